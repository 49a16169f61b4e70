/// Stream keys and the keyed history store.
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::history::History;

/// Key used when no segmenter is configured (a single global stream).
pub const DEFAULT_KEY: &str = "DEFAULT";

/// Identifier of one history stream.
///
/// Numeric keys are stored in their decimal form, so `HistoryKey::from(1)`
/// and `HistoryKey::from("1")` address the same stream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryKey(String);

impl HistoryKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HistoryKey {
    fn default() -> Self {
        Self(DEFAULT_KEY.to_string())
    }
}

impl fmt::Display for HistoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HistoryKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for HistoryKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&String> for HistoryKey {
    fn from(key: &String) -> Self {
        Self(key.clone())
    }
}

macro_rules! numeric_key {
    ($($t:ty),*) => {
        $(
            impl From<$t> for HistoryKey {
                fn from(key: $t) -> Self {
                    Self(key.to_string())
                }
            }
        )*
    };
}

numeric_key!(i32, i64, u32, u64, usize);

/// History stacks keyed by stream.
///
/// Entries are created lazily on first touch and are never removed; an
/// absent key behaves like an empty `History`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Histories<P> {
    streams: BTreeMap<HistoryKey, History<P>>,
}

impl<P> Default for Histories<P> {
    fn default() -> Self {
        Self {
            streams: BTreeMap::new(),
        }
    }
}

impl<P> Histories<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the history for `key`, if the stream has been touched.
    pub fn get(&self, key: &HistoryKey) -> Option<&History<P>> {
        self.streams.get(key)
    }

    /// Returns the history for `key`, creating an empty one if needed.
    pub fn entry(&mut self, key: HistoryKey) -> &mut History<P> {
        self.streams.entry(key).or_default()
    }

    /// Stores `history` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: HistoryKey, history: History<P>) {
        self.streams.insert(key, history);
    }

    /// Removes and returns the history for `key` (empty if untouched).
    pub fn take(&mut self, key: &HistoryKey) -> History<P> {
        self.streams.remove(key).unwrap_or_default()
    }

    pub fn contains(&self, key: &HistoryKey) -> bool {
        self.streams.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &HistoryKey> {
        self.streams.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, HistoryKey, History<P>> {
        self.streams.iter()
    }
}
