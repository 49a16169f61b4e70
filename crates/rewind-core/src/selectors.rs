/// Read-only history accessors for UI collaborators.
use std::sync::Arc;

use rewind_mod_history::{History, HistoryKey};

use crate::engine::UndoRedoState;
use crate::segment::{SegmentResolver, Segmenter};

/// Looks up history streams and undo/redo availability.
///
/// Without an explicit key the active stream is used: the segmenter's key if
/// one is configured, the default key otherwise.
pub struct HistorySelectors<S> {
    resolver: SegmentResolver<S>,
}

impl<S> Clone for HistorySelectors<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
        }
    }
}

impl<S> Default for HistorySelectors<S> {
    fn default() -> Self {
        Self {
            resolver: SegmentResolver::default(),
        }
    }
}

impl<S> std::fmt::Debug for HistorySelectors<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistorySelectors")
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl<S: UndoRedoState> HistorySelectors<S> {
    /// Selectors over the single default stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selectors whose active stream comes from `segmenter`.
    pub fn segmented<F>(segmenter: F) -> Self
    where
        F: Fn(&S) -> HistoryKey + Send + Sync + 'static,
    {
        let segmenter: Segmenter<S> = Arc::new(segmenter);
        Self::from_segmenter(Some(segmenter))
    }

    pub(crate) fn from_segmenter(segmenter: Option<Segmenter<S>>) -> Self {
        Self {
            resolver: SegmentResolver::new(segmenter, None),
        }
    }

    /// The key of the stream currently active for `state`.
    pub fn active_key(&self, state: &S) -> HistoryKey {
        self.resolver.resolve(state, None)
    }

    /// The history for `key` (or the active stream), `None` if untouched.
    pub fn history<'s>(
        &self,
        state: &'s S,
        key: Option<&HistoryKey>,
    ) -> Option<&'s History<S::Patch>> {
        match key {
            Some(key) => state.histories().get(key),
            None => state.histories().get(&self.active_key(state)),
        }
    }

    pub fn can_undo(&self, state: &S, key: Option<&HistoryKey>) -> bool {
        self.history(state, key).is_some_and(History::can_undo)
    }

    pub fn can_redo(&self, state: &S, key: Option<&HistoryKey>) -> bool {
        self.history(state, key).is_some_and(History::can_redo)
    }
}
