/// Undo/redo policy settings: load, save, and sanitize.
use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default number of undoable steps kept per stream.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 32;

/// Reserved action kinds that drive the history instead of the reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionKinds {
    pub undo: String,
    pub redo: String,
    pub break_merge: String,
    pub clear: String,
}

impl Default for ActionKinds {
    fn default() -> Self {
        Self {
            undo: "UNDO".to_string(),
            redo: "REDO".to_string(),
            break_merge: "BREAK_MERGE".to_string(),
            clear: "CLEAR".to_string(),
        }
    }
}

/// Serializable undo/redo policy.
///
/// Anything that needs a closure (merge rules, segmentation override,
/// payload predicates) is configured at runtime on top of these settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoRedoSettings {
    /// How many undoable steps each stream keeps.
    pub max_buffer_size: usize,
    /// Kinds eligible for capture. Empty = every kind.
    pub allowed_action_kinds: Vec<String>,
    /// Kinds that always merge with an immediately preceding action of the same kind.
    pub merge_action_kinds: Vec<String>,
    /// Overrides for the reserved control kinds.
    pub action_kinds: ActionKinds,
    /// Whether recorded actions keep their payload.
    pub track_action_payload: bool,
}

impl Default for UndoRedoSettings {
    fn default() -> Self {
        Self {
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            allowed_action_kinds: Vec::new(),
            merge_action_kinds: Vec::new(),
            action_kinds: ActionKinds::default(),
            track_action_payload: false,
        }
    }
}

impl UndoRedoSettings {
    /// Parses settings from a JSON string and sanitizes them.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: UndoRedoSettings =
            serde_json::from_str(json).context("Failed to parse undo/redo settings")?;
        settings.sanitize();
        Ok(settings)
    }

    /// Loads settings from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (unreadable file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match Self::from_json(&contents) {
                    Ok(settings) => return settings,
                    Err(e) => {
                        tracing::warn!("Failed to parse settings at {}: {e:#}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read settings at {}: {e}", path.display());
                }
            }
            // Return defaults on error (don't overwrite broken file)
            Self::default()
        } else {
            let settings = Self::default();
            if let Err(e) = settings.save(path) {
                tracing::warn!(
                    "Failed to create default settings at {}: {e:#}",
                    path.display()
                );
            }
            settings
        }
    }

    /// Saves settings to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.max_buffer_size = self.max_buffer_size.max(1);
        dedup_kinds(&mut self.allowed_action_kinds);
        dedup_kinds(&mut self.merge_action_kinds);

        let defaults = ActionKinds::default();
        let kinds = &mut self.action_kinds;
        reset_if_blank(&mut kinds.undo, defaults.undo);
        reset_if_blank(&mut kinds.redo, defaults.redo);
        reset_if_blank(&mut kinds.break_merge, defaults.break_merge);
        reset_if_blank(&mut kinds.clear, defaults.clear);

        // Control kinds are intercepted before capture
        let reserved: Vec<String> = self
            .allowed_action_kinds
            .iter()
            .chain(&self.merge_action_kinds)
            .filter(|kind| self.is_reserved(kind))
            .cloned()
            .collect();
        if !reserved.is_empty() {
            tracing::warn!("Ignoring reserved control kinds in kind lists: {reserved:?}");
            self.allowed_action_kinds.retain(|kind| !reserved.contains(kind));
            self.merge_action_kinds.retain(|kind| !reserved.contains(kind));
        }
    }

    /// Whether `kind` names one of the reserved control actions.
    pub fn is_reserved(&self, kind: &str) -> bool {
        let kinds = &self.action_kinds;
        kind == kinds.undo || kind == kinds.redo || kind == kinds.break_merge || kind == kinds.clear
    }
}

/// Trims entries, drops blanks and duplicates, keeps first-seen order.
fn dedup_kinds(kinds: &mut Vec<String>) {
    let mut seen = HashSet::new();
    let cleaned: Vec<String> = kinds
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.clone()))
        .collect();
    *kinds = cleaned;
}

fn reset_if_blank(kind: &mut String, default: String) {
    if kind.trim().is_empty() {
        *kind = default;
    }
}
