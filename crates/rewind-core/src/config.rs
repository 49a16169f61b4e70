/// Runtime undo/redo policy.
///
/// Wraps the serializable `UndoRedoSettings` with lookup sets built once at
/// construction, plus the closure-valued knobs that cannot live in a file.
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use rewind_config::{ActionKinds, UndoRedoSettings};
use rewind_mod_history::{Action, HistoryKey};

/// Decides whether two consecutive actions of the same kind merge.
/// Called as `(previous, current)`.
pub type MergeRule = Arc<dyn Fn(&Action, &Action) -> bool + Send + Sync>;

/// Picks a stream key from an action, overriding the state-derived one.
pub type SegmentationOverride = Arc<dyn Fn(&Action) -> Option<HistoryKey> + Send + Sync>;

/// Whether recorded actions keep their payload.
#[derive(Clone, Default)]
pub enum TrackPayload {
    /// Keep every payload.
    All,
    /// Keep only the kind.
    #[default]
    None,
    /// Keep the payload of actions matching the predicate.
    When(Arc<dyn Fn(&Action) -> bool + Send + Sync>),
}

impl TrackPayload {
    pub fn tracks(&self, action: &Action) -> bool {
        match self {
            TrackPayload::All => true,
            TrackPayload::None => false,
            TrackPayload::When(predicate) => predicate(action),
        }
    }
}

impl From<bool> for TrackPayload {
    fn from(track: bool) -> Self {
        if track {
            TrackPayload::All
        } else {
            TrackPayload::None
        }
    }
}

impl fmt::Debug for TrackPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackPayload::All => f.write_str("All"),
            TrackPayload::None => f.write_str("None"),
            TrackPayload::When(_) => f.write_str("When(..)"),
        }
    }
}

/// Policy consumed by the undo/redo wrapper. Immutable once built.
#[derive(Clone)]
pub struct UndoRedoConfig {
    max_buffer_size: usize,
    allowed_action_kinds: HashSet<String>,
    merge_action_kinds: HashSet<String>,
    merge_rules: HashMap<String, MergeRule>,
    action_kinds: ActionKinds,
    segmentation_override: Option<SegmentationOverride>,
    track_payload: TrackPayload,
}

impl fmt::Debug for UndoRedoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rule_kinds: Vec<&String> = self.merge_rules.keys().collect();
        rule_kinds.sort();
        f.debug_struct("UndoRedoConfig")
            .field("max_buffer_size", &self.max_buffer_size)
            .field("allowed_action_kinds", &self.allowed_action_kinds)
            .field("merge_action_kinds", &self.merge_action_kinds)
            .field("merge_rules", &rule_kinds)
            .field("action_kinds", &self.action_kinds)
            .field(
                "segmentation_override",
                &self.segmentation_override.is_some(),
            )
            .field("track_payload", &self.track_payload)
            .finish()
    }
}

impl Default for UndoRedoConfig {
    fn default() -> Self {
        Self::from(UndoRedoSettings::default())
    }
}

impl From<UndoRedoSettings> for UndoRedoConfig {
    fn from(mut settings: UndoRedoSettings) -> Self {
        settings.sanitize();
        Self {
            max_buffer_size: settings.max_buffer_size,
            allowed_action_kinds: settings.allowed_action_kinds.into_iter().collect(),
            merge_action_kinds: settings.merge_action_kinds.into_iter().collect(),
            merge_rules: HashMap::new(),
            action_kinds: settings.action_kinds,
            segmentation_override: None,
            track_payload: settings.track_action_payload.into(),
        }
    }
}

impl UndoRedoConfig {
    /// Creates a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many undoable steps each stream keeps (at least one).
    pub fn max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size.max(1);
        self
    }

    /// Restricts capture to the given kinds.
    pub fn allow<I, K>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.allowed_action_kinds
            .extend(kinds.into_iter().map(Into::into));
        self
    }

    /// Makes consecutive actions of these kinds always merge.
    pub fn merge<I, K>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.merge_action_kinds
            .extend(kinds.into_iter().map(Into::into));
        self
    }

    /// Registers a merge predicate for `kind`.
    pub fn merge_rule<F>(mut self, kind: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&Action, &Action) -> bool + Send + Sync + 'static,
    {
        self.merge_rules.insert(kind.into(), Arc::new(rule));
        self
    }

    /// Overrides the reserved control kinds.
    pub fn action_kinds(mut self, kinds: ActionKinds) -> Self {
        let mut settings = UndoRedoSettings {
            action_kinds: kinds,
            ..Default::default()
        };
        settings.sanitize();
        self.action_kinds = settings.action_kinds;
        self
    }

    /// Lets actions pick their stream key.
    pub fn segmentation_override<F>(mut self, f: F) -> Self
    where
        F: Fn(&Action) -> Option<HistoryKey> + Send + Sync + 'static,
    {
        self.segmentation_override = Some(Arc::new(f));
        self
    }

    /// Keeps all payloads (`true`) or none (`false`).
    pub fn track_payload(mut self, track: bool) -> Self {
        self.track_payload = track.into();
        self
    }

    /// Keeps the payload of actions matching `predicate`.
    pub fn track_payload_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Action) -> bool + Send + Sync + 'static,
    {
        self.track_payload = TrackPayload::When(Arc::new(predicate));
        self
    }

    pub fn buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    pub fn kinds(&self) -> &ActionKinds {
        &self.action_kinds
    }

    pub fn override_fn(&self) -> Option<&SegmentationOverride> {
        self.segmentation_override.as_ref()
    }

    /// Whether `action` participates in capture.
    pub fn is_undoable(&self, action: &Action) -> bool {
        self.allowed_action_kinds.is_empty() || self.allowed_action_kinds.contains(action.kind())
    }

    /// Whether `current` merges into the step whose latest action is `previous`.
    pub fn should_merge(&self, previous: &Action, current: &Action) -> bool {
        if previous.kind() != current.kind() {
            return false;
        }
        self.merge_action_kinds.contains(current.kind())
            || self
                .merge_rules
                .get(current.kind())
                .is_some_and(|rule| rule(previous, current))
    }

    /// The form of `action` to store in history.
    pub fn slim(&self, action: &Action) -> Action {
        if self.track_payload.tracks(action) {
            action.clone()
        } else {
            action.slim()
        }
    }
}
