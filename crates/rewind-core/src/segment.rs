// Resolves which history stream an action/state pair belongs to.
use std::sync::Arc;

use rewind_mod_history::{Action, HistoryKey};

use crate::config::SegmentationOverride;

/// Derives a stream key from the state.
pub type Segmenter<S> = Arc<dyn Fn(&S) -> HistoryKey + Send + Sync>;

/// Stream key resolution.
///
/// An action override wins; otherwise the segmenter is applied to the
/// state; with no segmenter every action lands in the default stream.
pub struct SegmentResolver<S> {
    segmenter: Option<Segmenter<S>>,
    action_override: Option<SegmentationOverride>,
}

impl<S> Clone for SegmentResolver<S> {
    fn clone(&self) -> Self {
        Self {
            segmenter: self.segmenter.clone(),
            action_override: self.action_override.clone(),
        }
    }
}

impl<S> Default for SegmentResolver<S> {
    fn default() -> Self {
        Self {
            segmenter: None,
            action_override: None,
        }
    }
}

impl<S> std::fmt::Debug for SegmentResolver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentResolver")
            .field("segmented", &self.segmenter.is_some())
            .field("action_override", &self.action_override.is_some())
            .finish()
    }
}

impl<S> SegmentResolver<S> {
    pub fn new(
        segmenter: Option<Segmenter<S>>,
        action_override: Option<SegmentationOverride>,
    ) -> Self {
        Self {
            segmenter,
            action_override,
        }
    }

    pub fn segmenter(&self) -> Option<&Segmenter<S>> {
        self.segmenter.as_ref()
    }

    pub fn resolve(&self, state: &S, action: Option<&Action>) -> HistoryKey {
        if let (Some(action), Some(action_override)) = (action, &self.action_override) {
            if let Some(key) = action_override(action) {
                return key;
            }
        }
        match &self.segmenter {
            Some(segmenter) => segmenter(state),
            None => HistoryKey::default(),
        }
    }
}
