/// Core types for recorded state differences and undo steps.
use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Forward and inverse patch lists describing one state change.
///
/// `forward` takes the old state to the new one; `inverse` takes the new
/// state back to the old one. The patch type is opaque here: it is only
/// concatenated and handed back to the patch engine for replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patches<P> {
    pub forward: Vec<P>,
    pub inverse: Vec<P>,
}

impl<P> Default for Patches<P> {
    fn default() -> Self {
        Self {
            forward: Vec::new(),
            inverse: Vec::new(),
        }
    }
}

impl<P> Patches<P> {
    pub fn new(forward: Vec<P>, inverse: Vec<P>) -> Self {
        Self { forward, inverse }
    }

    /// Whether the change is a no-op (no forward edits).
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Folds a newer change on top of this one.
    ///
    /// Forward edits run oldest first; inverse edits must undo the newest
    /// edit first, so the newer inverse list goes in front.
    pub fn merged_with(self, newer: Patches<P>) -> Patches<P> {
        let mut forward = self.forward;
        forward.extend(newer.forward);
        let mut inverse = newer.inverse;
        inverse.extend(self.inverse);
        Patches { forward, inverse }
    }
}

/// One undoable unit.
///
/// `actions` normally holds a single entry; consecutive mergeable actions
/// accumulate here, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step<P> {
    pub patches: Patches<P>,
    pub actions: Vec<Action>,
}

impl<P> Step<P> {
    pub fn new(patches: Patches<P>, action: Action) -> Self {
        Self {
            patches,
            actions: vec![action],
        }
    }

    /// The most recently recorded action of this step.
    pub fn latest_action(&self) -> Option<&Action> {
        self.actions.first()
    }
}
