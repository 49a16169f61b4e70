/// Undo/redo stacks for a single history stream.
///
/// Both stacks keep their most recent step at the front. The undoable stack
/// is bounded by the capacity passed to `record`; older steps fall off the
/// back without notice.
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::step::{Patches, Step};

/// Per-stream history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History<P> {
    /// Steps that can be undone, most recent first.
    pub undoable: VecDeque<Step<P>>,
    /// Steps that were undone and can be redone, most recent first.
    pub undone: VecDeque<Step<P>>,
    /// When set, the next recorded step never merges into the latest one.
    pub merge_broken: bool,
}

impl<P> Default for History<P> {
    fn default() -> Self {
        Self {
            undoable: VecDeque::new(),
            undone: VecDeque::new(),
            merge_broken: false,
        }
    }
}

impl<P> History<P> {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent undoable step.
    pub fn latest(&self) -> Option<&Step<P>> {
        self.undoable.front()
    }

    /// The most recent action of the most recent undoable step.
    pub fn latest_action(&self) -> Option<&Action> {
        self.latest().and_then(Step::latest_action)
    }

    /// Records a new step, dropping the oldest steps beyond `capacity`.
    ///
    /// Invalidates the redo stack and lifts any merge break.
    pub fn record(&mut self, step: Step<P>, capacity: usize) {
        self.undoable.push_front(step);
        self.undoable.truncate(capacity.max(1));
        self.undone.clear();
        self.merge_broken = false;
    }

    /// Folds `patches` and `action` into the latest step.
    ///
    /// Falls back to recording a fresh step when there is nothing to merge
    /// into. Invalidates the redo stack and lifts any merge break.
    pub fn merge_latest(&mut self, patches: Patches<P>, action: Action, capacity: usize) {
        let Some(latest) = self.undoable.pop_front() else {
            self.record(Step::new(patches, action), capacity);
            return;
        };

        let mut actions = latest.actions;
        actions.insert(0, action);
        self.undoable.push_front(Step {
            patches: latest.patches.merged_with(patches),
            actions,
        });
        self.undone.clear();
        self.merge_broken = false;
    }

    /// Moves the latest undoable step onto the redo stack.
    ///
    /// Returns the moved step, or `None` if there's nothing to undo.
    pub fn undo(&mut self) -> Option<&Step<P>> {
        let step = self.undoable.pop_front()?;
        self.undone.push_front(step);
        self.undone.front()
    }

    /// Moves the latest undone step back onto the undoable stack.
    ///
    /// Returns the moved step, or `None` if there's nothing to redo.
    pub fn redo(&mut self) -> Option<&Step<P>> {
        let step = self.undone.pop_front()?;
        self.undoable.push_front(step);
        self.undoable.front()
    }

    /// Reverses the last successful `undo` (used when replay fails).
    pub fn revert_undo(&mut self) {
        if let Some(step) = self.undone.pop_front() {
            self.undoable.push_front(step);
        }
    }

    /// Reverses the last successful `redo` (used when replay fails).
    pub fn revert_redo(&mut self) {
        if let Some(step) = self.undoable.pop_front() {
            self.undone.push_front(step);
        }
    }

    /// Empties both stacks and lifts any merge break.
    pub fn clear(&mut self) {
        self.undoable.clear();
        self.undone.clear();
        self.merge_broken = false;
    }

    /// Forces the next recorded step to start a new undo step.
    pub fn break_merge(&mut self) {
        self.merge_broken = true;
    }

    /// Whether undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undoable.is_empty()
    }

    /// Whether redo is available.
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }
}
