/// Capture & merge: turns the patches of a completed action into history.
use rewind_mod_history::{Action, History, Patches, Step};

use crate::config::UndoRedoConfig;

/// What a capture did to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// The action changed nothing; history untouched.
    Unchanged,
    /// A new step was recorded.
    Recorded,
    /// The change was folded into the latest step.
    Merged,
}

/// Records `patches` produced by `action` into `history`.
///
/// Merges into the latest step when the merge break is not set and the
/// config says the latest recorded action and `action` merge. Otherwise
/// records a new step, evicting the oldest beyond the buffer size.
pub fn capture<P>(
    history: &mut History<P>,
    action: &Action,
    patches: Patches<P>,
    config: &UndoRedoConfig,
) -> Capture {
    if patches.is_empty() {
        return Capture::Unchanged;
    }

    let merge = !history.merge_broken
        && history
            .latest_action()
            .is_some_and(|previous| config.should_merge(previous, action));

    let recorded = config.slim(action);
    if merge {
        history.merge_latest(patches, recorded, config.buffer_size());
        Capture::Merged
    } else {
        history.record(Step::new(patches, recorded), config.buffer_size());
        Capture::Recorded
    }
}
