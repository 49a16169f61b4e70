/// Undo/redo for reducer-driven state.
///
/// Wraps a reducer so every capturable action records the patches it
/// produced into a bounded per-stream history embedded in the state. The
/// reserved control kinds (undo, redo, clear, break-merge) replay or reset
/// that history. Ships a JSON patch engine and a declarative `OnReducer`
/// for `serde_json::Value` documents.
pub mod capture;
pub mod config;
pub mod engine;
pub mod json;
pub mod on;
pub mod segment;
pub mod selectors;
pub mod undo_redo;

pub use capture::{capture, Capture};
pub use config::{MergeRule, SegmentationOverride, TrackPayload, UndoRedoConfig};
pub use engine::{PatchEngine, PatchReducer, PatchSink, Reducer, UndoRedoState};
pub use json::{Draft, JsonPatch, JsonPatchEngine, JsonState};
pub use on::{Handler, JsonUndoRedo, OnReducer};
pub use segment::{SegmentResolver, Segmenter};
pub use selectors::HistorySelectors;
pub use undo_redo::UndoRedo;

pub use rewind_config::{ActionKinds, UndoRedoSettings, DEFAULT_MAX_BUFFER_SIZE};
pub use rewind_mod_history::{
    Action, Histories, History, HistoryKey, Patches, Step, DEFAULT_KEY,
};
