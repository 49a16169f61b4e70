pub mod settings;

pub use settings::{ActionKinds, UndoRedoSettings, DEFAULT_MAX_BUFFER_SIZE};
