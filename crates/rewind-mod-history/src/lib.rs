/// Plain-data undo/redo history model.
///
/// Provides the `History` stacks kept per stream, the `Step` records they
/// hold, and the `Histories` map that embeds them into a caller's state tree.
/// Everything here is serializable so history travels with the state.
pub mod action;
pub mod history;
pub mod key;
pub mod step;

pub use action::Action;
pub use history::History;
pub use key::{Histories, HistoryKey, DEFAULT_KEY};
pub use step::{Patches, Step};
