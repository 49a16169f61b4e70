//! JSON patch engine: state documents as `serde_json::Value`, edits
//! recorded through a `Draft` and replayed as RFC 6902-style patches.

mod draft;
mod patch;

pub use draft::Draft;
pub use patch::{apply_all, apply_op, escape_token, JsonPatch};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use rewind_mod_history::{Histories, Patches};

use crate::engine::{PatchEngine, UndoRedoState};

/// A JSON document with its history store alongside.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JsonState {
    pub data: Value,
    #[serde(default)]
    pub histories: Histories<JsonPatch>,
}

impl JsonState {
    /// Wraps `data` with an empty history store.
    pub fn new(data: Value) -> Self {
        Self {
            data,
            histories: Histories::new(),
        }
    }

    /// Reads the value at `pointer` in the document.
    pub fn get(&self, pointer: &str) -> Option<&Value> {
        self.data.pointer(pointer)
    }
}

impl UndoRedoState for JsonState {
    type Patch = JsonPatch;

    fn histories(&self) -> &Histories<JsonPatch> {
        &self.histories
    }

    fn histories_mut(&mut self) -> &mut Histories<JsonPatch> {
        &mut self.histories
    }
}

/// Produces and replays patches on `JsonState` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPatchEngine;

impl JsonPatchEngine {
    /// Runs `recipe` against a draft of `state.data`.
    ///
    /// Returns the forward/inverse patches describing what the recipe did.
    /// The history store is never touched.
    ///
    /// # Errors
    ///
    /// Returns the recipe's error after reverting its edits.
    pub fn produce<F>(&self, state: &mut JsonState, recipe: F) -> Result<Patches<JsonPatch>>
    where
        F: FnOnce(&mut Draft<'_>) -> Result<()>,
    {
        let mut draft = Draft::new(&mut state.data);
        match recipe(&mut draft) {
            Ok(()) => Ok(draft.finish()),
            Err(e) => {
                draft.abort();
                Err(e)
            }
        }
    }
}

impl PatchEngine<JsonState> for JsonPatchEngine {
    fn apply(&self, state: &mut JsonState, patches: &[JsonPatch]) -> Result<()> {
        apply_all(&mut state.data, patches)
    }
}
