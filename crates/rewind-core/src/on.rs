/// Declarative reducer built from per-kind draft handlers.
///
/// Handlers are looked up by action kind in a map built once; registering a
/// second handler for a kind composes it after the first, and both run
/// against the same draft so the action still reports a single patch set.
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use rewind_mod_history::{Action, HistoryKey};

use crate::config::UndoRedoConfig;
use crate::engine::{PatchReducer, PatchSink};
use crate::json::{Draft, JsonPatch, JsonPatchEngine, JsonState};
use crate::undo_redo::UndoRedo;

/// Mutates a draft in response to an action.
pub type Handler = Arc<dyn Fn(&mut Draft<'_>, &Action) -> Result<()> + Send + Sync>;

/// An undo/redo wrapper over an `OnReducer`.
pub type JsonUndoRedo = UndoRedo<JsonState, OnReducer, JsonPatchEngine>;

#[derive(Clone)]
pub struct OnReducer {
    initial: Value,
    handlers: HashMap<String, Handler>,
    engine: JsonPatchEngine,
}

impl std::fmt::Debug for OnReducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&String> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("OnReducer")
            .field("initial", &self.initial)
            .field("kinds", &kinds)
            .finish()
    }
}

impl OnReducer {
    /// Creates a reducer whose first state holds `initial`.
    pub fn new(initial: Value) -> Self {
        Self {
            initial,
            handlers: HashMap::new(),
            engine: JsonPatchEngine,
        }
    }

    /// Registers `handler` for each of `kinds`.
    pub fn on<F>(mut self, kinds: &[&str], handler: F) -> Self
    where
        F: Fn(&mut Draft<'_>, &Action) -> Result<()> + Send + Sync + 'static,
    {
        let handler = boxed(handler);
        for kind in kinds {
            let composed = match self.handlers.remove(*kind) {
                Some(previous) => {
                    let next = Arc::clone(&handler);
                    boxed(move |draft, action| {
                        previous(draft, action)?;
                        next(draft, action)
                    })
                }
                None => Arc::clone(&handler),
            };
            self.handlers.insert((*kind).to_string(), composed);
        }
        self
    }

    /// The state handed out before any action ran.
    pub fn initial_state(&self) -> JsonState {
        JsonState::new(self.initial.clone())
    }

    /// Wraps this reducer with an unsegmented undo/redo history.
    pub fn wrap(self, config: UndoRedoConfig) -> JsonUndoRedo {
        UndoRedo::wrap(self, JsonPatchEngine, config)
    }

    /// Wraps this reducer with one history stream per `segmenter` key.
    pub fn wrap_segmented<F>(self, config: UndoRedoConfig, segmenter: F) -> JsonUndoRedo
    where
        F: Fn(&JsonState) -> HistoryKey + Send + Sync + 'static,
    {
        self.wrap(config).segmented(segmenter)
    }
}

fn boxed<F>(handler: F) -> Handler
where
    F: Fn(&mut Draft<'_>, &Action) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(handler)
}

impl PatchReducer<JsonState> for OnReducer {
    fn reduce(
        &self,
        state: Option<JsonState>,
        action: &Action,
        sink: Option<&mut PatchSink<JsonPatch>>,
    ) -> JsonState {
        let mut state = state.unwrap_or_else(|| self.initial_state());
        let Some(handler) = self.handlers.get(action.kind()) else {
            return state;
        };

        match self
            .engine
            .produce(&mut state, |draft| handler(draft, action))
        {
            Ok(patches) => {
                if let Some(sink) = sink {
                    sink.emit(patches);
                }
            }
            Err(e) => {
                tracing::warn!("Handler for {} failed: {e:#}", action.kind());
            }
        }
        state
    }
}
