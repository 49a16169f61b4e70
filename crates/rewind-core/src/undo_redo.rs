/// Undo/redo wrapper around a patch-reporting reducer.
///
/// Intercepts the reserved control kinds (undo, redo, clear, break-merge)
/// and, for every other action, runs the wrapped reducer with a patch sink
/// and records what it reports into the active stream's history.
use std::sync::Arc;

use rewind_mod_history::{Action, History, HistoryKey};

use crate::capture::{capture, Capture};
use crate::config::UndoRedoConfig;
use crate::engine::{PatchEngine, PatchReducer, PatchSink, Reducer, UndoRedoState};
use crate::segment::{SegmentResolver, Segmenter};
use crate::selectors::HistorySelectors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Undo,
    Redo,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Undo => f.write_str("undo"),
            Direction::Redo => f.write_str("redo"),
        }
    }
}

/// A reducer with undo/redo history.
pub struct UndoRedo<S, R, E> {
    reducer: R,
    engine: E,
    config: UndoRedoConfig,
    resolver: SegmentResolver<S>,
}

impl<S, R, E> std::fmt::Debug for UndoRedo<S, R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoRedo")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl<S, R, E> UndoRedo<S, R, E>
where
    S: UndoRedoState,
    R: PatchReducer<S>,
    E: PatchEngine<S>,
{
    /// Wraps `reducer` with a single, unsegmented history stream.
    pub fn wrap(reducer: R, engine: E, config: UndoRedoConfig) -> Self {
        let resolver = SegmentResolver::new(None, config.override_fn().cloned());
        Self {
            reducer,
            engine,
            config,
            resolver,
        }
    }

    /// Keeps one history stream per key derived from the state.
    pub fn segmented<F>(self, segmenter: F) -> Self
    where
        F: Fn(&S) -> HistoryKey + Send + Sync + 'static,
    {
        let segmenter: Segmenter<S> = Arc::new(segmenter);
        let resolver = SegmentResolver::new(Some(segmenter), self.config.override_fn().cloned());
        Self { resolver, ..self }
    }

    pub fn config(&self) -> &UndoRedoConfig {
        &self.config
    }

    /// Read-only history accessors sharing this wrapper's segmenter.
    ///
    /// Without an explicit key they look at the stream active for the given
    /// state, the same one `UNDO` would act on. Use `HistorySelectors::new()`
    /// to always read the default stream instead.
    pub fn selectors(&self) -> HistorySelectors<S> {
        HistorySelectors::from_segmenter(self.resolver.segmenter().cloned())
    }

    /// Computes the next state for `action`.
    pub fn reduce(&self, state: Option<S>, action: &Action) -> S {
        // No history key can be resolved before a state exists
        let Some(state) = state else {
            return self.reducer.reduce(None, action, None);
        };

        let key = self.resolver.resolve(&state, Some(action));
        let kinds = self.config.kinds();
        let kind = action.kind();

        if kind == kinds.undo {
            self.replay(state, action, key, Direction::Undo)
        } else if kind == kinds.redo {
            self.replay(state, action, key, Direction::Redo)
        } else if kind == kinds.clear {
            self.clear(state, key)
        } else if kind == kinds.break_merge {
            self.break_merge(state, key)
        } else {
            self.record(state, action, key)
        }
    }

    /// Moves one step between the stacks and applies its patches.
    fn replay(&self, mut state: S, action: &Action, key: HistoryKey, direction: Direction) -> S {
        let available = state
            .histories()
            .get(&key)
            .is_some_and(|history| match direction {
                Direction::Undo => history.can_undo(),
                Direction::Redo => history.can_redo(),
            });
        if !available {
            tracing::trace!("Nothing to {direction} in stream {key}");
            return state;
        }

        let mut history = state.histories_mut().take(&key);
        let step = match direction {
            Direction::Undo => history.undo(),
            Direction::Redo => history.redo(),
        };
        let applied = match step {
            Some(step) => {
                let patches = match direction {
                    Direction::Undo => &step.patches.inverse,
                    Direction::Redo => &step.patches.forward,
                };
                self.engine.apply(&mut state, patches)
            }
            None => Ok(()),
        };

        if let Err(e) = applied {
            tracing::warn!("Failed to {direction} in stream {key}: {e:#}");
            match direction {
                Direction::Undo => history.revert_undo(),
                Direction::Redo => history.revert_redo(),
            }
            state.histories_mut().insert(key, history);
            return state;
        }

        tracing::debug!(
            "Applied {direction} in stream {key} (undoable: {}, undone: {})",
            history.undoable.len(),
            history.undone.len()
        );
        state.histories_mut().insert(key, history);
        self.reducer.reduce(Some(state), action, None)
    }

    fn clear(&self, mut state: S, key: HistoryKey) -> S {
        tracing::debug!("Clearing history stream {key}");
        state.histories_mut().insert(key, History::new());
        state
    }

    fn break_merge(&self, mut state: S, key: HistoryKey) -> S {
        tracing::debug!("Breaking merge in stream {key}");
        state.histories_mut().entry(key).break_merge();
        state
    }

    /// Runs the wrapped reducer and records its patches under `key`.
    ///
    /// `key` is resolved from the state before the action ran, so an action
    /// that switches the active stream is still undone in the stream it edited.
    fn record(&self, state: S, action: &Action, key: HistoryKey) -> S {
        if !self.config.is_undoable(action) {
            tracing::trace!("Action {} is not undoable", action.kind());
            return self.reducer.reduce(Some(state), action, None);
        }

        let mut sink = PatchSink::new();
        let mut next = self.reducer.reduce(Some(state), action, Some(&mut sink));

        let patches = match sink.take() {
            Some(patches) if !patches.is_empty() => patches,
            _ => {
                tracing::trace!("Action {} changed nothing", action.kind());
                return next;
            }
        };

        let history = next.histories_mut().entry(key.clone());
        match capture(history, action, patches, &self.config) {
            Capture::Recorded => tracing::debug!(
                "Recorded {} in stream {key} (undoable: {})",
                action.kind(),
                history.undoable.len()
            ),
            Capture::Merged => {
                tracing::debug!("Merged {} into latest step of stream {key}", action.kind())
            }
            Capture::Unchanged => {}
        }
        next
    }
}

impl<S, R, E> Reducer<S> for UndoRedo<S, R, E>
where
    S: UndoRedoState,
    R: PatchReducer<S>,
    E: PatchEngine<S>,
{
    fn reduce(&self, state: Option<S>, action: &Action) -> S {
        UndoRedo::reduce(self, state, action)
    }
}
