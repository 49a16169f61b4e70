/// Seams between the history wrapper, the caller's state, and the patch engine.
use anyhow::Result;

use rewind_mod_history::{Action, Histories, Patches};

/// A state tree that embeds a history store under a reserved field.
pub trait UndoRedoState {
    /// Edit operation produced and replayed by the patch engine.
    type Patch: Clone;

    fn histories(&self) -> &Histories<Self::Patch>;

    fn histories_mut(&mut self) -> &mut Histories<Self::Patch>;
}

/// Replays recorded patches onto a state.
pub trait PatchEngine<S: UndoRedoState> {
    /// Applies `patches` in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any patch does not fit the state. `state` must be
    /// left exactly as it was in that case.
    fn apply(&self, state: &mut S, patches: &[S::Patch]) -> Result<()>;
}

/// Receives the patches produced while a reducer runs.
///
/// Handed to the wrapped reducer for capturable actions only. A reducer
/// emits at most once per invocation; a second emit replaces the first.
#[derive(Debug)]
pub struct PatchSink<P> {
    captured: Option<Patches<P>>,
}

impl<P> Default for PatchSink<P> {
    fn default() -> Self {
        Self { captured: None }
    }
}

impl<P> PatchSink<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports the forward/inverse patches of the change just made.
    pub fn emit(&mut self, patches: Patches<P>) {
        if self.captured.is_some() {
            tracing::warn!("Reducer emitted patches more than once; keeping the latest");
        }
        self.captured = Some(patches);
    }

    /// Takes the captured patches, if any were emitted.
    pub fn take(&mut self) -> Option<Patches<P>> {
        self.captured.take()
    }
}

/// A reducer that reports its changes as patches.
///
/// `state` is `None` on the very first call; the reducer must then produce
/// its initial state.
pub trait PatchReducer<S: UndoRedoState> {
    fn reduce(&self, state: Option<S>, action: &Action, sink: Option<&mut PatchSink<S::Patch>>)
        -> S;
}

impl<S, F> PatchReducer<S> for F
where
    S: UndoRedoState,
    F: Fn(Option<S>, &Action, Option<&mut PatchSink<S::Patch>>) -> S,
{
    fn reduce(
        &self,
        state: Option<S>,
        action: &Action,
        sink: Option<&mut PatchSink<S::Patch>>,
    ) -> S {
        self(state, action, sink)
    }
}

/// A plain `(state, action) -> state` reducer.
pub trait Reducer<S> {
    fn reduce(&self, state: Option<S>, action: &Action) -> S;
}
