//! Mutable state as an effect.

use std::fmt;

use kontrol_vm::{ContMarker, Control, Handler, HandlerState, StateScope, Stateful};

use crate::error::EffectError;

/// State of type `S` for a region answering `R`.
pub struct State<S, R> {
    marker: ContMarker<R>,
    state: HandlerState<S>,
}

impl<S: Clone + 'static, R: 'static> State<S, R> {
    pub fn new(initial: S) -> Self {
        State {
            marker: ContMarker::fresh(),
            state: HandlerState::new(initial),
        }
    }

    pub fn get(&self) -> Control<S> {
        self.use_state(|current, commit| commit.resume_unchanged(current))
    }

    pub fn put(&self, value: S) -> Control<()> {
        self.use_state(move |_, commit| commit.resume((), value))
    }

    /// Replace the state with `f(state)` and return the new value.
    pub fn modify<F>(&self, f: F) -> Control<S>
    where
        F: FnOnce(S) -> S + 'static,
    {
        self.use_state(move |current, commit| {
            let next = f(current);
            commit.resume(next.clone(), next)
        })
    }

    /// The state as seen from outside any program.
    pub fn current(&self) -> Option<S> {
        self.state.get()
    }
}

impl<S, R> Clone for State<S, R> {
    fn clone(&self) -> Self {
        State {
            marker: self.marker,
            state: self.state.clone(),
        }
    }
}

impl<S, R> fmt::Debug for State<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State").field("marker", &self.marker).finish()
    }
}

impl<S: Clone + 'static, R: 'static> Handler for State<S, R> {
    type Answer = R;
    type Ops = State<S, R>;

    fn marker(&self) -> ContMarker<R> {
        self.marker
    }

    fn ops(&self) -> State<S, R> {
        self.clone()
    }

    fn scoped_state(&self) -> Option<StateScope> {
        Some(self.state.scope())
    }
}

impl<S: Clone + 'static, R: 'static> Stateful for State<S, R> {
    type State = S;

    fn state(&self) -> &HandlerState<S> {
        &self.state
    }
}

/// Run `program` with state starting at `initial`; answers the program's
/// result together with the final state.
pub fn run_state<S, R, F>(initial: S, program: F) -> Control<(R, S)>
where
    S: Clone + 'static,
    R: 'static,
    F: FnOnce(State<S, R>) -> Control<R> + 'static,
{
    let handler = State::new(initial);
    let state = handler.state.clone();
    handler.handle(program).try_map(move |result| {
        let last = state.get().ok_or_else(|| EffectError::missing_state("State"))?;
        Ok((result, last))
    })
}
