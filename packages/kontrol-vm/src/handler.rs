//! Handler extension point.
//!
//! A handler couples one prompt with an operations value. Client code is
//! written against the operations; [`Handler::handle`] installs the prompt
//! (and the handler's scoped state, if any) and hands the operations to the
//! program, so every effect performed through them targets this installation.

use crate::capture::Resume;
use crate::control::Control;
use crate::error::Throwable;
use crate::marker::{ContMarker, StateScope};

pub trait Handler: Clone + 'static {
    /// Answer type of the handled region.
    type Answer: 'static;

    /// Operations handed to programs run under this handler.
    type Ops: 'static;

    fn marker(&self) -> ContMarker<Self::Answer>;

    fn ops(&self) -> Self::Ops;

    /// State installed around the handled region. Stateful handlers return
    /// `Some(self.state().scope())`.
    fn scoped_state(&self) -> Option<StateScope> {
        None
    }

    /// Perform an effect handled by this handler.
    fn use_effect<A, F>(&self, body: F) -> Control<A>
    where
        A: 'static,
        F: FnOnce(Resume<A, Self::Answer>) -> Control<Self::Answer> + 'static,
    {
        Control::use_cont(self.marker(), body)
    }

    fn try_use_effect<A, F>(&self, body: F) -> Control<A>
    where
        A: 'static,
        F: FnOnce(Resume<A, Self::Answer>) -> Result<Control<Self::Answer>, Throwable> + 'static,
    {
        Control::try_use_cont(self.marker(), body)
    }

    /// Run `program` with this handler installed.
    ///
    /// The state frame sits outside the handler frame, so the handler's own
    /// state is never captured by its own effects.
    fn handle<F>(&self, program: F) -> Control<Self::Answer>
    where
        F: FnOnce(Self::Ops) -> Control<Self::Answer> + 'static,
    {
        let ops = self.ops();
        let handled = Control::delimit_cont(self.marker(), move |_| program(ops));
        match self.scoped_state() {
            Some(scope) => Control::delimit_scope(scope, handled),
            None => handled,
        }
    }
}
