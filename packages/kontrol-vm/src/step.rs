//! Step type of the trampoline.

use crate::continuation::MetaCont;
use crate::control::Node;
use crate::error::{Throwable, VMError};
use crate::value::Value;

/// Outcome of forcing one step.
///
/// `Value` and `Abort` end the run; `Computation` is the only case that
/// keeps the trampoline going.
pub(crate) enum Step {
    Value(Value),
    Abort(VMError),
    Computation(Node, MetaCont),
}

impl Step {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Step::Value(_) => "Value",
            Step::Abort(_) => "Abort",
            Step::Computation(..) => "Computation",
        }
    }
}

/// An exception raised while forcing a step, paired with the live
/// continuation it must unwind.
pub(crate) struct Thrown {
    pub(crate) error: Throwable,
    pub(crate) cont: MetaCont,
}

impl Thrown {
    pub(crate) fn new(error: Throwable, cont: MetaCont) -> Self {
        Thrown { error, cont }
    }
}
