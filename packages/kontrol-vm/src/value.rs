//! Value types that flow through the trampoline.
//!
//! Programs are typed at the `Control<A>` surface. Inside the machine every
//! payload is boxed as `dyn Any` so frames of different types can share one
//! continuation stack; typed boundaries downcast on the way out.

use std::any::{type_name, Any};

use crate::error::VMError;

pub(crate) type Value = Box<dyn Any>;

pub(crate) fn boxed<A: 'static>(value: A) -> Value {
    Box::new(value)
}

pub(crate) fn downcast<A: 'static>(value: Value) -> Result<A, VMError> {
    value
        .downcast::<A>()
        .map(|value| *value)
        .map_err(|_| VMError::type_error(format!("expected value of type {}", type_name::<A>())))
}
