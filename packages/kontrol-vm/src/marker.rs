//! Capability markers installed on the continuation stack.
//!
//! Three kinds of delimiter can be installed:
//!
//! - [`ContMarker`]: a prompt identity that `use` sites split the continuation at.
//! - [`StateMarker`]: a backup/restore contract over an externally held cell.
//! - [`CatchMarker`]: a partial function from thrown errors to recovery programs.
//!
//! Any component can mint its own markers and install them through
//! `Control::delimit_cont`, `Control::delimit_state` and `Control::delimit_catch`.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::control::{Control, Node};
use crate::error::Throwable;
use crate::ids::Marker;
use crate::value::{boxed, downcast, Value};

/// Typed prompt identity. `R` is the answer type of the delimited region.
pub struct ContMarker<R> {
    marker: Marker,
    _answer: PhantomData<fn(R) -> R>,
}

impl<R> ContMarker<R> {
    /// Mint a fresh prompt.
    pub fn fresh() -> Self {
        ContMarker {
            marker: Marker::fresh(),
            _answer: PhantomData,
        }
    }

    pub fn marker(&self) -> Marker {
        self.marker
    }
}

impl<R> Clone for ContMarker<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ContMarker<R> {}

impl<R> PartialEq for ContMarker<R> {
    fn eq(&self, other: &Self) -> bool {
        self.marker == other.marker
    }
}

impl<R> Eq for ContMarker<R> {}

impl<R> fmt::Debug for ContMarker<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContMarker({})", self.marker.raw())
    }
}

/// Backup/restore contract for state that must follow captured continuations.
///
/// When a continuation is captured past an installed state marker the current
/// `backup()` travels with it, and `restore()` is called with that snapshot
/// right before the continuation is resumed.
pub trait StateMarker: 'static {
    type Snapshot: 'static;

    fn backup(&self) -> Self::Snapshot;

    fn restore(&self, snapshot: Self::Snapshot);
}

pub(crate) trait ErasedState {
    fn backup_erased(&self) -> Value;
    fn restore_erased(&self, snapshot: Value);
}

impl<S: StateMarker> ErasedState for S {
    fn backup_erased(&self) -> Value {
        boxed(self.backup())
    }

    fn restore_erased(&self, snapshot: Value) {
        match downcast::<S::Snapshot>(snapshot) {
            Ok(snapshot) => self.restore(snapshot),
            Err(err) => log::error!("discarding state snapshot: {err}"),
        }
    }
}

/// A state marker ready to be installed as a delimiter.
#[derive(Clone)]
pub struct StateScope {
    marker: Rc<dyn ErasedState>,
}

impl StateScope {
    pub fn new<S: StateMarker>(marker: Rc<S>) -> Self {
        StateScope { marker }
    }

    pub(crate) fn backup(&self) -> Value {
        self.marker.backup_erased()
    }

    pub(crate) fn restore(&self, snapshot: Value) {
        self.marker.restore_erased(snapshot)
    }
}

impl fmt::Debug for StateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateScope")
    }
}

/// Partial function from thrown errors to recovery programs.
///
/// `is_defined_at` is consulted first; only a marker that accepts the error
/// is consumed by `apply`.
pub trait CatchMarker<R>: 'static {
    fn is_defined_at(&self, error: &Throwable) -> bool;

    fn apply(self, error: Throwable) -> Control<R>;
}

pub(crate) trait ErasedCatch {
    fn is_defined_at(&self, error: &Throwable) -> bool;
    fn apply_erased(self: Box<Self>, error: Throwable) -> Node;
}

struct CatchAdapter<R, C> {
    marker: C,
    _answer: PhantomData<fn() -> R>,
}

impl<R: 'static, C: CatchMarker<R>> ErasedCatch for CatchAdapter<R, C> {
    fn is_defined_at(&self, error: &Throwable) -> bool {
        self.marker.is_defined_at(error)
    }

    fn apply_erased(self: Box<Self>, error: Throwable) -> Node {
        self.marker.apply(error).into_node()
    }
}

pub(crate) type CatchRef = Box<dyn ErasedCatch>;

pub(crate) fn erase_catch<R: 'static, C: CatchMarker<R>>(marker: C) -> CatchRef {
    Box::new(CatchAdapter {
        marker,
        _answer: PhantomData,
    })
}
