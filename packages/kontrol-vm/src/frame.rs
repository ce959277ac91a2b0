//! Frame types for the continuation stack.

use std::fmt;

use crate::control::Node;
use crate::error::Throwable;
use crate::value::Value;

/// A pending bind-function: receives the value of the computation below it
/// and produces the next computation to run.
pub(crate) type BindFn = Box<dyn FnOnce(Value) -> Result<Node, Throwable>>;

/// A frame in a `Frames` layer of the continuation stack.
///
/// Frames are consumed exactly once; nothing here is `Clone`.
///
/// Both variants apply their function the same way; the variant only labels
/// the frame's origin (`map` or `flat_map`) in `vm_debug_logs` traces.
pub(crate) enum Frame {
    MapReturn { mapper: BindFn },
    FlatMapBind { binder: BindFn },
}

impl Frame {
    pub(crate) fn apply(self, value: Value) -> Result<Node, Throwable> {
        match self {
            Frame::MapReturn { mapper } => mapper(value),
            Frame::FlatMapBind { binder } => binder(value),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Frame::MapReturn { .. } => "MapReturn",
            Frame::FlatMapBind { .. } => "FlatMapBind",
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
