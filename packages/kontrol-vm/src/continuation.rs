//! Meta-continuation: the rest of the program as an inspectable stack.
//!
//! A `MetaCont` is a stack of layers with the innermost (next to run) layer
//! last. The empty stack is the identity continuation (`Return`). Every
//! operation walks the stack iteratively, so neither running nor dropping a
//! deep continuation grows the native call stack.
//!
//! Layer kinds:
//!
//! - `Frames`: consecutive pending bind-functions (innermost last). Composing
//!   another bind pushes onto the innermost `Frames` layer in O(1).
//! - `HandlerFrame`: an installed prompt; the unit `split_at` searches for.
//! - `StateFrame`: an installed state marker.
//! - `CatchFrame`: an installed catch marker; intercepts `unwind`.
//! - `Captured`: a state marker plus the snapshot taken when a split walked
//!   through its `StateFrame`. Only `append` may consume it.

use std::fmt;

use crate::error::{Throwable, VMError};
use crate::frame::{BindFn, Frame};
use crate::ids::Marker;
use crate::marker::{CatchRef, StateScope};
use crate::step::{Step, Thrown};
use crate::value::Value;

pub(crate) enum Layer {
    Frames(Vec<Frame>),
    Handler(Marker),
    State(StateScope),
    Catch(CatchRef),
    Captured { scope: StateScope, snapshot: Value },
}

impl Layer {
    fn kind(&self) -> &'static str {
        match self {
            Layer::Frames(_) => "Frames",
            Layer::Handler(_) => "HandlerFrame",
            Layer::State(_) => "StateFrame",
            Layer::Catch(_) => "CatchFrame",
            Layer::Captured { .. } => "Captured",
        }
    }
}

pub struct MetaCont {
    layers: Vec<Layer>,
}

impl MetaCont {
    /// The identity continuation.
    pub fn identity() -> Self {
        MetaCont { layers: Vec::new() }
    }

    pub fn is_return(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of layers above `Return`.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Number of pending bind-functions across all `Frames` layers.
    pub fn frame_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| match layer {
                Layer::Frames(frames) => frames.len(),
                _ => 0,
            })
            .sum()
    }

    /// Layer kinds, innermost first, ending with `"Return"`.
    pub fn layer_kinds(&self) -> Vec<&'static str> {
        self.layers
            .iter()
            .rev()
            .map(Layer::kind)
            .chain(std::iter::once("Return"))
            .collect()
    }

    pub fn contains_marker(&self, marker: Marker) -> bool {
        self.layers
            .iter()
            .any(|layer| matches!(layer, Layer::Handler(m) if *m == marker))
    }

    pub(crate) fn push_frame(mut self, frame: Frame) -> Self {
        if let Some(Layer::Frames(frames)) = self.layers.last_mut() {
            frames.push(frame);
        } else {
            self.layers.push(Layer::Frames(vec![frame]));
        }
        self
    }

    pub(crate) fn map(self, mapper: BindFn) -> Self {
        self.push_frame(Frame::MapReturn { mapper })
    }

    pub(crate) fn flat_map(self, binder: BindFn) -> Self {
        self.push_frame(Frame::FlatMapBind { binder })
    }

    pub(crate) fn push_handler(mut self, marker: Marker) -> Self {
        self.layers.push(Layer::Handler(marker));
        self
    }

    pub(crate) fn push_state(mut self, scope: StateScope) -> Self {
        self.layers.push(Layer::State(scope));
        self
    }

    pub(crate) fn push_catch(mut self, marker: CatchRef) -> Self {
        self.layers.push(Layer::Catch(marker));
        self
    }

    /// Deliver a value to this continuation.
    ///
    /// Delimiter layers are transparent to values. The first pending frame
    /// is popped and its result becomes the next computation, continued by
    /// whatever remains.
    pub(crate) fn apply(mut self, value: Value) -> Result<Step, Thrown> {
        loop {
            match self.layers.pop() {
                None => return Ok(Step::Value(value)),
                Some(Layer::Frames(mut frames)) => {
                    let Some(frame) = frames.pop() else {
                        continue;
                    };
                    if !frames.is_empty() {
                        self.layers.push(Layer::Frames(frames));
                    }
                    crate::vm_debug_log!("apply: {} frame", frame.kind());
                    return match frame.apply(value) {
                        Ok(next) => Ok(Step::Computation(next, self)),
                        Err(error) => Err(Thrown::new(error, self)),
                    };
                }
                Some(Layer::Handler(_)) | Some(Layer::State(_)) | Some(Layer::Catch(_)) => {}
                Some(Layer::Captured { .. }) => {
                    return Ok(Step::Abort(VMError::captured_frame("applied")));
                }
            }
        }
    }

    /// Sequential composition: `next` runs after this continuation completes.
    ///
    /// Captured snapshots are restored into their markers (innermost first)
    /// and turned back into live state frames.
    pub(crate) fn append(self, mut next: MetaCont) -> MetaCont {
        let mut attached = Vec::with_capacity(self.layers.len());
        for layer in self.layers.into_iter().rev() {
            match layer {
                Layer::Captured { scope, snapshot } => {
                    scope.restore(snapshot);
                    attached.push(Layer::State(scope));
                }
                other => attached.push(other),
            }
        }
        attached.reverse();
        next.layers.extend(attached);
        next
    }

    /// Split at the innermost handler frame installed for `marker`.
    ///
    /// Returns `(head, tail)`: the head holds everything strictly above the
    /// handler frame, the tail is the handler frame and everything below it.
    /// State frames in the head become `Captured` with their current backup.
    pub(crate) fn split_at(mut self, marker: Marker) -> Result<(MetaCont, MetaCont), VMError> {
        let position = self
            .layers
            .iter()
            .rposition(|layer| matches!(layer, Layer::Handler(m) if *m == marker))
            .ok_or_else(|| VMError::handler_not_found(marker))?;

        let above = self.layers.split_off(position + 1);
        let mut head = Vec::with_capacity(above.len());
        for layer in above {
            match layer {
                Layer::State(scope) => {
                    let snapshot = scope.backup();
                    head.push(Layer::Captured { scope, snapshot });
                }
                Layer::Captured { .. } => return Err(VMError::captured_frame("split")),
                other => head.push(other),
            }
        }

        crate::vm_debug_log!(
            "split at marker {}: head={} tail={}",
            marker.raw(),
            head.len(),
            self.layers.len()
        );
        Ok((MetaCont { layers: head }, self))
    }

    /// Walk outward looking for a catch frame that accepts `error`.
    ///
    /// The first accepting frame's handling program runs under the remaining
    /// tail. Reaching `Return` ends the run with the exception.
    pub(crate) fn unwind(mut self, error: Throwable) -> Step {
        while let Some(layer) = self.layers.pop() {
            match layer {
                Layer::Catch(handler) => {
                    if handler.is_defined_at(&error) {
                        crate::vm_debug_log!("unwind: caught {error} at depth {}", self.depth());
                        return Step::Computation(handler.apply_erased(error), self);
                    }
                }
                Layer::Captured { .. } => return Step::Abort(VMError::captured_frame("unwound")),
                Layer::Frames(_) | Layer::Handler(_) | Layer::State(_) => {}
            }
        }
        crate::vm_debug_log!("unwind: uncaught {error}");
        Step::Abort(VMError::uncaught_exception(error))
    }
}

impl Default for MetaCont {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for MetaCont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.layer_kinds()).finish()
    }
}
