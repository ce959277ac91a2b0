//! Captured continuations and their one-shot resume handles.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::continuation::MetaCont;
use crate::control::{Control, Node};
use crate::error::VMError;
use crate::ids::ContId;
use crate::value::boxed;

/// Shared slot holding a captured head until it is resumed.
#[derive(Clone)]
pub(crate) struct ContinuationCell {
    cont_id: ContId,
    head: Rc<RefCell<Option<MetaCont>>>,
}

impl ContinuationCell {
    pub(crate) fn new(head: MetaCont) -> Self {
        ContinuationCell {
            cont_id: ContId::fresh(),
            head: Rc::new(RefCell::new(Some(head))),
        }
    }

    /// Move the captured head out; `None` once consumed.
    pub(crate) fn take(&self) -> Option<MetaCont> {
        self.head.borrow_mut().take()
    }

    pub(crate) fn cont_id(&self) -> ContId {
        self.cont_id
    }

    pub(crate) fn is_consumed(&self) -> bool {
        self.head.borrow().is_none()
    }
}

/// One-shot resume handle for a captured continuation `A -> R`.
///
/// Clones share the captured head. The first `resume` moves it out; any
/// later `resume` on this handle or a clone yields a program that aborts
/// with `VMError::OneShotViolation`.
pub struct Resume<A, R> {
    cell: ContinuationCell,
    _types: PhantomData<fn(A) -> R>,
}

impl<A: 'static, R: 'static> Resume<A, R> {
    pub(crate) fn new(cell: ContinuationCell) -> Self {
        Resume {
            cell,
            _types: PhantomData,
        }
    }

    /// Replay `value` through the captured continuation.
    ///
    /// The returned program answers with whatever the handler's delimited
    /// region answers.
    pub fn resume(&self, value: A) -> Control<R> {
        match self.cell.take() {
            Some(head) => Control::from_node(Node::Handle {
                value: boxed(value),
                head,
            }),
            None => {
                crate::vm_debug_log!(
                    "resume: continuation {} already consumed",
                    self.cell.cont_id().raw()
                );
                Control::abort(VMError::one_shot_violation(self.cell.cont_id()))
            }
        }
    }

    pub fn cont_id(&self) -> ContId {
        self.cell.cont_id()
    }

    pub fn is_consumed(&self) -> bool {
        self.cell.is_consumed()
    }
}

impl<A, R> Clone for Resume<A, R> {
    fn clone(&self) -> Self {
        Resume {
            cell: self.cell.clone(),
            _types: PhantomData,
        }
    }
}

impl<A, R> fmt::Debug for Resume<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resume")
            .field("cont_id", &self.cell.cont_id.raw())
            .field("consumed", &self.cell.is_consumed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::ContMarker;

    #[test]
    fn test_cell_take_is_one_shot() {
        let cell = ContinuationCell::new(MetaCont::identity());
        assert!(!cell.is_consumed());
        assert!(cell.take().is_some());
        assert!(cell.is_consumed());
        assert!(cell.take().is_none());
    }

    #[test]
    fn test_clones_share_captured_head() {
        let cell = ContinuationCell::new(MetaCont::identity());
        let resume = Resume::<i32, i32>::new(cell);
        let other = resume.clone();
        assert_eq!(resume.cont_id(), other.cont_id());

        let _ = resume.resume(1);
        assert!(other.is_consumed());
        assert!(format!("{other:?}").contains("consumed: true"));
    }

    #[test]
    fn test_second_resume_is_one_shot_violation() {
        let marker = ContMarker::<i32>::fresh();
        let program = Control::delimit_cont(marker, |m| {
            Control::<i32>::use_cont(m, |resume| {
                let again = resume.clone();
                resume
                    .resume(1)
                    .flat_map(move |first| again.resume(2).map(move |second| first + second))
            })
        });
        let err = program.run().unwrap_err();
        assert!(matches!(err, VMError::OneShotViolation { .. }));
    }
}
