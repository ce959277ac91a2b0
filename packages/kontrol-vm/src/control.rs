//! Control: suspended computations and their combinators.
//!
//! A [`Control<A>`] is a description of a program producing an `A`. Nothing
//! runs until [`Control::run`] hands it to the trampoline together with the
//! identity continuation.
//!
//! Combinators never recurse into the program tree. `map` and `flat_map`
//! become continuation transformers when forced, so a bind costs one push
//! onto the innermost `Frames` layer.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::capture::{ContinuationCell, Resume};
use crate::config::RunConfig;
use crate::continuation::MetaCont;
use crate::driver::Trampoline;
use crate::error::{Throwable, VMError};
use crate::frame::BindFn;
use crate::ids::Marker;
use crate::marker::{erase_catch, CatchMarker, CatchRef, ContMarker, StateMarker, StateScope};
use crate::step::{Step, Thrown};
use crate::value::{boxed, downcast, Value};

pub(crate) type Thunk = Box<dyn FnOnce() -> Result<Value, Throwable>>;
pub(crate) type UseBody = Box<dyn FnOnce(ContinuationCell) -> Result<Node, Throwable>>;
pub(crate) type DelimitBody = Box<dyn FnOnce(Marker) -> Node>;

/// Erased program tree.
pub(crate) enum Node {
    Pure(Value),
    Delay(Thunk),
    Failure(VMError),
    Mapped { source: Child, mapper: BindFn },
    FlatMapped { source: Child, binder: BindFn },
    Use { marker: Marker, body: UseBody },
    Handle { value: Value, head: MetaCont },
    DelimitCont { marker: Marker, body: DelimitBody },
    DelimitState { scope: StateScope, body: Child },
    DelimitCatch { marker: CatchRef, body: Child },
}

/// Boxed sub-program of a [`Node`].
///
/// Left-nested chains are as deep as the program is long, so dropping one
/// walks the chain in a loop instead of through the generated drop glue.
pub(crate) struct Child(Box<Node>);

impl Child {
    fn new(node: Node) -> Self {
        Child(Box::new(node))
    }

    /// Move the sub-program out, leaving an empty `Pure` behind.
    fn take(&mut self) -> Node {
        std::mem::replace(&mut *self.0, Node::Pure(boxed(())))
    }

    fn into_node(mut self) -> Node {
        self.take()
    }
}

impl Drop for Child {
    fn drop(&mut self) {
        let mut next = self.0.child_mut().map(Child::take);
        while let Some(mut node) = next {
            next = node.child_mut().map(Child::take);
        }
    }
}

impl Node {
    fn child_mut(&mut self) -> Option<&mut Child> {
        match self {
            Node::Mapped { source, .. } | Node::FlatMapped { source, .. } => Some(source),
            Node::DelimitState { body, .. } | Node::DelimitCatch { body, .. } => Some(body),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Node::Pure(_) => "Pure",
            Node::Delay(_) => "Delay",
            Node::Failure(_) => "Failure",
            Node::Mapped { .. } => "Mapped",
            Node::FlatMapped { .. } => "FlatMapped",
            Node::Use { .. } => "Use",
            Node::Handle { .. } => "Handle",
            Node::DelimitCont { .. } => "DelimitCont",
            Node::DelimitState { .. } => "DelimitState",
            Node::DelimitCatch { .. } => "DelimitCatch",
        }
    }

    /// Force one step of this node under continuation `k`.
    ///
    /// `Err` carries a thrown error together with the live continuation it
    /// must unwind; the trampoline turns it into `MetaCont::unwind`.
    pub(crate) fn apply(self, k: MetaCont) -> Result<Step, Thrown> {
        match self {
            Node::Pure(value) => k.apply(value),
            Node::Delay(thunk) => match thunk() {
                Ok(value) => k.apply(value),
                Err(error) => Err(Thrown::new(error, k)),
            },
            Node::Failure(error) => Ok(Step::Abort(error)),
            Node::Mapped { source, mapper } => {
                Ok(Step::Computation(source.into_node(), k.map(mapper)))
            }
            Node::FlatMapped { source, binder } => {
                Ok(Step::Computation(source.into_node(), k.flat_map(binder)))
            }
            Node::Use { marker, body } => apply_use(marker, body, k),
            Node::Handle { value, head } => head.append(k).apply(value),
            Node::DelimitCont { marker, body } => {
                Ok(Step::Computation(body(marker), k.push_handler(marker)))
            }
            Node::DelimitState { scope, body } => {
                Ok(Step::Computation(body.into_node(), k.push_state(scope)))
            }
            Node::DelimitCatch { marker, body } => {
                Ok(Step::Computation(body.into_node(), k.push_catch(marker)))
            }
        }
    }
}

fn apply_use(marker: Marker, body: UseBody, k: MetaCont) -> Result<Step, Thrown> {
    let (head, tail) = match k.split_at(marker) {
        Ok(parts) => parts,
        Err(error) => return Ok(Step::Abort(error)),
    };
    let cell = ContinuationCell::new(head);
    match body(cell.clone()) {
        Ok(handled) => Ok(Step::Computation(handled, tail)),
        Err(error) => {
            // An unresumed capture is put back so catch frames above the
            // handler see the throw.
            let live = match cell.take() {
                Some(head) => head.append(tail),
                None => tail,
            };
            Err(Thrown::new(error, live))
        }
    }
}

/// Wrap a typed step function as an erased bind-function.
fn typed<A, F>(f: F) -> BindFn
where
    A: 'static,
    F: FnOnce(A) -> Result<Node, Throwable> + 'static,
{
    Box::new(move |value| match downcast::<A>(value) {
        Ok(a) => f(a),
        Err(error) => Ok(Node::Failure(error)),
    })
}

/// A suspended computation producing an `A`.
#[must_use = "a Control does nothing until it is run"]
pub struct Control<A> {
    node: Node,
    _result: PhantomData<fn() -> A>,
}

impl<A: 'static> Control<A> {
    pub(crate) fn from_node(node: Node) -> Self {
        Control {
            node,
            _result: PhantomData,
        }
    }

    pub(crate) fn into_node(self) -> Node {
        self.node
    }

    pub(crate) fn abort(error: VMError) -> Self {
        Self::from_node(Node::Failure(error))
    }

    pub fn pure(value: A) -> Self {
        Self::from_node(Node::Pure(boxed(value)))
    }

    /// Deferred value; `f` runs when the step is forced.
    pub fn delay<F>(f: F) -> Self
    where
        F: FnOnce() -> A + 'static,
    {
        Self::from_node(Node::Delay(Box::new(move || Ok(boxed(f())))))
    }

    /// Deferred value whose producer may throw.
    pub fn try_delay<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<A, Throwable> + 'static,
    {
        Self::from_node(Node::Delay(Box::new(move || f().map(boxed))))
    }

    /// Throw `error` on the live continuation; catch frames may intercept it.
    pub fn raise(error: impl Into<Throwable>) -> Self {
        let error = error.into();
        Self::from_node(Node::Delay(Box::new(move || Err(error))))
    }

    /// Structured abort. Ends the run with `VMError::Aborted` without
    /// consulting any catch frame.
    pub fn failure(error: impl Into<Throwable>) -> Self {
        Self::abort(VMError::aborted(error))
    }

    pub fn map<B, F>(self, f: F) -> Control<B>
    where
        B: 'static,
        F: FnOnce(A) -> B + 'static,
    {
        Control::from_node(Node::Mapped {
            source: Child::new(self.node),
            mapper: typed(move |a: A| Ok(Node::Pure(boxed(f(a))))),
        })
    }

    pub fn try_map<B, F>(self, f: F) -> Control<B>
    where
        B: 'static,
        F: FnOnce(A) -> Result<B, Throwable> + 'static,
    {
        Control::from_node(Node::Mapped {
            source: Child::new(self.node),
            mapper: typed(move |a: A| f(a).map(|b| Node::Pure(boxed(b)))),
        })
    }

    pub fn flat_map<B, F>(self, f: F) -> Control<B>
    where
        B: 'static,
        F: FnOnce(A) -> Control<B> + 'static,
    {
        Control::from_node(Node::FlatMapped {
            source: Child::new(self.node),
            binder: typed(move |a: A| Ok(f(a).node)),
        })
    }

    /// Run `next` after this program, discarding this program's value.
    pub fn then<B: 'static>(self, next: Control<B>) -> Control<B> {
        self.flat_map(move |_| next)
    }

    pub fn void(self) -> Control<()> {
        self.map(|_| ())
    }

    /// Perform an effect handled at `marker`.
    ///
    /// The continuation up to the handler is captured and handed to `body`
    /// as a one-shot [`Resume`]; the program `body` returns answers for the
    /// whole delimited region.
    pub fn use_cont<R, F>(marker: ContMarker<R>, body: F) -> Self
    where
        R: 'static,
        F: FnOnce(Resume<A, R>) -> Control<R> + 'static,
    {
        Self::try_use_cont(marker, move |resume| Ok(body(resume)))
    }

    /// Like [`Control::use_cont`], but `body` may throw.
    ///
    /// A throw unwinds the live continuation, so catch frames between the
    /// use site and the handler see it.
    pub fn try_use_cont<R, F>(marker: ContMarker<R>, body: F) -> Self
    where
        R: 'static,
        F: FnOnce(Resume<A, R>) -> Result<Control<R>, Throwable> + 'static,
    {
        Self::from_node(Node::Use {
            marker: marker.marker(),
            body: Box::new(move |cell| body(Resume::new(cell)).map(Control::into_node)),
        })
    }

    /// Install a handler frame for `marker` around `body(marker)`.
    pub fn delimit_cont<F>(marker: ContMarker<A>, body: F) -> Self
    where
        F: FnOnce(ContMarker<A>) -> Control<A> + 'static,
    {
        Self::from_node(Node::DelimitCont {
            marker: marker.marker(),
            body: Box::new(move |_| body(marker).node),
        })
    }

    /// Install a state frame for `marker` around `body`.
    pub fn delimit_state<S: StateMarker>(marker: Rc<S>, body: Control<A>) -> Self {
        Self::delimit_scope(StateScope::new(marker), body)
    }

    pub fn delimit_scope(scope: StateScope, body: Control<A>) -> Self {
        Self::from_node(Node::DelimitState {
            scope,
            body: Child::new(body.node),
        })
    }

    /// Install a catch frame for `marker` around `body`.
    pub fn delimit_catch<C: CatchMarker<A>>(marker: C, body: Control<A>) -> Self {
        Self::from_node(Node::DelimitCatch {
            marker: erase_catch(marker),
            body: Child::new(body.node),
        })
    }

    /// Run each program in order, collecting the results.
    pub fn sequence<I>(programs: I) -> Control<Vec<A>>
    where
        I: IntoIterator<Item = Control<A>>,
    {
        programs
            .into_iter()
            .fold(Control::pure(Vec::new()), |acc, program| {
                acc.flat_map(move |mut values: Vec<A>| {
                    program.map(move |value| {
                        values.push(value);
                        values
                    })
                })
            })
    }

    pub fn traverse<T, I, F>(items: I, f: F) -> Control<Vec<A>>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T) -> Control<A>,
    {
        Self::sequence(items.into_iter().map(f))
    }

    /// Run to completion with the default configuration.
    pub fn run(self) -> Result<A, VMError> {
        match self.node {
            Node::Pure(value) => downcast(value),
            node => Trampoline::new(RunConfig::default()).run(Control::<A>::from_node(node)),
        }
    }

    pub fn run_with(self, config: &RunConfig) -> Result<A, VMError> {
        Trampoline::new(config.clone()).run(self)
    }
}

impl Control<()> {
    pub fn unit() -> Self {
        Control::pure(())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

impl<A> fmt::Debug for Control<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Control({})", self.node.kind())
    }
}
