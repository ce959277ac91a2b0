//! Scoped state: a keyed store that follows captured continuations.
//!
//! [`StateCells`] is a [`StateMarker`] over an immutable map. Writes replace
//! the map copy-on-write, so `backup` only shares the current map and a
//! captured continuation keeps exactly the cells it saw.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::capture::Resume;
use crate::control::Control;
use crate::error::VMError;
use crate::handler::Handler;
use crate::ids::FieldId;
use crate::marker::{StateMarker, StateScope};

type CellMap = HashMap<FieldId, Rc<dyn Any>>;

#[derive(Default)]
pub struct StateCells {
    data: RefCell<Rc<CellMap>>,
}

/// Typed key into a [`StateCells`] store.
pub struct Field<T> {
    id: FieldId,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({})", self.id.raw())
    }
}

impl StateCells {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new cell holding `init`.
    pub fn field<T: 'static>(&self, init: T) -> Field<T> {
        let field = Field {
            id: FieldId::fresh(),
            _type: PhantomData,
        };
        self.set(field, init);
        field
    }

    pub fn get<T: Clone + 'static>(&self, field: Field<T>) -> Option<T> {
        self.data
            .borrow()
            .get(&field.id)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    pub fn set<T: 'static>(&self, field: Field<T>, value: T) {
        let mut data = self.data.borrow_mut();
        Rc::make_mut(&mut data).insert(field.id, Rc::new(value));
    }

    /// Apply `f` to the current value and store the result. Returns the new
    /// value, or `None` if the cell is absent.
    pub fn update<T, F>(&self, field: Field<T>, f: F) -> Option<T>
    where
        T: Clone + 'static,
        F: FnOnce(T) -> T,
    {
        let next = f(self.get(field)?);
        self.set(field, next.clone());
        Some(next)
    }

    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateMarker for StateCells {
    type Snapshot = Rc<CellMap>;

    fn backup(&self) -> Rc<CellMap> {
        self.data.borrow().clone()
    }

    fn restore(&self, snapshot: Rc<CellMap>) {
        *self.data.borrow_mut() = snapshot;
    }
}

impl fmt::Debug for StateCells {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCells").field("len", &self.len()).finish()
    }
}

/// The distinguished state of a stateful handler.
pub struct HandlerState<S> {
    cells: Rc<StateCells>,
    field: Field<S>,
}

impl<S: Clone + 'static> HandlerState<S> {
    pub fn new(initial: S) -> Self {
        let cells = Rc::new(StateCells::new());
        let field = cells.field(initial);
        HandlerState { cells, field }
    }

    pub fn get(&self) -> Option<S> {
        self.cells.get(self.field)
    }

    pub fn set(&self, value: S) {
        self.cells.set(self.field, value)
    }

    pub fn scope(&self) -> StateScope {
        StateScope::new(self.cells.clone())
    }

    pub fn cells(&self) -> &Rc<StateCells> {
        &self.cells
    }
}

impl<S> Clone for HandlerState<S> {
    fn clone(&self) -> Self {
        HandlerState {
            cells: self.cells.clone(),
            field: self.field,
        }
    }
}

impl<S> fmt::Debug for HandlerState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerState")
            .field("field", &self.field)
            .finish()
    }
}

/// A handler that threads a state value through its effects.
pub trait Stateful: Handler {
    type State: Clone + 'static;

    fn state(&self) -> &HandlerState<Self::State>;

    /// Perform an effect that reads the handler state.
    ///
    /// `body` receives the state current at the use site and a [`Commit`]
    /// that writes the new state before resuming.
    fn use_state<A, F>(&self, body: F) -> Control<A>
    where
        A: 'static,
        F: FnOnce(Self::State, Commit<A, Self::State, Self::Answer>) -> Control<Self::Answer>
            + 'static,
    {
        let state = self.state().clone();
        self.use_effect(move |resume| match state.get() {
            Some(current) => body(current, Commit { resume, state }),
            None => Control::abort(VMError::type_error("handler state cell is missing")),
        })
    }
}

/// Resumes a stateful effect, committing the handler state first.
pub struct Commit<A, S, R> {
    resume: Resume<A, R>,
    state: HandlerState<S>,
}

impl<A: 'static, S: Clone + 'static, R: 'static> Commit<A, S, R> {
    pub fn resume(self, result: A, new_state: S) -> Control<R> {
        self.state.set(new_state);
        self.resume.resume(result)
    }

    pub fn resume_unchanged(self, result: A) -> Control<R> {
        self.resume.resume(result)
    }

    /// The underlying resume handle, for handlers that answer without resuming.
    pub fn into_resume(self) -> Resume<A, R> {
        self.resume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::ContMarker;

    #[test]
    fn test_cells_are_independent() {
        let cells = StateCells::new();
        let count = cells.field(0i32);
        let name = cells.field(String::from("a"));
        assert_eq!(cells.len(), 2);

        cells.set(count, 5);
        assert_eq!(cells.get(count), Some(5));
        assert_eq!(cells.get(name), Some("a".to_string()));
        assert_eq!(cells.update(name, |s| s + "b"), Some("ab".to_string()));
    }

    #[test]
    fn test_backup_shares_and_restore_replaces() {
        let cells = StateCells::new();
        let count = cells.field(1i32);
        let snapshot = cells.backup();

        cells.set(count, 2);
        let saved = snapshot.get(&count.id).and_then(|v| v.downcast_ref::<i32>());
        assert_eq!(saved, Some(&1));

        cells.restore(snapshot);
        assert_eq!(cells.get(count), Some(1));
    }

    #[derive(Clone)]
    struct Counter {
        marker: ContMarker<i32>,
        state: HandlerState<i32>,
    }

    impl Counter {
        fn new(initial: i32) -> Self {
            Counter {
                marker: ContMarker::fresh(),
                state: HandlerState::new(initial),
            }
        }

        fn increment(&self) -> Control<i32> {
            self.use_state(|n, commit| commit.resume(n, n + 1))
        }

        fn current(&self) -> Control<i32> {
            self.use_state(|n, commit| commit.resume_unchanged(n))
        }
    }

    impl Handler for Counter {
        type Answer = i32;
        type Ops = Counter;

        fn marker(&self) -> ContMarker<i32> {
            self.marker
        }

        fn ops(&self) -> Counter {
            self.clone()
        }

        fn scoped_state(&self) -> Option<StateScope> {
            Some(self.state.scope())
        }
    }

    impl Stateful for Counter {
        type State = i32;

        fn state(&self) -> &HandlerState<i32> {
            &self.state
        }
    }

    #[test]
    fn test_use_state_threads_state_in_order() {
        let counter = Counter::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let program = counter.handle(move |c| {
            let ops = c.clone();
            Control::traverse(0..3, move |_| ops.increment())
                .map(move |olds| {
                    log.borrow_mut().extend(olds);
                })
                .then(c.current())
        });
        assert_eq!(program.run().unwrap(), 3);
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
        assert_eq!(counter.state().get(), Some(3));
    }

    #[test]
    fn test_into_resume_lets_handler_answer_directly() {
        let counter = Counter::new(4);
        let program = counter.handle(|c| {
            let ops = c.clone();
            c.increment()
                .then(ops.use_state(|n, commit| {
                    let resume = commit.into_resume();
                    assert!(!resume.is_consumed());
                    Control::pure(-n)
                }))
                .map(|x: i32| x * 100)
        });
        assert_eq!(program.run().unwrap(), -5);
        assert_eq!(counter.state().get(), Some(5));

        let tagged = Counter::new(7);
        let program = tagged.handle(|c| {
            c.use_state(|n, commit| commit.into_resume().resume(n).map(|answer| answer + 1000))
                .map(|x: i32| x + 1)
        });
        assert_eq!(program.run().unwrap(), 1008);
        assert_eq!(tagged.state().get(), Some(7));
    }
}
