//! Catch layer: closure-backed catch markers and `Control` conveniences.

use std::fmt::{Debug, Display};

use crate::control::Control;
use crate::error::Throwable;
use crate::marker::CatchMarker;

/// A catch marker built from a predicate and a recovery program.
pub struct Catch<R> {
    predicate: Box<dyn Fn(&Throwable) -> bool>,
    handler: Box<dyn FnOnce(Throwable) -> Control<R>>,
}

impl<R: 'static> Catch<R> {
    pub fn new<P, H>(predicate: P, handler: H) -> Self
    where
        P: Fn(&Throwable) -> bool + 'static,
        H: FnOnce(Throwable) -> Control<R> + 'static,
    {
        Catch {
            predicate: Box::new(predicate),
            handler: Box::new(handler),
        }
    }
}

impl<R: 'static> CatchMarker<R> for Catch<R> {
    fn is_defined_at(&self, error: &Throwable) -> bool {
        (self.predicate)(error)
    }

    fn apply(self, error: Throwable) -> Control<R> {
        (self.handler)(error)
    }
}

impl<A: 'static> Control<A> {
    /// Recover from thrown errors accepted by `predicate`.
    pub fn catch_when<P, H>(self, predicate: P, handler: H) -> Control<A>
    where
        P: Fn(&Throwable) -> bool + 'static,
        H: FnOnce(Throwable) -> Control<A> + 'static,
    {
        Control::delimit_catch(Catch::new(predicate, handler), self)
    }

    /// Recover from thrown errors of type `E`.
    pub fn catch_error<E, H>(self, handler: H) -> Control<A>
    where
        E: Display + Debug + Send + Sync + 'static,
        H: FnOnce(E) -> Control<A> + 'static,
    {
        self.catch_when(
            |error| error.is::<E>(),
            move |error| match error.downcast::<E>() {
                Ok(error) => handler(error),
                Err(error) => Control::raise(error),
            },
        )
    }

    pub fn catch_all<H>(self, handler: H) -> Control<A>
    where
        H: FnOnce(Throwable) -> Control<A> + 'static,
    {
        self.catch_when(|_| true, handler)
    }

    /// Replace any thrown error with a value.
    pub fn recover<F>(self, f: F) -> Control<A>
    where
        F: FnOnce(Throwable) -> A + 'static,
    {
        self.catch_all(move |error| Control::pure(f(error)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VMError;
    use thiserror::Error;

    #[derive(Debug, Error, PartialEq)]
    #[error("not found: {0}")]
    struct NotFound(String);

    #[test]
    fn test_recover_replaces_raise() {
        let program = Control::<i32>::raise(anyhow::anyhow!("boom"))
            .map(|x| x + 1)
            .recover(|e| e.to_string().len() as i32);
        assert_eq!(program.run().unwrap(), 4);
    }

    #[test]
    fn test_catch_error_downcasts() {
        let program = Control::<String>::raise(NotFound("key".into()))
            .catch_error(|e: NotFound| Control::pure(format!("default for {}", e.0)));
        assert_eq!(program.run().unwrap(), "default for key");
    }

    #[test]
    fn test_catch_error_skips_other_types() {
        let program = Control::<i32>::raise(anyhow::anyhow!("plain"))
            .catch_error(|_: NotFound| Control::pure(0));
        let err = program.run().unwrap_err();
        assert!(err.is_uncaught());
    }

    #[test]
    fn test_catch_does_not_see_failure() {
        let program = Control::<i32>::failure(anyhow::anyhow!("fatal")).recover(|_| 0);
        let err = program.run().unwrap_err();
        assert!(matches!(err, VMError::Aborted(_)));
    }

    #[test]
    fn test_value_passes_through_catch() {
        let program = Control::pure(5i32).map(|x| x * 2).catch_all(|_| Control::pure(-1));
        assert_eq!(program.run().unwrap(), 10);
    }

    #[test]
    fn test_handler_raise_reaches_outer_catch() {
        let program = Control::<i32>::raise(anyhow::anyhow!("first"))
            .catch_all(|e| Control::raise(anyhow::anyhow!("second after {e}")))
            .recover(|e| e.to_string().len() as i32);
        assert_eq!(program.run().unwrap(), "second after first".len() as i32);
    }
}
