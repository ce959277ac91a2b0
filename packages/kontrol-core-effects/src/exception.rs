//! Early exit with a typed error.
//!
//! Unlike `Control::raise`, which unwinds to catch frames, `Exc::raise`
//! answers the handled region with `Err` and drops the captured
//! continuation.

use std::fmt;
use std::marker::PhantomData;

use kontrol_vm::{ContMarker, Control, Handler};

pub struct Exc<E, R> {
    marker: ContMarker<Result<R, E>>,
    _error: PhantomData<fn() -> E>,
}

impl<E: 'static, R: 'static> Exc<E, R> {
    pub fn new() -> Self {
        Exc {
            marker: ContMarker::fresh(),
            _error: PhantomData,
        }
    }

    pub fn raise<A: 'static>(&self, error: E) -> Control<A> {
        self.use_effect(move |_resume| {
            log::trace!("exc: region exits early");
            Control::pure(Err(error))
        })
    }

    /// Continue with `Ok` values and exit on `Err`.
    pub fn lift<A: 'static>(&self, result: Result<A, E>) -> Control<A> {
        match result {
            Ok(value) => Control::pure(value),
            Err(error) => self.raise(error),
        }
    }
}

impl<E: 'static, R: 'static> Default for Exc<E, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, R> Clone for Exc<E, R> {
    fn clone(&self) -> Self {
        Exc {
            marker: self.marker,
            _error: PhantomData,
        }
    }
}

impl<E, R> fmt::Debug for Exc<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exc").field("marker", &self.marker).finish()
    }
}

impl<E: 'static, R: 'static> Handler for Exc<E, R> {
    type Answer = Result<R, E>;
    type Ops = Exc<E, R>;

    fn marker(&self) -> ContMarker<Result<R, E>> {
        self.marker
    }

    fn ops(&self) -> Exc<E, R> {
        self.clone()
    }
}

/// Run `program`, answering `Err` if it raises through its `Exc`.
pub fn try_run<E, R, F>(program: F) -> Control<Result<R, E>>
where
    E: 'static,
    R: 'static,
    F: FnOnce(Exc<E, R>) -> Control<R> + 'static,
{
    Exc::new().handle(move |exc| program(exc).map(Ok))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_no_raise_is_ok() {
        let program = try_run::<String, _, _>(|_| Control::pure(3).map(|x| x + 1));
        assert_eq!(program.run().unwrap(), Ok(4));
    }

    #[test]
    fn test_raise_skips_rest_of_region() {
        let reached = Rc::new(Cell::new(false));
        let flag = reached.clone();
        let program = try_run(move |exc: Exc<&str, i32>| {
            exc.raise::<i32>("stop").map(move |x| {
                flag.set(true);
                x
            })
        });
        assert_eq!(program.run().unwrap(), Err("stop"));
        assert!(!reached.get());
    }

    #[test]
    fn test_lift() {
        let program = try_run(|exc: Exc<String, i32>| {
            let again = exc.clone();
            exc.lift(Ok(2))
                .flat_map(move |x| again.lift("x".parse::<i32>().map_err(|e| e.to_string())).map(move |y| x + y))
        });
        let result = program.run().unwrap();
        assert!(result.unwrap_err().contains("invalid digit"));
    }

    #[test]
    fn test_code_after_region_still_runs() {
        let program = try_run(|exc: Exc<&str, i32>| exc.raise("early"))
            .map(|result| result.unwrap_or(-1) * 10);
        assert_eq!(program.run().unwrap(), -10);
    }
}
