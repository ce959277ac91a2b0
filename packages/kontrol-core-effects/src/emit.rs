//! Append-only output stream.
//!
//! Emitted items live in a persistent list so a captured continuation keeps
//! exactly the items emitted before its capture.

use std::fmt;
use std::rc::Rc;

use kontrol_vm::{ContMarker, Control, Handler, HandlerState, StateScope, Stateful};

use crate::error::EffectError;

struct Link<T> {
    item: T,
    prev: Option<Rc<Link<T>>>,
}

impl<T> Drop for Link<T> {
    fn drop(&mut self) {
        let mut prev = self.prev.take();
        while let Some(link) = prev {
            match Rc::try_unwrap(link) {
                Ok(mut link) => prev = link.prev.take(),
                Err(_) => break,
            }
        }
    }
}

/// Persistent list of emitted items. Cloning shares the list.
pub struct Emitted<T> {
    last: Option<Rc<Link<T>>>,
}

impl<T> Emitted<T> {
    pub fn empty() -> Self {
        Emitted { last: None }
    }

    pub fn push(self, item: T) -> Self {
        Emitted {
            last: Some(Rc::new(Link {
                item,
                prev: self.last,
            })),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    /// Items oldest first.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut items = Vec::new();
        let mut cursor = self.last.as_deref();
        while let Some(link) = cursor {
            items.push(link.item.clone());
            cursor = link.prev.as_deref();
        }
        items.reverse();
        items
    }
}

impl<T> Clone for Emitted<T> {
    fn clone(&self) -> Self {
        Emitted {
            last: self.last.clone(),
        }
    }
}

impl<T> Default for Emitted<T> {
    fn default() -> Self {
        Self::empty()
    }
}

pub struct Emit<T, R> {
    marker: ContMarker<R>,
    trail: HandlerState<Emitted<T>>,
}

impl<T: Clone + 'static, R: 'static> Emit<T, R> {
    pub fn new() -> Self {
        Emit {
            marker: ContMarker::fresh(),
            trail: HandlerState::new(Emitted::empty()),
        }
    }

    pub fn emit(&self, item: T) -> Control<()> {
        self.use_state(move |trail, commit| {
            commit.resume((), trail.push(item))
        })
    }

    /// Items emitted so far, oldest first.
    pub fn emitted(&self) -> Vec<T> {
        self.trail.get().map(|trail| trail.to_vec()).unwrap_or_default()
    }
}

impl<T: Clone + 'static, R: 'static> Default for Emit<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R> Clone for Emit<T, R> {
    fn clone(&self) -> Self {
        Emit {
            marker: self.marker,
            trail: self.trail.clone(),
        }
    }
}

impl<T, R> fmt::Debug for Emit<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emit").field("marker", &self.marker).finish()
    }
}

impl<T: Clone + 'static, R: 'static> Handler for Emit<T, R> {
    type Answer = R;
    type Ops = Emit<T, R>;

    fn marker(&self) -> ContMarker<R> {
        self.marker
    }

    fn ops(&self) -> Emit<T, R> {
        self.clone()
    }

    fn scoped_state(&self) -> Option<StateScope> {
        Some(self.trail.scope())
    }
}

impl<T: Clone + 'static, R: 'static> Stateful for Emit<T, R> {
    type State = Emitted<T>;

    fn state(&self) -> &HandlerState<Emitted<T>> {
        &self.trail
    }
}

/// Run `program`, answering its result and everything it emitted in order.
pub fn collect<T, R, F>(program: F) -> Control<(R, Vec<T>)>
where
    T: Clone + 'static,
    R: 'static,
    F: FnOnce(Emit<T, R>) -> Control<R> + 'static,
{
    let handler = Emit::new();
    let trail = handler.trail.clone();
    handler.handle(program).try_map(move |result| {
        let trail = trail.get().ok_or_else(|| EffectError::missing_state("Emit"))?;
        let items = trail.to_vec();
        log::trace!("emit: collected {} items", items.len());
        Ok((result, items))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_in_order() {
        let program = collect(|out: Emit<&str, usize>| {
            let (a, b) = (out.clone(), out.clone());
            out.emit("one")
                .then(a.emit("two"))
                .then(b.emit("three"))
                .map(|_| 3)
        });
        assert_eq!(program.run().unwrap(), (3, vec!["one", "two", "three"]));
    }

    #[test]
    fn test_nothing_emitted() {
        let program = collect(|_: Emit<u8, ()>| Control::unit());
        assert_eq!(program.run().unwrap(), ((), Vec::new()));
    }

    #[test]
    fn test_emitted_outside_program() {
        let handler = Emit::<i32, ()>::new();
        let view = handler.clone();
        let program = handler.handle(|out| Control::traverse(0..4, move |i| out.emit(i)).void());
        program.run().unwrap();
        assert_eq!(view.emitted(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_long_trail_drops_iteratively() {
        let mut trail = Emitted::empty();
        for item in 0..200_000u32 {
            trail = trail.push(item);
        }
        let shared = trail.clone();
        assert_eq!(trail.to_vec().len(), 200_000);
        drop(trail);
        assert!(!shared.is_empty());
        drop(shared);
    }
}
