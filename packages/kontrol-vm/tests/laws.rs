//! Property-based checks of the monad laws and handler transparency.

use kontrol_vm::{ContMarker, Control};
use proptest::prelude::*;

/// Ways of producing a value: directly, deferred, or through a resumed effect.
#[derive(Debug, Clone, Copy)]
enum Source {
    Pure,
    Delay,
    Resumed,
}

fn source() -> impl Strategy<Value = Source> {
    prop_oneof![Just(Source::Pure), Just(Source::Delay), Just(Source::Resumed)]
}

fn program(source: Source, value: i64) -> Control<i64> {
    match source {
        Source::Pure => Control::pure(value),
        Source::Delay => Control::delay(move || value),
        Source::Resumed => {
            let marker = ContMarker::<i64>::fresh();
            Control::delimit_cont(marker, move |m| {
                Control::<i64>::use_cont(m, move |k| k.resume(value))
            })
        }
    }
}

fn f(a: i64) -> impl Fn(i64) -> Control<i64> + Clone {
    move |x| Control::pure(x.wrapping_mul(a))
}

fn g(b: i64) -> impl Fn(i64) -> Control<i64> + Clone {
    move |x| Control::delay(move || x.wrapping_add(b))
}

proptest! {
    #[test]
    fn left_identity(v in any::<i64>(), a in -50i64..50) {
        let lhs = Control::pure(v).flat_map(f(a)).run().unwrap();
        let rhs = f(a)(v).run().unwrap();
        prop_assert_eq!(lhs, rhs);
    }

    #[test]
    fn right_identity(kind in source(), v in any::<i64>()) {
        let lhs = program(kind, v).flat_map(Control::pure).run().unwrap();
        let rhs = program(kind, v).run().unwrap();
        prop_assert_eq!(lhs, rhs);
    }

    #[test]
    fn associativity(kind in source(), v in any::<i64>(), a in -50i64..50, b in any::<i64>()) {
        let lhs = program(kind, v).flat_map(f(a)).flat_map(g(b)).run().unwrap();

        let (f, g) = (f(a), g(b));
        let rhs = program(kind, v)
            .flat_map(move |x| f(x).flat_map(g))
            .run()
            .unwrap();
        prop_assert_eq!(lhs, rhs);
    }

    #[test]
    fn map_agrees_with_flat_map_pure(kind in source(), v in any::<i64>(), a in -50i64..50) {
        let lhs = program(kind, v).map(move |x| x.wrapping_mul(a)).run().unwrap();
        let rhs = program(kind, v).flat_map(f(a)).run().unwrap();
        prop_assert_eq!(lhs, rhs);
    }

    #[test]
    fn handler_transparency(v in any::<i64>(), a in -50i64..50) {
        let marker = ContMarker::<i64>::fresh();
        let handled = Control::delimit_cont(marker, move |m| {
            Control::<i64>::use_cont(m, move |k| k.resume(v))
        })
        .flat_map(f(a))
        .run()
        .unwrap();
        let direct = Control::pure(v).flat_map(f(a)).run().unwrap();
        prop_assert_eq!(handled, direct);
    }

    #[test]
    fn sequence_matches_iterator(values in proptest::collection::vec(any::<i32>(), 0..64)) {
        let programs = values.iter().copied().map(|v| program(Source::Delay, v as i64));
        let collected = Control::sequence(programs).run().unwrap();
        let expected: Vec<i64> = values.iter().map(|&v| v as i64).collect();
        prop_assert_eq!(collected, expected);
    }
}
