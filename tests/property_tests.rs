//! Property-based tests for the qualifier parser and number sets
//!
//! Properties covered:
//! 1. NumberSet membership, inversion and growth
//! 2. Qualifier parsing never panics on arbitrary text
//! 3. Dispatch order follows priority for any clause sequence
//! 4. Selector negation is the complement of the plain selector

use proptest::prelude::*;
use sysqual::action::{ActionData, ActionKind};
use sysqual::call::SyscallStop;
use sysqual::engine::EngineBuilder;
use sysqual::inject::parse_inject_args;
use sysqual::number_set::NumberSet;
use sysqual::syscalls::Personalities;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_number_set_membership(
        added in prop::collection::vec(0u32..4096, 0..32),
        probe in 0u32..8192,
    ) {
        let mut set = NumberSet::new();
        for &n in &added {
            set.add(n);
        }
        for &n in &added {
            prop_assert!(set.contains(n));
        }
        prop_assert_eq!(set.contains(probe), added.contains(&probe));

        // Inversion flips every answer, including far out of range
        set.invert();
        prop_assert_eq!(set.contains(probe), !added.contains(&probe));
        prop_assert!(set.contains(u32::MAX) || added.contains(&u32::MAX));
    }

    #[test]
    fn prop_number_set_capacity_only_grows(numbers in prop::collection::vec(0u32..100_000, 1..16)) {
        let mut set = NumberSet::new();
        let mut last = set.capacity();
        for n in numbers {
            set.add(n);
            prop_assert!(set.capacity() >= last);
            prop_assert!(set.capacity() > n as usize);
            last = set.capacity();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_qualify_never_panics(expr in ".{0,64}") {
        let mut builder = EngineBuilder::new(Personalities::native());
        let _ = builder.qualify(&expr);
        let _ = builder.finish();
    }

    #[test]
    fn prop_qualify_structured_clauses_never_panic(
        action in prop::sample::select(vec![
            "trace", "t", "abbrev", "verbose", "raw", "signal", "read", "write", "fault", "inject",
        ]),
        tokens in prop::collection::vec("[!?%/]{0,2}[a-z0-9_]{0,8}", 0..4),
        args in prop::option::of("[a-z]{0,6}=[A-Z0-9+]{0,6}"),
    ) {
        let mut expr = format!("{}={}", action, tokens.join(","));
        if let Some(args) = args {
            expr.push(':');
            expr.push_str(&args);
        }
        let mut builder = EngineBuilder::new(Personalities::native());
        let _ = builder.qualify(&expr);
    }

    #[test]
    fn prop_inject_args_never_panic(args in "[a-z]{0,6}=[A-Za-z0-9+]{0,8}(:[a-z]{0,6}=[A-Za-z0-9+]{0,8}){0,3}") {
        let _ = parse_inject_args(Some(&args), true, true);
        let _ = parse_inject_args(Some(&args), false, true);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_dispatch_follows_priority(
        clauses in prop::collection::vec(
            prop::sample::select(vec![
                "trace=all", "raw=all", "abbrev=all", "verbose=all",
                "fault=all", "inject=all:retval=0", "read=all", "write=all",
            ]),
            1..8,
        ),
        number in 0u64..335,
    ) {
        let mut builder = EngineBuilder::new(Personalities::native());
        for clause in &clauses {
            builder.qualify(clause).unwrap();
        }
        let mut engine = builder.finish();

        let mut fired = Vec::new();
        let mut call = SyscallStop::new(0, number);
        engine.filter_syscall(&mut call, &mut |_: &mut SyscallStop, kind: ActionKind, _: &ActionData| {
            fired.push(kind.priority())
        });
        prop_assert!(fired.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_negation_is_complement(
        name in prop::sample::select(vec!["read", "openat", "%file", "%network", "/^sched_", "1,2,3"]),
        number in 0u64..335,
    ) {
        let traced = |expr: &str| {
            let mut builder = EngineBuilder::new(Personalities::native());
            builder.qualify(expr).unwrap();
            let mut engine = builder.finish();
            let mut call = SyscallStop::new(0, number);
            engine.filter_syscall(&mut call, &mut sysqual::action::DecisionsOnly);
            call.is_traced()
        };
        prop_assert_ne!(
            traced(&format!("trace={}", name)),
            traced(&format!("trace=!{}", name))
        );
    }
}
