// tests/policy_properties.rs

//! Property tests for the pure policy function and for the structural
//! equality of target definitions.

use proptest::prelude::*;

use retrig::config::TargetDefinition;
use retrig::engine::{decide, PolicyDecision};
use retrig::types::RunningBehavior;

fn behavior_strategy() -> impl Strategy<Value = RunningBehavior> {
    prop_oneof![
        Just(RunningBehavior::Batch),
        Just(RunningBehavior::Terminate),
        Just(RunningBehavior::Restart),
    ]
}

fn definition_strategy() -> impl Strategy<Value = TargetDefinition> {
    (
        "[a-z]{1,8}",
        prop::collection::vec("[a-z*/.]{1,12}", 1..3),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        0u64..500,
        behavior_strategy(),
        0u64..120,
    )
        .prop_map(
            |(
                target_command,
                file_patterns,
                ignore_create,
                ignore_change,
                ignore_delete,
                only_files,
                pause_ms_before_run,
                running_behavior,
                batch_throttle_seconds,
            )| TargetDefinition {
                target_command,
                file_patterns,
                ignore_create,
                ignore_change,
                ignore_delete,
                only_files,
                pause_ms_before_run,
                running_behavior,
                batch_throttle_seconds,
            },
        )
}

proptest! {
    #[test]
    fn zero_running_always_invokes(behavior in behavior_strategy()) {
        prop_assert_eq!(decide(behavior, 0), PolicyDecision::InvokeNow);
    }

    #[test]
    fn busy_decision_matches_behavior(
        behavior in behavior_strategy(),
        running in 1usize..64,
    ) {
        let expected = match behavior {
            RunningBehavior::Batch => PolicyDecision::WaitThenRecheck,
            RunningBehavior::Terminate => PolicyDecision::SkipAndTerminateAll,
            RunningBehavior::Restart => PolicyDecision::TerminateThenInvoke,
        };
        prop_assert_eq!(decide(behavior, running), expected);
    }

    #[test]
    fn definition_equality_is_reflexive_and_symmetric(def in definition_strategy()) {
        let copy = def.clone();
        prop_assert!(def == copy);
        prop_assert!(copy == def);
    }

    #[test]
    fn flipping_any_flag_breaks_equality(def in definition_strategy()) {
        let mut other = def.clone();
        other.only_files = !other.only_files;
        prop_assert_ne!(&def, &other);

        let mut other = def.clone();
        other.pause_ms_before_run += 1;
        prop_assert_ne!(&def, &other);

        let mut other = def.clone();
        other.target_command.push('x');
        prop_assert_ne!(&def, &other);
    }
}
