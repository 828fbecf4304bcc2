// src/engine/policy.rs

//! Pure running-task policy.
//!
//! Given the configured behaviour and the number of currently-running
//! instances of the target command, decide what the coordinator should do.
//! No side effects, no timers; trivially unit-testable in isolation from
//! watchers and the command registry.

use crate::types::RunningBehavior;

/// Outcome of a policy decision for one trigger cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Terminate every running instance and do not invoke this cycle.
    SkipAndTerminateAll,
    /// Terminate every running instance, then invoke a new one.
    TerminateThenInvoke,
    /// Wait for the batch throttle interval, then re-check.
    WaitThenRecheck,
    /// Nothing is running; invoke immediately.
    InvokeNow,
}

/// Decide what to do about `running` instances under `behavior`.
pub fn decide(behavior: RunningBehavior, running: usize) -> PolicyDecision {
    if running == 0 {
        return PolicyDecision::InvokeNow;
    }

    match behavior {
        RunningBehavior::Terminate => PolicyDecision::SkipAndTerminateAll,
        RunningBehavior::Restart => PolicyDecision::TerminateThenInvoke,
        RunningBehavior::Batch => PolicyDecision::WaitThenRecheck,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_running_always_invokes() {
        for behavior in [
            RunningBehavior::Batch,
            RunningBehavior::Terminate,
            RunningBehavior::Restart,
        ] {
            assert_eq!(decide(behavior, 0), PolicyDecision::InvokeNow);
        }
    }

    #[test]
    fn batch_waits_while_instances_run() {
        assert_eq!(decide(RunningBehavior::Batch, 1), PolicyDecision::WaitThenRecheck);
        assert_eq!(decide(RunningBehavior::Batch, 5), PolicyDecision::WaitThenRecheck);
    }

    #[test]
    fn terminate_skips_invocation() {
        assert_eq!(
            decide(RunningBehavior::Terminate, 2),
            PolicyDecision::SkipAndTerminateAll
        );
    }

    #[test]
    fn restart_terminates_then_invokes() {
        assert_eq!(
            decide(RunningBehavior::Restart, 1),
            PolicyDecision::TerminateThenInvoke
        );
    }
}
