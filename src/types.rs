use std::str::FromStr;
use serde::Deserialize;

/// Behaviour when a trigger fires while a previous instance of the target
/// command is still running.
///
/// - `Batch`: wait (re-checking periodically) until no instance is running,
///   then launch one. Coalesces rapid file churn into a single eventual run.
/// - `Terminate`: terminate the running instances and do not launch a new one
///   this cycle.
/// - `Restart`: terminate the running instances, then launch a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunningBehavior {
    Batch,
    Terminate,
    Restart,
}

impl Default for RunningBehavior {
    fn default() -> Self {
        RunningBehavior::Batch
    }
}

impl FromStr for RunningBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "batch" => Ok(RunningBehavior::Batch),
            "terminate" => Ok(RunningBehavior::Terminate),
            "restart" => Ok(RunningBehavior::Restart),
            other => Err(format!(
                "invalid running_task_behavior: {other} (expected \"batch\", \"terminate\" or \"restart\")"
            )),
        }
    }
}
