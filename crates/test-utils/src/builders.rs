#![allow(dead_code)]

use retrig::config::TargetDefinition;
use retrig::types::RunningBehavior;

/// Builder for `TargetDefinition` to simplify test setup.
///
/// Note: the builder defaults `pause_ms_before_run` to 0 (no debounce) so
/// tests run fast; production resolution defaults it to 100ms.
pub struct TargetDefinitionBuilder {
    def: TargetDefinition,
}

impl TargetDefinitionBuilder {
    pub fn new(target_command: &str) -> Self {
        Self {
            def: TargetDefinition {
                target_command: target_command.to_string(),
                file_patterns: vec!["**/*".to_string()],
                ignore_create: false,
                ignore_change: false,
                ignore_delete: false,
                only_files: false,
                pause_ms_before_run: 0,
                running_behavior: RunningBehavior::Batch,
                batch_throttle_seconds: 30,
            },
        }
    }

    pub fn files(mut self, patterns: &[&str]) -> Self {
        self.def.file_patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn ignore_create(mut self, val: bool) -> Self {
        self.def.ignore_create = val;
        self
    }

    pub fn ignore_change(mut self, val: bool) -> Self {
        self.def.ignore_change = val;
        self
    }

    pub fn ignore_delete(mut self, val: bool) -> Self {
        self.def.ignore_delete = val;
        self
    }

    pub fn only_files(mut self, val: bool) -> Self {
        self.def.only_files = val;
        self
    }

    pub fn pause_ms(mut self, ms: u64) -> Self {
        self.def.pause_ms_before_run = ms;
        self
    }

    pub fn behavior(mut self, behavior: RunningBehavior) -> Self {
        self.def.running_behavior = behavior;
        self
    }

    pub fn throttle_seconds(mut self, seconds: u64) -> Self {
        self.def.batch_throttle_seconds = seconds;
        self
    }

    pub fn build(self) -> TargetDefinition {
        self.def
    }
}
