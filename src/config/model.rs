// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::RunningBehavior;

/// Built-in fallback watch pattern: everything under the workspace root.
pub const DEFAULT_FILE_PATTERN: &str = "**/*";

/// Built-in fallback debounce pause in milliseconds.
pub const DEFAULT_PAUSE_MS: u64 = 100;

/// Built-in fallback batch wait interval in seconds.
pub const DEFAULT_BATCH_THROTTLE_SECONDS: u64 = 30;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [default]
/// files = ["**/*"]
///
/// [command.build]
/// cmd = "cargo build"
///
/// [watch.build-on-save]
/// task = "build"
/// files = ["src/**/*.rs"]
/// running_task_behavior = "restart"
/// ```
///
/// All sections are optional and have reasonable defaults, except that at
/// least one `[watch.<name>]` section must be present (checked by
/// validation, not deserialization).
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Fallbacks for `files`, `pause_ms_before_run`, `batch_throttle_seconds`
    /// from `[default]`.
    #[serde(default)]
    pub default: DefaultSection,

    /// Invocable commands from `[command.<name>]`.
    ///
    /// Keys are the *command names* watch targets refer to via `task = "..."`.
    #[serde(default)]
    pub command: BTreeMap<String, CommandConfig>,

    /// Watch targets from `[watch.<name>]`.
    #[serde(default)]
    pub watch: BTreeMap<String, WatchTargetConfig>,
}

/// `[default]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultSection {
    /// Default watch patterns applied to targets that do not set `files`.
    ///
    /// If empty, the built-in `"**/*"` pattern is used.
    #[serde(default)]
    pub files: Vec<String>,

    /// Default debounce pause; if `None`, the built-in 100ms is used.
    #[serde(default)]
    pub pause_ms_before_run: Option<u64>,

    /// Default batch wait interval; if `None`, the built-in 30s is used.
    #[serde(default)]
    pub batch_throttle_seconds: Option<u64>,
}

/// `[command.<name>]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandConfig {
    /// The shell command line to execute.
    pub cmd: String,
}

/// `[watch.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchTargetConfig {
    /// Name of the command to invoke when a qualifying event fires.
    pub task: String,

    /// Optional target-local watch patterns; if `None`, `default.files`
    /// (or the built-in pattern) applies.
    #[serde(default)]
    pub files: Option<Vec<String>>,

    /// Suppress create events for this target.
    #[serde(default)]
    pub ignore_create_events: bool,

    /// Suppress change events for this target.
    #[serde(default)]
    pub ignore_change_events: bool,

    /// Suppress delete events for this target.
    #[serde(default)]
    pub ignore_delete_events: bool,

    /// Directory events are reported but not acted upon when true.
    #[serde(default)]
    pub only_files: bool,

    /// Delay before invoking the command, in milliseconds.
    #[serde(default)]
    pub pause_ms_before_run: Option<u64>,

    /// What to do when instances of the target command are still running.
    #[serde(default)]
    pub running_task_behavior: Option<RunningBehavior>,

    /// Wait interval used in batch mode, in seconds.
    #[serde(default)]
    pub batch_throttle_seconds: Option<u64>,
}

/// Immutable watch-and-trigger configuration for one target.
///
/// Equality is total and field-by-field; it is the key used to deduplicate
/// coordinators (identical definitions share one coordinator and its watch
/// subscriptions, distinct definitions never share state). The config-file
/// section name is deliberately *not* part of the definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetDefinition {
    pub target_command: String,
    pub file_patterns: Vec<String>,
    pub ignore_create: bool,
    pub ignore_change: bool,
    pub ignore_delete: bool,
    pub only_files: bool,
    pub pause_ms_before_run: u64,
    pub running_behavior: RunningBehavior,
    pub batch_throttle_seconds: u64,
}

impl WatchTargetConfig {
    /// Resolve this target against `[default]` and the built-in defaults,
    /// producing the immutable definition the engine works with.
    pub fn resolve(&self, defaults: &DefaultSection) -> TargetDefinition {
        let file_patterns = match &self.files {
            Some(files) if !files.is_empty() => files.clone(),
            _ if !defaults.files.is_empty() => defaults.files.clone(),
            _ => vec![DEFAULT_FILE_PATTERN.to_string()],
        };

        TargetDefinition {
            target_command: self.task.clone(),
            file_patterns,
            ignore_create: self.ignore_create_events,
            ignore_change: self.ignore_change_events,
            ignore_delete: self.ignore_delete_events,
            only_files: self.only_files,
            pause_ms_before_run: self
                .pause_ms_before_run
                .or(defaults.pause_ms_before_run)
                .unwrap_or(DEFAULT_PAUSE_MS),
            running_behavior: self.running_task_behavior.unwrap_or_default(),
            batch_throttle_seconds: self
                .batch_throttle_seconds
                .or(defaults.batch_throttle_seconds)
                .unwrap_or(DEFAULT_BATCH_THROTTLE_SECONDS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_target(task: &str) -> WatchTargetConfig {
        WatchTargetConfig {
            task: task.to_string(),
            files: None,
            ignore_create_events: false,
            ignore_change_events: false,
            ignore_delete_events: false,
            only_files: false,
            pause_ms_before_run: None,
            running_task_behavior: None,
            batch_throttle_seconds: None,
        }
    }

    #[test]
    fn resolve_applies_builtin_defaults() {
        let def = minimal_target("build").resolve(&DefaultSection::default());

        assert_eq!(def.target_command, "build");
        assert_eq!(def.file_patterns, vec![DEFAULT_FILE_PATTERN.to_string()]);
        assert_eq!(def.pause_ms_before_run, DEFAULT_PAUSE_MS);
        assert_eq!(def.running_behavior, RunningBehavior::Batch);
        assert_eq!(def.batch_throttle_seconds, DEFAULT_BATCH_THROTTLE_SECONDS);
        assert!(!def.only_files);
    }

    #[test]
    fn resolve_prefers_target_fields_over_default_section() {
        let defaults = DefaultSection {
            files: vec!["src/**/*.py".to_string()],
            pause_ms_before_run: Some(5),
            batch_throttle_seconds: Some(7),
        };

        let mut target = minimal_target("test");
        target.files = Some(vec!["tests/**/*.rs".to_string()]);
        target.pause_ms_before_run = Some(0);
        target.running_task_behavior = Some(RunningBehavior::Restart);

        let def = target.resolve(&defaults);
        assert_eq!(def.file_patterns, vec!["tests/**/*.rs".to_string()]);
        assert_eq!(def.pause_ms_before_run, 0);
        assert_eq!(def.batch_throttle_seconds, 7);
        assert_eq!(def.running_behavior, RunningBehavior::Restart);
    }

    #[test]
    fn definition_equality_is_field_by_field() {
        let defaults = DefaultSection::default();
        let a = minimal_target("build").resolve(&defaults);
        let b = minimal_target("build").resolve(&defaults);
        assert_eq!(a, b);
        assert_eq!(b, a);

        let mut c = b.clone();
        c.only_files = true;
        assert_ne!(a, c);
    }
}
