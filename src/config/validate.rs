// src/config/validate.rs

use globset::Glob;
use tracing::warn;

use crate::config::model::ConfigFile;
use crate::errors::{Result, RetrigError};

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one `[watch.<name>]` section
/// - every watch target names a non-empty `task`
/// - every glob pattern (per-target and `[default].files`) compiles
///
/// A watch target referencing a command absent from `[command]` is *not* an
/// error here: the command set is owned by the registry and looked up at
/// trigger time, so a missing command stays a recoverable runtime condition.
/// We do log a warning so typos are visible at startup.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_watch_targets(cfg)?;
    validate_watch_targets(cfg)?;
    validate_patterns(cfg)?;
    Ok(())
}

fn ensure_has_watch_targets(cfg: &ConfigFile) -> Result<()> {
    if cfg.watch.is_empty() {
        return Err(RetrigError::ConfigError(
            "config must contain at least one [watch.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_watch_targets(cfg: &ConfigFile) -> Result<()> {
    for (name, target) in cfg.watch.iter() {
        if target.task.trim().is_empty() {
            return Err(RetrigError::ConfigError(format!(
                "watch target '{}' has an empty `task` field",
                name
            )));
        }
        if !cfg.command.contains_key(&target.task) {
            warn!(
                target = %name,
                task = %target.task,
                "watch target references a command not defined in [command]; \
                 it will be reported as not found when triggered"
            );
        }
    }
    Ok(())
}

fn validate_patterns(cfg: &ConfigFile) -> Result<()> {
    for pattern in cfg.default.files.iter() {
        compile_check(pattern)?;
    }
    for target in cfg.watch.values() {
        if let Some(files) = &target.files {
            for pattern in files {
                compile_check(pattern)?;
            }
        }
    }
    Ok(())
}

fn compile_check(pattern: &str) -> Result<()> {
    Glob::new(pattern).map_err(|source| RetrigError::PatternError {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> ConfigFile {
        toml::from_str(toml_str).expect("test config should deserialize")
    }

    #[test]
    fn rejects_config_without_watch_targets() {
        let cfg = parse(
            r#"
            [command.build]
            cmd = "cargo build"
            "#,
        );
        assert!(matches!(
            validate_config(&cfg),
            Err(RetrigError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_empty_task_name() {
        let cfg = parse(
            r#"
            [watch.broken]
            task = "  "
            "#,
        );
        assert!(matches!(
            validate_config(&cfg),
            Err(RetrigError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_invalid_glob() {
        let cfg = parse(
            r#"
            [watch.build]
            task = "build"
            files = ["src/**/*.{rs"]
            "#,
        );
        assert!(matches!(
            validate_config(&cfg),
            Err(RetrigError::PatternError { .. })
        ));
    }

    #[test]
    fn accepts_target_referencing_undefined_command() {
        // Missing commands are a trigger-time condition, not a load error.
        let cfg = parse(
            r#"
            [watch.build]
            task = "no-such-command"
            "#,
        );
        assert!(validate_config(&cfg).is_ok());
    }
}
