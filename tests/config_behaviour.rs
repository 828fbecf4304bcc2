// tests/config_behaviour.rs

use std::error::Error;
use std::str::FromStr;

use retrig::config::{load_and_validate, validate_config, ConfigFile};
use retrig::types::RunningBehavior;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn minimal_config_gets_builtin_defaults() -> TestResult {
    let cfg: ConfigFile = toml::from_str(
        r#"
        [command.build]
        cmd = "cargo build"

        [watch.build-on-save]
        task = "build"
        "#,
    )?;
    validate_config(&cfg)?;

    let def = cfg.watch["build-on-save"].resolve(&cfg.default);
    assert_eq!(def.target_command, "build");
    assert_eq!(def.file_patterns, vec!["**/*".to_string()]);
    assert!(!def.ignore_create);
    assert!(!def.ignore_change);
    assert!(!def.ignore_delete);
    assert!(!def.only_files);
    assert_eq!(def.pause_ms_before_run, 100);
    assert_eq!(def.running_behavior, RunningBehavior::Batch);
    assert_eq!(def.batch_throttle_seconds, 30);
    Ok(())
}

#[test]
fn default_section_fills_unset_target_fields() -> TestResult {
    let cfg: ConfigFile = toml::from_str(
        r#"
        [default]
        files = ["src/**/*.py"]
        pause_ms_before_run = 5
        batch_throttle_seconds = 2

        [command.test]
        cmd = "pytest"

        [watch.tests]
        task = "test"
        running_task_behavior = "terminate"
        "#,
    )?;
    validate_config(&cfg)?;

    let def = cfg.watch["tests"].resolve(&cfg.default);
    assert_eq!(def.file_patterns, vec!["src/**/*.py".to_string()]);
    assert_eq!(def.pause_ms_before_run, 5);
    assert_eq!(def.batch_throttle_seconds, 2);
    assert_eq!(def.running_behavior, RunningBehavior::Terminate);
    Ok(())
}

#[test]
fn target_fields_override_default_section() -> TestResult {
    let cfg: ConfigFile = toml::from_str(
        r#"
        [default]
        files = ["src/**/*.py"]
        pause_ms_before_run = 500

        [command.lint]
        cmd = "ruff check ."

        [watch.lint]
        task = "lint"
        files = ["**/*.toml"]
        pause_ms_before_run = 0
        only_files = true
        ignore_delete_events = true
        running_task_behavior = "restart"
        "#,
    )?;
    validate_config(&cfg)?;

    let def = cfg.watch["lint"].resolve(&cfg.default);
    assert_eq!(def.file_patterns, vec!["**/*.toml".to_string()]);
    assert_eq!(def.pause_ms_before_run, 0);
    assert!(def.only_files);
    assert!(def.ignore_delete);
    assert!(!def.ignore_create);
    assert_eq!(def.running_behavior, RunningBehavior::Restart);
    Ok(())
}

#[test]
fn running_behavior_strings_parse() -> TestResult {
    assert_eq!(RunningBehavior::from_str("batch")?, RunningBehavior::Batch);
    assert_eq!(
        RunningBehavior::from_str("  Terminate ")?,
        RunningBehavior::Terminate
    );
    assert_eq!(
        RunningBehavior::from_str("restart")?,
        RunningBehavior::Restart
    );
    assert!(RunningBehavior::from_str("queue").is_err());
    Ok(())
}

#[test]
fn invalid_behavior_string_is_rejected_at_parse_time() {
    let parsed: Result<ConfigFile, _> = toml::from_str(
        r#"
        [watch.build]
        task = "build"
        running_task_behavior = "detach"
        "#,
    );
    assert!(parsed.is_err());
}

#[test]
fn load_and_validate_reads_a_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Retrig.toml");
    std::fs::write(
        &path,
        r#"
        [command.build]
        cmd = "cargo build"

        [watch.build]
        task = "build"
        files = ["src/**/*.rs"]
        "#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.command.len(), 1);
    assert_eq!(cfg.watch.len(), 1);
    assert_eq!(cfg.command["build"].cmd, "cargo build");
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_and_validate("/definitely/not/here/Retrig.toml");
    assert!(matches!(
        result,
        Err(retrig::errors::RetrigError::IoError(_))
    ));
}
