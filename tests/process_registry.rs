// tests/process_registry.rs

//! Integration tests for the process-backed command registry. These spawn
//! real shell processes, so they are kept small and bounded by polling
//! timeouts.

#![cfg(unix)]

use std::collections::BTreeMap;
use std::error::Error;
use std::time::Duration;

use tokio::time::sleep;

use retrig::config::CommandConfig;
use retrig::exec::{CommandRegistry, ProcessCommandRegistry};
use retrig::errors::RetrigError;
use retrig_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn registry_with(entries: &[(&str, &str)]) -> ProcessCommandRegistry {
    let mut commands = BTreeMap::new();
    for (name, cmd) in entries {
        commands.insert(
            name.to_string(),
            CommandConfig {
                cmd: cmd.to_string(),
            },
        );
    }
    ProcessCommandRegistry::from_config(&commands)
}

/// Poll `cond` until it holds, for at most ~3 seconds.
async fn wait_until(cond: impl Fn() -> bool) {
    for _ in 0..300 {
        if cond() {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 3 seconds");
}

#[tokio::test]
async fn lookup_and_list_defined_reflect_config() -> TestResult {
    init_tracing();
    let registry = registry_with(&[("build", "echo build"), ("test", "echo test")]);

    let defined = registry.list_defined();
    assert_eq!(defined.len(), 2);
    assert_eq!(defined[0].0, "build");
    assert_eq!(defined[0].1.cmd, "echo build");

    assert!(registry.lookup("build").is_some());
    assert!(registry.lookup("deploy").is_none());
    Ok(())
}

#[tokio::test]
async fn starting_an_unknown_command_fails() -> TestResult {
    init_tracing();
    let registry = registry_with(&[]);
    let err = registry.start("ghost").unwrap_err();
    assert!(matches!(err, RetrigError::CommandNotFound(_)));
    Ok(())
}

#[tokio::test]
async fn short_command_leaves_the_running_table() -> TestResult {
    init_tracing();
    let registry = registry_with(&[("noop", "true")]);

    registry.start("noop")?;
    wait_until(|| registry.running_instances("noop").is_empty()).await;
    Ok(())
}

#[tokio::test]
async fn terminate_kills_a_long_running_instance() -> TestResult {
    init_tracing();
    let registry = registry_with(&[("sleeper", "sleep 30")]);

    let instance = registry.start("sleeper")?;
    assert_eq!(registry.running_instances("sleeper").len(), 1);

    instance.terminate();
    wait_until(|| registry.running_instances("sleeper").is_empty()).await;

    // A second terminate on the finished instance is tolerated silently.
    instance.terminate();
    Ok(())
}

#[tokio::test]
async fn instances_of_different_commands_are_tracked_separately() -> TestResult {
    init_tracing();
    let registry = registry_with(&[("a", "sleep 30"), ("b", "sleep 30")]);

    let a = registry.start("a")?;
    let b = registry.start("b")?;
    assert_eq!(registry.running_instances("a").len(), 1);
    assert_eq!(registry.running_instances("b").len(), 1);

    a.terminate();
    wait_until(|| registry.running_instances("a").is_empty()).await;
    assert_eq!(registry.running_instances("b").len(), 1);

    b.terminate();
    wait_until(|| registry.running_instances("b").is_empty()).await;
    Ok(())
}
