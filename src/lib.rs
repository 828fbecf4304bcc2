// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod provider;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{ProgressSink, StdoutSink};
use crate::exec::{CommandRegistry, ProcessCommandRegistry};
use crate::provider::TargetProvider;
use crate::types::RunningBehavior;
use crate::watch::{EventSource, NotifyEventSource};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the process-backed command registry
/// - the target provider (one coordinator + watch session per definition)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let registry: Arc<dyn CommandRegistry> =
        Arc::new(ProcessCommandRegistry::from_config(&cfg.command));

    if args.dry_run {
        print_dry_run(&cfg, registry.as_ref());
        return Ok(());
    }

    let source: Arc<dyn EventSource> = Arc::new(NotifyEventSource);
    let sink: Arc<dyn ProgressSink> = Arc::new(StdoutSink);

    let root_dir = config_root_dir(&config_path);
    let provider = TargetProvider::new(root_dir, source, registry, sink);

    // Resolve either the single requested target or all of them.
    let selected: Vec<(&str, &config::WatchTargetConfig)> = match &args.target {
        Some(name) => {
            let target = cfg.watch.get(name).ok_or_else(|| {
                anyhow!("no [watch.{name}] section in {config_path:?}")
            })?;
            vec![(name.as_str(), target)]
        }
        None => cfg.watch.iter().map(|(n, t)| (n.as_str(), t)).collect(),
    };

    let mut handles = Vec::with_capacity(selected.len());
    for (name, target) in selected {
        let definition = target.resolve(&cfg.default);
        info!(
            target = %name,
            command = %definition.target_command,
            patterns = ?definition.file_patterns,
            "watching target"
        );
        handles.push(provider.resolve(&definition)?);
    }

    info!(
        targets = provider.resolved_count(),
        "retrig started; press Ctrl-C to stop"
    );

    // Ctrl-C → graceful shutdown.
    tokio::signal::ctrl_c().await?;
    info!("shutdown requested, closing targets");

    provider.close_all();
    for handle in &handles {
        handle.closed().await;
    }

    info!("retrig exiting");
    Ok(())
}

/// Figure out a sensible workspace root for watching.
///
/// - If the config path has a non-empty parent (e.g. "configs/Retrig.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Retrig.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Simple dry-run output: print defined commands and watch targets with
/// their effective settings.
fn print_dry_run(cfg: &ConfigFile, registry: &dyn CommandRegistry) {
    println!("retrig dry-run");
    println!();

    let defined = registry.list_defined();
    println!("commands ({}):", defined.len());
    for (name, spec) in &defined {
        println!("  - {name}");
        println!("      cmd: {}", spec.cmd);
    }
    println!();

    println!("watch targets ({}):", cfg.watch.len());
    for (name, target) in cfg.watch.iter() {
        let def = target.resolve(&cfg.default);
        println!("  - {name}");
        println!("      task: {}", def.target_command);
        println!("      files: {:?}", def.file_patterns);
        if def.ignore_create {
            println!("      ignore_create_events: true");
        }
        if def.ignore_change {
            println!("      ignore_change_events: true");
        }
        if def.ignore_delete {
            println!("      ignore_delete_events: true");
        }
        if def.only_files {
            println!("      only_files: true");
        }
        println!("      pause_ms_before_run: {}", def.pause_ms_before_run);
        println!("      running_task_behavior: {:?}", def.running_behavior);
        if def.running_behavior == RunningBehavior::Batch {
            println!(
                "      batch_throttle_seconds: {}",
                def.batch_throttle_seconds
            );
        }
    }

    debug!("dry-run complete (no execution)");
}
