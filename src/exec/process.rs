// src/exec/process.rs

//! Process-backed command registry.
//!
//! Commands are defined by the `[command.<name>]` config sections and run as
//! shell processes via `tokio::process::Command`. Each started instance gets
//! a supervisor task that waits for the process to exit (or for a kill
//! request) and then removes the instance from the running table.

use std::collections::BTreeMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::model::CommandConfig;
use crate::errors::{Result, RetrigError};
use crate::exec::registry::{CommandInstance, CommandName, CommandRegistry, CommandSpec};

/// Shared table of live instances across all commands.
type RunningTable = Arc<Mutex<Vec<CommandInstance>>>;

/// Command registry backed by real OS processes.
pub struct ProcessCommandRegistry {
    commands: BTreeMap<CommandName, CommandSpec>,
    running: RunningTable,
    next_id: AtomicU64,
}

impl ProcessCommandRegistry {
    /// Build a registry from the `[command.<name>]` config sections.
    pub fn from_config(commands: &BTreeMap<String, CommandConfig>) -> Self {
        let commands = commands
            .iter()
            .map(|(name, cfg)| (name.clone(), CommandSpec { cmd: cfg.cmd.clone() }))
            .collect();

        Self {
            commands,
            running: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }
}

impl CommandRegistry for ProcessCommandRegistry {
    fn list_defined(&self) -> Vec<(CommandName, CommandSpec)> {
        self.commands
            .iter()
            .map(|(name, spec)| (name.clone(), spec.clone()))
            .collect()
    }

    fn lookup(&self, name: &str) -> Option<CommandSpec> {
        self.commands.get(name).cloned()
    }

    fn running_instances(&self, name: &str) -> Vec<CommandInstance> {
        match self.running.lock() {
            Ok(table) => table
                .iter()
                .filter(|instance| instance.command() == name)
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn start(&self, name: &str) -> Result<CommandInstance> {
        let spec = self
            .lookup(name)
            .ok_or_else(|| RetrigError::CommandNotFound(name.to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (instance, kill_rx) = CommandInstance::new(id, name);

        let child = spawn_shell(&spec.cmd)?;

        if let Ok(mut table) = self.running.lock() {
            table.push(instance.clone());
        }

        let supervisor_instance = instance.clone();
        let running = Arc::clone(&self.running);
        tokio::spawn(async move {
            supervise(child, supervisor_instance, kill_rx, running).await;
        });

        info!(command = %name, id, "started command instance");
        Ok(instance)
    }
}

/// Build and spawn a shell command appropriate for the platform.
fn spawn_shell(cmd_line: &str) -> Result<Child> {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_line);
        c
    };

    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    Ok(cmd.spawn()?)
}

/// Wait for the child to exit (or for a kill request), then drop the
/// instance from the running table.
async fn supervise(
    mut child: Child,
    instance: CommandInstance,
    mut kill_rx: oneshot::Receiver<()>,
    running: RunningTable,
) {
    let command = instance.command().to_string();
    let id = instance.id();

    // Drain both output streams so pipe buffers don't fill.
    drain_lines(child.stdout.take(), command.clone(), id, "stdout");
    drain_lines(child.stderr.take(), command.clone(), id, "stderr");

    tokio::select! {
        status_res = child.wait() => {
            match status_res {
                Ok(status) => {
                    let code = status.code().unwrap_or(-1);
                    info!(
                        command = %command,
                        id,
                        exit_code = code,
                        success = status.success(),
                        "command instance exited"
                    );
                }
                Err(err) => {
                    warn!(
                        command = %command,
                        id,
                        error = %err,
                        "failed waiting for command instance"
                    );
                }
            }
        }

        _ = &mut kill_rx => {
            info!(command = %command, id, "termination requested; killing instance");
            if let Err(err) = child.kill().await {
                // The process may have exited on its own in the meantime.
                debug!(
                    command = %command,
                    id,
                    error = %err,
                    "kill after termination request failed"
                );
            }
        }
    }

    if let Ok(mut table) = running.lock() {
        table.retain(|entry| entry.id() != id);
    }
}

fn drain_lines(
    stream: Option<impl tokio::io::AsyncRead + Unpin + Send + 'static>,
    command: String,
    id: u64,
    label: &'static str,
) {
    if let Some(stream) = stream {
        tokio::spawn(async move {
            let reader = BufReader::new(stream);
            let mut lines = reader.lines();

            while let Ok(Some(line)) = lines.next_line().await {
                debug!(command = %command, id, "{label}: {line}");
            }
        });
    }
}
