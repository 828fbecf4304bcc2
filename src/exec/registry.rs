// src/exec/registry.rs

//! Pluggable command-registry abstraction.
//!
//! The coordinator talks to a `CommandRegistry` instead of spawning processes
//! itself. This makes it easy to swap in a fake registry in tests while
//! keeping the production implementation in [`process`](super::process).
//!
//! - `ProcessCommandRegistry` is the default implementation used by `retrig`.
//!   It spawns shell processes and tracks their running instances.
//! - Tests can provide their own `CommandRegistry` that records which
//!   commands were started or terminated without touching the OS.

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing::debug;

use crate::errors::Result;

/// Canonical command name type used throughout the engine.
pub type CommandName = String;

/// Definition of an invocable command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The shell command line to execute.
    pub cmd: String,
}

/// Trait abstracting the command execution substrate.
///
/// All methods are synchronous: enumeration reads an in-process table,
/// `terminate` is fire and forget, and `start` hands the process off to a
/// background task. None of them may block the triggering flow materially.
pub trait CommandRegistry: Send + Sync {
    /// Enumerate the defined commands.
    fn list_defined(&self) -> Vec<(CommandName, CommandSpec)>;

    /// Look up a single command by name.
    fn lookup(&self, name: &str) -> Option<CommandSpec>;

    /// Currently-running instances of the named command.
    fn running_instances(&self, name: &str) -> Vec<CommandInstance>;

    /// Start a new instance of the named command.
    fn start(&self, name: &str) -> Result<CommandInstance>;
}

/// Handle for one running instance of a command.
///
/// Cloneable; all clones refer to the same instance. Termination is
/// requested through a oneshot kill channel and is idempotent: requesting
/// termination of an instance that already finished (or was already asked to
/// terminate) is silently tolerated.
#[derive(Debug, Clone)]
pub struct CommandInstance {
    inner: Arc<InstanceInner>,
}

#[derive(Debug)]
struct InstanceInner {
    id: u64,
    command: CommandName,
    kill: Mutex<Option<oneshot::Sender<()>>>,
}

impl CommandInstance {
    /// Create a new instance handle and the kill receiver its supervisor
    /// should select on.
    pub fn new(id: u64, command: impl Into<CommandName>) -> (Self, oneshot::Receiver<()>) {
        let (kill_tx, kill_rx) = oneshot::channel();
        let instance = Self {
            inner: Arc::new(InstanceInner {
                id,
                command: command.into(),
                kill: Mutex::new(Some(kill_tx)),
            }),
        };
        (instance, kill_rx)
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn command(&self) -> &str {
        &self.inner.command
    }

    /// Request termination of this instance.
    ///
    /// Fire and forget: the caller does not learn whether the process
    /// actually stopped. If the instance finished on its own first, the send
    /// lands on a dropped receiver and is ignored.
    pub fn terminate(&self) {
        let sender = match self.inner.kill.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };

        match sender {
            Some(tx) => {
                if tx.send(()).is_err() {
                    debug!(
                        command = %self.inner.command,
                        id = self.inner.id,
                        "instance already finished while terminating"
                    );
                }
            }
            None => {
                debug!(
                    command = %self.inner.command,
                    id = self.inner.id,
                    "termination already requested for instance"
                );
            }
        }
    }

    /// Whether termination has been requested on this instance.
    pub fn terminate_requested(&self) -> bool {
        self.inner
            .kill
            .lock()
            .map(|slot| slot.is_none())
            .unwrap_or(true)
    }
}
