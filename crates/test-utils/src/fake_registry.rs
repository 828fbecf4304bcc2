use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use retrig::errors::{Result, RetrigError};
use retrig::exec::{CommandInstance, CommandName, CommandRegistry, CommandSpec};

/// A fake command registry that:
/// - serves a configurable set of defined commands
/// - lets tests plant "already running" instances
/// - records every `start` call instead of spawning processes.
///
/// Started instances are treated as completing immediately (they are not
/// added to the running set); tests that need a busy command plant instances
/// explicitly with [`push_running`](FakeCommandRegistry::push_running).
#[derive(Default)]
pub struct FakeCommandRegistry {
    defined: Mutex<BTreeMap<CommandName, CommandSpec>>,
    running: Mutex<Vec<CommandInstance>>,
    started: Mutex<Vec<CommandName>>,
    next_id: AtomicU64,
}

impl FakeCommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a command so `lookup` succeeds for it.
    pub fn define(&self, name: &str, cmd: &str) {
        self.defined.lock().unwrap().insert(
            name.to_string(),
            CommandSpec {
                cmd: cmd.to_string(),
            },
        );
    }

    /// Plant an already-running instance of `name`; returns its handle so the
    /// test can observe termination requests.
    pub fn push_running(&self, name: &str) -> CommandInstance {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (instance, _kill_rx) = CommandInstance::new(id, name);
        self.running.lock().unwrap().push(instance.clone());
        instance
    }

    /// Remove every running instance of `name` (simulates completion).
    pub fn finish_all(&self, name: &str) {
        self.running
            .lock()
            .unwrap()
            .retain(|instance| instance.command() != name);
    }

    /// Names of commands started so far, in order.
    pub fn started(&self) -> Vec<CommandName> {
        self.started.lock().unwrap().clone()
    }
}

impl CommandRegistry for FakeCommandRegistry {
    fn list_defined(&self) -> Vec<(CommandName, CommandSpec)> {
        self.defined
            .lock()
            .unwrap()
            .iter()
            .map(|(name, spec)| (name.clone(), spec.clone()))
            .collect()
    }

    fn lookup(&self, name: &str) -> Option<CommandSpec> {
        self.defined.lock().unwrap().get(name).cloned()
    }

    fn running_instances(&self, name: &str) -> Vec<CommandInstance> {
        self.running
            .lock()
            .unwrap()
            .iter()
            .filter(|instance| instance.command() == name)
            .cloned()
            .collect()
    }

    fn start(&self, name: &str) -> Result<CommandInstance> {
        if self.lookup(name).is_none() {
            return Err(RetrigError::CommandNotFound(name.to_string()));
        }
        self.started.lock().unwrap().push(name.to_string());
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (instance, _kill_rx) = CommandInstance::new(id, name);
        Ok(instance)
    }
}
