// src/engine/coordinator.rs

//! Per-target rebuild coordinator.
//!
//! One coordinator owns the trigger flow for one resolved target definition:
//! it consumes `TriggerEvent`s from the watch session, debounces them,
//! applies the running-task policy against the command registry, and starts
//! new command instances. Flows run to completion one at a time; events that
//! arrive during a flow's suspension points are coalesced, never queued as
//! separate flows.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::model::TargetDefinition;
use crate::engine::policy::{decide, PolicyDecision};
use crate::engine::{ChangeKind, FlowState, ProgressSink, TriggerEvent};
use crate::exec::CommandRegistry;

pub struct RebuildCoordinator {
    definition: TargetDefinition,
    registry: Arc<dyn CommandRegistry>,
    sink: Arc<dyn ProgressSink>,

    /// True while the flow is blocked retrying because a prior invocation
    /// under batch mode has not finished.
    waiting_for_completion: bool,
    state: FlowState,
}

impl RebuildCoordinator {
    pub fn new(
        definition: TargetDefinition,
        registry: Arc<dyn CommandRegistry>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            definition,
            registry,
            sink,
            waiting_for_completion: false,
            state: FlowState::Idle,
        }
    }

    pub fn definition(&self) -> &TargetDefinition {
        &self.definition
    }

    pub fn waiting_for_completion(&self) -> bool {
        self.waiting_for_completion
    }

    /// Main event loop.
    ///
    /// Runs until every sender for `events` is dropped (the owning session
    /// was closed). Each received event starts a trigger flow; a flow may be
    /// superseded during its debounce pause by a newer event, in which case
    /// the newer event restarts the flow from scratch.
    pub async fn run(mut self, mut events: mpsc::Receiver<TriggerEvent>) {
        info!(
            command = %self.definition.target_command,
            "rebuild coordinator started"
        );

        let mut pending = events.recv().await;
        while let Some(event) = pending.take() {
            pending = match self.trigger_flow(event, &mut events).await {
                Some(superseding) => Some(superseding),
                None => events.recv().await,
            };
        }

        info!(
            command = %self.definition.target_command,
            "rebuild coordinator stopped"
        );
    }

    /// One end-to-end attempt to go from a trigger event to a command
    /// invocation (or a policy-driven skip).
    ///
    /// Returns a superseding event if one arrived during the debounce pause.
    async fn trigger_flow(
        &mut self,
        event: TriggerEvent,
        events: &mut mpsc::Receiver<TriggerEvent>,
    ) -> Option<TriggerEvent> {
        self.set_state(FlowState::Debouncing);

        let Some(description) = self.describe(&event) else {
            self.set_state(FlowState::Idle);
            return None;
        };
        self.emit("---");
        self.emit(&description);

        if self.definition.pause_ms_before_run > 0 {
            if let Some(superseding) = self.debounce_pause(events).await {
                return Some(superseding);
            }
        }

        self.set_state(FlowState::ResolvingPolicy);
        let name = self.definition.target_command.clone();
        if self.registry.lookup(&name).is_none() {
            self.emit(&format!("Task '{name}' not found!"));
            error!(command = %name, "target command not found in registry");
            self.set_state(FlowState::Idle);
            return None;
        }

        loop {
            let running = self.registry.running_instances(&name);
            match decide(self.definition.running_behavior, running.len()) {
                PolicyDecision::InvokeNow => break,
                PolicyDecision::SkipAndTerminateAll => {
                    self.emit(&format!("Terminating running task '{name}' ..."));
                    for instance in &running {
                        instance.terminate();
                    }
                    self.set_state(FlowState::Idle);
                    return None;
                }
                PolicyDecision::TerminateThenInvoke => {
                    self.emit(&format!("Restarting running task '{name}' ..."));
                    for instance in &running {
                        instance.terminate();
                    }
                    break;
                }
                PolicyDecision::WaitThenRecheck => {
                    self.set_state(FlowState::Waiting);
                    self.waiting_for_completion = true;
                    self.emit(&format!(
                        "Waiting {} seconds for running task '{name}' to finish before launching another instance ...",
                        self.definition.batch_throttle_seconds
                    ));
                    self.batch_wait(events).await;
                    self.waiting_for_completion = false;
                }
            }
        }

        self.set_state(FlowState::Invoking);
        match self.registry.start(&name) {
            Ok(_instance) => {
                self.emit(&format!("Running task '{name}' ..."));
            }
            Err(err) => {
                self.emit(&format!("Failed to start task '{name}': {err}"));
                error!(command = %name, error = %err, "failed to start command instance");
            }
        }
        self.set_state(FlowState::Idle);
        None
    }

    /// Best-effort pre-trigger delay.
    ///
    /// Returns a superseding event if one arrives before the pause elapses;
    /// the latest flow wins.
    async fn debounce_pause(
        &mut self,
        events: &mut mpsc::Receiver<TriggerEvent>,
    ) -> Option<TriggerEvent> {
        let pause = Duration::from_millis(self.definition.pause_ms_before_run);
        let timer = sleep(pause);
        tokio::pin!(timer);

        tokio::select! {
            _ = &mut timer => None,
            event = events.recv() => match event {
                Some(event) => {
                    debug!(
                        command = %self.definition.target_command,
                        "debounce pause interrupted by newer event"
                    );
                    Some(event)
                }
                // Senders are gone; finish the pause and let this last flow
                // complete.
                None => {
                    timer.as_mut().await;
                    None
                }
            },
        }
    }

    /// Sleep the batch throttle interval.
    ///
    /// Events arriving meanwhile are coalesced: each one gets exactly one
    /// informational message and is dropped, retaining only the fact that
    /// something changed.
    async fn batch_wait(&mut self, events: &mut mpsc::Receiver<TriggerEvent>) {
        let throttle = Duration::from_secs(self.definition.batch_throttle_seconds);
        let timer = sleep(throttle);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                _ = &mut timer => return,
                event = events.recv() => match event {
                    Some(event) => {
                        debug!(
                            command = %self.definition.target_command,
                            ?event,
                            "coalescing event that arrived while waiting"
                        );
                        self.emit(
                            "Waiting for running task to finish before launching another instance ...",
                        );
                    }
                    None => {
                        timer.as_mut().await;
                        return;
                    }
                },
            }
        }
    }

    /// Build the description line for an accepted trigger.
    ///
    /// Returns `None` when the trigger must be dropped (`only_files` and the
    /// path is a directory); the informational message is emitted here.
    fn describe(&self, event: &TriggerEvent) -> Option<String> {
        match event {
            TriggerEvent::Startup => Some("Running task first time! ...".to_string()),
            TriggerEvent::FileChange {
                path,
                kind: ChangeKind::Deleted,
            } => Some(format!("File/Directory {} was deleted.", path.display())),
            TriggerEvent::FileChange { path, kind } => {
                let action = kind.as_str();
                match fs::metadata(path) {
                    Ok(meta) if meta.is_file() => {
                        Some(format!("File {} was {action}.", path.display()))
                    }
                    Ok(meta) if meta.is_dir() => {
                        if self.definition.only_files {
                            self.emit(&format!(
                                "Directory {} was {action}, but task is configured to only watch files.",
                                path.display()
                            ));
                            None
                        } else {
                            Some(format!("Directory {} was {action}.", path.display()))
                        }
                    }
                    Ok(_) => Some(format!("File/Directory {} was {action}.", path.display())),
                    Err(err) => {
                        // The path may have vanished between event and stat.
                        debug!(
                            path = %path.display(),
                            error = %err,
                            "stat failed; falling back to generic description"
                        );
                        Some(format!("File/Directory {} was {action}.", path.display()))
                    }
                }
            }
        }
    }

    /// Write a progress message to the sink and mirror it to the log.
    fn emit(&self, message: &str) {
        self.sink.write(message);
        debug!(command = %self.definition.target_command, "{message}");
    }

    fn set_state(&mut self, state: FlowState) {
        if self.state != state {
            debug!(
                command = %self.definition.target_command,
                from = ?self.state,
                to = ?state,
                "flow state transition"
            );
            self.state = state;
        }
    }
}
