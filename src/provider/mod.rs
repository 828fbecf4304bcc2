// src/provider/mod.rs

//! Target resolution and deduplication.
//!
//! The provider owns the mapping from resolved [`TargetDefinition`]s to live
//! coordinator/session pairs. Definitions compare structurally, so resolving
//! the same configuration twice reattaches to the same shared state instead
//! of duplicating watchers: at most one live coordinator per distinct
//! definition.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::model::TargetDefinition;
use crate::engine::{ProgressSink, RebuildCoordinator, TriggerEvent};
use crate::errors::Result;
use crate::exec::CommandRegistry;
use crate::watch::{EventSource, WatchSession};

/// Capacity of the per-target trigger channel.
const TRIGGER_CHANNEL_CAPACITY: usize = 64;

pub struct TargetProvider {
    root: PathBuf,
    source: Arc<dyn EventSource>,
    registry: Arc<dyn CommandRegistry>,
    sink: Arc<dyn ProgressSink>,
    targets: Mutex<HashMap<TargetDefinition, TargetHandle>>,
}

impl TargetProvider {
    pub fn new(
        root: impl Into<PathBuf>,
        source: Arc<dyn EventSource>,
        registry: Arc<dyn CommandRegistry>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            root: root.into(),
            source,
            registry,
            sink,
            targets: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a definition to its (possibly shared) live handle.
    ///
    /// On a structural-equality match against a previously resolved
    /// definition this returns a clone of the existing handle — same
    /// coordinator, same watch session, same trigger channel. Otherwise a
    /// new session is opened, a new coordinator task is spawned, and the
    /// pair is registered under the definition.
    pub fn resolve(&self, definition: &TargetDefinition) -> Result<TargetHandle> {
        let mut targets = self
            .targets
            .lock()
            .map_err(|_| anyhow::anyhow!("target table poisoned"))?;

        if let Some(handle) = targets.get(definition) {
            debug!(
                command = %definition.target_command,
                "reattaching to existing coordinator for equal definition"
            );
            return Ok(handle.clone());
        }

        let handle = TargetHandle::spawn(
            definition.clone(),
            self.root.clone(),
            Arc::clone(&self.source),
            Arc::clone(&self.registry),
            Arc::clone(&self.sink),
        )?;
        targets.insert(definition.clone(), handle.clone());

        info!(
            command = %definition.target_command,
            "created coordinator for new target definition"
        );
        Ok(handle)
    }

    /// Number of distinct definitions currently resolved.
    pub fn resolved_count(&self) -> usize {
        self.targets.lock().map(|t| t.len()).unwrap_or(0)
    }

    /// Close every live target: subscriptions are released and the
    /// coordinator loops drain and stop.
    pub fn close_all(&self) {
        let mut targets = match self.targets.lock() {
            Ok(t) => t,
            Err(_) => return,
        };
        for (_, handle) in targets.drain() {
            handle.close();
        }
    }
}

/// Shared handle to one live target (coordinator + watch session).
///
/// Clones refer to the same underlying state; this is the explicit
/// shared-state handle that replaces closure-captured mutable state.
#[derive(Clone)]
pub struct TargetHandle {
    inner: Arc<TargetInner>,
}

struct TargetInner {
    definition: TargetDefinition,
    session: Mutex<Option<WatchSession>>,
    events_tx: Mutex<Option<mpsc::Sender<TriggerEvent>>>,
    coordinator: Mutex<Option<JoinHandle<()>>>,
}

impl TargetHandle {
    fn spawn(
        definition: TargetDefinition,
        root: PathBuf,
        source: Arc<dyn EventSource>,
        registry: Arc<dyn CommandRegistry>,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<Self> {
        let (events_tx, events_rx) = mpsc::channel::<TriggerEvent>(TRIGGER_CHANNEL_CAPACITY);

        let mut session = WatchSession::new(root, source, events_tx.clone());
        session.open(&definition)?;

        let coordinator = RebuildCoordinator::new(definition.clone(), registry, sink);
        let join = tokio::spawn(coordinator.run(events_rx));

        Ok(Self {
            inner: Arc::new(TargetInner {
                definition,
                session: Mutex::new(Some(session)),
                events_tx: Mutex::new(Some(events_tx)),
                coordinator: Mutex::new(Some(join)),
            }),
        })
    }

    pub fn definition(&self) -> &TargetDefinition {
        &self.inner.definition
    }

    /// True if both handles refer to the same live target.
    pub fn shares_state_with(&self, other: &TargetHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Close this target: drop the watch session (releasing every
    /// subscription) and the trigger sender, after which the coordinator
    /// loop drains remaining events and stops.
    pub fn close(&self) {
        if let Ok(mut session) = self.inner.session.lock() {
            session.take();
        }
        if let Ok(mut events_tx) = self.inner.events_tx.lock() {
            events_tx.take();
        }
        debug!(
            command = %self.inner.definition.target_command,
            "target handle closed"
        );
    }

    /// Wait for the coordinator task to finish (after [`close`]).
    pub async fn closed(&self) {
        let join = match self.inner.coordinator.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(join) = join {
            let _ = join.await;
        }
    }
}
