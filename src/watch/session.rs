// src/watch/session.rs

//! Watch-subscription lifecycle for one target.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::model::TargetDefinition;
use crate::engine::TriggerEvent;
use crate::errors::Result;
use crate::watch::source::{EventSource, SubscribeRequest, WatchSubscription};

/// Owns the active watch subscriptions for one target.
///
/// `open` subscribes once per configured file pattern and then fires the
/// bootstrap trigger; `close` releases every subscription. All delivered
/// events land on the coordinator channel handed in at construction.
pub struct WatchSession {
    root: PathBuf,
    source: Arc<dyn EventSource>,
    events_tx: mpsc::Sender<TriggerEvent>,
    subscriptions: Vec<WatchSubscription>,
}

impl WatchSession {
    pub fn new(
        root: impl Into<PathBuf>,
        source: Arc<dyn EventSource>,
        events_tx: mpsc::Sender<TriggerEvent>,
    ) -> Self {
        Self {
            root: root.into(),
            source,
            events_tx,
            subscriptions: Vec::new(),
        }
    }

    /// Open subscriptions for every pattern in `definition`.
    ///
    /// Any prior subscriptions are closed first, so calling `open` twice is
    /// safe. After subscribing, a single [`TriggerEvent::Startup`] is sent so
    /// the target command runs once at startup even with no file activity.
    pub fn open(&mut self, definition: &TargetDefinition) -> Result<()> {
        self.close();

        for pattern in &definition.file_patterns {
            let request = SubscribeRequest {
                root: self.root.clone(),
                pattern: pattern.clone(),
                ignore_create: definition.ignore_create,
                ignore_change: definition.ignore_change,
                ignore_delete: definition.ignore_delete,
            };
            let subscription = self.source.subscribe(&request, self.events_tx.clone())?;
            self.subscriptions.push(subscription);
        }

        debug!(
            command = %definition.target_command,
            patterns = definition.file_patterns.len(),
            "watch session opened"
        );

        if let Err(err) = self.events_tx.try_send(TriggerEvent::Startup) {
            warn!(error = %err, "failed to send bootstrap trigger");
        }

        Ok(())
    }

    /// Release every subscription; safe to call when none exist.
    pub fn close(&mut self) {
        if !self.subscriptions.is_empty() {
            debug!(
                subscriptions = self.subscriptions.len(),
                "closing watch session"
            );
        }
        self.subscriptions.clear();
    }

    /// Number of currently active subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        self.close();
    }
}
