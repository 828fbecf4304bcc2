// src/watch/source.rs

//! Filesystem event source abstraction.
//!
//! The watch session talks to an `EventSource` instead of the `notify` crate
//! directly. This makes it easy to drive sessions from a fake source in
//! tests while keeping the production implementation here.
//!
//! One subscription covers one glob pattern with its own per-event-kind
//! enable flags. Dropping the returned [`WatchSubscription`] releases it.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{ChangeKind, TriggerEvent};
use crate::errors::Result;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::PatternFilter;

/// What to subscribe to: a glob pattern evaluated against the workspace
/// root, with per-event-kind suppression flags.
#[derive(Debug, Clone)]
pub struct SubscribeRequest {
    pub root: PathBuf,
    pub pattern: String,
    pub ignore_create: bool,
    pub ignore_change: bool,
    pub ignore_delete: bool,
}

/// Handle for one active watch subscription.
///
/// This exists mainly so the underlying watcher is kept alive for as long as
/// needed. Dropping this handle releases the subscription.
pub struct WatchSubscription {
    _keepalive: Box<dyn Any + Send>,
}

impl WatchSubscription {
    pub fn new(keepalive: impl Any + Send) -> Self {
        Self {
            _keepalive: Box::new(keepalive),
        }
    }
}

impl fmt::Debug for WatchSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSubscription").finish()
    }
}

/// A source of filesystem change notifications.
pub trait EventSource: Send + Sync {
    /// Subscribe to changes matching `request`, delivering them as
    /// [`TriggerEvent::FileChange`] on `events_tx`.
    fn subscribe(
        &self,
        request: &SubscribeRequest,
        events_tx: mpsc::Sender<TriggerEvent>,
    ) -> Result<WatchSubscription>;
}

/// Production event source backed by the `notify` crate.
///
/// Each subscription gets its own recursive watcher on the workspace root;
/// raw events are relativized against the root and filtered by the compiled
/// glob before being forwarded.
#[derive(Debug, Default)]
pub struct NotifyEventSource;

impl EventSource for NotifyEventSource {
    fn subscribe(
        &self,
        request: &SubscribeRequest,
        events_tx: mpsc::Sender<TriggerEvent>,
    ) -> Result<WatchSubscription> {
        let filter = PatternFilter::compile(&request.pattern)?;

        let root = request
            .root
            .canonicalize()
            .unwrap_or_else(|_| request.root.clone()); // best-effort

        // Channel from the blocking notify callback into the async world.
        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<Event>();

        // Closure called synchronously by notify whenever an event arrives.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Err(err) = raw_tx.send(event) {
                        // We can't log via tracing here easily, so fallback to stderr.
                        eprintln!("retrig: failed to forward notify event: {err}");
                    }
                }
                Err(err) => {
                    eprintln!("retrig: file watch error: {err}");
                }
            },
            Config::default(),
        )
        .map_err(|err| anyhow::anyhow!("creating filesystem watcher: {err}"))?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|err| anyhow::anyhow!("watching {root:?}: {err}"))?;

        info!(pattern = %request.pattern, root = ?root, "watch subscription opened");

        // Async task that consumes raw notify events and forwards matching
        // trigger events into the coordinator channel.
        let request = request.clone();
        tokio::spawn(async move {
            while let Some(event) = raw_rx.recv().await {
                debug!(?event, "received notify event");

                let kind = match classify(&event.kind) {
                    Some(kind) => kind,
                    None => continue,
                };
                if suppressed(&request, kind) {
                    continue;
                }

                for path in &event.paths {
                    let Some(rel) = relative_str(&root, path) else {
                        warn!(?path, ?root, "could not relativize event path");
                        continue;
                    };
                    if !filter.matches(&rel) {
                        continue;
                    }

                    debug!(pattern = %request.pattern, path = %rel, ?kind, "watch match");
                    if let Err(err) = events_tx
                        .send(TriggerEvent::FileChange {
                            path: path.clone(),
                            kind,
                        })
                        .await
                    {
                        warn!("failed to forward trigger event: {err}");
                        // If the coordinator channel is closed, there's no
                        // point keeping this forward loop alive.
                        return;
                    }
                }
            }

            debug!("watch forward loop ended");
        });

        Ok(WatchSubscription::new(watcher))
    }
}

fn classify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(_) => Some(ChangeKind::Changed),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        _ => None,
    }
}

fn suppressed(request: &SubscribeRequest, kind: ChangeKind) -> bool {
    match kind {
        ChangeKind::Created => request.ignore_create,
        ChangeKind::Changed => request.ignore_change,
        ChangeKind::Deleted => request.ignore_delete,
    }
}
