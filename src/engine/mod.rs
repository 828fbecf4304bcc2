// src/engine/mod.rs

//! Rebuild engine for retrig.
//!
//! This module ties together:
//! - the trigger events flowing in from watch subscriptions
//! - the pure running-task policy (what to do when instances of the target
//!   command are still running)
//! - the per-target rebuild coordinator that reacts to:
//!   - file-watch triggers
//!   - the bootstrap trigger at session open
//!
//! The pure decision logic lives in [`policy`]; the stateful flow is
//! implemented in [`coordinator`].

use std::path::PathBuf;

/// Kind of filesystem change reported by a watch subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Changed,
    Deleted,
}

impl ChangeKind {
    /// Past-tense verb used in progress messages.
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Changed => "changed",
            ChangeKind::Deleted => "deleted",
        }
    }
}

/// Events flowing into a rebuild coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    /// Bootstrap trigger sent once when a watch session opens, so the target
    /// command runs at startup even with no file activity.
    Startup,
    /// A watched path was created, changed or deleted.
    FileChange { path: PathBuf, kind: ChangeKind },
}

/// Where a trigger flow currently is; tracked for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Debouncing,
    ResolvingPolicy,
    Waiting,
    Invoking,
}

/// Append-only sink for user-facing progress messages.
///
/// Implementations must not block the triggering flow materially; no
/// acknowledgement is expected.
pub trait ProgressSink: Send + Sync {
    fn write(&self, message: &str);
}

/// Production sink: progress messages go to stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ProgressSink for StdoutSink {
    fn write(&self, message: &str) {
        println!("{message}");
    }
}

pub mod coordinator;
pub mod policy;

pub use coordinator::RebuildCoordinator;
pub use policy::{decide, PolicyDecision};
pub use crate::types::RunningBehavior;
