// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Compiling per-pattern globs.
//! - Wiring up a cross-platform filesystem watcher (`notify`) behind the
//!   [`EventSource`](source::EventSource) trait.
//! - Managing the per-target subscription lifecycle ([`WatchSession`]).
//!
//! It does **not** know about running-task policy or command execution; it
//! only turns filesystem changes into trigger events.

pub mod path_utils;
pub mod patterns;
pub mod session;
pub mod source;

pub use patterns::PatternFilter;
pub use session::WatchSession;
pub use source::{EventSource, NotifyEventSource, SubscribeRequest, WatchSubscription};
