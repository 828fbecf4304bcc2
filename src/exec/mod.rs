// src/exec/mod.rs

//! Command execution layer.
//!
//! This module owns the *execution substrate* the rebuild engine calls into:
//! given a command name it can enumerate running instances, terminate one,
//! and start a new one.
//!
//! - [`registry`] provides the `CommandRegistry` trait, `CommandSpec`, and
//!   the shared `CommandInstance` handle, so tests can replace the substrate
//!   with a fake implementation.
//! - [`process`] provides `ProcessCommandRegistry`, the production
//!   implementation backed by `tokio::process`.

pub mod process;
pub mod registry;

pub use process::ProcessCommandRegistry;
pub use registry::{CommandInstance, CommandName, CommandRegistry, CommandSpec};
