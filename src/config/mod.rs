// src/config/mod.rs

//! Configuration loading and validation.
//!
//! The TOML surface has three sections:
//! - `[default]` — fallbacks for watch patterns and timings.
//! - `[command.<name>]` — invocable commands (the registry's defined set).
//! - `[watch.<name>]` — watch targets, each resolved to an immutable
//!   [`TargetDefinition`](model::TargetDefinition).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    CommandConfig, ConfigFile, DefaultSection, TargetDefinition, WatchTargetConfig,
};
pub use validate::validate_config;
