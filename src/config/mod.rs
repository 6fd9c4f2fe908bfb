//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (ChatConfig, ChannelDefinition)
//! - [`validation`]: Startup validation of the channel topology
//!
//! The channel set is loaded once at startup and is effectively immutable
//! afterwards; an invalid topology is fatal (the engine must not run with
//! no default channel or with duplicate names).

mod types;
mod validation;

pub use types::{ChannelDefinition, ChatConfig, ConfigError};
pub use validation::{ValidationError, validate};
