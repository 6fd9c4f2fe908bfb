//! Configuration validation.
//!
//! Validates the channel topology at startup to catch configuration errors
//! before any player state exists.

use super::ChatConfig;
use crate::state::normalize_name;
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for the channel topology.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no channels configured")]
    NoChannels,
    #[error("no default channel configured")]
    NoDefaultChannel,
    #[error("channel name must not be empty")]
    EmptyChannelName,
    #[error("duplicate channel name: {0}")]
    DuplicateChannelName(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &ChatConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.channels.is_empty() {
        errors.push(ValidationError::NoChannels);
    } else if !config.channels.iter().any(|c| c.default) {
        errors.push(ValidationError::NoDefaultChannel);
    }

    // Names are unique after normalization: lookups are case-insensitive.
    let mut seen = HashSet::new();
    for def in &config.channels {
        if def.name.is_empty() {
            errors.push(ValidationError::EmptyChannelName);
            continue;
        }
        let normalized = normalize_name(&def.name);
        if !seen.insert(normalized.clone()) {
            errors.push(ValidationError::DuplicateChannelName(normalized));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
