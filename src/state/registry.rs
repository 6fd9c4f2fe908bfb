//! The channel registry - authoritative store of configured channels.

use crate::config::{ChatConfig, ValidationError, validate};
use crate::state::{Channel, normalize_name};
use std::collections::HashMap;
use std::sync::Arc;

/// Owns every configured [`Channel`], indexed by normalized name.
///
/// The channel set is fixed at construction; there is no hot-reload of the
/// channel topology. Iteration order is configuration order, which is what
/// makes default-channel selection and leave tie-breaks deterministic.
#[derive(Debug)]
pub struct ChannelRegistry {
    /// All channels, in configuration order.
    channels: Vec<Arc<Channel>>,
    /// Normalized name -> channel.
    by_name: HashMap<String, Arc<Channel>>,
    /// First default channel; new players start speaking here.
    primary_default: Arc<Channel>,
}

impl ChannelRegistry {
    /// Build the registry from configuration, validating the topology.
    ///
    /// Fails fast with every problem found; the engine must not run with an
    /// invalid channel set (no default channel, duplicate names).
    pub fn new(config: &ChatConfig) -> Result<Self, Vec<ValidationError>> {
        validate(config)?;

        let channels: Vec<Arc<Channel>> = config
            .channels
            .iter()
            .map(|def| Arc::new(Channel::from_definition(def)))
            .collect();

        let by_name = channels
            .iter()
            .map(|c| (c.name.clone(), Arc::clone(c)))
            .collect();

        // Guaranteed by validation; re-checked here so construction can
        // never hand out a registry without a fallback channel.
        let Some(primary_default) = channels.iter().find(|c| c.is_default).cloned() else {
            return Err(vec![ValidationError::NoDefaultChannel]);
        };

        tracing::info!(count = channels.len(), "Loaded channel registry");

        Ok(Self { channels, by_name, primary_default })
    }

    /// Look up a channel by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<Arc<Channel>> {
        self.by_name.get(&normalize_name(name)).cloned()
    }

    /// Channels flagged default, in configuration order.
    ///
    /// Non-empty in any valid configuration; used to initialize a new
    /// player's membership.
    pub fn defaults(&self) -> Vec<Arc<Channel>> {
        self.channels.iter().filter(|c| c.is_default).cloned().collect()
    }

    /// All channels in configuration order.
    pub fn all(&self) -> &[Arc<Channel>] {
        &self.channels
    }

    /// The first default channel.
    pub fn primary_default(&self) -> Arc<Channel> {
        Arc::clone(&self.primary_default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ChannelRegistry {
        let config: ChatConfig = toml::from_str(
            r#"
[[channel]]
name = "Global"
default = true

[[channel]]
name = "trade"
default = true

[[channel]]
name = "staff"
read_permission = "chat.staff"
"#,
        )
        .unwrap();
        ChannelRegistry::new(&config).unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = registry();
        assert!(registry.get("global").is_some());
        assert!(registry.get("GLOBAL").is_some());
        assert!(registry.get("nether").is_none());
    }

    #[test]
    fn test_defaults_keep_configuration_order() {
        let registry = registry();
        let defaults: Vec<String> =
            registry.defaults().iter().map(|c| c.name.clone()).collect();
        assert_eq!(defaults, vec!["global", "trade"]);
    }

    #[test]
    fn test_invalid_topology_is_rejected() {
        let config: ChatConfig = toml::from_str(
            r#"
[[channel]]
name = "global"
"#,
        )
        .unwrap();
        let errors = ChannelRegistry::new(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::NoDefaultChannel)));
    }
}
