//! Service wiring - one-stop construction of the chat core at startup.

use crate::commands::ChatCommands;
use crate::config::{ChatConfig, ConfigError};
use crate::dispatch::ChatDispatcher;
use crate::session::{Identity, MessageSink};
use crate::state::{ChannelRegistry, MembershipEngine};
use std::sync::Arc;
use tracing::info;

/// The chat service: owns registry, engine, dispatcher, and command glue.
///
/// Constructed once at startup with the host's collaborators injected;
/// handles are passed by `Arc` to whatever listeners the host wires up. No
/// process-wide globals.
pub struct ChatService {
    registry: Arc<ChannelRegistry>,
    engine: Arc<MembershipEngine>,
    dispatcher: Arc<ChatDispatcher>,
    commands: Arc<ChatCommands>,
}

impl ChatService {
    /// Build the whole core from configuration.
    ///
    /// Fails when the channel topology is invalid; the service must not run
    /// without a default channel or with duplicate names.
    pub fn new(
        config: &ChatConfig,
        identity: Arc<dyn Identity>,
        sink: Arc<dyn MessageSink>,
    ) -> Result<Self, ConfigError> {
        let registry = ChannelRegistry::new(config).map_err(|errors| {
            let reasons =
                errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
            ConfigError::Invalid(reasons)
        })?;
        let registry = Arc::new(registry);

        let engine =
            Arc::new(MembershipEngine::new(Arc::clone(&registry), Arc::clone(&identity)));
        let dispatcher =
            Arc::new(ChatDispatcher::new(Arc::clone(&engine), identity, sink));
        let commands =
            Arc::new(ChatCommands::new(Arc::clone(&engine), Arc::clone(&dispatcher)));

        info!(channels = registry.all().len(), "Chat service ready");

        Ok(Self { registry, engine, dispatcher, commands })
    }

    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    pub fn engine(&self) -> &Arc<MembershipEngine> {
        &self.engine
    }

    pub fn dispatcher(&self) -> &Arc<ChatDispatcher> {
        &self.dispatcher
    }

    pub fn commands(&self) -> &Arc<ChatCommands> {
        &self.commands
    }
}
