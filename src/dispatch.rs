//! Chat dispatch - the single entry point for an utterance.
//!
//! The dispatcher resolves where a message goes, gates it on write
//! permission, formats it, and fans it out to the channel's members through
//! the host's [`MessageSink`]. The host's chat listener is expected to
//! suppress its default platform broadcast for every dispatched event and
//! act on the returned [`DispatchOutcome`] instead.

use crate::error::{ChannelAction, ChatError};
use crate::metrics;
use crate::session::{Identity, MessageSink};
use crate::state::{Channel, MembershipEngine, PlayerId};
use crate::telemetry::CommandTimer;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of dispatching one utterance.
///
/// In both arms the platform's own broadcast is cancelled; on `Rejected`
/// the glue layer shows `message` to the sender and nobody else.
#[derive(Debug)]
pub enum DispatchOutcome {
    Delivered {
        channel: Arc<Channel>,
        /// Members the sink accepted the message for.
        recipients: usize,
    },
    Rejected {
        /// Display name of the channel the utterance was aimed at.
        channel: String,
        /// User-visible error for the sender only.
        message: String,
    },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Formats and routes incoming chat to the correct channel's members.
pub struct ChatDispatcher {
    engine: Arc<MembershipEngine>,
    identity: Arc<dyn Identity>,
    sink: Arc<dyn MessageSink>,
}

impl ChatDispatcher {
    pub fn new(
        engine: Arc<MembershipEngine>,
        identity: Arc<dyn Identity>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self { engine, identity, sink }
    }

    /// Route an utterance to the player's current speaking channel.
    pub fn dispatch(&self, player: PlayerId, text: &str) -> DispatchOutcome {
        let _timer = CommandTimer::new("chat");

        let channel = self.engine.speaking_channel(player);
        if let Some(capability) = channel.permissions.write.as_deref()
            && !self.identity.has_permission(player, capability)
        {
            let err = ChatError::PermissionDenied {
                channel: channel.display_name.clone(),
                capability: capability.to_string(),
                action: ChannelAction::Write,
            };
            metrics::record_permission_denied(ChannelAction::Write.as_label());
            metrics::record_command_error("chat", err.error_code());
            return DispatchOutcome::Rejected {
                channel: channel.display_name.clone(),
                message: err.user_message(),
            };
        }
        self.broadcast(&channel, player, text)
    }

    /// Route an utterance to an explicitly named channel.
    ///
    /// Same permission and auto-join rules as [`MembershipEngine::speak`]:
    /// a non-member with write capability is joined first and told so.
    pub fn dispatch_to_channel(
        &self,
        player: PlayerId,
        name: &str,
        text: &str,
    ) -> DispatchOutcome {
        let _timer = CommandTimer::new("speak");

        let (channel, joined_now) = match self.engine.speak(player, name) {
            Ok(result) => result,
            Err(err) => {
                metrics::record_command_error("speak", err.error_code());
                return DispatchOutcome::Rejected {
                    channel: name.to_string(),
                    message: err.user_message(),
                };
            }
        };

        if joined_now {
            let _ = self
                .sink
                .deliver(player, &format!("You have joined {}.", channel.display_name));
        }
        self.broadcast(&channel, player, text)
    }

    /// Deliver the formatted message to every member of the channel,
    /// sender included. One unreachable member never aborts the rest.
    fn broadcast(&self, channel: &Arc<Channel>, sender: PlayerId, text: &str) -> DispatchOutcome {
        let formatted = format_channel_message(channel, &self.identity.display_name(sender), text);

        let members = channel.member_ids();
        let mut recipients = 0;
        for member in &members {
            if self.sink.deliver(*member, &formatted) {
                recipients += 1;
            } else {
                metrics::record_delivery_failure();
                warn!(player = %member, channel = %channel.name, "Message delivery failed");
            }
        }

        metrics::record_dispatch(members.len());
        debug!(channel = %channel.name, recipients, "Dispatched chat message");
        DispatchOutcome::Delivered { channel: Arc::clone(channel), recipients }
    }
}

/// Format an utterance for channel members, tagging the sender.
pub fn format_channel_message(channel: &Channel, sender: &str, text: &str) -> String {
    format!("[{}] {}: {}", channel.display_name, sender, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tags_channel_and_sender() {
        let channel = Channel::from_definition(&crate::config::ChannelDefinition {
            name: "global".into(),
            display_name: Some("Global".into()),
            read_permission: None,
            write_permission: None,
            leave_permission: None,
            default: true,
        });
        assert_eq!(
            format_channel_message(&channel, "Steve", "hello"),
            "[Global] Steve: hello"
        );
    }
}
