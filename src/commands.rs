//! Command-surface glue for the `channel` command tree.
//!
//! Thin layer between the host's command registration and the core: each
//! subcommand maps 1:1 onto a [`MembershipEngine`] or [`ChatDispatcher`]
//! call. Replies are returned as user-visible lines for the host to render;
//! running inside a long-lived process, there are no process exit codes.

use crate::dispatch::{ChatDispatcher, DispatchOutcome};
use crate::state::{Channel, MembershipEngine, PlayerId};
use crate::telemetry::CommandTimer;
use std::sync::Arc;

/// A parsed `channel` subcommand.
#[derive(Debug, PartialEq, Eq)]
pub enum ChannelCommand<'a> {
    /// Bare `channel`: list speaking/joined/available channels.
    List,
    Join(&'a str),
    Leave(&'a str),
    Speak { channel: &'a str, message: &'a str },
}

/// Parse the argument string following the `channel` command word.
///
/// Returns a usage line when the input does not form a valid subcommand.
pub fn parse(input: &str) -> Result<ChannelCommand<'_>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(ChannelCommand::List);
    }

    let (word, rest) = match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    };

    match word {
        "join" if !rest.is_empty() => Ok(ChannelCommand::Join(rest)),
        "join" => Err("Usage: channel join <channel>".to_string()),
        "leave" if !rest.is_empty() => Ok(ChannelCommand::Leave(rest)),
        "leave" => Err("Usage: channel leave <channel>".to_string()),
        "speak" => match rest.split_once(char::is_whitespace) {
            Some((channel, message)) if !message.trim().is_empty() => {
                Ok(ChannelCommand::Speak { channel, message: message.trim_start() })
            }
            _ => Err("Usage: channel speak <channel> <message>".to_string()),
        },
        other => Err(format!("Unknown channel subcommand: {other}")),
    }
}

/// Executes `channel` subcommands against the core.
pub struct ChatCommands {
    engine: Arc<MembershipEngine>,
    dispatcher: Arc<ChatDispatcher>,
}

impl ChatCommands {
    pub fn new(engine: Arc<MembershipEngine>, dispatcher: Arc<ChatDispatcher>) -> Self {
        Self { engine, dispatcher }
    }

    /// Parse and execute, returning the reply lines for the sender.
    pub fn handle(&self, player: PlayerId, input: &str) -> Vec<String> {
        match parse(input) {
            Ok(command) => self.execute(player, command),
            Err(usage) => vec![usage],
        }
    }

    /// Execute a parsed subcommand.
    pub fn execute(&self, player: PlayerId, command: ChannelCommand<'_>) -> Vec<String> {
        match command {
            ChannelCommand::List => self.list(player),
            ChannelCommand::Join(name) => {
                let _timer = CommandTimer::new("join");
                match self.engine.join(player, name) {
                    Ok(channel) => {
                        vec![format!("You are now chatting in {}.", channel.display_name)]
                    }
                    Err(err) => vec![err.user_message()],
                }
            }
            ChannelCommand::Leave(name) => {
                let _timer = CommandTimer::new("leave");
                match self.engine.leave(player, name) {
                    Ok(channel) => vec![format!("You have left {}.", channel.display_name)],
                    Err(err) => vec![err.user_message()],
                }
            }
            ChannelCommand::Speak { channel, message } => {
                match self.dispatcher.dispatch_to_channel(player, channel, message) {
                    DispatchOutcome::Delivered { .. } => Vec::new(),
                    DispatchOutcome::Rejected { message, .. } => vec![message],
                }
            }
        }
    }

    /// The bare `channel` listing: speaking, joined, and available channels.
    fn list(&self, player: PlayerId) -> Vec<String> {
        let speaking = self.engine.speaking_channel(player);
        vec![
            format!("Currently speaking in: {}", speaking.display_name),
            format!(
                "Joined channels: {}",
                display_names(&self.engine.member_channels(player))
            ),
            format!(
                "Available channels: {}",
                display_names(&self.engine.non_member_channels(player))
            ),
        ]
    }
}

fn display_names(channels: &[Arc<Channel>]) -> String {
    channels
        .iter()
        .map(|c| c.display_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
