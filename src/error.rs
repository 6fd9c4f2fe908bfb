//! Unified error handling for gamechat.
//!
//! Runtime errors are recoverable per call: they are caught at the dispatch
//! or command boundary, converted to a user-facing message, and never affect
//! another player's state. Configuration errors are fatal at startup and
//! live in [`crate::config`].

use thiserror::Error;

/// The capability being exercised when a permission check runs.
///
/// Read (join), write (speak) and leave are three independently gated
/// capabilities on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelAction {
    /// Joining or seeing the channel.
    Read,
    /// Speaking in the channel.
    Write,
    /// Leaving the channel.
    Leave,
}

impl ChannelAction {
    /// Verb used in user-facing permission errors.
    fn verb(self) -> &'static str {
        match self {
            Self::Read => "join",
            Self::Write => "talk in",
            Self::Leave => "leave",
        }
    }

    /// Static label for metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Leave => "leave",
        }
    }
}

/// Errors that can occur during a chat operation.
///
/// No operation partially mutates state before failing: permission and
/// membership checks happen before any set is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("missing capability {capability} for channel {channel}")]
    PermissionDenied {
        /// Display name of the channel the check ran against.
        channel: String,
        /// The capability string the player lacks.
        capability: String,
        action: ChannelAction,
    },

    #[error("not a member of channel {channel}")]
    NotMember { channel: String },

    #[error("no such channel: {name}")]
    NoSuchChannel { name: String },
}

impl ChatError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PermissionDenied { .. } => "permission_denied",
            Self::NotMember { .. } => "not_member",
            Self::NoSuchChannel { .. } => "no_such_channel",
        }
    }

    /// Convert to the message shown to the acting player.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied { channel, action, .. } => {
                format!(
                    "You do not have permission to {} the {} channel.",
                    action.verb(),
                    channel
                )
            }
            Self::NotMember { .. } => "You are not in that channel.".to_string(),
            Self::NoSuchChannel { name } => format!("There is no channel named {name}."),
        }
    }
}

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;
