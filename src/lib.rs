//! gamechat - channel-based chat engine for multiplayer game servers.
//!
//! Named channels with membership and read/write/leave permissions, a
//! per-player speaking-channel selection, and message dispatch to channel
//! members. The host game server supplies sessions, permission checks, and
//! outbound delivery through the traits in [`session`]; the core keeps all
//! channel state in memory, rebuilt from configuration at startup.

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod service;
pub mod session;
pub mod state;
pub mod telemetry;

pub use commands::{ChannelCommand, ChatCommands};
pub use config::{ChannelDefinition, ChatConfig, ConfigError, ValidationError};
pub use dispatch::{ChatDispatcher, DispatchOutcome};
pub use error::{ChannelAction, ChatError, ChatResult};
pub use service::ChatService;
pub use session::{Identity, MessageSink};
pub use state::{Channel, ChannelRegistry, MembershipEngine, PlayerId};
