//! Collaborator interfaces supplied by the host game server.
//!
//! The core never talks to the platform directly: the session layer answers
//! capability checks and the messaging sink performs the actual sends.

use crate::state::PlayerId;

/// Session/identity provider.
///
/// Implemented over the host's live session registry. Both calls must be
/// cheap and non-blocking; they run inside the engine's locked sections.
pub trait Identity: Send + Sync {
    /// Capability-check predicate for permission-gated transitions.
    fn has_permission(&self, player: PlayerId, capability: &str) -> bool;

    /// Presentation name used to tag the sender in formatted messages.
    fn display_name(&self, player: PlayerId) -> String;
}

/// Outbound message delivery.
///
/// Called once per channel member per dispatched message. Returns false
/// when this one recipient could not be reached (e.g. went offline); the
/// dispatcher logs it and continues with the remaining members.
pub trait MessageSink: Send + Sync {
    fn deliver(&self, player: PlayerId, text: &str) -> bool;
}
