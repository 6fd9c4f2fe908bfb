//! Player identity and per-player channel state.

use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Stable unique player identifier, supplied by the host's session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Generate a fresh random identifier. Hosts normally wrap their own
    /// session UUIDs via `From<Uuid>` instead.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for PlayerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A player's channel membership and speaking selection.
///
/// One per player, created on first contact and removed on disconnect.
/// Invariant: `speaking` is always an element of `joined`.
#[derive(Debug)]
pub struct PlayerChannelState {
    /// Normalized names of the channels the player belongs to.
    pub joined: HashSet<String>,
    /// Normalized name of the single channel chat input goes to.
    pub speaking: String,
}

impl PlayerChannelState {
    pub fn new(joined: HashSet<String>, speaking: String) -> Self {
        Self { joined, speaking }
    }
}
