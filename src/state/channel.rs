//! Channel entity and per-channel member set.

use crate::config::ChannelDefinition;
use crate::state::{PlayerId, normalize_name};
use parking_lot::RwLock;
use std::collections::HashSet;

/// Capability strings gating a channel.
///
/// Each capability is checked independently; `None` means that action is
/// open to everyone.
#[derive(Debug, Clone, Default)]
pub struct ChannelPermissions {
    pub read: Option<String>,
    pub write: Option<String>,
    pub leave: Option<String>,
}

/// A configured chat channel.
///
/// Identity fields are immutable after startup; only the member set
/// changes. The member set is mutated exclusively by the membership engine,
/// while it holds the owning player's state lock, which is what keeps
/// channel membership and player state from diverging.
#[derive(Debug)]
pub struct Channel {
    /// Normalized stable identifier.
    pub name: String,
    /// Presentation label, passed through to the host's text layer.
    pub display_name: String,
    pub permissions: ChannelPermissions,
    /// Default channels are auto-joined on first contact.
    pub is_default: bool,
    /// Unix timestamp of registry construction.
    pub created: i64,
    members: RwLock<HashSet<PlayerId>>,
}

impl Channel {
    /// Build a channel from its configuration entry.
    pub fn from_definition(def: &ChannelDefinition) -> Self {
        Self {
            name: normalize_name(&def.name),
            display_name: def.display_name().to_string(),
            permissions: ChannelPermissions {
                read: def.read_permission.clone(),
                write: def.write_permission.clone(),
                leave: def.leave_permission.clone(),
            },
            is_default: def.default,
            created: chrono::Utc::now().timestamp(),
            members: RwLock::new(HashSet::new()),
        }
    }

    /// Add a member. Returns false if the player was already a member.
    pub(crate) fn add_member(&self, player: PlayerId) -> bool {
        self.members.write().insert(player)
    }

    /// Remove a member. Returns false if the player was not a member.
    pub(crate) fn remove_member(&self, player: PlayerId) -> bool {
        self.members.write().remove(&player)
    }

    /// Check if a player is a member.
    pub fn is_member(&self, player: PlayerId) -> bool {
        self.members.read().contains(&player)
    }

    /// Snapshot the member list for broadcasting.
    ///
    /// The lock is released before the snapshot is used, so deliveries never
    /// run under it.
    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.members.read().iter().copied().collect()
    }

    pub fn member_count(&self) -> usize {
        self.members.read().len()
    }
}
