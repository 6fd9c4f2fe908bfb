//! The membership engine - per-player channel state and its transitions.
//!
//! Every transition is permission-gated and check-then-act: nothing is
//! mutated until the operation is known to succeed.
//!
//! ## Locking
//!
//! Player states live in a `DashMap` behind per-player `RwLock`s; each
//! channel guards its own member set. Lock order is always player state
//! first, then channel member set, and member sets are only mutated while
//! the owning player's write lock is held. Any reader going through the
//! player lock therefore sees channel membership and the joined set move
//! together, and unrelated players never contend.

use crate::error::{ChannelAction, ChatError, ChatResult};
use crate::metrics;
use crate::session::Identity;
use crate::state::{Channel, ChannelRegistry, PlayerChannelState, PlayerId};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Maintains, per player, the joined-channel set and the active speaking
/// channel, and enforces join/leave/speak permission rules.
pub struct MembershipEngine {
    registry: Arc<ChannelRegistry>,
    identity: Arc<dyn Identity>,
    players: DashMap<PlayerId, Arc<RwLock<PlayerChannelState>>>,
}

impl MembershipEngine {
    pub fn new(registry: Arc<ChannelRegistry>, identity: Arc<dyn Identity>) -> Self {
        Self {
            registry,
            identity,
            players: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Check one capability on a channel without touching any state.
    pub fn can(&self, player: PlayerId, channel: &Channel, action: ChannelAction) -> bool {
        let required = match action {
            ChannelAction::Read => &channel.permissions.read,
            ChannelAction::Write => &channel.permissions.write,
            ChannelAction::Leave => &channel.permissions.leave,
        };
        required
            .as_ref()
            .is_none_or(|cap| self.identity.has_permission(player, cap))
    }

    fn authorize(
        &self,
        player: PlayerId,
        channel: &Channel,
        action: ChannelAction,
    ) -> ChatResult<()> {
        let required = match action {
            ChannelAction::Read => &channel.permissions.read,
            ChannelAction::Write => &channel.permissions.write,
            ChannelAction::Leave => &channel.permissions.leave,
        };
        match required {
            Some(cap) if !self.identity.has_permission(player, cap) => {
                metrics::record_permission_denied(action.as_label());
                Err(ChatError::PermissionDenied {
                    channel: channel.display_name.clone(),
                    capability: cap.clone(),
                    action,
                })
            }
            _ => Ok(()),
        }
    }

    fn resolve(&self, name: &str) -> ChatResult<Arc<Channel>> {
        self.registry
            .get(name)
            .ok_or_else(|| ChatError::NoSuchChannel { name: name.to_string() })
    }

    /// Fetch the player's state, initializing defaults on first contact.
    fn state_for(&self, player: PlayerId) -> Arc<RwLock<PlayerChannelState>> {
        if let Some(state) = self.players.get(&player) {
            return Arc::clone(&state);
        }
        let state = self
            .players
            .entry(player)
            .or_insert_with(|| Arc::new(RwLock::new(self.initial_state(player))));
        Arc::clone(&state)
    }

    /// First contact: auto-join every default channel, speak in the first.
    fn initial_state(&self, player: PlayerId) -> PlayerChannelState {
        let mut joined = HashSet::new();
        for channel in self.registry.defaults() {
            channel.add_member(player);
            metrics::set_channel_members(&channel.name, channel.member_count() as i64);
            joined.insert(channel.name.clone());
        }
        let speaking = self.registry.primary_default().name.clone();
        metrics::inc_tracked_players();
        info!(%player, speaking = %speaking, "Initialized player with default channels");
        PlayerChannelState::new(joined, speaking)
    }

    /// Put a player into their default channels if not yet tracked.
    ///
    /// Called from the host's player-join listener. Idempotent.
    pub fn ensure_initialized(&self, player: PlayerId) {
        self.state_for(player);
    }

    /// Join a channel, gated on its read capability.
    ///
    /// Joining also switches the player's speaking channel to the joined
    /// one, including when they were already a member.
    pub fn join(&self, player: PlayerId, name: &str) -> ChatResult<Arc<Channel>> {
        let channel = self.resolve(name)?;
        self.authorize(player, &channel, ChannelAction::Read)?;

        let state = self.state_for(player);
        {
            let mut st = state.write();
            channel.add_member(player);
            st.joined.insert(channel.name.clone());
            st.speaking = channel.name.clone();
        }

        metrics::record_join();
        metrics::set_channel_members(&channel.name, channel.member_count() as i64);
        info!(%player, channel = %channel.name, "Player joined channel");
        Ok(channel)
    }

    /// Leave a channel, gated on its leave capability.
    ///
    /// Fails with [`ChatError::NotMember`] when the player is not joined;
    /// nothing is mutated in that case. If the left channel was the
    /// speaking channel, the selection moves to the first remaining joined
    /// channel in registry order.
    pub fn leave(&self, player: PlayerId, name: &str) -> ChatResult<Arc<Channel>> {
        let channel = self.resolve(name)?;
        self.authorize(player, &channel, ChannelAction::Leave)?;

        let state = self.state_for(player);
        {
            let mut st = state.write();
            if !st.joined.contains(&channel.name) {
                return Err(ChatError::NotMember { channel: channel.display_name.clone() });
            }
            channel.remove_member(player);
            st.joined.remove(&channel.name);

            if st.speaking == channel.name {
                self.reassign_speaking(player, &mut st);
            }
        }

        metrics::record_leave();
        metrics::set_channel_members(&channel.name, channel.member_count() as i64);
        info!(%player, channel = %channel.name, "Player left channel");
        Ok(channel)
    }

    /// Pick a new speaking channel after the current one was left.
    ///
    /// Deterministic: first remaining joined channel in registry order. A
    /// player must always remain in at least one channel, so an empty
    /// joined set is repaired by re-adding the first default.
    fn reassign_speaking(&self, player: PlayerId, st: &mut PlayerChannelState) {
        if let Some(next) = self.registry.all().iter().find(|c| st.joined.contains(&c.name)) {
            st.speaking = next.name.clone();
            return;
        }

        let fallback = self.registry.primary_default();
        warn!(%player, channel = %fallback.name, "Player left their last channel, re-adding default");
        fallback.add_member(player);
        metrics::set_channel_members(&fallback.name, fallback.member_count() as i64);
        st.joined.insert(fallback.name.clone());
        st.speaking = fallback.name.clone();
    }

    /// Select the channel chat input goes to. Membership alone grants the
    /// selection; write permission is checked again at speak time.
    pub fn set_speaking_channel(&self, player: PlayerId, name: &str) -> ChatResult<Arc<Channel>> {
        let channel = self.resolve(name)?;

        let state = self.state_for(player);
        let mut st = state.write();
        if !st.joined.contains(&channel.name) {
            return Err(ChatError::NotMember { channel: channel.display_name.clone() });
        }
        st.speaking = channel.name.clone();
        Ok(channel)
    }

    /// Write-gate an utterance aimed at a specific channel, auto-joining a
    /// non-member first.
    ///
    /// Auto-join adds membership only; unlike an explicit [`join`] it does
    /// not switch the speaking channel. Returns the channel and whether an
    /// auto-join happened.
    ///
    /// [`join`]: Self::join
    pub fn speak(&self, player: PlayerId, name: &str) -> ChatResult<(Arc<Channel>, bool)> {
        let channel = self.resolve(name)?;
        self.authorize(player, &channel, ChannelAction::Write)?;

        let state = self.state_for(player);
        let joined_now = {
            let mut st = state.write();
            if st.joined.contains(&channel.name) {
                false
            } else {
                channel.add_member(player);
                st.joined.insert(channel.name.clone());
                true
            }
        };

        if joined_now {
            metrics::record_join();
            metrics::set_channel_members(&channel.name, channel.member_count() as i64);
            info!(%player, channel = %channel.name, "Player auto-joined channel on speak");
        }
        Ok((channel, joined_now))
    }

    /// The channel the player's chat input currently goes to.
    pub fn speaking_channel(&self, player: PlayerId) -> Arc<Channel> {
        let state = self.state_for(player);
        let speaking = state.read().speaking.clone();
        match self.registry.get(&speaking) {
            Some(channel) => channel,
            None => {
                // speaking always names a configured channel; this only
                // trips if state was tampered with from outside.
                warn!(%player, speaking = %speaking, "Speaking channel missing from registry");
                self.registry.primary_default()
            }
        }
    }

    /// Channels the player belongs to, in registry order.
    pub fn member_channels(&self, player: PlayerId) -> Vec<Arc<Channel>> {
        let state = self.state_for(player);
        let st = state.read();
        self.registry
            .all()
            .iter()
            .filter(|c| st.joined.contains(&c.name))
            .cloned()
            .collect()
    }

    /// Channels the player can see, in registry order.
    pub fn visible_channels(&self, player: PlayerId) -> Vec<Arc<Channel>> {
        self.registry
            .all()
            .iter()
            .filter(|c| self.can(player, c, ChannelAction::Read))
            .cloned()
            .collect()
    }

    /// Visible channels the player has not joined, in registry order.
    pub fn non_member_channels(&self, player: PlayerId) -> Vec<Arc<Channel>> {
        let state = self.state_for(player);
        let st = state.read();
        self.registry
            .all()
            .iter()
            .filter(|c| !st.joined.contains(&c.name))
            .filter(|c| self.can(player, c, ChannelAction::Read))
            .cloned()
            .collect()
    }

    /// Drop a player's state on disconnect, removing them from every
    /// member set.
    pub fn remove_player(&self, player: PlayerId) {
        let Some((_, state)) = self.players.remove(&player) else {
            return;
        };
        // Write lock serializes against any in-flight operation still
        // holding the state handle.
        let st = state.write();
        for name in &st.joined {
            if let Some(channel) = self.registry.get(name) {
                channel.remove_member(player);
                metrics::set_channel_members(&channel.name, channel.member_count() as i64);
            }
        }
        metrics::dec_tracked_players();
        info!(%player, channels = st.joined.len(), "Removed player state");
    }
}
