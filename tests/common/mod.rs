//! Integration test common infrastructure.
//!
//! Scripted stand-ins for the host's session layer and messaging sink, plus
//! the channel topology shared by the flow tests.

// Not every test binary uses every fixture helper.
#![allow(dead_code)]

use gamechat::{ChatConfig, Identity, MessageSink, PlayerId};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Identity provider with scripted names and grantable capabilities.
#[derive(Default)]
pub struct TestIdentity {
    names: Mutex<HashMap<PlayerId, String>>,
    granted: Mutex<HashSet<(PlayerId, String)>>,
}

impl TestIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player under a display name.
    pub fn player(&self, name: &str) -> PlayerId {
        let id = PlayerId::random();
        self.names.lock().insert(id, name.to_string());
        id
    }

    pub fn grant(&self, player: PlayerId, capability: &str) {
        self.granted.lock().insert((player, capability.to_string()));
    }

    pub fn revoke_all(&self, player: PlayerId) {
        self.granted.lock().retain(|(p, _)| *p != player);
    }
}

impl Identity for TestIdentity {
    fn has_permission(&self, player: PlayerId, capability: &str) -> bool {
        self.granted.lock().contains(&(player, capability.to_string()))
    }

    fn display_name(&self, player: PlayerId) -> String {
        self.names
            .lock()
            .get(&player)
            .cloned()
            .unwrap_or_else(|| player.to_string())
    }
}

/// Sink that records every delivery and can be told to fail for a player.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<(PlayerId, String)>>,
    unreachable: Mutex<HashSet<PlayerId>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_unreachable(&self, player: PlayerId) {
        self.unreachable.lock().insert(player);
    }

    /// Messages delivered to a player, in order.
    pub fn messages_for(&self, player: PlayerId) -> Vec<String> {
        self.delivered
            .lock()
            .iter()
            .filter(|(p, _)| *p == player)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn delivery_count(&self) -> usize {
        self.delivered.lock().len()
    }
}

impl MessageSink for RecordingSink {
    fn deliver(&self, player: PlayerId, text: &str) -> bool {
        if self.unreachable.lock().contains(&player) {
            return false;
        }
        self.delivered.lock().push((player, text.to_string()));
        true
    }
}

/// Topology used by the flow tests: two open defaults plus a gated channel.
pub fn test_config() -> ChatConfig {
    toml::from_str(
        r#"
[[channel]]
name = "global"
display_name = "Global"
default = true

[[channel]]
name = "trade"
display_name = "Trade"
default = true

[[channel]]
name = "staff"
display_name = "Staff"
read_permission = "chat.staff"
write_permission = "chat.staff"
"#,
    )
    .expect("test config must parse")
}
