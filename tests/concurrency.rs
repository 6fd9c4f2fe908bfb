//! Concurrent membership stress: the bidirectional invariant must hold
//! under many players joining and leaving at once, and a single player's
//! state must survive racing operations against itself.

mod common;

use common::{RecordingSink, TestIdentity, test_config};
use gamechat::{ChatService, PlayerId};
use std::sync::Arc;
use std::thread;

fn service() -> (Arc<ChatService>, Arc<TestIdentity>) {
    let identity = Arc::new(TestIdentity::new());
    let sink: Arc<RecordingSink> = Arc::new(RecordingSink::new());
    let service = Arc::new(
        ChatService::new(
            &test_config(),
            Arc::clone(&identity) as Arc<dyn gamechat::Identity>,
            sink as Arc<dyn gamechat::MessageSink>,
        )
        .expect("valid topology"),
    );
    (service, identity)
}

/// Membership must agree in both directions for every player and channel.
fn assert_membership_consistent(service: &ChatService, players: &[PlayerId]) {
    for player in players {
        let joined: Vec<String> = service
            .engine()
            .member_channels(*player)
            .iter()
            .map(|c| c.name.clone())
            .collect();
        for channel in service.registry().all() {
            assert_eq!(
                channel.is_member(*player),
                joined.contains(&channel.name),
                "membership diverged for player {player} in channel {}",
                channel.name
            );
        }
        if !joined.is_empty() {
            let speaking = service.engine().speaking_channel(*player).name.clone();
            assert!(joined.contains(&speaking), "speaking channel {speaking} not joined");
        }
    }
}

#[test]
fn test_many_players_join_and_leave_concurrently() {
    let (service, identity) = service();

    let players: Vec<PlayerId> = (0..16).map(|i| identity.player(&format!("p{i}"))).collect();

    let handles: Vec<_> = players
        .iter()
        .map(|&player| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let engine = service.engine();
                for _ in 0..50 {
                    engine.ensure_initialized(player);
                    engine.join(player, "trade").unwrap();
                    engine.leave(player, "global").unwrap_or_else(|_| {
                        // Already left in a previous round.
                        engine.join(player, "global").unwrap()
                    });
                    engine.set_speaking_channel(player, "trade").unwrap();
                    engine.leave(player, "trade").unwrap();
                    engine.join(player, "global").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_membership_consistent(&service, &players);
}

#[test]
fn test_same_player_racing_against_itself_stays_consistent() {
    let (service, identity) = service();
    let player = identity.player("racer");
    service.engine().ensure_initialized(player);

    // Two threads fight over joins/leaves of the same two channels.
    let spawn = |target: &'static str, other: &'static str| {
        let service = Arc::clone(&service);
        thread::spawn(move || {
            let engine = service.engine();
            for _ in 0..200 {
                engine.join(player, target).unwrap();
                let _ = engine.leave(player, other);
            }
        })
    };
    let a = spawn("global", "trade");
    let b = spawn("trade", "global");
    a.join().unwrap();
    b.join().unwrap();

    // Whatever interleaving happened, the state is internally consistent:
    // joined matches member sets and speaking is one of the joined
    // channels.
    assert_membership_consistent(&service, &[player]);
    let joined = service.engine().member_channels(player);
    assert!(!joined.is_empty(), "player must remain in at least one channel");
}

#[test]
fn test_concurrent_first_contact_initializes_once() {
    let (service, identity) = service();
    let player = identity.player("newcomer");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service.engine().ensure_initialized(player);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Exactly one membership per default channel, not eight.
    for channel in service.registry().all().iter().filter(|c| c.is_default) {
        assert_eq!(
            channel.member_ids().iter().filter(|id| **id == player).count(),
            1
        );
    }
    assert_membership_consistent(&service, &[player]);
}
