//! Session actor tests: routing, fan-out, and the turn timer.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use clue_less::{
    ClientCommand, ServerEvent,
    entities::{GameStateView, Username},
    session::{ConnectionId, SessionConfig, SessionManager, SessionMessage},
};

struct Client {
    username: Username,
    connection: ConnectionId,
    events: mpsc::Receiver<ServerEvent>,
}

impl Client {
    async fn recv(&mut self) -> ServerEvent {
        timeout(Duration::from_secs(1), self.events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    /// Receive until an event matches, panicking if the channel drains.
    async fn recv_until<F: Fn(&ServerEvent) -> bool>(&mut self, want: F) -> ServerEvent {
        loop {
            let event = self.recv().await;
            if want(&event) {
                return event;
            }
        }
    }

    fn try_recv(&mut self) -> Option<ServerEvent> {
        self.events.try_recv().ok()
    }
}

async fn connect(
    manager: &SessionManager,
    game_id: i64,
    name: &str,
) -> Client {
    let handle = manager.get_or_create(game_id).await;
    let (sender, events) = mpsc::channel(64);
    let connection = ConnectionId::new();
    let (response, ack) = oneshot::channel();
    handle
        .send(SessionMessage::Connect {
            username: Username::new(name),
            connection,
            sender,
            response,
        })
        .await
        .unwrap();
    ack.await.unwrap().unwrap();
    Client {
        username: Username::new(name),
        connection,
        events,
    }
}

/// Waits for the actor to finish everything sent before this call.
async fn barrier(manager: &SessionManager, game_id: i64) -> GameStateView {
    let handle = manager.get_or_create(game_id).await;
    let (response, ack) = oneshot::channel();
    handle
        .send(SessionMessage::Snapshot { response })
        .await
        .unwrap();
    ack.await.unwrap().unwrap()
}

#[tokio::test]
async fn joins_are_broadcast_to_everyone() {
    let manager = SessionManager::new(SessionConfig {
        turn_timeout: None,
        ..SessionConfig::default()
    });
    let mut alice = connect(&manager, 1, "alice").await;

    match alice.recv().await {
        ServerEvent::PlayerJoined { username, .. } => assert_eq!(username, alice.username),
        other => panic!("expected player_joined, got {other:?}"),
    }
    assert!(matches!(alice.recv().await, ServerEvent::GameUpdate { .. }));

    let mut bob = connect(&manager, 1, "bob").await;
    // Both connections see bob arrive.
    let event = alice
        .recv_until(|e| matches!(e, ServerEvent::PlayerJoined { .. }))
        .await;
    match event {
        ServerEvent::PlayerJoined { username, .. } => assert_eq!(username, bob.username),
        other => panic!("expected player_joined, got {other:?}"),
    }
    assert!(matches!(
        bob.recv().await,
        ServerEvent::PlayerJoined { .. }
    ));
}

#[tokio::test]
async fn commands_fan_out_and_errors_stay_private() {
    let manager = SessionManager::new(SessionConfig {
        turn_timeout: None,
        ..SessionConfig::default()
    });
    let handle = manager.get_or_create(1).await;
    let mut alice = connect(&manager, 1, "alice").await;
    let mut bob = connect(&manager, 1, "bob").await;

    handle
        .send(SessionMessage::Command {
            username: alice.username.clone(),
            command: ClientCommand::StartGame,
        })
        .await
        .unwrap();
    alice
        .recv_until(|e| matches!(e, ServerEvent::GameStarted))
        .await;
    bob.recv_until(|e| matches!(e, ServerEvent::GameStarted))
        .await;

    // A second start is rejected; only the offender hears about it.
    handle
        .send(SessionMessage::Command {
            username: bob.username.clone(),
            command: ClientCommand::StartGame,
        })
        .await
        .unwrap();
    let state = barrier(&manager, 1).await;
    assert!(state.begun);

    let event = bob
        .recv_until(|e| matches!(e, ServerEvent::Error { .. }))
        .await;
    match event {
        ServerEvent::Error { message } => assert!(!message.is_empty()),
        other => panic!("expected error, got {other:?}"),
    }
    // Drain alice: everything left over predates the rejected command.
    while let Some(event) = alice.try_recv() {
        assert!(
            !matches!(event, ServerEvent::Error { .. }),
            "error frame leaked to a bystander"
        );
    }
}

#[tokio::test]
async fn stale_disconnect_does_not_mark_a_rejoined_player_out() {
    let manager = SessionManager::new(SessionConfig {
        turn_timeout: None,
        ..SessionConfig::default()
    });
    let handle = manager.get_or_create(1).await;
    let alice = connect(&manager, 1, "alice").await;
    let old_connection = alice.connection;
    drop(alice);

    // Reconnect, then deliver the stale socket's disconnect.
    let mut alice = connect(&manager, 1, "alice").await;
    handle
        .send(SessionMessage::Disconnect {
            username: alice.username.clone(),
            connection: old_connection,
        })
        .await
        .unwrap();

    let state = barrier(&manager, 1).await;
    let me = state
        .players
        .iter()
        .find(|p| p.username == alice.username)
        .unwrap();
    assert!(me.is_active, "stale disconnect deactivated the player");
    while let Some(event) = alice.try_recv() {
        assert!(!matches!(event, ServerEvent::PlayerOut { .. }));
    }
}

#[tokio::test]
async fn expired_turns_are_force_passed() {
    let manager = SessionManager::new(SessionConfig {
        turn_timeout: Some(Duration::from_millis(50)),
        ..SessionConfig::default()
    });
    let handle = manager.get_or_create(1).await;
    let mut alice = connect(&manager, 1, "alice").await;
    let _bob = connect(&manager, 1, "bob").await;

    handle
        .send(SessionMessage::Command {
            username: alice.username.clone(),
            command: ClientCommand::StartGame,
        })
        .await
        .unwrap();
    let before = barrier(&manager, 1).await;
    let first = before
        .players
        .iter()
        .find(|p| p.turn)
        .unwrap()
        .username
        .clone();

    alice
        .recv_until(
            |e| matches!(e, ServerEvent::Popup { message } if message.contains("ran out of time")),
        )
        .await;
    let after = barrier(&manager, 1).await;
    let holder = after
        .players
        .iter()
        .find(|p| p.turn)
        .unwrap()
        .username
        .clone();
    assert_ne!(holder, first, "turn did not pass after the timeout");
}

#[tokio::test]
async fn reset_returns_the_game_to_an_empty_lobby() {
    let manager = SessionManager::new(SessionConfig {
        turn_timeout: None,
        ..SessionConfig::default()
    });
    let handle = manager.get_or_create(1).await;
    let _alice = connect(&manager, 1, "alice").await;
    let _bob = connect(&manager, 1, "bob").await;

    let (response, ack) = oneshot::channel();
    handle
        .send(SessionMessage::Reset { response })
        .await
        .unwrap();
    ack.await.unwrap().unwrap();

    let state = barrier(&manager, 1).await;
    assert!(state.players.is_empty());
    assert!(!state.begun);
}

#[tokio::test]
async fn manager_reuses_and_closes_sessions() {
    let manager = SessionManager::new(SessionConfig::default());
    let first = manager.get_or_create(7).await;
    let second = manager.get_or_create(7).await;
    assert_eq!(first.game_id(), second.game_id());
    assert_eq!(manager.active_session_count().await, 1);

    manager.close(7).await;
    assert_eq!(manager.active_session_count().await, 0);
    assert!(manager.get(7).await.is_none());
}
