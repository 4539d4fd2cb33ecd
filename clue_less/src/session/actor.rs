//! Session actor implementation with async message handling.

use std::collections::HashMap;

use tokio::{
    sync::mpsc,
    time::{Instant, sleep_until},
};

use super::{
    config::SessionConfig,
    messages::{ConnectionId, SessionMessage},
};
use crate::{
    game::{Engine, entities::{GameId, Username}},
    net::messages::{ClientCommand, Outgoing, Recipient, ServerEvent},
    store::MemoryStore,
};

/// Session actor handle for sending messages.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    game_id: GameId,
}

impl SessionHandle {
    pub fn new(sender: mpsc::Sender<SessionMessage>, game_id: GameId) -> Self {
        Self { sender, game_id }
    }

    #[must_use]
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Send a message to the session.
    pub async fn send(&self, message: SessionMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Session is closed".to_string())
    }
}

/// One connected player's event channel.
struct Subscriber {
    connection: ConnectionId,
    sender: mpsc::Sender<ServerEvent>,
}

/// Session actor managing a single game.
pub struct SessionActor {
    game_id: GameId,
    config: SessionConfig,
    engine: Engine<MemoryStore>,
    inbox: mpsc::Receiver<SessionMessage>,
    subscribers: HashMap<Username, Subscriber>,
    /// Username currently on the clock; tracked so the timer only rearms
    /// when the turn actually changes hands.
    turn_holder: Option<Username>,
    turn_deadline: Option<Instant>,
    is_closed: bool,
}

impl SessionActor {
    pub fn new(game_id: GameId, config: SessionConfig) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity);
        let actor = Self {
            game_id,
            config,
            engine: Engine::new(MemoryStore::with_game(game_id), game_id),
            inbox,
            subscribers: HashMap::new(),
            turn_holder: None,
            turn_deadline: None,
            is_closed: false,
        };
        let handle = SessionHandle::new(sender, game_id);
        (actor, handle)
    }

    /// Run the session actor event loop.
    pub async fn run(mut self) {
        log::info!("session {} starting", self.game_id);

        loop {
            let deadline = self.turn_deadline;
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else { break };
                    self.handle_message(message);
                    if self.is_closed {
                        break;
                    }
                }
                () = Self::sleep_until_deadline(deadline) => {
                    self.handle_timeout();
                }
            }
        }

        log::info!("session {} closed", self.game_id);
    }

    async fn sleep_until_deadline(deadline: Option<Instant>) {
        match deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }

    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Connect {
                username,
                connection,
                sender,
                response,
            } => {
                match self.engine.join(&username) {
                    Ok(events) => {
                        // A reconnect replaces the old channel; the stale
                        // connection's disconnect is ignored by id.
                        self.subscribers
                            .insert(username, Subscriber { connection, sender });
                        let _ = response.send(Ok(()));
                        self.dispatch(events);
                        self.rearm_turn_timer();
                    }
                    Err(e) => {
                        let _ = response.send(Err(e));
                    }
                }
            }

            SessionMessage::Disconnect {
                username,
                connection,
            } => {
                let current = self
                    .subscribers
                    .get(&username)
                    .is_some_and(|s| s.connection == connection);
                if !current {
                    log::debug!(
                        "session {}: stale disconnect for {} ignored",
                        self.game_id,
                        username
                    );
                    return;
                }
                self.subscribers.remove(&username);
                match self.engine.disconnect(&username) {
                    Ok(events) => self.dispatch(events),
                    Err(e) => log::warn!(
                        "session {}: disconnect for {} failed: {}",
                        self.game_id,
                        username,
                        e
                    ),
                }
            }

            SessionMessage::Command { username, command } => {
                log::debug!("session {}: {} from {}", self.game_id, command, username);
                let result = match command {
                    ClientCommand::StartGame => self.engine.start_game(&username),
                    ClientCommand::Move { location } => self.engine.move_to(&username, location),
                    ClientCommand::Suggest {
                        suspect,
                        weapon,
                        room,
                    } => self.engine.suggest(&username, suspect, weapon, room),
                    ClientCommand::Accuse {
                        suspect,
                        weapon,
                        room,
                    } => self.engine.accuse(&username, suspect, weapon, room),
                    ClientCommand::EndTurn => self.engine.end_turn(&username),
                    ClientCommand::CardSelected { card } => {
                        self.engine.card_selected(&username, card)
                    }
                };
                match result {
                    Ok(events) => {
                        self.dispatch(events);
                        self.rearm_turn_timer();
                    }
                    Err(e) => {
                        log::debug!(
                            "session {}: rejected command from {}: {}",
                            self.game_id,
                            username,
                            e
                        );
                        self.send_to(&username, ServerEvent::Error {
                            message: e.to_string(),
                        });
                    }
                }
            }

            SessionMessage::Snapshot { response } => {
                let _ = response.send(self.engine.snapshot());
            }

            SessionMessage::Reset { response } => match self.engine.reset() {
                Ok(events) => {
                    let _ = response.send(Ok(()));
                    self.dispatch(events);
                    self.rearm_turn_timer();
                }
                Err(e) => {
                    let _ = response.send(Err(e));
                }
            },

            SessionMessage::Close => {
                self.is_closed = true;
            }
        }
    }

    fn handle_timeout(&mut self) {
        self.turn_deadline = None;
        match self.engine.force_end_turn() {
            Ok(events) => {
                self.dispatch(events);
                self.rearm_turn_timer();
            }
            Err(e) => {
                log::debug!("session {}: turn timeout skipped: {}", self.game_id, e);
            }
        }
    }

    /// Restart the turn clock if the turn changed hands; stop it when the
    /// game is over or nobody holds the turn.
    fn rearm_turn_timer(&mut self) {
        let holder = match self.engine.snapshot() {
            Ok(state) if state.game_is_active && state.begun => state
                .players
                .into_iter()
                .find(|p| p.turn)
                .map(|p| p.username),
            _ => None,
        };
        if holder.is_none() {
            self.turn_holder = None;
            self.turn_deadline = None;
            return;
        }
        if holder != self.turn_holder {
            self.turn_holder = holder;
            self.turn_deadline = self
                .config
                .turn_timeout
                .map(|timeout| Instant::now() + timeout);
        }
    }

    fn dispatch(&mut self, events: Vec<Outgoing>) {
        for event in events {
            match event.to {
                Recipient::All => self.broadcast(event.event),
                Recipient::Player(username) => self.send_to(&username, event.event),
            }
        }
    }

    fn broadcast(&mut self, event: ServerEvent) {
        let game_id = self.game_id;
        self.subscribers.retain(|username, subscriber| {
            match subscriber.sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "session {game_id}: {username} channel full, dropping event"
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("session {game_id}: {username} disconnected, removing");
                    false
                }
            }
        });
    }

    fn send_to(&mut self, username: &Username, event: ServerEvent) {
        let Some(subscriber) = self.subscribers.get(username) else {
            return;
        };
        match subscriber.sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!(
                    "session {}: {} channel full, dropping event",
                    self.game_id,
                    username
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!(
                    "session {}: {} disconnected, removing",
                    self.game_id,
                    username
                );
                self.subscribers.remove(username);
            }
        }
    }
}
