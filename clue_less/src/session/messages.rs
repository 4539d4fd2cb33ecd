//! Session actor message types.

use std::fmt;

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::game::GameError;
use crate::game::entities::{GameStateView, Username};
use crate::net::messages::{ClientCommand, ServerEvent};

/// Identifies one WebSocket connection. A player reconnecting gets a fresh
/// id, which lets the actor ignore the stale connection's disconnect.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Messages that can be sent to a session actor.
#[derive(Debug)]
pub enum SessionMessage {
    /// A player's connection opened: join (or rejoin) the game and start
    /// receiving events on `sender`.
    Connect {
        username: Username,
        connection: ConnectionId,
        sender: mpsc::Sender<ServerEvent>,
        response: oneshot::Sender<Result<(), GameError>>,
    },

    /// A player's connection closed.
    Disconnect {
        username: Username,
        connection: ConnectionId,
    },

    /// A parsed command from a connected player.
    Command {
        username: Username,
        command: ClientCommand,
    },

    /// Get the current full-state snapshot.
    Snapshot {
        response: oneshot::Sender<Result<GameStateView, GameError>>,
    },

    /// Wipe the game back to a fresh lobby.
    Reset {
        response: oneshot::Sender<Result<(), GameError>>,
    },

    /// Shut the session down.
    Close,
}
