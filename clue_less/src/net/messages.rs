//! JSON wire messages exchanged over a game WebSocket.
//!
//! Both directions use text frames with a `"type"` discriminator. Inbound
//! frames that fail to parse are answered with an [`ServerEvent::Error`]
//! frame rather than silently dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::entities::{Card, Character, GameStateView, Location, Room, Username, Weapon};

/// A command from a connected client. The sender's identity comes from the
/// connection, never from the payload.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    StartGame,
    Move {
        location: Location,
    },
    Suggest {
        suspect: Character,
        weapon: Weapon,
        room: Room,
    },
    Accuse {
        suspect: Character,
        weapon: Weapon,
        room: Room,
    },
    EndTurn,
    CardSelected {
        card: Card,
    },
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::StartGame => "start_game",
            Self::Move { .. } => "move",
            Self::Suggest { .. } => "suggest",
            Self::Accuse { .. } => "accuse",
            Self::EndTurn => "end_turn",
            Self::CardSelected { .. } => "card_selected",
        };
        write!(f, "{repr}")
    }
}

/// An event pushed to one or more clients.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full state snapshot; concludes every successful mutating operation.
    GameUpdate {
        state: GameStateView,
    },
    PlayerJoined {
        username: Username,
        character: Character,
    },
    PlayerOut {
        username: Username,
    },
    GameStarted,
    GameEnd {
        winner: Username,
        suspect: Character,
        weapon: Weapon,
        room: Room,
    },
    GameTie {
        suspect: Character,
        weapon: Weapon,
        room: Room,
    },
    PlayerEliminated {
        username: Username,
    },
    AccusationResult {
        username: Username,
        suspect: Character,
        weapon: Weapon,
        room: Room,
        correct: bool,
    },
    SuggestionResult {
        username: Username,
        suspect: Character,
        weapon: Weapon,
        room: Room,
        disproved_by: Option<Username>,
    },
    /// Sent only to a player who holds several cards matching a suggestion
    /// and must choose which one to reveal.
    SelectCard {
        choices: Vec<Card>,
    },
    /// Free-form notice rendered as-is by clients.
    Popup {
        message: String,
    },
    Error {
        message: String,
    },
}

/// Who an event is delivered to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Recipient {
    All,
    Player(Username),
}

/// A routed event produced by an engine operation, in delivery order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Outgoing {
    pub to: Recipient,
    pub event: ServerEvent,
}

impl Outgoing {
    #[must_use]
    pub fn all(event: ServerEvent) -> Self {
        Self {
            to: Recipient::All,
            event,
        }
    }

    #[must_use]
    pub fn to(username: Username, event: ServerEvent) -> Self {
        Self {
            to: Recipient::Player(username),
            event,
        }
    }
}
