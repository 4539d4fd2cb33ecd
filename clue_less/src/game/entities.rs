use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::constants;

/// Type alias for game identifiers.
pub type GameId = i64;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Character {
    #[serde(rename = "Miss Scarlet")]
    MissScarlet,
    #[serde(rename = "Prof. Plum")]
    ProfPlum,
    #[serde(rename = "Mrs. Peacock")]
    MrsPeacock,
    #[serde(rename = "Mr. Green")]
    MrGreen,
    #[serde(rename = "Mrs. White")]
    MrsWhite,
    #[serde(rename = "Col. Mustard")]
    ColMustard,
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::MissScarlet => "Miss Scarlet",
            Self::ProfPlum => "Prof. Plum",
            Self::MrsPeacock => "Mrs. Peacock",
            Self::MrGreen => "Mr. Green",
            Self::MrsWhite => "Mrs. White",
            Self::ColMustard => "Col. Mustard",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Weapon {
    Rope,
    #[serde(rename = "Lead Pipe")]
    LeadPipe,
    Knife,
    Wrench,
    Candlestick,
    Revolver,
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Rope => "Rope",
            Self::LeadPipe => "Lead Pipe",
            Self::Knife => "Knife",
            Self::Wrench => "Wrench",
            Self::Candlestick => "Candlestick",
            Self::Revolver => "Revolver",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Room {
    Study,
    Hall,
    Lounge,
    Library,
    BilliardRoom,
    DiningRoom,
    Conservatory,
    Ballroom,
    Kitchen,
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Study => "Study",
            Self::Hall => "Hall",
            Self::Lounge => "Lounge",
            Self::Library => "Library",
            Self::BilliardRoom => "BilliardRoom",
            Self::DiningRoom => "DiningRoom",
            Self::Conservatory => "Conservatory",
            Self::Ballroom => "Ballroom",
            Self::Kitchen => "Kitchen",
        };
        write!(f, "{repr}")
    }
}

/// The twelve hallways connecting adjacent rooms. Each hallway holds at
/// most one player at a time.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Hallway {
    Hallway1,
    Hallway2,
    Hallway3,
    Hallway4,
    Hallway5,
    Hallway6,
    Hallway7,
    Hallway8,
    Hallway9,
    Hallway10,
    Hallway11,
    Hallway12,
}

impl fmt::Display for Hallway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Hallway1 => "Hallway1",
            Self::Hallway2 => "Hallway2",
            Self::Hallway3 => "Hallway3",
            Self::Hallway4 => "Hallway4",
            Self::Hallway5 => "Hallway5",
            Self::Hallway6 => "Hallway6",
            Self::Hallway7 => "Hallway7",
            Self::Hallway8 => "Hallway8",
            Self::Hallway9 => "Hallway9",
            Self::Hallway10 => "Hallway10",
            Self::Hallway11 => "Hallway11",
            Self::Hallway12 => "Hallway12",
        };
        write!(f, "{repr}")
    }
}

/// A board position. Room and hallway names are disjoint, so the wire
/// representation is the bare name string.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum Location {
    Room(Room),
    Hallway(Hallway),
}

impl Location {
    #[must_use]
    pub const fn is_room(self) -> bool {
        matches!(self, Self::Room(_))
    }

    #[must_use]
    pub const fn is_hallway(self) -> bool {
        matches!(self, Self::Hallway(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room(room) => room.fmt(f),
            Self::Hallway(hallway) => hallway.fmt(f),
        }
    }
}

/// One of the 21 deck cards. Suspect, weapon, and room names are disjoint,
/// so a card also serializes as its bare name.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum Card {
    Suspect(Character),
    Weapon(Weapon),
    Room(Room),
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suspect(character) => character.fmt(f),
            Self::Weapon(weapon) => weapon.fmt(f),
            Self::Room(room) => room.fmt(f),
        }
    }
}

/// The hidden solution triple players try to deduce.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CaseFile {
    pub suspect: Character,
    pub weapon: Weapon,
    pub room: Room,
}

impl CaseFile {
    /// Field-wise comparison against an accusation.
    #[must_use]
    pub fn matches(&self, suspect: Character, weapon: Weapon, room: Room) -> bool {
        self.suspect == suspect && self.weapon == weapon && self.room == room
    }

    /// The three solution cards.
    #[must_use]
    pub fn cards(&self) -> [Card; 3] {
        [
            Card::Suspect(self.suspect),
            Card::Weapon(self.weapon),
            Card::Room(self.room),
        ]
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Self {
        let mut username: String = s
            .trim()
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        username.truncate(constants::MAX_USERNAME_LENGTH);
        Self(username)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A suggestion waiting on the disproving player's card choice. Recorded on
/// the game so the choice can be validated instead of trusting the client.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PendingDisprove {
    /// Player holding multiple matching cards who must pick one.
    pub chooser: Username,
    /// Player whose suggestion is being disproven and whose turn ends
    /// once a card is chosen.
    pub suggester: Username,
    /// The matching cards the chooser may reveal.
    pub choices: Vec<Card>,
}

/// A game session's persistent record.
///
/// `players_list` is the historical roster in join order. It only grows and
/// is the authoritative turn order; it is distinct from currently-connected
/// players.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Game {
    pub id: GameId,
    /// Set exactly once when the game starts; `Some` iff `begun`.
    pub case_file: Option<CaseFile>,
    pub is_active: bool,
    pub begun: bool,
    pub players_list: Vec<Username>,
    pub created_at: DateTime<Utc>,
    /// Monotonic snapshot sequence number, bumped once per mutating
    /// operation so clients can detect stale updates.
    pub seq: u64,
    pub pending_disprove: Option<PendingDisprove>,
}

impl Game {
    #[must_use]
    pub fn new(id: GameId) -> Self {
        Self {
            id,
            case_file: None,
            is_active: true,
            begun: false,
            players_list: Vec::new(),
            created_at: Utc::now(),
            seq: 0,
            pending_disprove: None,
        }
    }
}

/// A player's persistent record, one per (game, username).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub game_id: GameId,
    pub username: Username,
    pub character: Character,
    pub location: Location,
    pub is_active: bool,
    pub turn: bool,
    pub hand: Vec<Card>,
    pub moved: bool,
    pub accused: bool,
    /// Set when a suggestion pulled this player's token into a room,
    /// letting them suggest there without moving first.
    pub suggested: bool,
}

impl Player {
    #[must_use]
    pub fn new(game_id: GameId, username: Username, character: Character, location: Location) -> Self {
        Self {
            game_id,
            username,
            character,
            location,
            is_active: true,
            turn: false,
            hand: Vec::new(),
            moved: false,
            accused: false,
            suggested: false,
        }
    }
}

/// The public fields of a player as shared with every client. Hands are
/// deliberately excluded; cards are only ever revealed through directed
/// disprove messages.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerView {
    pub username: Username,
    pub character: Character,
    pub location: Location,
    pub is_active: bool,
    pub turn: bool,
    pub moved: bool,
    pub accused: bool,
    pub suggested: bool,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            username: player.username.clone(),
            character: player.character,
            location: player.location,
            is_active: player.is_active,
            turn: player.turn,
            moved: player.moved,
            accused: player.accused,
            suggested: player.suggested,
        }
    }
}

/// A full game-state snapshot. Every state-changing operation concludes by
/// broadcasting one of these so clients resynchronize from the latest
/// snapshot instead of applying deltas.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameStateView {
    pub game_id: GameId,
    pub seq: u64,
    /// Only revealed once the game has ended.
    pub case_file: Option<CaseFile>,
    pub game_is_active: bool,
    pub begun: bool,
    pub players: Vec<PlayerView>,
    pub rooms: Vec<Room>,
    pub hallways: Vec<Hallway>,
    pub weapons: Vec<Weapon>,
}
