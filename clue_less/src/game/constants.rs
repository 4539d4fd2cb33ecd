//! Fixed deck and roster constants.

use super::entities::{Card, Character, Hallway, Room, Weapon};

/// Total cards in the deck: 6 suspects + 6 weapons + 9 rooms.
pub const DECK_SIZE: usize = 21;

/// Minimum active players required to start a game.
pub const MIN_PLAYERS: usize = 2;

/// Maximum players per game, one per suspect.
pub const MAX_PLAYERS: usize = 6;

/// Maximum accepted username length.
pub const MAX_USERNAME_LENGTH: usize = 32;

pub const SUSPECTS: [Character; 6] = [
    Character::MissScarlet,
    Character::ProfPlum,
    Character::MrsPeacock,
    Character::MrGreen,
    Character::MrsWhite,
    Character::ColMustard,
];

pub const WEAPONS: [Weapon; 6] = [
    Weapon::Rope,
    Weapon::LeadPipe,
    Weapon::Knife,
    Weapon::Wrench,
    Weapon::Candlestick,
    Weapon::Revolver,
];

pub const ROOMS: [Room; 9] = [
    Room::Study,
    Room::Hall,
    Room::Lounge,
    Room::Library,
    Room::BilliardRoom,
    Room::DiningRoom,
    Room::Conservatory,
    Room::Ballroom,
    Room::Kitchen,
];

pub const HALLWAYS: [Hallway; 12] = [
    Hallway::Hallway1,
    Hallway::Hallway2,
    Hallway::Hallway3,
    Hallway::Hallway4,
    Hallway::Hallway5,
    Hallway::Hallway6,
    Hallway::Hallway7,
    Hallway::Hallway8,
    Hallway::Hallway9,
    Hallway::Hallway10,
    Hallway::Hallway11,
    Hallway::Hallway12,
];

/// The full 21-card deck in suspect, weapon, room order.
#[must_use]
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    deck.extend(SUSPECTS.map(Card::Suspect));
    deck.extend(WEAPONS.map(Card::Weapon));
    deck.extend(ROOMS.map(Card::Room));
    deck
}
