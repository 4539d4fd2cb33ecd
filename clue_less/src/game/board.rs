//! Static board topology: 9 rooms, 12 hallways, and the two secret
//! passages (Study-Kitchen, Lounge-Conservatory). Adjacency is fixed and
//! bidirectional; there is no mutable state here.

use super::entities::{Character, Location};
use super::entities::Hallway::*;
use super::entities::Room::*;

use Location::{Hallway as H, Room as R};

/// All locations reachable in one move from `from`. Secret passages appear
/// as room-to-room edges.
#[must_use]
pub fn valid_moves(from: Location) -> &'static [Location] {
    match from {
        // Rooms and their adjacent hallways, plus secret passages.
        R(Study) => &[H(Hallway1), H(Hallway3), R(Kitchen)],
        R(Hall) => &[H(Hallway1), H(Hallway2), H(Hallway4)],
        R(Lounge) => &[H(Hallway2), H(Hallway5), R(Conservatory)],
        R(Library) => &[H(Hallway3), H(Hallway6), H(Hallway8)],
        R(BilliardRoom) => &[H(Hallway4), H(Hallway6), H(Hallway7), H(Hallway9)],
        R(DiningRoom) => &[H(Hallway5), H(Hallway7), H(Hallway10)],
        R(Conservatory) => &[H(Hallway8), H(Hallway11), R(Lounge)],
        R(Ballroom) => &[H(Hallway9), H(Hallway11), H(Hallway12)],
        R(Kitchen) => &[H(Hallway10), H(Hallway12), R(Study)],
        // Hallways and the two rooms they connect.
        H(Hallway1) => &[R(Study), R(Hall)],
        H(Hallway2) => &[R(Hall), R(Lounge)],
        H(Hallway3) => &[R(Study), R(Library)],
        H(Hallway4) => &[R(Hall), R(BilliardRoom)],
        H(Hallway5) => &[R(Lounge), R(DiningRoom)],
        H(Hallway6) => &[R(Library), R(BilliardRoom)],
        H(Hallway7) => &[R(BilliardRoom), R(DiningRoom)],
        H(Hallway8) => &[R(Library), R(Conservatory)],
        H(Hallway9) => &[R(BilliardRoom), R(Ballroom)],
        H(Hallway10) => &[R(DiningRoom), R(Kitchen)],
        H(Hallway11) => &[R(Conservatory), R(Ballroom)],
        H(Hallway12) => &[R(Ballroom), R(Kitchen)],
    }
}

#[must_use]
pub fn is_adjacent(from: Location, to: Location) -> bool {
    valid_moves(from).contains(&to)
}

/// Each character's starting hallway at the beginning of the game.
#[must_use]
pub fn starting_location(character: Character) -> Location {
    match character {
        Character::MissScarlet => H(Hallway2),
        Character::ProfPlum => H(Hallway3),
        Character::MrsPeacock => H(Hallway8),
        Character::MrGreen => H(Hallway11),
        Character::MrsWhite => H(Hallway12),
        Character::ColMustard => H(Hallway5),
    }
}
