//! Case file selection and card dealing.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

use super::constants::{ROOMS, SUSPECTS, WEAPONS, full_deck};
use super::entities::{Card, CaseFile, Character};

/// Picks the hidden solution uniformly at random.
pub fn generate_case_file<R: Rng + ?Sized>(rng: &mut R) -> CaseFile {
    CaseFile {
        suspect: SUSPECTS[rng.random_range(0..SUSPECTS.len())],
        weapon: WEAPONS[rng.random_range(0..WEAPONS.len())],
        room: ROOMS[rng.random_range(0..ROOMS.len())],
    }
}

/// Deals the 18 non-solution cards round-robin.
///
/// `seating` is the characters in `players_list` (join) order and
/// `starting` is the character holding the first turn; that player receives
/// the first card and dealing wraps through the seating until the pool is
/// exhausted. Hand sizes differ by at most one.
pub fn deal_hands<R: Rng + ?Sized>(
    case_file: &CaseFile,
    seating: &[Character],
    starting: Character,
    rng: &mut R,
) -> HashMap<Character, Vec<Card>> {
    let mut hands: HashMap<Character, Vec<Card>> =
        seating.iter().map(|&c| (c, Vec::new())).collect();
    if seating.is_empty() {
        return hands;
    }

    let solution = case_file.cards();
    let mut remaining: Vec<Card> = full_deck()
        .into_iter()
        .filter(|card| !solution.contains(card))
        .collect();
    remaining.shuffle(rng);

    let start = seating.iter().position(|&c| c == starting).unwrap_or(0);
    for (i, card) in remaining.into_iter().enumerate() {
        let character = seating[(start + i) % seating.len()];
        if let Some(hand) = hands.get_mut(&character) {
            hand.push(card);
        }
    }
    hands
}
