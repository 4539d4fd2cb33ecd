//! Game rules: board topology, deck, entities, and the turn engine.

pub mod board;
pub mod constants;
pub mod deck;
pub mod engine;
pub mod entities;

pub use engine::{Engine, GameError};
