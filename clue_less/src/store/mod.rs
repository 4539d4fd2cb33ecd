//! Abstract game/player state store.
//!
//! The engine only needs create/read/update access to [`Game`] and
//! [`Player`] records; any backing store (in-memory map, SQL, embedded KV)
//! can implement [`GameStore`]. The bundled [`MemoryStore`] backs the
//! per-game session actor, which serializes all access, so implementations
//! do not need internal locking.

mod memory;

pub use memory::MemoryStore;

use thiserror::Error;

use crate::game::entities::{Game, GameId, Player, Username};

/// Errors from store operations.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum StoreError {
    #[error("game {0} not found")]
    GameNotFound(GameId),
    #[error("player {0} not found")]
    PlayerNotFound(Username),
    #[error("game {0} already exists")]
    GameAlreadyExists(GameId),
    #[error("player {0} already exists")]
    PlayerAlreadyExists(Username),
}

/// CRUD access to persistent game state.
pub trait GameStore {
    fn game(&self, id: GameId) -> Result<Game, StoreError>;

    fn player(&self, game_id: GameId, username: &Username) -> Result<Player, StoreError>;

    /// All players of a game in join order.
    fn players(&self, game_id: GameId) -> Result<Vec<Player>, StoreError>;

    fn create_game(&mut self, game: &Game) -> Result<(), StoreError>;

    fn create_player(&mut self, player: &Player) -> Result<(), StoreError>;

    fn save_game(&mut self, game: &Game) -> Result<(), StoreError>;

    fn save_player(&mut self, player: &Player) -> Result<(), StoreError>;

    /// Wipes a game back to a fresh, un-begun record with no players.
    /// Housekeeping hook for tests and operational resets.
    fn reset_game(&mut self, id: GameId) -> Result<(), StoreError>;
}
