//! In-memory store implementation.

use std::collections::HashMap;

use super::{GameStore, StoreError};
use crate::game::entities::{Game, GameId, Player, Username};

/// Hash-map backed [`GameStore`]. Player vectors preserve join order, which
/// is also the turn order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: HashMap<GameId, Game>,
    players: HashMap<GameId, Vec<Player>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with one fresh game, the common starting point for a
    /// session actor.
    #[must_use]
    pub fn with_game(id: GameId) -> Self {
        let mut store = Self::new();
        store.games.insert(id, Game::new(id));
        store.players.insert(id, Vec::new());
        store
    }
}

impl GameStore for MemoryStore {
    fn game(&self, id: GameId) -> Result<Game, StoreError> {
        self.games.get(&id).cloned().ok_or(StoreError::GameNotFound(id))
    }

    fn player(&self, game_id: GameId, username: &Username) -> Result<Player, StoreError> {
        self.players
            .get(&game_id)
            .and_then(|players| players.iter().find(|p| &p.username == username))
            .cloned()
            .ok_or_else(|| StoreError::PlayerNotFound(username.clone()))
    }

    fn players(&self, game_id: GameId) -> Result<Vec<Player>, StoreError> {
        if !self.games.contains_key(&game_id) {
            return Err(StoreError::GameNotFound(game_id));
        }
        Ok(self.players.get(&game_id).cloned().unwrap_or_default())
    }

    fn create_game(&mut self, game: &Game) -> Result<(), StoreError> {
        if self.games.contains_key(&game.id) {
            return Err(StoreError::GameAlreadyExists(game.id));
        }
        self.games.insert(game.id, game.clone());
        self.players.entry(game.id).or_default();
        Ok(())
    }

    fn create_player(&mut self, player: &Player) -> Result<(), StoreError> {
        if !self.games.contains_key(&player.game_id) {
            return Err(StoreError::GameNotFound(player.game_id));
        }
        let players = self.players.entry(player.game_id).or_default();
        if players.iter().any(|p| p.username == player.username) {
            return Err(StoreError::PlayerAlreadyExists(player.username.clone()));
        }
        players.push(player.clone());
        Ok(())
    }

    fn save_game(&mut self, game: &Game) -> Result<(), StoreError> {
        match self.games.get_mut(&game.id) {
            Some(existing) => {
                *existing = game.clone();
                Ok(())
            }
            None => Err(StoreError::GameNotFound(game.id)),
        }
    }

    fn save_player(&mut self, player: &Player) -> Result<(), StoreError> {
        let players = self
            .players
            .get_mut(&player.game_id)
            .ok_or(StoreError::GameNotFound(player.game_id))?;
        match players.iter_mut().find(|p| p.username == player.username) {
            Some(existing) => {
                *existing = player.clone();
                Ok(())
            }
            None => Err(StoreError::PlayerNotFound(player.username.clone())),
        }
    }

    fn reset_game(&mut self, id: GameId) -> Result<(), StoreError> {
        self.games.insert(id, Game::new(id));
        self.players.insert(id, Vec::new());
        Ok(())
    }
}
