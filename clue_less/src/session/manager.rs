//! Session manager for spawning and tracking game session actors.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use super::{
    actor::{SessionActor, SessionHandle},
    config::SessionConfig,
    messages::SessionMessage,
};
use crate::game::entities::GameId;

/// Spawns one actor per game on demand and hands out clones of their
/// handles. Cheap to clone; all clones share the same session map.
#[derive(Clone)]
pub struct SessionManager {
    config: SessionConfig,
    sessions: Arc<RwLock<HashMap<GameId, SessionHandle>>>,
}

impl SessionManager {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The session for `game_id`, spawning its actor on first use.
    pub async fn get_or_create(&self, game_id: GameId) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(&game_id) {
            return handle.clone();
        }

        let mut sessions = self.sessions.write().await;
        // Raced against another creator while upgrading the lock.
        if let Some(handle) = sessions.get(&game_id) {
            return handle.clone();
        }
        let (actor, handle) = SessionActor::new(game_id, self.config.clone());
        tokio::spawn(actor.run());
        sessions.insert(game_id, handle.clone());
        log::info!("spawned session for game {game_id}");
        handle
    }

    pub async fn get(&self, game_id: GameId) -> Option<SessionHandle> {
        self.sessions.read().await.get(&game_id).cloned()
    }

    /// Removes a session and tells its actor to shut down.
    pub async fn close(&self, game_id: GameId) {
        let handle = self.sessions.write().await.remove(&game_id);
        if let Some(handle) = handle {
            let _ = handle.send(SessionMessage::Close).await;
        }
    }

    pub async fn active_session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
