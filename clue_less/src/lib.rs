//! # Clue-Less
//!
//! A server-side engine for the simplified Clue board game, covering the
//! board topology, case-file and deck generation, per-game state, the turn
//! and action rules, and the session layer that fans events out to
//! connected clients.
//!
//! ## Architecture
//!
//! A game runs as a single actor task owning an [`Engine`] over a
//! [`store::GameStore`]. Clients talk to the actor through a
//! [`session::SessionHandle`]; every command is validated, applied, and
//! broadcast in one step, so game state never sees concurrent writers.
//!
//! - Rooms and hallways form a fixed graph with two secret passages;
//!   hallways hold one token at a time.
//! - The 21-card deck is split into a hidden 3-card case file and hands
//!   dealt round-robin.
//! - Turns cycle through players in join order, skipping anyone eliminated
//!   by an incorrect accusation.
//!
//! ## Core Modules
//!
//! - [`game`]: Board, deck, entities, and the rules engine
//! - [`store`]: Abstract persistence behind the engine
//! - [`session`]: Per-game actor and session manager
//! - [`net`]: JSON wire messages
//!
//! ## Example
//!
//! ```
//! use clue_less::{Engine, store::MemoryStore};
//!
//! let mut engine = Engine::new(MemoryStore::with_game(1), 1);
//! let events = engine.join(&"alice".into()).unwrap();
//! assert!(!events.is_empty());
//! ```

/// Core game logic and entities.
pub mod game;
pub use game::{
    Engine, GameError, board,
    constants::{self, MAX_PLAYERS, MIN_PLAYERS},
    deck, entities,
};

/// Wire messages exchanged with clients.
pub mod net;
pub use net::{ClientCommand, Outgoing, Recipient, ServerEvent, messages};

/// Per-game session actors and their manager.
pub mod session;
pub use session::{SessionConfig, SessionHandle, SessionManager};

/// Game state persistence.
pub mod store;
pub use store::{GameStore, MemoryStore, StoreError};
