//! Per-game session actors.
//!
//! One actor task owns each game's [`Engine`](crate::game::Engine) and
//! subscriber registry. All commands for a game flow through its inbox, so
//! every operation runs as one atomic validate-mutate-broadcast step.

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{SessionActor, SessionHandle};
pub use config::{DEFAULT_TURN_TIMEOUT, SessionConfig};
pub use manager::SessionManager;
pub use messages::{ConnectionId, SessionMessage};
