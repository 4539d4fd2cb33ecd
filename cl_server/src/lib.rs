//! Clue-Less WebSocket game server.

pub mod api;
pub mod config;
