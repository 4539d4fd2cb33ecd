//! Session configuration.

use std::time::Duration;

/// Default time a player gets to finish their turn.
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(120);

/// Tunables for a game session actor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionConfig {
    /// Force-pass the turn after this long; `None` disables the timer.
    pub turn_timeout: Option<Duration>,
    /// Actor inbox depth.
    pub inbox_capacity: usize,
    /// Per-connection outbound event buffer depth.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Some(DEFAULT_TURN_TIMEOUT),
            inbox_capacity: 100,
            event_capacity: 64,
        }
    }
}
