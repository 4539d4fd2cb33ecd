//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration.

use std::net::SocketAddr;
use std::time::Duration;

use clue_less::session::{DEFAULT_TURN_TIMEOUT, SessionConfig};
use thiserror::Error;

const DEFAULT_BIND: &str = "127.0.0.1:7878";

/// Configuration problems worth refusing to start over.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Complete server configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Server bind address.
    pub bind: SocketAddr,
    /// Seconds before an idle turn is force-passed; 0 disables the timer.
    pub turn_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables, with CLI overrides
    /// taking precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparseable.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        turn_timeout_override: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => match std::env::var("SERVER_BIND") {
                Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("{raw} is not an IP:PORT address"),
                })?,
                Err(_) => DEFAULT_BIND
                    .parse()
                    .map_err(|_| ConfigError::Invalid {
                        var: "SERVER_BIND".to_string(),
                        reason: "default bind address failed to parse".to_string(),
                    })?,
            },
        };

        let turn_timeout_secs = match turn_timeout_override {
            Some(secs) => secs,
            None => parse_env_or("TURN_TIMEOUT_SECS", DEFAULT_TURN_TIMEOUT.as_secs())?,
        };

        Ok(Self {
            bind,
            turn_timeout_secs,
        })
    }

    /// The per-game session tunables this configuration implies.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            turn_timeout: (self.turn_timeout_secs > 0)
                .then(|| Duration::from_secs(self.turn_timeout_secs)),
            ..SessionConfig::default()
        }
    }
}

/// Read an environment variable, falling back to a default when unset and
/// failing loudly when set to garbage.
fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            var: var.to_string(),
            reason: format!("could not parse {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}
