//! Error types for the fairplay casino engine
//!
//! One root error with a sub-enum per concern. Derivation and verification
//! never produce errors: out-of-domain derivation panics and malformed
//! verification input simply fails to match.

use crate::games::GameType;
use thiserror::Error;

/// Root error type for all fairplay operations
#[derive(Debug, Error)]
pub enum CasinoError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Entropy error: {0}")]
    Entropy(#[from] EntropyError),

    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Monitoring error: {0}")]
    Monitoring(#[from] MonitoringError),
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),
}

/// The secure random source could not produce seed material.
///
/// Fatal for the round being started; there is no weaker fallback source.
#[derive(Debug, Error)]
#[error("secure random source unavailable: {0}")]
pub struct EntropyError(pub String);

/// Invalid bets, parameters or actions against a round
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Bet {bet} outside allowed range [{min}, {max}]")]
    BetOutOfRange { bet: f64, min: f64, max: f64 },

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Tile {tile} already revealed")]
    TileAlreadyRevealed { tile: u8 },

    #[error("Action not allowed: {0}")]
    ActionNotAllowed(String),
}

/// Per-user round bookkeeping errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("User {user_id} already has an active {game} round")]
    RoundInProgress { user_id: String, game: GameType },

    #[error("User {user_id} has no active {game} round")]
    NoActiveRound { user_id: String, game: GameType },
}

/// Metrics registry errors
#[derive(Debug, Error)]
pub enum MonitoringError {
    #[error("Metrics registration failed: {0}")]
    RegistrationFailed(String),

    #[error("Metrics encoding failed: {0}")]
    EncodingFailed(String),
}

impl From<prometheus::Error> for CasinoError {
    fn from(e: prometheus::Error) -> Self {
        CasinoError::Monitoring(MonitoringError::RegistrationFailed(e.to_string()))
    }
}

impl From<toml::de::Error> for CasinoError {
    fn from(e: toml::de::Error) -> Self {
        CasinoError::Configuration(ConfigurationError::LoadFailed(format!(
            "Failed to parse TOML: {}",
            e
        )))
    }
}

// Convenience type alias for Results
pub type CasinoResult<T> = Result<T, CasinoError>;

impl GameError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        GameError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_error_display() {
        let config_error = ConfigurationError::ValidationFailed("test".to_string());
        let casino_error = CasinoError::Configuration(config_error);

        assert!(casino_error.to_string().contains("Configuration error"));
        assert!(casino_error.to_string().contains("test"));
    }

    #[test]
    fn test_bet_range_details() {
        let err = GameError::BetOutOfRange {
            bet: 0.0,
            min: 1.0,
            max: 100.0,
        };

        assert!(err.to_string().contains("[1, 100]"));
    }

    #[test]
    fn test_error_conversion() {
        let casino_error: CasinoError = EntropyError("getrandom failed".to_string()).into();

        match casino_error {
            CasinoError::Entropy(_) => {}
            _ => panic!("Expected entropy error"),
        }
    }

    #[test]
    fn test_error_source() {
        let session_error = SessionError::NoActiveRound {
            user_id: "u1".to_string(),
            game: GameType::Mines,
        };
        let casino_error = CasinoError::Session(session_error);

        assert!(casino_error.source().is_some());
    }
}
