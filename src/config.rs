//! Configuration management with validation and defaults
//!
//! House edges and payout parameters live here so operators can tune them
//! without touching the derivation code. Changing one changes payout math for
//! new rounds only; past rounds replay with the parameters they were played with.

use crate::errors::{CasinoResult, ConfigurationError};
use crate::fairness::generators::{DEFAULT_CRASH_HOUSE_EDGE, MAX_CHICKEN_STEPS, MAX_TOWERS_ROWS};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Top-level casino configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CasinoConfig {
    pub fairness: FairnessConfig,
    pub games: GamesConfig,
    pub session: SessionConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// How blackjack turns the outcome stream into cards
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeckMode {
    /// One independent draw per card (duplicates possible)
    #[default]
    IndependentDraws,
    /// Fisher–Yates shuffled 52-card deck, dealt from the top
    Shuffled,
}

/// House edges and payout constants baked into outcome math
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessConfig {
    pub crash_house_edge: f64,
    pub mines_house_edge: f64,
    pub towers_house_edge: f64,
    pub chicken_house_edge: f64,
    pub coinflip_payout: f64,
    pub blackjack_deck: DeckMode,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            crash_house_edge: DEFAULT_CRASH_HOUSE_EDGE,
            mines_house_edge: 0.02,
            towers_house_edge: 0.02,
            chicken_house_edge: 0.02,
            coinflip_payout: 1.98,
            blackjack_deck: DeckMode::IndependentDraws,
        }
    }
}

/// Board sizes and bet limits
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GamesConfig {
    pub min_bet: f64,
    pub max_bet: f64,
    pub mines_board_size: u8,
    pub towers_rows: u8,
    pub chicken_max_steps: u32,
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            min_bet: 1.0,
            max_bet: 1_000_000.0,
            mines_board_size: 25,
            towers_rows: 8,
            chicken_max_steps: 20,
        }
    }
}

/// In-progress round bookkeeping
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Rounds idle for longer than this are dropped without reveal
    pub round_ttl_secs: u64,
    pub reaper_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            round_ttl_secs: 900,
            reaper_interval_secs: 60,
        }
    }
}

/// HTTP API settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub recent_rounds_capacity: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
            recent_rounds_capacity: 1_000,
        }
    }
}

/// Tracing subscriber settings; `RUST_LOG` takes precedence over `filter`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "fairplay=info,tower_http=info".to_string(),
            ansi: true,
        }
    }
}

impl CasinoConfig {
    /// Short timeouts and verbose logging for local testing
    pub fn testing() -> Self {
        Self {
            session: SessionConfig {
                round_ttl_secs: 5,
                reaper_interval_secs: 1,
            },
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                recent_rounds_capacity: 100,
                ..Default::default()
            },
            logging: LoggingConfig {
                filter: "fairplay=debug".to_string(),
                ansi: false,
            },
            ..Default::default()
        }
    }

    /// Production defaults: explicit origins are expected via config file
    pub fn production() -> Self {
        Self {
            games: GamesConfig {
                min_bet: 10.0,
                max_bet: 10_000_000.0,
                ..Default::default()
            },
            api: ApiConfig {
                request_timeout_secs: 10,
                recent_rounds_capacity: 10_000,
                ..Default::default()
            },
            logging: LoggingConfig {
                filter: "fairplay=info,tower_http=warn".to_string(),
                ansi: false,
            },
            ..Default::default()
        }
    }

    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let edges = [
            ("fairness.crash_house_edge", self.fairness.crash_house_edge),
            ("fairness.mines_house_edge", self.fairness.mines_house_edge),
            ("fairness.towers_house_edge", self.fairness.towers_house_edge),
            ("fairness.chicken_house_edge", self.fairness.chicken_house_edge),
        ];
        for (field, edge) in edges {
            if !(0.0..0.5).contains(&edge) {
                return Err(invalid(field, edge, "house edge must be in [0, 0.5)"));
            }
        }

        if !(1.0..2.0).contains(&self.fairness.coinflip_payout) {
            return Err(invalid(
                "fairness.coinflip_payout",
                self.fairness.coinflip_payout,
                "payout must be in [1, 2)",
            ));
        }

        if self.games.min_bet <= 0.0 {
            return Err(invalid("games.min_bet", self.games.min_bet, "must be > 0"));
        }

        if self.games.max_bet < self.games.min_bet {
            return Err(ConfigurationError::ValidationFailed(
                "games.max_bet must be >= games.min_bet".to_string(),
            ));
        }

        if self.games.mines_board_size < 2 {
            return Err(invalid(
                "games.mines_board_size",
                self.games.mines_board_size,
                "board needs at least 2 tiles",
            ));
        }

        if self.games.towers_rows == 0 || self.games.towers_rows > MAX_TOWERS_ROWS {
            return Err(invalid(
                "games.towers_rows",
                self.games.towers_rows,
                &format!("must be in [1, {}]", MAX_TOWERS_ROWS),
            ));
        }

        if self.games.chicken_max_steps == 0 || self.games.chicken_max_steps > MAX_CHICKEN_STEPS {
            return Err(invalid(
                "games.chicken_max_steps",
                self.games.chicken_max_steps,
                &format!("must be in [1, {}]", MAX_CHICKEN_STEPS),
            ));
        }

        if self.session.round_ttl_secs == 0 || self.session.reaper_interval_secs == 0 {
            return Err(ConfigurationError::ValidationFailed(
                "session timings must be > 0".to_string(),
            ));
        }

        if self.api.recent_rounds_capacity == 0 {
            return Err(invalid("api.recent_rounds_capacity", 0, "must be > 0"));
        }

        Ok(())
    }

    pub fn round_ttl(&self) -> Duration {
        Duration::from_secs(self.session.round_ttl_secs)
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.session.reaper_interval_secs)
    }
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Configuration loader: optional TOML file, then `FAIRPLAY_*` env overrides
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load, override from the environment and validate
    pub fn load(&self) -> CasinoResult<CasinoConfig> {
        self.load_with(|key| env::var(key).ok())
    }

    /// [`load`](Self::load) with overrides taken from `lookup` instead of the environment
    pub fn load_with<F>(&self, lookup: F) -> CasinoResult<CasinoConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.config_path {
            Some(ref path) => Self::load_from_file(path)?,
            None => CasinoConfig::default(),
        };

        Self::apply_overrides(&mut config, lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &str) -> CasinoResult<CasinoConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        Ok(toml::from_str(&content)?)
    }

    /// Apply overrides from a key lookup (the process environment in `load`)
    pub fn apply_overrides<F>(config: &mut CasinoConfig, lookup: F) -> CasinoResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("FAIRPLAY_API_HOST") {
            config.api.host = host;
        }
        if let Some(port) = lookup("FAIRPLAY_API_PORT") {
            config.api.port = parse_override("FAIRPLAY_API_PORT", port, "Invalid port number")?;
        }
        if let Some(filter) = lookup("FAIRPLAY_LOG_FILTER") {
            config.logging.filter = filter;
        }
        if let Some(edge) = lookup("FAIRPLAY_CRASH_HOUSE_EDGE") {
            config.fairness.crash_house_edge =
                parse_override("FAIRPLAY_CRASH_HOUSE_EDGE", edge, "Invalid house edge")?;
        }
        if let Some(ttl) = lookup("FAIRPLAY_ROUND_TTL_SECS") {
            config.session.round_ttl_secs =
                parse_override("FAIRPLAY_ROUND_TTL_SECS", ttl, "Invalid duration")?;
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(field: &str, value: String, reason: &str) -> CasinoResult<T> {
    value.parse().map_err(|_| {
        ConfigurationError::InvalidValue {
            field: field.to_string(),
            value,
            reason: reason.to_string(),
        }
        .into()
    })
}
