//! fairplay - Provably Fair Casino Engine
//!
//! Every round commits to `SHA256(server_seed + client_seed + nonce)` before
//! play, derives all of its randomness from that hash, and reveals the seed
//! afterwards so the player can recompute both the hash and the outcome.
//!
//! The engine ([`fairness`]) is pure. Games ([`games`]) turn its outputs into
//! rounds; [`service::GameService`] owns per-user state and is what the HTTP
//! API ([`api`]) and the CLI drive.

pub mod api;
pub mod config;
pub mod errors;
pub mod fairness;
pub mod game_log;
pub mod games;
pub mod logging;
pub mod metrics;
pub mod service;
pub mod session;

pub use config::{CasinoConfig, ConfigLoader};
pub use errors::{CasinoError, CasinoResult};
pub use fairness::{create_seed, derive_uniform, verify, RevealedSeed, Seed};
pub use game_log::{GameLog, MemoryGameLog};
pub use metrics::CasinoMetrics;
pub use service::GameService;

use std::sync::Arc;

/// Service with the in-memory game log sized from config.
pub fn build_service(config: CasinoConfig) -> CasinoResult<GameService> {
    let log = Arc::new(MemoryGameLog::new(config.api.recent_rounds_capacity));
    let metrics = CasinoMetrics::new()?;
    Ok(GameService::new(config, log, metrics))
}
