//! API Request and Response Models

use crate::fairness::{CoinSide, RevealedSeed};
use crate::games::{ChickenDifficulty, ReplayOutcome, ReplayRequest, ReplayVerdict, RoundSettlement, TowersDifficulty};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub active_rounds: usize,
}

/// POST /api/verify
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub server_seed: String,
    pub client_seed: String,
    /// Decimal text; anything else fails verification
    pub nonce: String,
    pub commitment_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

/// POST /api/verify/replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayApiRequest {
    pub seed: RevealedSeed,
    pub params: ReplayRequest,
    /// Outcome the player was shown, if they want a verdict
    #[serde(default)]
    pub claimed: Option<ReplayOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayApiResponse {
    pub commitment_valid: bool,
    pub outcome: ReplayOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<ReplayVerdict>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentRoundsResponse {
    pub rounds: Vec<RoundSettlement>,
}

/// Body of actions that only name the player (cash out, hit, stand, step...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinflipPlayRequest {
    pub user_id: String,
    pub bet: f64,
    pub choice: CoinSide,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsPlayRequest {
    pub user_id: String,
    pub bet: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrashPlayRequest {
    pub user_id: String,
    pub bet: f64,
    /// Auto cash-out multiplier
    pub target: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinesStartRequest {
    pub user_id: String,
    pub bet: f64,
    pub mine_count: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinesRevealRequest {
    pub user_id: String,
    pub tile: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowersStartRequest {
    pub user_id: String,
    pub bet: f64,
    pub difficulty: TowersDifficulty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowersClimbRequest {
    pub user_id: String,
    pub column: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackjackStartRequest {
    pub user_id: String,
    pub bet: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChickenStartRequest {
    pub user_id: String,
    pub bet: f64,
    pub difficulty: ChickenDifficulty,
}
