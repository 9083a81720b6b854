//! Route Definitions

use super::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        // Verification
        .route("/api/verify", post(verify_handler))
        .route("/api/verify/replay", post(replay_handler))
        .route("/api/rounds/recent", get(recent_rounds_handler))
        // Single-shot games
        .route("/api/coinflip/play", post(coinflip_play_handler))
        .route("/api/slots/play", post(slots_play_handler))
        .route("/api/crash/play", post(crash_play_handler))
        // Multi-step games
        .route("/api/mines/start", post(mines_start_handler))
        .route("/api/mines/reveal", post(mines_reveal_handler))
        .route("/api/mines/cashout", post(mines_cashout_handler))
        .route("/api/towers/start", post(towers_start_handler))
        .route("/api/towers/climb", post(towers_climb_handler))
        .route("/api/towers/cashout", post(towers_cashout_handler))
        .route("/api/blackjack/start", post(blackjack_start_handler))
        .route("/api/blackjack/hit", post(blackjack_hit_handler))
        .route("/api/blackjack/stand", post(blackjack_stand_handler))
        .route("/api/blackjack/double", post(blackjack_double_handler))
        .route("/api/chicken/start", post(chicken_start_handler))
        .route("/api/chicken/step", post(chicken_step_handler))
        .route("/api/chicken/cashout", post(chicken_cashout_handler))
        .with_state(state)
}
