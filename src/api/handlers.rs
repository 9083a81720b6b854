//! Request Handlers
//!
//! Thin adapters: parse the body, call the game service, map errors to
//! responses carrying the request id.

use super::{errors::ApiError, middleware::RequestId, models::*};
use crate::errors::CasinoResult;
use crate::games::{BlackjackView, ChickenView, MinesView, RoundSettlement, TowersView};
use crate::service::{GameService, RoundUpdate};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

const MAX_RECENT: usize = 500;

/// Shared application state
pub struct AppState {
    pub service: Arc<GameService>,
    pub version: String,
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn body<T>(request_id: &RequestId, payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| ApiError::bad_request(request_id.0.clone(), e.body_text()))
}

fn user(request_id: &RequestId, user_id: &str) -> Result<(), ApiError> {
    if user_id.trim().is_empty() {
        return Err(ApiError::bad_request(
            request_id.0.clone(),
            "user_id must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn respond<T>(request_id: &RequestId, result: CasinoResult<T>) -> ApiResult<T> {
    result
        .map(Json)
        .map_err(|e| ApiError::from_casino(request_id.0.clone(), e))
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
        version: state.version.clone(),
        active_rounds: state.service.store().active_count(),
    })
}

/// GET /metrics
pub async fn metrics_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let text = state
        .service
        .render_metrics()
        .map_err(|e| ApiError::from_casino(request_id.0.clone(), e))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text))
}

/// POST /api/verify
pub async fn verify_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> ApiResult<VerifyResponse> {
    let req = body(&request_id, payload)?;
    let valid = state
        .service
        .verify(&req.server_seed, &req.client_seed, &req.nonce, &req.commitment_hash);
    Ok(Json(VerifyResponse { valid }))
}

/// POST /api/verify/replay
pub async fn replay_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReplayApiRequest>, JsonRejection>,
) -> ApiResult<ReplayApiResponse> {
    let req = body(&request_id, payload)?;
    let result = state
        .service
        .replay(&req.seed, &req.params, req.claimed.as_ref())
        .map(|(report, verdict)| ReplayApiResponse {
            commitment_valid: report.commitment_valid,
            outcome: report.outcome,
            verdict,
        });
    respond(&request_id, result)
}

/// GET /api/rounds/recent?limit={n}
pub async fn recent_rounds_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> Json<RecentRoundsResponse> {
    Json(RecentRoundsResponse {
        rounds: state.service.recent_rounds(query.limit.min(MAX_RECENT)),
    })
}

// Single-shot games

/// POST /api/coinflip/play
pub async fn coinflip_play_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CoinflipPlayRequest>, JsonRejection>,
) -> ApiResult<RoundSettlement> {
    let req = body(&request_id, payload)?;
    user(&request_id, &req.user_id)?;
    respond(&request_id, state.service.play_coinflip(&req.user_id, req.bet, req.choice))
}

/// POST /api/slots/play
pub async fn slots_play_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SlotsPlayRequest>, JsonRejection>,
) -> ApiResult<RoundSettlement> {
    let req = body(&request_id, payload)?;
    user(&request_id, &req.user_id)?;
    respond(&request_id, state.service.play_slots(&req.user_id, req.bet))
}

/// POST /api/crash/play
pub async fn crash_play_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CrashPlayRequest>, JsonRejection>,
) -> ApiResult<RoundSettlement> {
    let req = body(&request_id, payload)?;
    user(&request_id, &req.user_id)?;
    respond(&request_id, state.service.play_crash(&req.user_id, req.bet, req.target))
}

// Mines

/// POST /api/mines/start
pub async fn mines_start_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MinesStartRequest>, JsonRejection>,
) -> ApiResult<MinesView> {
    let req = body(&request_id, payload)?;
    user(&request_id, &req.user_id)?;
    respond(&request_id, state.service.start_mines(&req.user_id, req.bet, req.mine_count))
}

/// POST /api/mines/reveal
pub async fn mines_reveal_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MinesRevealRequest>, JsonRejection>,
) -> ApiResult<RoundUpdate<MinesView>> {
    let req = body(&request_id, payload)?;
    respond(&request_id, state.service.reveal_mine_tile(&req.user_id, req.tile))
}

/// POST /api/mines/cashout
pub async fn mines_cashout_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> ApiResult<RoundSettlement> {
    let req = body(&request_id, payload)?;
    respond(&request_id, state.service.cash_out_mines(&req.user_id))
}

// Towers

/// POST /api/towers/start
pub async fn towers_start_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TowersStartRequest>, JsonRejection>,
) -> ApiResult<TowersView> {
    let req = body(&request_id, payload)?;
    user(&request_id, &req.user_id)?;
    respond(&request_id, state.service.start_towers(&req.user_id, req.bet, req.difficulty))
}

/// POST /api/towers/climb
pub async fn towers_climb_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TowersClimbRequest>, JsonRejection>,
) -> ApiResult<RoundUpdate<TowersView>> {
    let req = body(&request_id, payload)?;
    respond(&request_id, state.service.climb_tower(&req.user_id, req.column))
}

/// POST /api/towers/cashout
pub async fn towers_cashout_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> ApiResult<RoundSettlement> {
    let req = body(&request_id, payload)?;
    respond(&request_id, state.service.cash_out_towers(&req.user_id))
}

// Blackjack

/// POST /api/blackjack/start
pub async fn blackjack_start_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BlackjackStartRequest>, JsonRejection>,
) -> ApiResult<RoundUpdate<BlackjackView>> {
    let req = body(&request_id, payload)?;
    user(&request_id, &req.user_id)?;
    respond(&request_id, state.service.start_blackjack(&req.user_id, req.bet))
}

/// POST /api/blackjack/hit
pub async fn blackjack_hit_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> ApiResult<RoundUpdate<BlackjackView>> {
    let req = body(&request_id, payload)?;
    respond(&request_id, state.service.blackjack_hit(&req.user_id))
}

/// POST /api/blackjack/stand
pub async fn blackjack_stand_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> ApiResult<RoundUpdate<BlackjackView>> {
    let req = body(&request_id, payload)?;
    respond(&request_id, state.service.blackjack_stand(&req.user_id))
}

/// POST /api/blackjack/double
pub async fn blackjack_double_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> ApiResult<RoundUpdate<BlackjackView>> {
    let req = body(&request_id, payload)?;
    respond(&request_id, state.service.blackjack_double(&req.user_id))
}

// Chicken Run

/// POST /api/chicken/start
pub async fn chicken_start_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChickenStartRequest>, JsonRejection>,
) -> ApiResult<ChickenView> {
    let req = body(&request_id, payload)?;
    user(&request_id, &req.user_id)?;
    respond(&request_id, state.service.start_chicken(&req.user_id, req.bet, req.difficulty))
}

/// POST /api/chicken/step
pub async fn chicken_step_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> ApiResult<RoundUpdate<ChickenView>> {
    let req = body(&request_id, payload)?;
    respond(&request_id, state.service.chicken_step(&req.user_id))
}

/// POST /api/chicken/cashout
pub async fn chicken_cashout_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> ApiResult<RoundSettlement> {
    let req = body(&request_id, payload)?;
    respond(&request_id, state.service.cash_out_chicken(&req.user_id))
}
