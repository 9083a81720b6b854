//! API Error Handling
//!
//! Structured error responses with HTTP status codes and request tracking.

use crate::errors::{CasinoError, SessionError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// NOT_FOUND, BAD_REQUEST, CONFLICT, SERVICE_UNAVAILABLE, INTERNAL_ERROR
    pub code: String,
    pub message: String,
}

/// API error types with request tracking
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub request_id: String,
}

#[derive(Debug)]
pub enum ApiErrorKind {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    InternalError(String),
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn not_found(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::NotFound(message),
            request_id,
        }
    }

    pub fn bad_request(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::BadRequest(message),
            request_id,
        }
    }

    pub fn conflict(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::Conflict(message),
            request_id,
        }
    }

    pub fn internal_error(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::InternalError(message),
            request_id,
        }
    }

    pub fn service_unavailable(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::ServiceUnavailable(message),
            request_id,
        }
    }

    /// Map a service error onto its HTTP meaning.
    pub fn from_casino(request_id: String, err: CasinoError) -> Self {
        let message = err.to_string();
        match err {
            CasinoError::Game(_) => Self::bad_request(request_id, message),
            CasinoError::Session(SessionError::RoundInProgress { .. }) => Self::conflict(request_id, message),
            CasinoError::Session(SessionError::NoActiveRound { .. }) => Self::not_found(request_id, message),
            CasinoError::Entropy(_) => {
                tracing::error!(request_id = %request_id, "{}", message);
                Self::service_unavailable(request_id, message)
            }
            CasinoError::Configuration(_) | CasinoError::Monitoring(_) => {
                tracing::error!(request_id = %request_id, "{}", message);
                Self::internal_error(request_id, message)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            ApiErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            ApiErrorKind::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiErrorKind::Conflict(_) => StatusCode::CONFLICT,
            ApiErrorKind::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorKind::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ApiErrorKind::NotFound(msg) => write!(f, "[{}] Not Found: {}", self.request_id, msg),
            ApiErrorKind::BadRequest(msg) => write!(f, "[{}] Bad Request: {}", self.request_id, msg),
            ApiErrorKind::Conflict(msg) => write!(f, "[{}] Conflict: {}", self.request_id, msg),
            ApiErrorKind::InternalError(msg) => write!(f, "[{}] Internal Error: {}", self.request_id, msg),
            ApiErrorKind::ServiceUnavailable(msg) => {
                write!(f, "[{}] Service Unavailable: {}", self.request_id, msg)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self.kind {
            ApiErrorKind::NotFound(msg) => ("NOT_FOUND", msg),
            ApiErrorKind::BadRequest(msg) => ("BAD_REQUEST", msg),
            ApiErrorKind::Conflict(msg) => ("CONFLICT", msg),
            ApiErrorKind::InternalError(msg) => ("INTERNAL_ERROR", msg),
            ApiErrorKind::ServiceUnavailable(msg) => ("SERVICE_UNAVAILABLE", msg),
        };

        let body = Json(ErrorResponse {
            request_id: self.request_id,
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{EntropyError, GameError};
    use crate::games::GameType;

    #[test]
    fn test_casino_error_status_mapping() {
        let rid = || "req-1".to_string();

        let err = ApiError::from_casino(rid(), GameError::ActionNotAllowed("cash out first".into()).into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from_casino(
            rid(),
            SessionError::RoundInProgress {
                user_id: "u".into(),
                game: GameType::Mines,
            }
            .into(),
        );
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = ApiError::from_casino(
            rid(),
            SessionError::NoActiveRound {
                user_id: "u".into(),
                game: GameType::Towers,
            }
            .into(),
        );
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ApiError::from_casino(rid(), EntropyError("gone".into()).into());
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
