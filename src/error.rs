// src/error.rs
//! Typed failures for each pipeline stage plus the HTTP-facing error.
//!
//! Stage errors never reach a client of the briefing endpoints: the
//! orchestrator maps them to safe defaults. Only explicit verify/AI requests
//! surface `ApiError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// One provider endpoint call failed.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// One link probe attempt failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VerifyError {
    #[error("probe request failed: {0}")]
    Transport(String),

    #[error("probe rejected with HTTP status {0}")]
    Status(u16),
}

impl From<reqwest::Error> for VerifyError {
    fn from(err: reqwest::Error) -> Self {
        VerifyError::Transport(err.to_string())
    }
}

/// Generative-AI call failed or was not possible.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichError {
    #[error("generative AI credential not configured")]
    NotConfigured,

    #[error("AI request failed: {0}")]
    Transport(String),

    #[error("AI backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("AI backend returned no content")]
    EmptyResponse,

    #[error("AI reply could not be parsed: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for EnrichError {
    fn from(err: reqwest::Error) -> Self {
        EnrichError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for EnrichError {
    fn from(err: serde_json::Error) -> Self {
        EnrichError::Parse(err.to_string())
    }
}

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Route-level failure.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    /// The cause is logged server-side; the client sees a fixed message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(cause) => {
                tracing::error!(%cause, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}
