//! HTTP error handling and response types.
//!
//! Callers only ever see a stable code and a generic message; the underlying
//! error is logged here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::export::RenderError;
use crate::services::TimelineError;

pub const UPSTREAM_FETCH_FAILURE: &str = "UPSTREAM_FETCH_FAILURE";
pub const RENDER_FAILURE: &str = "RENDER_FAILURE";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Always `false`
    pub success: bool,
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Lifecycle data could not be fetched
    Upstream(RepositoryError),
    /// An export could not be serialized
    Render(RenderError),
    /// Anything else
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error = match self {
            AppError::Upstream(e) => {
                tracing::error!(error = %e, retryable = e.is_retryable(), "lifecycle fetch failed");
                ApiError::new(UPSTREAM_FETCH_FAILURE, "Gagal mengambil data timeline")
            }
            AppError::Render(e) => {
                tracing::error!(error = %e, "export rendering failed");
                ApiError::new(RENDER_FAILURE, "Gagal membuat file export")
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                ApiError::new(INTERNAL_ERROR, "Terjadi kesalahan internal")
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Upstream(err)
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Render(err)
    }
}

impl From<TimelineError> for AppError {
    fn from(err: TimelineError) -> Self {
        match err {
            TimelineError::Fetch(e) => AppError::Upstream(e),
            TimelineError::Render(e) => AppError::Render(e),
            TimelineError::Join(e) => AppError::Internal(e.to_string()),
        }
    }
}
