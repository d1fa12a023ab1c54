//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! timeline services.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{HealthResponse, TimelineApiResponse};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::export::ExportFormat;
use crate::services::timeline::{self, RenderedExport};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            "error".to_string()
        }
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Lifecycle timeline
// =============================================================================

/// GET /api/lifecycle/timeline
///
/// Chart datasets grouped by stage and month.
pub async fn get_timeline(State(state): State<AppState>) -> HandlerResult<TimelineApiResponse> {
    let data = timeline::get_timeline_data(state.repository.as_ref()).await?;
    Ok(Json(TimelineApiResponse {
        success: true,
        data,
    }))
}

/// GET /api/lifecycle/timeline/export
pub async fn export_spreadsheet(State(state): State<AppState>) -> Result<Response, AppError> {
    let export = timeline::export_timeline(state.repository.as_ref(), ExportFormat::Spreadsheet).await?;
    Ok(download(export))
}

/// GET /api/lifecycle/timeline/export-pdf
pub async fn export_document(State(state): State<AppState>) -> Result<Response, AppError> {
    let export = timeline::export_timeline(state.repository.as_ref(), ExportFormat::Document).await?;
    Ok(download(export))
}

fn download(export: RenderedExport) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    (
        [
            (header::CONTENT_TYPE, export.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.bytes,
    )
        .into_response()
}
