//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing).

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Read-only GET endpoints; the dashboard is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let lifecycle = Router::new()
        .route("/timeline", get(handlers::get_timeline))
        .route("/timeline/export", get(handlers::export_spreadsheet))
        .route("/timeline/export-pdf", get(handlers::export_document));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/lifecycle", lifecycle)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
