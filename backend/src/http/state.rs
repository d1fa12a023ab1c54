//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::LifecycleRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository the timeline is read from
    pub repository: Arc<dyn LifecycleRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn LifecycleRepository>) -> Self {
        Self { repository }
    }
}
