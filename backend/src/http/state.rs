//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for storage operations
    pub repository: Arc<dyn FullRepository>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, config: AppConfig) -> Self {
        Self {
            repository,
            config: Arc::new(config),
        }
    }
}
