//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::scheduler::SchedulingEngine;
use crate::services::ImportService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for storage operations
    pub repository: Arc<dyn FullRepository>,
    /// Availability scheduling engine
    pub engine: Arc<SchedulingEngine>,
    /// Listing import pipeline
    pub importer: Arc<ImportService>,
}

impl AppState {
    /// Wire the state from a repository handle.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        let engine = Arc::new(SchedulingEngine::new(repository.clone()));
        let importer = Arc::new(ImportService::new(repository.clone()));
        Self {
            repository,
            engine,
            importer,
        }
    }
}
