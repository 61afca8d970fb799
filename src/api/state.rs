use std::sync::Arc;

use crate::services::RecommendationEngine;

/// Shared application state
///
/// Everything behind it is loaded once at startup and only read afterwards,
/// so handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
}

impl AppState {
    pub fn new(engine: RecommendationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
