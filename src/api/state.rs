use std::sync::Arc;

use crate::services::{CourseCatalog, RecommendationEngine, Scorer};

/// Shared, read-only application state
///
/// Built once at startup; the catalog and scorer are never mutated, so
/// handlers share them without locking.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CourseCatalog>,
    pub engine: Arc<RecommendationEngine>,
}

impl AppState {
    pub fn new(catalog: CourseCatalog, scorer: Arc<dyn Scorer>) -> Self {
        let catalog = Arc::new(catalog);
        let engine = Arc::new(RecommendationEngine::new(catalog.clone(), scorer));
        Self { catalog, engine }
    }
}
