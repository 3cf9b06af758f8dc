use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_span, tag_request};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/recommend", post(handlers::recommend))
        .route("/courses", get(handlers::list_courses))
        .route("/batch-recommend", post(handlers::batch_recommend))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(tag_request))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(CorsLayer::very_permissive()),
        )
        .with_state(state)
}
