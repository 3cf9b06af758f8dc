use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{CourseInfo, RecommendationRequest, RecommendationResponse},
    services::catalog::DEFAULT_LISTING_LIMIT,
};

use super::extract::{AppJson, AppQuery};
use super::AppState;

// Request/Response types

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub message: String,
    pub model_loaded: bool,
    pub courses_loaded: bool,
}

#[derive(Debug, Deserialize)]
pub struct CoursesQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LISTING_LIMIT
}

// Handlers

/// Service status: whether the model and a non-empty catalog are loaded
pub async fn root(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Course Recommendation Service is running".to_string(),
        // The scorer is constructed before the router, so it is always present
        model_loaded: true,
        courses_loaded: !state.catalog.is_empty(),
    })
}

/// Ranked course recommendations for one user
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppJson(request): AppJson<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %request.user_profile.user_id,
        num_recommendations = request.num_recommendations,
        "Processing recommendation request"
    );

    let response = state.engine.recommend(&request)?;
    Ok(Json(response))
}

/// The first `limit` catalog courses in catalog order
pub async fn list_courses(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CoursesQuery>,
) -> Json<Vec<CourseInfo>> {
    let courses = state
        .catalog
        .all(query.limit)
        .iter()
        .map(CourseInfo::from)
        .collect();
    Json(courses)
}

/// Recommendations for several users, processed one after another
///
/// A failure on any item fails the whole batch.
pub async fn batch_recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppJson(requests): AppJson<Vec<RecommendationRequest>>,
) -> AppResult<Json<Vec<RecommendationResponse>>> {
    tracing::info!(
        request_id = %request_id,
        batch_size = requests.len(),
        "Processing batch recommendation request"
    );

    let responses = state.engine.recommend_batch(&requests)?;
    Ok(Json(responses))
}
