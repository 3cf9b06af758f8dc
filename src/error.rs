use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::scorer::ScoringError;

/// Per-request errors
///
/// Every variant is reported to the client the same way: a 500 carrying the
/// error message as `detail`. Malformed input and scoring failures are not
/// distinguished on the wire.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        tracing::error!(error = %message, "Request failed");

        let body = Json(json!({
            "detail": message
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scorer::FeatureError;

    #[test]
    fn test_all_variants_render_as_internal_error() {
        let errors = vec![
            AppError::InvalidInput("num_recommendations must be positive".to_string()),
            AppError::Scoring(ScoringError::EmptyInput),
            AppError::Internal("boom".to_string()),
        ];

        for error in errors {
            let response = error.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_scoring_error_message_is_preserved() {
        let error: AppError =
            ScoringError::Feature(FeatureError::MissingColumn("avg_rating".to_string())).into();
        assert!(error.to_string().contains("avg_rating"));
    }
}
