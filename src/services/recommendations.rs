use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        CourseRecord, RecommendationRequest, RecommendationResponse, RecommendedCourse,
        UserProfile,
    },
    services::{
        catalog::CourseCatalog,
        scorer::{FeatureRow, Scorer},
    },
};

/// A catalog course paired with its predicted relevance
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub course: &'a CourseRecord,
    pub predicted_score: f64,
}

impl From<ScoredCandidate<'_>> for RecommendedCourse {
    fn from(candidate: ScoredCandidate<'_>) -> Self {
        let course = candidate.course;
        Self {
            course_id: course.course_id.clone(),
            course_title: course.title.clone(),
            score: candidate.predicted_score,
            description: course.description.clone(),
            tags: course.tags.clone(),
            category: course.category.clone(),
            rating: course.rating(),
        }
    }
}

/// Ranks catalog courses for a user with the fitted scorer
///
/// Every request scores the whole catalog. The catalog supports filtering by
/// course id, but requests carry no candidate list, so no filter is applied.
pub struct RecommendationEngine {
    catalog: Arc<CourseCatalog>,
    scorer: Arc<dyn Scorer>,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<CourseCatalog>, scorer: Arc<dyn Scorer>) -> Self {
        Self { catalog, scorer }
    }

    /// Produces the top `num_recommendations` courses for one request
    ///
    /// Any failure aborts the request; no partial ranking is returned.
    /// `exclude_taken_courses` has no effect since no history of taken
    /// courses is available.
    pub fn recommend(&self, request: &RecommendationRequest) -> AppResult<RecommendationResponse> {
        let start = Instant::now();
        let profile = &request.user_profile;

        if request.num_recommendations == 0 {
            return Err(AppError::InvalidInput(
                "num_recommendations must be greater than zero".to_string(),
            ));
        }

        let candidates = self.catalog.filter_by_ids(None);
        let rows = assemble_features(&candidates, profile);

        let matrix = self.scorer.transform(&rows)?;
        let scores = self.scorer.predict_probability(&matrix)?;

        if scores.len() != candidates.len() {
            return Err(AppError::Internal(format!(
                "scorer returned {} scores for {} candidates",
                scores.len(),
                candidates.len()
            )));
        }

        let scored = candidates
            .into_iter()
            .zip(scores)
            .map(|(course, predicted_score)| ScoredCandidate {
                course,
                predicted_score,
            })
            .collect();

        let recommendations: Vec<RecommendedCourse> = rank(scored, request.num_recommendations)
            .into_iter()
            .map(RecommendedCourse::from)
            .collect();

        tracing::info!(
            user_id = %profile.user_id,
            candidates = rows.len(),
            recommendations = recommendations.len(),
            exclude_taken_courses = request.exclude_taken_courses,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Generated recommendations"
        );

        Ok(RecommendationResponse {
            user_id: profile.user_id.clone(),
            recommendations,
            timestamp: Utc::now(),
        })
    }

    /// Runs each request in order; the first failure fails the whole batch
    pub fn recommend_batch(
        &self,
        requests: &[RecommendationRequest],
    ) -> AppResult<Vec<RecommendationResponse>> {
        requests.iter().map(|request| self.recommend(request)).collect()
    }
}

/// Text feature for a course: description, tags and category joined by
/// single spaces, with missing values treated as empty
pub fn content_features(course: &CourseRecord) -> String {
    [&course.description, &course.tags, &course.category]
        .iter()
        .map(|value| value.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One feature row per candidate, each carrying the same user columns
fn assemble_features(candidates: &[&CourseRecord], profile: &UserProfile) -> Vec<FeatureRow> {
    candidates
        .iter()
        .map(|&course| FeatureRow::new(course.clone(), content_features(course), profile))
        .collect()
}

/// Highest scores first, ties kept in catalog order, truncated to `limit`
fn rank(mut scored: Vec<ScoredCandidate<'_>>, limit: usize) -> Vec<ScoredCandidate<'_>> {
    // sort_by is stable; NaN compares equal so it never reorders neighbours
    scored.sort_by(|a, b| {
        b.predicted_score
            .partial_cmp(&a.predicted_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(limit);
    scored
}
