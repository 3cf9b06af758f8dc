use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CourseInfo;

/// Per-request description of the user being served
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    #[serde(rename = "UserID")]
    pub user_id: String,
    pub total_courses_taken: u32,
    pub avg_rating: f64,
}

/// Request for a ranked list of courses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationRequest {
    pub user_profile: UserProfile,
    pub course_profile: CourseInfo,
    #[serde(default = "default_num_recommendations")]
    pub num_recommendations: usize,
    /// Accepted for compatibility. No taken-courses data is available, so
    /// this does not affect candidate selection.
    #[serde(default = "default_exclude_taken_courses")]
    pub exclude_taken_courses: bool,
}

fn default_num_recommendations() -> usize {
    10
}

fn default_exclude_taken_courses() -> bool {
    true
}

/// A single ranked course returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedCourse {
    pub course_id: String,
    pub course_title: String,
    pub score: f64,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub category: Option<String>,
    pub rating: Option<f64>,
}

/// Ranked recommendations for one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub user_id: String,
    pub recommendations: Vec<RecommendedCourse>,
    pub timestamp: DateTime<Utc>,
}
