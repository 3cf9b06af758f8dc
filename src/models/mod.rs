pub mod course;
pub mod recommendation;

pub use course::{CourseInfo, CourseRecord};
pub use recommendation::{
    RecommendationRequest, RecommendationResponse, RecommendedCourse, UserProfile,
};
