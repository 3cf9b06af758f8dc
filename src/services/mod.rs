pub mod catalog;
pub mod recommendations;
pub mod scorer;

pub use catalog::CourseCatalog;
pub use recommendations::RecommendationEngine;
pub use scorer::{ArtifactScorer, Scorer};
