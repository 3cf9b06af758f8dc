//! Feature transformation and relevance prediction.
//!
//! The [`Scorer`] trait is the seam between the recommendation engine and the
//! fitted model. [`ArtifactScorer`] is the production implementation, built
//! from a JSON preprocessor artifact and an ONNX classifier artifact.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::{Array2, ArrayView1};

use crate::models::{CourseRecord, UserProfile};

pub mod model;
pub mod preprocessor;

pub use model::Classifier;
pub use preprocessor::{ColumnTransformer, Preprocessor};

/// Failure to turn feature rows into a numeric matrix
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("required column `{0}` is absent")]
    MissingColumn(String),

    #[error("column `{column}` must hold {expected} values")]
    WrongType {
        column: String,
        expected: &'static str,
    },

    #[error("column `{0}` has no value")]
    MissingValue(String),

    #[error("could not build feature matrix: {0}")]
    Shape(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    #[error("Cannot predict on an empty feature matrix")]
    EmptyInput,

    #[error("Feature matrix has {found} columns, model expects {expected}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("Invalid model artifact {path}: {reason}")]
    Artifact { path: String, reason: String },

    #[error("Model inference failed: {0}")]
    Inference(String),
}

/// A value read out of a [`FeatureRow`] column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Text(&'a str),
    Number(f64),
    Missing,
}

/// One candidate course joined with the requesting user's profile
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub course: CourseRecord,
    /// Description, tags and category joined by single spaces
    pub content_features: String,
    pub user_id: String,
    pub total_courses_taken: u32,
    pub avg_rating: f64,
}

impl FeatureRow {
    pub fn new(course: CourseRecord, content_features: String, user: &UserProfile) -> Self {
        Self {
            course,
            content_features,
            user_id: user.user_id.clone(),
            total_courses_taken: user.total_courses_taken,
            avg_rating: user.avg_rating,
        }
    }

    /// Looks up a column by name; `None` when the row has no such column
    pub fn column(&self, name: &str) -> Option<FeatureValue<'_>> {
        let value = match name {
            "CourseID" => FeatureValue::Text(&self.course.course_id),
            "CourseTitle" => FeatureValue::Text(&self.course.title),
            "Description" => text_or_missing(&self.course.description),
            "Tags" => text_or_missing(&self.course.tags),
            "Category" => text_or_missing(&self.course.category),
            "Duration" => FeatureValue::Text(&self.course.duration),
            "DifficultyLevel" => FeatureValue::Text(&self.course.difficulty_level),
            "CourseRating" => self
                .course
                .rating()
                .map_or(FeatureValue::Missing, FeatureValue::Number),
            "content_features" => FeatureValue::Text(&self.content_features),
            "UserID" => FeatureValue::Text(&self.user_id),
            "total_courses_taken" => FeatureValue::Number(f64::from(self.total_courses_taken)),
            "avg_rating" => FeatureValue::Number(self.avg_rating),
            _ => return None,
        };

        Some(value)
    }
}

fn text_or_missing(value: &Option<String>) -> FeatureValue<'_> {
    match value {
        Some(value) => FeatureValue::Text(value),
        None => FeatureValue::Missing,
    }
}

/// Dense numeric features, one row per candidate
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix(Array2<f64>);

impl FeatureMatrix {
    pub fn new(values: Array2<f64>) -> Self {
        Self(values)
    }

    pub fn nrows(&self) -> usize {
        self.0.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.0.ncols()
    }

    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.0.rows().into_iter()
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.0
    }
}

/// Fitted feature transformer plus binary classifier
///
/// Both operations are pure: identical input yields identical output and the
/// fitted parameters never change after construction.
#[cfg_attr(test, mockall::automock)]
pub trait Scorer: Send + Sync {
    /// Encodes feature rows into a numeric matrix, preserving row order
    fn transform(&self, rows: &[FeatureRow]) -> Result<FeatureMatrix, ScoringError>;

    /// Positive-class probability for each matrix row, in row order
    fn predict_probability(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ScoringError>;
}

/// Scorer backed by on-disk preprocessor and classifier artifacts
#[derive(Debug, Clone)]
pub struct ArtifactScorer {
    preprocessor: Preprocessor,
    model: Classifier,
}

impl ArtifactScorer {
    /// Pairs a preprocessor with a classifier, checking that the
    /// preprocessor's output width is what the classifier consumes
    pub fn new(preprocessor: Preprocessor, model: Classifier) -> Result<Self, ScoringError> {
        let width = preprocessor.output_width();
        if width != model.num_features() {
            return Err(ScoringError::ShapeMismatch {
                expected: model.num_features(),
                found: width,
            });
        }

        Ok(Self {
            preprocessor,
            model,
        })
    }

    /// Loads both artifacts; the preprocessor is validated as it is parsed
    pub fn load(
        preprocessor_path: impl AsRef<Path>,
        model_path: impl AsRef<Path>,
    ) -> Result<Self, ScoringError> {
        let preprocessor_path = preprocessor_path.as_ref();
        let model_path = model_path.as_ref();

        let preprocessor = read_preprocessor(preprocessor_path)?;
        let model = Classifier::load(model_path)?;

        tracing::info!(
            preprocessor = %preprocessor_path.display(),
            model = %model_path.display(),
            features = model.num_features(),
            "Model artifacts loaded"
        );

        Self::new(preprocessor, model)
    }
}

impl Scorer for ArtifactScorer {
    fn transform(&self, rows: &[FeatureRow]) -> Result<FeatureMatrix, ScoringError> {
        Ok(self.preprocessor.transform(rows)?)
    }

    fn predict_probability(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ScoringError> {
        self.model.predict_probability(matrix)
    }
}

fn read_preprocessor(path: &Path) -> Result<Preprocessor, ScoringError> {
    let artifact_error = |reason: String| ScoringError::Artifact {
        path: path.display().to_string(),
        reason,
    };

    let file = File::open(path).map_err(|e| artifact_error(e.to_string()))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| artifact_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(description: Option<&str>, rating: Option<f64>) -> FeatureRow {
        let course = CourseRecord {
            course_id: "C1".to_string(),
            title: "Intro".to_string(),
            description: description.map(str::to_string),
            tags: None,
            category: Some("Programming".to_string()),
            duration: "3 weeks".to_string(),
            difficulty_level: "Beginner".to_string(),
            rating,
        };
        let user = UserProfile {
            user_id: "u1".to_string(),
            total_courses_taken: 7,
            avg_rating: 3.9,
        };
        FeatureRow::new(course, "intro programming".to_string(), &user)
    }

    #[test]
    fn test_column_lookup() {
        let row = row(None, Some(4.0));
        assert_eq!(row.column("UserID"), Some(FeatureValue::Text("u1")));
        assert_eq!(row.column("total_courses_taken"), Some(FeatureValue::Number(7.0)));
        assert_eq!(row.column("CourseRating"), Some(FeatureValue::Number(4.0)));
        assert_eq!(row.column("Description"), Some(FeatureValue::Missing));
        assert_eq!(
            row.column("content_features"),
            Some(FeatureValue::Text("intro programming"))
        );
        assert_eq!(row.column("Instructor"), None);
    }

    fn shipped_model() -> Classifier {
        let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("artifacts/course_recommender.onnx");
        Classifier::load(path).unwrap()
    }

    fn preprocessor(value: serde_json::Value) -> Preprocessor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_width_mismatch_is_rejected() {
        let preprocessor = preprocessor(json!({
            "transformers": [
                { "kind": "passthrough", "columns": ["avg_rating"] }
            ]
        }));

        let result = ArtifactScorer::new(preprocessor, shipped_model());
        assert_eq!(
            result.err(),
            Some(ScoringError::ShapeMismatch {
                expected: 16,
                found: 1
            })
        );
    }

    #[test]
    fn test_artifact_scorer_end_to_end() {
        let preprocessor = preprocessor(json!({
            "transformers": [
                { "kind": "passthrough", "columns": ["avg_rating"] },
                { "kind": "one_hot", "column": "DifficultyLevel",
                  "categories": ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o"] }
            ]
        }));
        let scorer = ArtifactScorer::new(preprocessor, shipped_model()).unwrap();

        let matrix = scorer
            .transform(&[row(Some("x"), None), row(None, Some(1.0))])
            .unwrap();
        assert_eq!(matrix.ncols(), 16);

        let scores = scorer.predict_probability(&matrix).unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
        assert_eq!(scores[0], scores[1]);
    }

    #[test]
    fn test_unvalidated_preprocessor_cannot_be_built() {
        let result: Result<Preprocessor, _> = serde_json::from_value(json!({
            "transformers": [
                { "kind": "tfidf", "column": "content_features",
                  "vocabulary": { "python": 5 }, "idf": [1.0] }
            ]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_artifact_fails() {
        let result = ArtifactScorer::load("/nope/preprocessor.json", "/nope/model.onnx");
        assert!(matches!(result, Err(ScoringError::Artifact { .. })));
    }
}
