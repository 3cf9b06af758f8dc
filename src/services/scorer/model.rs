//! Binary classifier inference.
//!
//! Runs an ONNX-exported classifier (e.g. a LightGBM model converted with
//! `zipmap` disabled) through tract-onnx. The graph takes one `float32`
//! input of shape `N × width` and its last output holds class probabilities,
//! one column per class; the last column is the positive class.

use std::path::Path;
use std::sync::Arc;

use tract_onnx::prelude::*;
use tract_onnx::tract_hir::internal::DimLike;

use super::{FeatureMatrix, ScoringError};

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A loaded, optimised classifier graph
#[derive(Clone)]
pub struct Classifier {
    plan: Arc<OnnxPlan>,
    num_features: usize,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("num_features", &self.num_features)
            .finish()
    }
}

impl Classifier {
    /// Loads the ONNX graph and reads its input width off the input fact
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScoringError> {
        let path = path.as_ref();
        let artifact_error = |reason: String| ScoringError::Artifact {
            path: path.display().to_string(),
            reason,
        };

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.into_typed())
            .map_err(|e| artifact_error(e.to_string()))?;

        let num_features = input_width(&model).map_err(artifact_error)?;

        let plan = model
            .into_optimized()
            .and_then(|model| model.into_runnable())
            .map_err(|e| artifact_error(e.to_string()))?;

        tracing::debug!(path = %path.display(), num_features, "Loaded ONNX classifier");

        Ok(Self {
            plan: Arc::new(plan),
            num_features,
        })
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Probability of the positive class for every row, in row order
    pub fn predict_probability(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ScoringError> {
        let rows = matrix.nrows();
        if rows == 0 {
            return Err(ScoringError::EmptyInput);
        }
        if matrix.ncols() != self.num_features {
            return Err(ScoringError::ShapeMismatch {
                expected: self.num_features,
                found: matrix.ncols(),
            });
        }

        let values = matrix.as_array();
        let input = tract_ndarray::Array2::from_shape_fn((rows, self.num_features), |(i, j)| {
            values[[i, j]] as f32
        });

        let outputs = self
            .plan
            .run(tvec![Tensor::from(input).into()])
            .map_err(|e| ScoringError::Inference(e.to_string()))?;

        let probabilities = outputs
            .last()
            .ok_or_else(|| ScoringError::Inference("model produced no outputs".to_string()))?
            .to_array_view::<f32>()
            .map_err(|e| ScoringError::Inference(e.to_string()))?
            .into_dimensionality::<tract_ndarray::Ix2>()
            .map_err(|e| ScoringError::Inference(format!("probability output: {}", e)))?;

        let (out_rows, classes) = probabilities.dim();
        if out_rows != rows || classes == 0 {
            return Err(ScoringError::Inference(format!(
                "expected {} probability rows, model returned {}x{}",
                rows, out_rows, classes
            )));
        }

        Ok(probabilities
            .column(classes - 1)
            .iter()
            .map(|&p| f64::from(p))
            .collect())
    }
}

/// Feature count the graph consumes: the last axis of its first input
fn input_width(model: &TypedModel) -> Result<usize, String> {
    let fact = model.input_fact(0).map_err(|e| e.to_string())?;
    let width = fact
        .shape
        .last()
        .ok_or_else(|| "model input has no dimensions".to_string())?;

    width
        .to_usize()
        .map_err(|_| format!("model input width `{}` is not a fixed size", width))
}
