//! Fitted column transformer.
//!
//! A [`Preprocessor`] is an ordered list of column transformers. Each one
//! reads one or more named columns from a [`FeatureRow`] and writes a fixed
//! number of output values; the outputs are concatenated left to right to
//! form one matrix row.

use std::collections::HashMap;

use ndarray::Array2;
use serde::Deserialize;

use super::{FeatureError, FeatureMatrix, FeatureRow, FeatureValue};

/// Validated on construction, including when deserialized
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawPreprocessor")]
pub struct Preprocessor {
    transformers: Vec<ColumnTransformer>,
}

#[derive(Deserialize)]
struct RawPreprocessor {
    transformers: Vec<ColumnTransformer>,
}

impl TryFrom<RawPreprocessor> for Preprocessor {
    type Error = String;

    fn try_from(raw: RawPreprocessor) -> Result<Self, Self::Error> {
        Self::new(raw.transformers)
    }
}

/// A single fitted transformation over named input columns
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnTransformer {
    /// Term-frequency × inverse-document-frequency over a text column,
    /// L2-normalised per row
    Tfidf {
        column: String,
        vocabulary: HashMap<String, usize>,
        idf: Vec<f64>,
    },
    /// `(x - mean) / scale` for each numeric column
    StandardScaler {
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    /// One indicator per known category; unknown or missing values encode as
    /// all zeros
    OneHot {
        column: String,
        categories: Vec<String>,
    },
    /// Numeric columns copied through unchanged; missing values become NaN
    Passthrough { columns: Vec<String> },
}

impl ColumnTransformer {
    /// Number of output values this transformer writes per row
    pub fn width(&self) -> usize {
        match self {
            ColumnTransformer::Tfidf { idf, .. } => idf.len(),
            ColumnTransformer::StandardScaler { columns, .. } => columns.len(),
            ColumnTransformer::OneHot { categories, .. } => categories.len(),
            ColumnTransformer::Passthrough { columns } => columns.len(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            ColumnTransformer::Tfidf {
                column,
                vocabulary,
                idf,
            } => {
                if let Some((term, index)) = vocabulary.iter().find(|(_, index)| **index >= idf.len())
                {
                    return Err(format!(
                        "tfidf on `{}`: term `{}` maps to index {} but only {} idf weights exist",
                        column,
                        term,
                        index,
                        idf.len()
                    ));
                }
                Ok(())
            }
            ColumnTransformer::StandardScaler {
                columns,
                mean,
                scale,
            } => {
                if mean.len() != columns.len() || scale.len() != columns.len() {
                    return Err(format!(
                        "standard_scaler: {} columns but {} means and {} scales",
                        columns.len(),
                        mean.len(),
                        scale.len()
                    ));
                }
                Ok(())
            }
            ColumnTransformer::OneHot { .. } | ColumnTransformer::Passthrough { .. } => Ok(()),
        }
    }

    fn write_row(&self, row: &FeatureRow, out: &mut Vec<f64>) -> Result<(), FeatureError> {
        match self {
            ColumnTransformer::Tfidf {
                column,
                vocabulary,
                idf,
            } => {
                let text = match lookup(row, column)? {
                    FeatureValue::Text(text) => text,
                    FeatureValue::Missing => return Err(FeatureError::MissingValue(column.clone())),
                    FeatureValue::Number(_) => return Err(wrong_type(column, "text")),
                };

                let start = out.len();
                out.resize(start + idf.len(), 0.0);
                let block = &mut out[start..];

                for token in tokenize(text) {
                    if let Some(&index) = vocabulary.get(&token) {
                        block[index] += idf[index];
                    }
                }

                let norm = block.iter().map(|v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    block.iter_mut().for_each(|v| *v /= norm);
                }
            }
            ColumnTransformer::StandardScaler {
                columns,
                mean,
                scale,
            } => {
                for ((column, mean), scale) in columns.iter().zip(mean).zip(scale) {
                    let value = numeric(row, column)?;
                    let scale = if *scale == 0.0 { 1.0 } else { *scale };
                    out.push((value - mean) / scale);
                }
            }
            ColumnTransformer::OneHot { column, categories } => {
                let value = match lookup(row, column)? {
                    FeatureValue::Text(text) => Some(text),
                    FeatureValue::Missing => None,
                    FeatureValue::Number(_) => return Err(wrong_type(column, "text")),
                };
                out.extend(
                    categories
                        .iter()
                        .map(|category| if Some(category.as_str()) == value { 1.0 } else { 0.0 }),
                );
            }
            ColumnTransformer::Passthrough { columns } => {
                for column in columns {
                    out.push(numeric(row, column)?);
                }
            }
        }

        Ok(())
    }
}

impl Preprocessor {
    pub fn new(transformers: Vec<ColumnTransformer>) -> Result<Self, String> {
        let preprocessor = Self { transformers };
        preprocessor.validate()?;
        Ok(preprocessor)
    }

    /// Checks the fitted parameters for internal consistency
    fn validate(&self) -> Result<(), String> {
        self.transformers.iter().try_for_each(ColumnTransformer::validate)
    }

    /// Total number of matrix columns produced per row
    pub fn output_width(&self) -> usize {
        self.transformers.iter().map(ColumnTransformer::width).sum()
    }

    pub fn transform(&self, rows: &[FeatureRow]) -> Result<FeatureMatrix, FeatureError> {
        let width = self.output_width();
        let mut values = Vec::with_capacity(rows.len() * width);

        for row in rows {
            for transformer in &self.transformers {
                transformer.write_row(row, &mut values)?;
            }
        }

        let matrix = Array2::from_shape_vec((rows.len(), width), values)
            .map_err(|e| FeatureError::Shape(e.to_string()))?;

        Ok(FeatureMatrix::new(matrix))
    }
}

fn lookup<'a>(row: &'a FeatureRow, column: &str) -> Result<FeatureValue<'a>, FeatureError> {
    row.column(column)
        .ok_or_else(|| FeatureError::MissingColumn(column.to_string()))
}

fn numeric(row: &FeatureRow, column: &str) -> Result<f64, FeatureError> {
    match lookup(row, column)? {
        FeatureValue::Number(value) => Ok(value),
        FeatureValue::Missing => Ok(f64::NAN),
        FeatureValue::Text(_) => Err(wrong_type(column, "numeric")),
    }
}

fn wrong_type(column: &str, expected: &'static str) -> FeatureError {
    FeatureError::WrongType {
        column: column.to_string(),
        expected,
    }
}

/// Lowercased runs of two or more word characters (alphanumeric or `_`)
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_lowercase)
}
