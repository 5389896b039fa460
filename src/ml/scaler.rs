//! Per-feature standardization fitted on the encoded training matrix.

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::error::{PipelineError, TrainError};

/// Column means and population standard deviations.
///
/// A column whose standard deviation is zero (or not finite) carries no signal; it
/// scales to `0.0` for every input instead of dividing by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    means: Vec<f64>,
    std_devs: Vec<f64>,
}

impl FeatureScaler {
    /// Fit on a `rows x features` matrix.
    pub fn fit(matrix: ArrayView2<'_, f64>) -> Result<Self, TrainError> {
        if matrix.nrows() == 0 {
            return Err(TrainError::EmptyCorpus);
        }
        let means = matrix.mean_axis(Axis(0)).ok_or(TrainError::EmptyCorpus)?;
        let std_devs = matrix.std_axis(Axis(0), 0.0);
        Ok(Self {
            means: means.to_vec(),
            std_devs: std_devs.to_vec(),
        })
    }

    /// Number of features the scaler was fitted on.
    pub fn dim(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn std_devs(&self) -> &[f64] {
        &self.std_devs
    }

    /// Standardize one feature vector.
    pub fn transform(&self, vector: &[f64]) -> Result<Vec<f64>, PipelineError> {
        if vector.len() != self.dim() {
            return Err(PipelineError::DimensionMismatch {
                stage: "feature scaler",
                expected: self.dim(),
                actual: vector.len(),
            });
        }
        Ok(vector
            .iter()
            .zip(self.means.iter().zip(&self.std_devs))
            .map(|(&x, (&mean, &std))| scale(x, mean, std))
            .collect())
    }

    /// Standardize every row of a matrix.
    pub fn transform_matrix(&self, matrix: ArrayView2<'_, f64>) -> Result<Array2<f64>, PipelineError> {
        if matrix.ncols() != self.dim() {
            return Err(PipelineError::DimensionMismatch {
                stage: "feature scaler",
                expected: self.dim(),
                actual: matrix.ncols(),
            });
        }
        let mut scaled = matrix.to_owned();
        for mut row in scaled.rows_mut() {
            for (idx, value) in row.iter_mut().enumerate() {
                *value = scale(*value, self.means[idx], self.std_devs[idx]);
            }
        }
        Ok(scaled)
    }

    pub fn validate(&self, expected_dim: usize) -> Result<(), String> {
        if self.means.len() != expected_dim || self.std_devs.len() != expected_dim {
            return Err(format!(
                "scaler has {} means and {} std devs (expected {expected_dim})",
                self.means.len(),
                self.std_devs.len()
            ));
        }
        if self.means.iter().any(|mean| !mean.is_finite()) {
            return Err("scaler means must be finite".to_string());
        }
        if self.std_devs.iter().any(|std| *std < 0.0) {
            return Err("scaler std devs must be non-negative".to_string());
        }
        Ok(())
    }
}

fn scale(x: f64, mean: f64, std: f64) -> f64 {
    if std > 0.0 && std.is_finite() {
        (x - mean) / std
    } else {
        0.0
    }
}
