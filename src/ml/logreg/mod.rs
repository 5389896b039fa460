//! Binary logistic regression classifier for standardized feature vectors.

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::prediction::PredictionResult;

mod train;
pub use train::{TrainDataset, TrainOptions, train_logreg};

/// Current serialized model version.
pub const LOGREG_MODEL_VERSION: i64 = 1;

/// Versioned logistic regression model: `P(leave) = sigmoid(w . x + b)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRegModel {
    pub model_version: i64,
    pub feature_dim: usize,
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogRegModel {
    /// Model with zero weights; predicts 0.5 for every input.
    pub fn zeroed(feature_dim: usize) -> Self {
        Self {
            model_version: LOGREG_MODEL_VERSION,
            feature_dim,
            weights: vec![0.0; feature_dim],
            bias: 0.0,
        }
    }

    /// Validate the model dimensions and parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.model_version != LOGREG_MODEL_VERSION {
            return Err(format!(
                "Unsupported model_version {} (expected {LOGREG_MODEL_VERSION})",
                self.model_version
            ));
        }
        if self.feature_dim == 0 {
            return Err("feature_dim must be > 0".to_string());
        }
        if self.weights.len() != self.feature_dim {
            return Err(format!(
                "weights length {} does not match feature_dim {}",
                self.weights.len(),
                self.feature_dim
            ));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err("weights and bias must be finite".to_string());
        }
        Ok(())
    }

    /// Raw log-odds of leaving.
    pub fn decision_function(&self, features: &[f64]) -> Result<f64, PipelineError> {
        if features.len() != self.feature_dim {
            return Err(PipelineError::DimensionMismatch {
                stage: "classifier",
                expected: self.feature_dim,
                actual: features.len(),
            });
        }
        Ok(logit(&self.weights, self.bias, features))
    }

    /// Probabilities of staying and leaving for one standardized vector.
    pub fn predict_proba(&self, features: &[f64]) -> Result<PredictionResult, PipelineError> {
        let z = self.decision_function(features)?;
        PredictionResult::from_leave_probability(sigmoid(z)).ok_or(PipelineError::NonFiniteScore)
    }
}

pub(super) fn logit(weights: &[f64], bias: f64, features: &[f64]) -> f64 {
    weights
        .iter()
        .zip(features)
        .fold(bias, |sum, (w, x)| sum + w * x)
}

/// Logistic function evaluated without overflow for large `|z|`.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_model_validates_and_is_undecided() {
        let model = LogRegModel::zeroed(9);
        model.validate().unwrap();
        let out = model.predict_proba(&[0.0; 9]).unwrap();
        assert_eq!(out.p_leave, 0.5);
        assert!((out.p_stay + out.p_leave - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0 && sigmoid(800.0) > 0.999);
        assert!(sigmoid(-800.0) >= 0.0 && sigmoid(-800.0) < 1e-300);
        assert!(sigmoid(-800.0).is_finite());
    }

    #[test]
    fn positive_weight_raises_leave_probability() {
        let model = LogRegModel {
            model_version: LOGREG_MODEL_VERSION,
            feature_dim: 2,
            weights: vec![2.0, 0.0],
            bias: -1.0,
        };
        let low = model.predict_proba(&[0.0, 5.0]).unwrap();
        let high = model.predict_proba(&[2.0, 5.0]).unwrap();
        assert!(high.p_leave > low.p_leave);
        assert!((model.decision_function(&[2.0, 5.0]).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn opposing_infinite_terms_are_refused() {
        let model = LogRegModel {
            model_version: LOGREG_MODEL_VERSION,
            feature_dim: 2,
            weights: vec![1.0, 1.0],
            bias: 0.0,
        };
        assert_eq!(
            model.predict_proba(&[f64::INFINITY, f64::NEG_INFINITY]),
            Err(PipelineError::NonFiniteScore)
        );
        let saturated = model.predict_proba(&[f64::INFINITY, 0.0]).unwrap();
        assert_eq!(saturated.p_leave, 1.0);
    }

    #[test]
    fn wrong_dimension_is_reported() {
        let model = LogRegModel::zeroed(9);
        assert!(matches!(
            model.predict_proba(&[0.0; 8]),
            Err(PipelineError::DimensionMismatch {
                stage: "classifier",
                expected: 9,
                actual: 8
            })
        ));
    }

    #[test]
    fn validate_rejects_non_finite_weights() {
        let mut model = LogRegModel::zeroed(3);
        model.weights[1] = f64::NAN;
        assert!(model.validate().is_err());
        model.weights = vec![0.0; 2];
        assert!(model.validate().is_err());
    }
}
