use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, seq::SliceRandom};
use tracing::debug;

use super::{LOGREG_MODEL_VERSION, LogRegModel, logit, sigmoid};
use crate::ml::error::TrainError;

/// Training options for the churn logistic regression.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
    pub batch_size: usize,
    pub seed: u64,
    /// Weight each class inversely to its frequency.
    pub balance_classes: bool,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 100,
            learning_rate: 0.1,
            l2: 1e-4,
            batch_size: 64,
            seed: 42,
            balance_classes: false,
        }
    }
}

/// In-memory training set: standardized features and churn labels.
#[derive(Debug, Clone)]
pub struct TrainDataset {
    pub x: Array2<f64>,
    /// `true` when the employee left.
    pub y: Vec<bool>,
}

/// Fit a binary logistic regression with seeded mini-batch gradient descent.
///
/// The same dataset, options and seed always produce the same weights.
pub fn train_logreg(
    dataset: &TrainDataset,
    options: &TrainOptions,
) -> Result<LogRegModel, TrainError> {
    let rows = dataset.x.nrows();
    if rows == 0 || dataset.y.is_empty() {
        return Err(TrainError::EmptyCorpus);
    }
    if rows != dataset.y.len() {
        return Err(TrainError::LabelMismatch {
            rows,
            labels: dataset.y.len(),
        });
    }
    if !options.learning_rate.is_finite() || options.learning_rate <= 0.0 {
        return Err(TrainError::InvalidOptions(format!(
            "learning rate must be > 0 (got {})",
            options.learning_rate
        )));
    }
    let positives = dataset.y.iter().filter(|&&left| left).count();
    if positives == 0 || positives == rows {
        return Err(TrainError::SingleClass);
    }

    let dim = dataset.x.ncols();
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut weights: Vec<f64> = (0..dim)
        .map(|_| (rng.random::<f64>() - 0.5) * 0.01)
        .collect();
    let mut bias = 0.0f64;

    let class_weights = if options.balance_classes {
        let total = rows as f64;
        let leave = positives as f64;
        let stay = total - leave;
        [total / (2.0 * stay), total / (2.0 * leave)]
    } else {
        [1.0, 1.0]
    };

    let mut indices: Vec<usize> = (0..rows).collect();
    let batch_size = options.batch_size.max(1);
    let lr = options.learning_rate;
    let l2 = options.l2.max(0.0);
    let mut grad_w = vec![0.0f64; dim];

    for epoch in 0..options.epochs {
        indices.shuffle(&mut rng);
        for chunk in indices.chunks(batch_size) {
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0f64;
            let mut batch_weight = 0.0f64;
            for &idx in chunk {
                let row = dataset.x.row(idx);
                let x = row.as_slice().ok_or_else(|| {
                    TrainError::InvalidOptions("training matrix must be row-major".to_string())
                })?;
                let target = dataset.y[idx];
                let weight = class_weights[usize::from(target)];
                let p = sigmoid(logit(&weights, bias, x));
                let diff = (p - if target { 1.0 } else { 0.0 }) * weight;
                for (g, &xi) in grad_w.iter_mut().zip(x) {
                    *g += diff * xi;
                }
                grad_b += diff;
                batch_weight += weight;
            }
            if batch_weight == 0.0 {
                continue;
            }
            let inv = 1.0 / batch_weight;
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= lr * (g * inv + l2 * *w);
            }
            bias -= lr * grad_b * inv;
        }
        if epoch + 1 == options.epochs || (epoch + 1) % 25 == 0 {
            debug!(
                "epoch {}/{}: loss={:.5}",
                epoch + 1,
                options.epochs,
                mean_log_loss(dataset, &weights, bias)
            );
        }
    }

    let model = LogRegModel {
        model_version: LOGREG_MODEL_VERSION,
        feature_dim: dim,
        weights,
        bias,
    };
    model.validate().map_err(TrainError::InvalidModel)?;
    Ok(model)
}

fn mean_log_loss(dataset: &TrainDataset, weights: &[f64], bias: f64) -> f64 {
    let eps = 1e-15;
    let total: f64 = dataset
        .x
        .rows()
        .into_iter()
        .zip(&dataset.y)
        .map(|(row, &target)| {
            let z = row
                .iter()
                .zip(weights)
                .fold(bias, |sum, (x, w)| sum + x * w);
            let p = sigmoid(z).clamp(eps, 1.0 - eps);
            if target { -p.ln() } else { -(1.0 - p).ln() }
        })
        .sum();
    total / dataset.y.len().max(1) as f64
}
