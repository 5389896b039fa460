//! Evaluation metrics for the churn classifier.

use serde::{Deserialize, Serialize};

/// Class labels in index order: 0 = stayed, 1 = left.
pub const CLASS_LABELS: [&str; 2] = ["stay", "leave"];

#[derive(Debug, Clone)]
/// Confusion matrix for a `K`-class classifier.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&v| v as u64).sum()
    }

    /// Rows of the matrix (truth) as nested vectors.
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.counts
            .chunks(self.n_classes.max(1))
            .map(|row| row.to_vec())
            .collect()
    }
}

#[derive(Debug, Clone)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f64,
    /// `TP / (TP + FN)`.
    pub recall: f64,
    /// Total number of true examples for the class.
    pub support: u32,
}

impl PerClassStats {
    pub fn f1(&self) -> f64 {
        f1_score(self.precision, self.recall)
    }
}

/// Serialized held-out evaluation, stored in the artifact manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub accuracy: f64,
    pub log_loss: f64,
    pub per_class: Vec<PerClassMetric>,
    /// Rows are true class, columns predicted class.
    pub confusion: Vec<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerClassMetric {
    pub class_id: String,
    pub support: u32,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Accumulates binary predictions against their labels.
#[derive(Debug, Clone)]
pub struct BinaryEvaluator {
    confusion: ConfusionMatrix,
    log_loss_sum: f64,
}

impl Default for BinaryEvaluator {
    fn default() -> Self {
        Self {
            confusion: ConfusionMatrix::new(CLASS_LABELS.len()),
            log_loss_sum: 0.0,
        }
    }
}

impl BinaryEvaluator {
    /// Record one prediction given as the probability of leaving.
    pub fn add(&mut self, left: bool, p_leave: f64) {
        let truth = usize::from(left);
        let predicted = usize::from(p_leave >= 0.5);
        self.confusion.add(truth, predicted);
        let eps = 1e-15;
        let p = p_leave.clamp(eps, 1.0 - eps);
        self.log_loss_sum += if left { -p.ln() } else { -(1.0 - p).ln() };
    }

    pub fn confusion(&self) -> &ConfusionMatrix {
        &self.confusion
    }

    pub fn finish(&self) -> EvaluationReport {
        let samples = self.confusion.total() as usize;
        let per_class = precision_recall_by_class(&self.confusion)
            .iter()
            .zip(CLASS_LABELS)
            .map(|(stats, class_id)| PerClassMetric {
                class_id: class_id.to_string(),
                support: stats.support,
                precision: stats.precision,
                recall: stats.recall,
                f1: stats.f1(),
            })
            .collect();
        EvaluationReport {
            samples,
            accuracy: accuracy(&self.confusion),
            log_loss: if samples == 0 {
                0.0
            } else {
                self.log_loss_sum / samples as f64
            },
            per_class,
            confusion: self.confusion.to_rows(),
        }
    }
}

/// Compute per-class precision and recall from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = cm.get(class_idx, class_idx) as f64;
        let mut fp = 0f64;
        let mut fn_ = 0f64;
        let mut support = 0u32;
        for j in 0..k {
            let v = cm.get(class_idx, j);
            support = support.saturating_add(v);
            if j != class_idx {
                fn_ += v as f64;
            }
        }
        for i in 0..k {
            if i != class_idx {
                fp += cm.get(i, class_idx) as f64;
            }
        }
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        stats.push(PerClassStats {
            precision,
            recall,
            support,
        });
    }
    stats
}

/// Compute overall accuracy from a confusion matrix.
pub fn accuracy(cm: &ConfusionMatrix) -> f64 {
    let total = cm.total();
    if total == 0 {
        return 0.0;
    }
    let correct: u64 = (0..cm.n_classes).map(|i| cm.get(i, i) as u64).sum();
    correct as f64 / total as f64
}

pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}
