use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults::{
    clamp_epochs, clamp_test_fraction, default_batch_size, default_data_file, default_epochs,
    default_l2, default_learning_rate, default_seed, default_test_fraction,
    non_negative_or_default, positive_or_default,
};
use crate::insights::PredictionThresholds;
use crate::ml::{TrainOptions, TrainingConfig};

/// Settings stored in `config.toml`.
///
/// Config keys (TOML): `data_file`, `artifacts_dir`, `[training]`, `[thresholds]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// CSV corpus used by training and the summary tool.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Where model artifacts are written and loaded; `None` uses `<app root>/model`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts_dir: Option<PathBuf>,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub thresholds: PredictionThresholds,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            artifacts_dir: None,
            training: TrainingSettings::default(),
            thresholds: PredictionThresholds::default(),
        }
    }
}

impl AppSettings {
    pub fn normalized(self) -> Self {
        Self {
            training: self.training.normalized(),
            thresholds: self.thresholds.normalized(),
            ..self
        }
    }
}

/// Training knobs under `[training]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSettings {
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_l2")]
    pub l2: f64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub balance_classes: bool,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            epochs: default_epochs(),
            learning_rate: default_learning_rate(),
            l2: default_l2(),
            batch_size: default_batch_size(),
            balance_classes: false,
        }
    }
}

impl TrainingSettings {
    pub fn normalized(self) -> Self {
        Self {
            test_fraction: clamp_test_fraction(self.test_fraction),
            epochs: clamp_epochs(self.epochs),
            learning_rate: positive_or_default(self.learning_rate, default_learning_rate),
            l2: non_negative_or_default(self.l2, default_l2),
            batch_size: self.batch_size.max(1),
            ..self
        }
    }
}

impl From<&TrainingSettings> for TrainingConfig {
    fn from(settings: &TrainingSettings) -> Self {
        TrainingConfig {
            test_fraction: settings.test_fraction,
            logreg: TrainOptions {
                epochs: settings.epochs,
                learning_rate: settings.learning_rate,
                l2: settings.l2,
                batch_size: settings.batch_size,
                seed: settings.seed,
                balance_classes: settings.balance_classes,
            },
        }
    }
}
