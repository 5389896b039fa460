//! Churn model fitting and inference.
//!
//! A [`ModelBundle`] holds the three fitted artifacts (categorical encoders, feature
//! scaler, logistic classifier). Training produces one, `ModelBundle::load` restores
//! one, and every prediction goes through [`InferencePipeline`] so the transforms are
//! always applied in the same order.

pub mod bundle;
pub mod encoder;
pub mod error;
pub mod logreg;
pub mod metrics;
pub mod pipeline;
pub mod prediction;
pub mod scaler;
pub mod trainer;

pub use bundle::{ArtifactManifest, BundleMetadata, ModelBundle};
pub use encoder::{CategoryEncoder, EncoderTable};
pub use error::{ArtifactError, PipelineError, TrainError, UnknownCategory};
pub use logreg::{LogRegModel, TrainOptions};
pub use metrics::EvaluationReport;
pub use pipeline::InferencePipeline;
pub use prediction::PredictionResult;
pub use scaler::FeatureScaler;
pub use trainer::{TrainingConfig, TrainingReport, train};
