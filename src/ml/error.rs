//! Error types for inference, training and model artifacts.

use std::path::PathBuf;

use thiserror::Error;

pub use crate::dataset::schema::UnknownCategory;

/// Data-contract violations raised while turning a raw record into a prediction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The raw record lacks one of the nine schema fields.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    /// A numeric or flag field could not be interpreted.
    #[error("invalid value {value:?} for field `{field}`: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
    /// A categorical value outside the fitted vocabulary.
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),
    /// A vector length disagrees with what a fitted component expects.
    #[error("{stage} expects {expected} features but received {actual}")]
    DimensionMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The classifier score is NaN, so no probability pair exists.
    #[error("classifier produced a non-finite score")]
    NonFiniteScore,
}

/// Failures while persisting or loading the fitted artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Model artifact {path} is missing")]
    Missing { path: PathBuf },
    #[error("Failed to read model artifact {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write model artifact {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed model artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize model artifact {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Unsupported artifact format version {found} in {path} (expected {expected})")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    #[error("Model artifact {path} does not match its manifest digest")]
    DigestMismatch { path: PathBuf },
    #[error("Model artifact {path} is invalid: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Failures during the offline training phase.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("Training corpus is empty")]
    EmptyCorpus,
    #[error("Cannot fit an encoder for `{column}` without any observed values")]
    EmptyVocabulary { column: String },
    #[error("Training labels contain a single class; both stayers and leavers are required")]
    SingleClass,
    #[error("Mismatched training inputs/labels: {rows} rows but {labels} labels")]
    LabelMismatch { rows: usize, labels: usize },
    #[error("Invalid training options: {0}")]
    InvalidOptions(String),
    #[error("Fitted model failed validation: {0}")]
    InvalidModel(String),
    #[error("Failed to assemble training matrix: {0}")]
    Pipeline(#[from] PipelineError),
}
