//! Immutable bundle of the fitted encoder table, scaler and classifier.
//!
//! Built once (by training or by loading artifacts) and then shared by reference for
//! every prediction. Nothing on the prediction path takes `&mut self`.

use serde::{Deserialize, Serialize};

use super::encoder::EncoderTable;
use super::error::PipelineError;
use super::logreg::LogRegModel;
use super::metrics::EvaluationReport;
use super::pipeline::{InferencePipeline, assemble};
use super::prediction::PredictionResult;
use super::scaler::FeatureScaler;
use crate::dataset::{FEATURE_COUNT, RawRecord};

mod artifacts;
pub use artifacts::{
    ARTIFACT_FORMAT_VERSION, ArtifactDigest, ArtifactFiles, ArtifactManifest, CLASSIFIER_FILE,
    ENCODERS_FILE, MANIFEST_FILE, SCALER_FILE, read_manifest,
};

/// Provenance recorded alongside the fitted parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    /// Hex blake3 digest of the training corpus bytes.
    #[serde(default)]
    pub corpus_fingerprint: Option<String>,
    /// RFC 3339 timestamp of the training run.
    #[serde(default)]
    pub trained_at: Option<String>,
    #[serde(default)]
    pub train_rows: usize,
    /// Held-out metrics, when a test split was used.
    #[serde(default)]
    pub evaluation: Option<EvaluationReport>,
}

/// Fitted artifacts that turn raw records into churn probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    encoders: EncoderTable,
    scaler: FeatureScaler,
    classifier: LogRegModel,
    metadata: BundleMetadata,
}

impl ModelBundle {
    /// Assemble a bundle, checking that the three artifacts agree with the schema.
    pub fn new(
        encoders: EncoderTable,
        scaler: FeatureScaler,
        classifier: LogRegModel,
        metadata: BundleMetadata,
    ) -> Result<Self, String> {
        let bundle = Self {
            encoders,
            scaler,
            classifier,
            metadata,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.encoders.validate()?;
        self.scaler.validate(FEATURE_COUNT)?;
        self.classifier.validate()?;
        if self.classifier.feature_dim != FEATURE_COUNT {
            return Err(format!(
                "classifier expects {} features (schema has {FEATURE_COUNT})",
                self.classifier.feature_dim
            ));
        }
        Ok(())
    }

    pub fn encoders(&self) -> &EncoderTable {
        &self.encoders
    }

    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &LogRegModel {
        &self.classifier
    }

    pub fn metadata(&self) -> &BundleMetadata {
        &self.metadata
    }

    pub fn pipeline(&self) -> InferencePipeline<'_> {
        InferencePipeline::new(&self.encoders, &self.scaler, &self.classifier)
    }

    /// Predict churn probabilities for one raw record.
    pub fn predict(&self, raw: &RawRecord) -> Result<PredictionResult, PipelineError> {
        self.pipeline().predict(raw)
    }

    /// Unscaled, encoded feature vector for `raw`.
    pub fn feature_vector(&self, raw: &RawRecord) -> Result<[f64; FEATURE_COUNT], PipelineError> {
        assemble(raw, &self.encoders)
    }
}
