//! Raw record -> encoded vector -> standardized vector -> churn probabilities.
//!
//! Training builds its matrix through [`assemble`] as well, so the column order and
//! categorical codes seen by the scaler at fit time are exactly the ones produced for
//! a request at serving time.

use tracing::debug;

use super::encoder::EncoderTable;
use super::error::PipelineError;
use super::logreg::LogRegModel;
use super::prediction::PredictionResult;
use super::scaler::FeatureScaler;
use crate::dataset::{FEATURE_COUNT, Feature, FeatureKind, RawRecord};

/// Borrowed view over the three fitted artifacts.
#[derive(Debug, Clone, Copy)]
pub struct InferencePipeline<'a> {
    encoders: &'a EncoderTable,
    scaler: &'a FeatureScaler,
    classifier: &'a LogRegModel,
}

impl<'a> InferencePipeline<'a> {
    pub fn new(
        encoders: &'a EncoderTable,
        scaler: &'a FeatureScaler,
        classifier: &'a LogRegModel,
    ) -> Self {
        Self {
            encoders,
            scaler,
            classifier,
        }
    }

    /// Run all five steps for one record.
    pub fn predict(&self, raw: &RawRecord) -> Result<PredictionResult, PipelineError> {
        let scaled = self.standardized(raw)?;
        let result = self.classifier.predict_proba(&scaled)?;
        debug!(
            "prediction: p_stay={:.4} p_leave={:.4}",
            result.p_stay, result.p_leave
        );
        Ok(result)
    }

    /// Standardized vector the classifier would see for `raw`.
    pub fn standardized(&self, raw: &RawRecord) -> Result<Vec<f64>, PipelineError> {
        let vector = assemble(raw, self.encoders)?;
        let scaled = self.scaler.transform(&vector)?;
        check_weighted_terms(raw, &scaled, self.classifier)?;
        Ok(scaled)
    }
}

/// Reject a value whose standardized form, or its weighted term, overflows `f64`.
///
/// Finite terms keep the logit free of NaN: the running sum can saturate to one
/// infinity but never meet the opposite one.
fn check_weighted_terms(
    raw: &RawRecord,
    scaled: &[f64],
    classifier: &LogRegModel,
) -> Result<(), PipelineError> {
    for ((feature, &x), &weight) in Feature::ALL.iter().zip(scaled).zip(&classifier.weights) {
        if x.is_finite() && (weight * x).is_finite() {
            continue;
        }
        let field = feature.column();
        return Err(PipelineError::InvalidValue {
            field,
            value: raw.get(field).unwrap_or_default().trim().to_string(),
            reason: "outside the range the model was fitted on",
        });
    }
    Ok(())
}

/// Check that every schema field is present, in schema order.
pub fn require_fields(raw: &RawRecord) -> Result<(), PipelineError> {
    for feature in Feature::ALL {
        if raw.get(feature.column()).is_none() {
            return Err(PipelineError::MissingField {
                field: feature.column(),
            });
        }
    }
    Ok(())
}

/// Validate, encode and order the fields of `raw` into the unscaled model vector.
pub fn assemble(
    raw: &RawRecord,
    encoders: &EncoderTable,
) -> Result<[f64; FEATURE_COUNT], PipelineError> {
    require_fields(raw)?;
    if let Some(extra) = raw.unexpected_fields().next() {
        debug!("ignoring field `{extra}` outside the feature schema");
    }

    let mut vector = [0.0f64; FEATURE_COUNT];
    for feature in Feature::ALL {
        let field = feature.column();
        let text = raw
            .get(field)
            .ok_or(PipelineError::MissingField { field })?
            .trim();
        vector[feature.index()] = match feature.kind() {
            FeatureKind::Numeric => parse_number(field, text)?,
            FeatureKind::Flag => parse_flag(field, text)?,
            FeatureKind::Categorical => encoders.encode(feature, text)? as f64,
        };
    }
    Ok(vector)
}

fn parse_number(field: &'static str, text: &str) -> Result<f64, PipelineError> {
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| PipelineError::InvalidValue {
            field,
            value: text.to_string(),
            reason: "expected a finite number",
        })
}

fn parse_flag(field: &'static str, text: &str) -> Result<f64, PipelineError> {
    match text.parse::<f64>() {
        Ok(value) if value == 0.0 || value == 1.0 => Ok(value),
        _ => Err(PipelineError::InvalidValue {
            field,
            value: text.to_string(),
            reason: "expected 0 or 1",
        }),
    }
}
