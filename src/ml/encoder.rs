//! Closed-vocabulary label encoders for the categorical columns.
//!
//! Codes are positions in the sorted list of distinct labels seen at fit time, so
//! `IT` < `RandD` < `accounting` (byte order). Values that were never fitted are
//! rejected, never mapped to a default code.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::error::{TrainError, UnknownCategory};
use crate::dataset::{EmployeeRecord, Feature};

/// Label encoder for a single categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    column: String,
    classes: Vec<String>,
}

impl CategoryEncoder {
    /// Fit from the observed values of `column`.
    pub fn fit<I, S>(column: &str, values: I) -> Result<Self, TrainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = values
            .into_iter()
            .map(|value| value.as_ref().to_string())
            .collect();
        if classes.is_empty() {
            return Err(TrainError::EmptyVocabulary {
                column: column.to_string(),
            });
        }
        Ok(Self {
            column: column.to_string(),
            classes: classes.into_iter().collect(),
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Fitted vocabulary in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Integer code of `value`.
    pub fn encode(&self, value: &str) -> Result<u32, UnknownCategory> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .map(|idx| idx as u32)
            .map_err(|_| UnknownCategory::new(&self.column, value, &self.classes))
    }

    /// Inverse lookup of a code.
    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err(format!("encoder for `{}` has no classes", self.column));
        }
        if self.classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(format!(
                "encoder classes for `{}` must be sorted and unique",
                self.column
            ));
        }
        Ok(())
    }
}

/// One fitted encoder per categorical feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderTable {
    encoders: BTreeMap<String, CategoryEncoder>,
}

impl EncoderTable {
    /// Fit every categorical column from the given corpus rows.
    pub fn fit(records: &[EmployeeRecord]) -> Result<Self, TrainError> {
        if records.is_empty() {
            return Err(TrainError::EmptyCorpus);
        }
        let mut encoders = BTreeMap::new();
        for feature in Feature::CATEGORICAL {
            let encoder = CategoryEncoder::fit(
                feature.column(),
                records.iter().map(|record| record.field_text(feature)),
            )?;
            encoders.insert(feature.column().to_string(), encoder);
        }
        Ok(Self { encoders })
    }

    pub fn get(&self, feature: Feature) -> Option<&CategoryEncoder> {
        self.encoders.get(feature.column())
    }

    /// Encode `value` for a categorical feature.
    pub fn encode(&self, feature: Feature, value: &str) -> Result<u32, UnknownCategory> {
        match self.get(feature) {
            Some(encoder) => encoder.encode(value),
            None => Err(UnknownCategory::new::<&str>(feature.column(), value, &[])),
        }
    }

    pub fn decode(&self, feature: Feature, code: u32) -> Option<&str> {
        self.get(feature).and_then(|encoder| encoder.decode(code))
    }

    /// Check that exactly the schema's categorical columns are present and well-formed.
    pub fn validate(&self) -> Result<(), String> {
        for feature in Feature::CATEGORICAL {
            let encoder = self
                .get(feature)
                .ok_or_else(|| format!("missing encoder for `{}`", feature.column()))?;
            if encoder.column() != feature.column() {
                return Err(format!(
                    "encoder stored under `{}` is for column `{}`",
                    feature.column(),
                    encoder.column()
                ));
            }
            encoder.validate()?;
        }
        if self.encoders.len() != Feature::CATEGORICAL.len() {
            return Err(format!(
                "expected {} encoders, found {}",
                Feature::CATEGORICAL.len(),
                self.encoders.len()
            ));
        }
        Ok(())
    }
}
