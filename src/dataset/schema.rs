//! Canonical feature schema shared by training and serving.
//!
//! Column names are exactly the ones used by the HR corpus. Training assembles its
//! matrix in [`Feature::ALL`] order and the inference pipeline assembles request
//! vectors in the same order, so scaler and classifier parameters line up by index.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of model input features.
pub const FEATURE_COUNT: usize = 9;
/// Corpus column holding the churn label.
pub const TARGET_COLUMN: &str = "left";
/// Header older HR exports use for the department column.
pub const LEGACY_DEPARTMENT_COLUMN: &str = "sales";

/// A categorical value outside the closed vocabulary of its column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category {value:?} for column `{column}` (expected one of: {expected})")]
pub struct UnknownCategory {
    /// Column the value was supplied for.
    pub column: String,
    /// Offending value.
    pub value: String,
    /// Comma-separated vocabulary the value was checked against.
    pub expected: String,
}

impl UnknownCategory {
    pub(crate) fn new<S: AsRef<str>>(column: &str, value: &str, vocabulary: &[S]) -> Self {
        let expected = vocabulary
            .iter()
            .map(|label| label.as_ref())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            column: column.to_string(),
            value: value.to_string(),
            expected,
        }
    }
}

/// How a feature's raw text is interpreted before it enters the vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Any finite real number.
    Numeric,
    /// `0` or `1`.
    Flag,
    /// Label from a closed vocabulary, replaced by its fitted integer code.
    Categorical,
}

/// The nine model inputs, in training column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    SatisfactionLevel,
    LastEvaluation,
    NumberProject,
    AverageMonthlyHours,
    TimeSpendCompany,
    WorkAccident,
    PromotionLast5Years,
    Department,
    Salary,
}

impl Feature {
    /// All features in the order the scaler and classifier were fit on.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::SatisfactionLevel,
        Feature::LastEvaluation,
        Feature::NumberProject,
        Feature::AverageMonthlyHours,
        Feature::TimeSpendCompany,
        Feature::WorkAccident,
        Feature::PromotionLast5Years,
        Feature::Department,
        Feature::Salary,
    ];

    /// Features that go through the encoder table.
    pub const CATEGORICAL: [Feature; 2] = [Feature::Department, Feature::Salary];

    /// Corpus column name, also the field name expected in raw records.
    pub const fn column(self) -> &'static str {
        match self {
            Feature::SatisfactionLevel => "satisfaction_level",
            Feature::LastEvaluation => "last_evaluation",
            Feature::NumberProject => "number_project",
            // Misspelling is part of the corpus header.
            Feature::AverageMonthlyHours => "average_montly_hours",
            Feature::TimeSpendCompany => "time_spend_company",
            Feature::WorkAccident => "Work_accident",
            Feature::PromotionLast5Years => "promotion_last_5years",
            Feature::Department => "Department",
            Feature::Salary => "salary",
        }
    }

    pub const fn kind(self) -> FeatureKind {
        match self {
            Feature::WorkAccident | Feature::PromotionLast5Years => FeatureKind::Flag,
            Feature::Department | Feature::Salary => FeatureKind::Categorical,
            _ => FeatureKind::Numeric,
        }
    }

    /// Position of the feature in the assembled vector.
    pub fn index(self) -> usize {
        Feature::ALL
            .iter()
            .position(|feature| *feature == self)
            .unwrap_or_default()
    }

    /// Look up a feature by its canonical column name.
    pub fn from_column(name: &str) -> Option<Self> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.column() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Canonical feature column names in training order.
pub fn feature_columns() -> Vec<String> {
    Feature::ALL
        .iter()
        .map(|feature| feature.column().to_string())
        .collect()
}

/// Department vocabulary of the HR corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "sales")]
    Sales,
    #[serde(rename = "accounting")]
    Accounting,
    #[serde(rename = "hr")]
    Hr,
    #[serde(rename = "technical")]
    Technical,
    #[serde(rename = "support")]
    Support,
    #[serde(rename = "management")]
    Management,
    #[serde(rename = "IT")]
    It,
    #[serde(rename = "product_mng")]
    ProductMng,
    #[serde(rename = "marketing")]
    Marketing,
    #[serde(rename = "RandD")]
    RandD,
}

impl Department {
    pub const ALL: [Department; 10] = [
        Department::Sales,
        Department::Accounting,
        Department::Hr,
        Department::Technical,
        Department::Support,
        Department::Management,
        Department::It,
        Department::ProductMng,
        Department::Marketing,
        Department::RandD,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Department::Sales => "sales",
            Department::Accounting => "accounting",
            Department::Hr => "hr",
            Department::Technical => "technical",
            Department::Support => "support",
            Department::Management => "management",
            Department::It => "IT",
            Department::ProductMng => "product_mng",
            Department::Marketing => "marketing",
            Department::RandD => "RandD",
        }
    }
}

impl FromStr for Department {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|department| department.as_str() == value)
            .ok_or_else(|| {
                let labels: Vec<&str> = Department::ALL.iter().map(|d| d.as_str()).collect();
                UnknownCategory::new(Feature::Department.column(), value, &labels)
            })
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Salary band vocabulary of the HR corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryBand {
    Low,
    Medium,
    High,
}

impl SalaryBand {
    pub const ALL: [SalaryBand; 3] = [SalaryBand::Low, SalaryBand::Medium, SalaryBand::High];

    pub const fn as_str(self) -> &'static str {
        match self {
            SalaryBand::Low => "low",
            SalaryBand::Medium => "medium",
            SalaryBand::High => "high",
        }
    }
}

impl FromStr for SalaryBand {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SalaryBand::ALL
            .into_iter()
            .find(|band| band.as_str() == value)
            .ok_or_else(|| {
                let labels: Vec<&str> = SalaryBand::ALL.iter().map(|b| b.as_str()).collect();
                UnknownCategory::new(Feature::Salary.column(), value, &labels)
            })
    }
}

impl fmt::Display for SalaryBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
