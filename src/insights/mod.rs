//! Descriptive corpus statistics and risk tiers for individual predictions.

pub mod correlation;
pub mod risk;
pub mod summary;

pub use correlation::{CorrelationMatrix, NUMERIC_COLUMNS, correlation_matrix};
pub use risk::{PredictionThresholds, RiskTier};
pub use summary::{CorpusSummary, GroupChurn, churn_by_department, churn_by_salary};
