//! Pearson correlation between the numeric corpus columns.

use ndarray::{Array2, Axis};
use serde::Serialize;

use crate::dataset::{EmployeeRecord, TARGET_COLUMN};

/// Numeric columns in corpus order, the churn label included.
pub const NUMERIC_COLUMNS: [&str; 8] = [
    "satisfaction_level",
    "last_evaluation",
    "number_project",
    "average_montly_hours",
    "time_spend_company",
    "Work_accident",
    TARGET_COLUMN,
    "promotion_last_5years",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` squared. A constant column correlates as `0.0` with
    /// everything except itself.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

pub fn correlation_matrix(records: &[EmployeeRecord]) -> CorrelationMatrix {
    let n = NUMERIC_COLUMNS.len();
    let data = Array2::from_shape_fn((records.len(), n), |(row, col)| {
        numeric_value(&records[row], col)
    });

    let mut values: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();
    if let Some(means) = data.mean_axis(Axis(0)) {
        let centered = &data - &means;
        let cov = centered.t().dot(&centered);
        for i in 0..n {
            for j in (i + 1)..n {
                let denom = (cov[[i, i]] * cov[[j, j]]).sqrt();
                if denom > 0.0 {
                    let r = (cov[[i, j]] / denom).clamp(-1.0, 1.0);
                    values[i][j] = r;
                    values[j][i] = r;
                }
            }
        }
    }

    CorrelationMatrix {
        columns: NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
        values,
    }
}

fn numeric_value(record: &EmployeeRecord, column: usize) -> f64 {
    match column {
        0 => record.satisfaction_level,
        1 => record.last_evaluation,
        2 => f64::from(record.number_project),
        3 => f64::from(record.average_monthly_hours),
        4 => f64::from(record.time_spend_company),
        5 => f64::from(u8::from(record.work_accident)),
        6 => f64::from(u8::from(record.left)),
        _ => f64::from(u8::from(record.promotion_last_5years)),
    }
}
