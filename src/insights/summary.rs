//! Head-count and churn statistics over the corpus.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::EmployeeRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub employees: usize,
    pub churned: usize,
    /// Percentage of employees who left, `0..=100`.
    pub churn_rate: f64,
    pub mean_satisfaction: f64,
    pub mean_evaluation: f64,
}

impl CorpusSummary {
    pub fn from_records(records: &[EmployeeRecord]) -> Self {
        let employees = records.len();
        let churned = records.iter().filter(|record| record.left).count();
        Self {
            employees,
            churned,
            churn_rate: percentage(churned, employees),
            mean_satisfaction: mean(records.iter().map(|r| r.satisfaction_level)),
            mean_evaluation: mean(records.iter().map(|r| r.last_evaluation)),
        }
    }
}

/// Churn figures for one department or salary band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupChurn {
    pub label: String,
    pub total: usize,
    pub churned: usize,
    pub churn_rate: f64,
}

/// Groups in label byte order; departments absent from the corpus are omitted.
pub fn churn_by_department(records: &[EmployeeRecord]) -> Vec<GroupChurn> {
    group_churn(records, |record| record.department.as_str())
        .into_iter()
        .map(|(label, counts)| counts.into_group(label))
        .collect()
}

/// Bands in `low`, `medium`, `high` order.
pub fn churn_by_salary(records: &[EmployeeRecord]) -> Vec<GroupChurn> {
    group_churn(records, |record| record.salary)
        .into_iter()
        .map(|(band, counts)| counts.into_group(band.as_str()))
        .collect()
}

#[derive(Debug, Clone, Default)]
struct Counts {
    total: usize,
    churned: usize,
}

impl Counts {
    fn into_group(self, label: &str) -> GroupChurn {
        GroupChurn {
            label: label.to_string(),
            total: self.total,
            churned: self.churned,
            churn_rate: percentage(self.churned, self.total),
        }
    }
}

fn group_churn<K: Ord>(
    records: &[EmployeeRecord],
    key: impl Fn(&EmployeeRecord) -> K,
) -> BTreeMap<K, Counts> {
    let mut groups: BTreeMap<K, Counts> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(key(record)).or_default();
        entry.total += 1;
        entry.churned += usize::from(record.left);
    }
    groups
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
