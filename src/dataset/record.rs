//! Employee rows in their typed (corpus) and raw (request) forms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::schema::{Department, Feature, SalaryBand};

/// One fully parsed row of the HR corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub satisfaction_level: f64,
    pub last_evaluation: f64,
    pub number_project: u32,
    pub average_monthly_hours: u32,
    pub time_spend_company: u32,
    pub work_accident: bool,
    pub promotion_last_5years: bool,
    pub department: Department,
    pub salary: SalaryBand,
    /// Churn label: the employee left.
    pub left: bool,
}

impl EmployeeRecord {
    /// Text value of a feature as it would arrive in a raw record.
    pub fn field_text(&self, feature: Feature) -> String {
        match feature {
            Feature::SatisfactionLevel => self.satisfaction_level.to_string(),
            Feature::LastEvaluation => self.last_evaluation.to_string(),
            Feature::NumberProject => self.number_project.to_string(),
            Feature::AverageMonthlyHours => self.average_monthly_hours.to_string(),
            Feature::TimeSpendCompany => self.time_spend_company.to_string(),
            Feature::WorkAccident => flag_text(self.work_accident).to_string(),
            Feature::PromotionLast5Years => flag_text(self.promotion_last_5years).to_string(),
            Feature::Department => self.department.as_str().to_string(),
            Feature::Salary => self.salary.as_str().to_string(),
        }
    }
}

fn flag_text(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Field values for one prediction request, keyed by canonical column name.
///
/// Values stay as text until the inference pipeline validates and encodes them, so
/// form input, JSON payloads and corpus rows all enter through the same checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl ToString) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl ToString) {
        self.fields.insert(field.into(), value.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names that are not part of the feature schema.
    pub fn unexpected_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .keys()
            .map(String::as_str)
            .filter(|name| Feature::from_column(name).is_none())
    }
}

impl From<&EmployeeRecord> for RawRecord {
    fn from(record: &EmployeeRecord) -> Self {
        Feature::ALL
            .into_iter()
            .map(|feature| (feature.column().to_string(), record.field_text(feature)))
            .collect()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EmployeeRecord {
        EmployeeRecord {
            satisfaction_level: 0.38,
            last_evaluation: 0.53,
            number_project: 2,
            average_monthly_hours: 157,
            time_spend_company: 3,
            work_accident: false,
            promotion_last_5years: true,
            department: Department::ProductMng,
            salary: SalaryBand::Low,
            left: true,
        }
    }

    #[test]
    fn raw_record_from_employee_uses_canonical_columns() {
        let raw = RawRecord::from(&sample());
        assert_eq!(raw.len(), 9);
        assert_eq!(raw.get("satisfaction_level"), Some("0.38"));
        assert_eq!(raw.get("average_montly_hours"), Some("157"));
        assert_eq!(raw.get("promotion_last_5years"), Some("1"));
        assert_eq!(raw.get("Department"), Some("product_mng"));
        assert_eq!(raw.get("left"), None);
        assert_eq!(raw.unexpected_fields().count(), 0);
    }

    #[test]
    fn raw_record_serializes_as_flat_object() {
        let raw = RawRecord::new()
            .with("salary", "high")
            .with("number_project", 4);
        let json = serde_json::to_string(&raw).unwrap();
        assert_eq!(json, r#"{"number_project":"4","salary":"high"}"#);
        let back: RawRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn unexpected_fields_are_reported() {
        let raw = RawRecord::new()
            .with("satisfaction", 0.5)
            .with("salary", "low");
        let extra: Vec<&str> = raw.unexpected_fields().collect();
        assert_eq!(extra, vec!["satisfaction"]);
    }
}
