//! Offline fitting of a [`ModelBundle`] from a labelled corpus.

use ndarray::Array2;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use super::bundle::{BundleMetadata, ModelBundle};
use super::encoder::EncoderTable;
use super::error::TrainError;
use super::logreg::{TrainDataset, TrainOptions, train_logreg};
use super::metrics::{BinaryEvaluator, EvaluationReport};
use super::pipeline::assemble;
use super::scaler::FeatureScaler;
use crate::dataset::{Corpus, EmployeeRecord, FEATURE_COUNT, RawRecord, train_test_split};

/// Knobs for one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Share of rows held out for evaluation, in `[0, 1)`.
    pub test_fraction: f64,
    pub logreg: TrainOptions,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            logreg: TrainOptions::default(),
        }
    }
}

/// What happened during a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    /// Held-out metrics; `None` when `test_fraction` is zero.
    pub evaluation: Option<EvaluationReport>,
    pub corpus_fingerprint: String,
}

/// Fit encoders, scaler and classifier on `corpus`.
///
/// Encoders see every row so the vocabulary covers the whole corpus; the scaler and
/// classifier only see the training partition.
pub fn train(
    corpus: &Corpus,
    config: &TrainingConfig,
) -> Result<(ModelBundle, TrainingReport), TrainError> {
    if corpus.is_empty() {
        return Err(TrainError::EmptyCorpus);
    }
    if !(0.0..1.0).contains(&config.test_fraction) {
        return Err(TrainError::InvalidOptions(format!(
            "test fraction must be in [0, 1) (got {})",
            config.test_fraction
        )));
    }

    let encoders = EncoderTable::fit(&corpus.records)?;
    let split = train_test_split(corpus.len(), config.test_fraction, config.logreg.seed);
    let train_records: Vec<&EmployeeRecord> =
        split.train.iter().map(|&idx| &corpus.records[idx]).collect();
    info!(
        "Training on {} rows, holding out {}",
        split.train.len(),
        split.test.len()
    );

    let raw = encoded_matrix(&train_records, &encoders)?;
    let scaler = FeatureScaler::fit(raw.view())?;
    let x = scaler.transform_matrix(raw.view())?;
    let y = train_records.iter().map(|record| record.left).collect();
    let classifier = train_logreg(&TrainDataset { x, y }, &config.logreg)?;

    let mut metadata = BundleMetadata {
        corpus_fingerprint: Some(corpus.fingerprint.clone()),
        trained_at: OffsetDateTime::now_utc().format(&Rfc3339).ok(),
        train_rows: split.train.len(),
        evaluation: None,
    };
    let bundle = ModelBundle::new(
        encoders.clone(),
        scaler.clone(),
        classifier.clone(),
        metadata.clone(),
    )
    .map_err(TrainError::InvalidModel)?;

    let evaluation = if split.test.is_empty() {
        None
    } else {
        let mut evaluator = BinaryEvaluator::default();
        for &idx in &split.test {
            let record = &corpus.records[idx];
            let prediction = bundle.predict(&RawRecord::from(record))?;
            evaluator.add(record.left, prediction.p_leave);
        }
        let report = evaluator.finish();
        info!(
            "Held-out accuracy {:.4}, log loss {:.4} over {} rows",
            report.accuracy, report.log_loss, report.samples
        );
        Some(report)
    };

    metadata.evaluation = evaluation.clone();
    let bundle =
        ModelBundle::new(encoders, scaler, classifier, metadata).map_err(TrainError::InvalidModel)?;
    let report = TrainingReport {
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        evaluation,
        corpus_fingerprint: corpus.fingerprint.clone(),
    };
    Ok((bundle, report))
}

/// Unscaled model matrix built through the same assembly step used at inference.
fn encoded_matrix(
    records: &[&EmployeeRecord],
    encoders: &EncoderTable,
) -> Result<Array2<f64>, TrainError> {
    let mut values = Vec::with_capacity(records.len() * FEATURE_COUNT);
    for record in records {
        values.extend(assemble(&RawRecord::from(*record), encoders)?);
    }
    Array2::from_shape_vec((records.len(), FEATURE_COUNT), values)
        .map_err(|err| TrainError::InvalidOptions(format!("training matrix shape: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Department, SalaryBand};

    fn corpus() -> Corpus {
        let departments = [Department::Sales, Department::It, Department::Hr];
        let salaries = [SalaryBand::Low, SalaryBand::Medium, SalaryBand::High];
        let records = (0..60)
            .map(|i| {
                let left = i % 3 == 0;
                EmployeeRecord {
                    satisfaction_level: if left { 0.1 + (i % 5) as f64 * 0.02 } else { 0.7 },
                    last_evaluation: 0.5 + (i % 4) as f64 * 0.1,
                    number_project: 2 + (i % 5) as u32,
                    average_monthly_hours: 150 + (i % 7) as u32 * 10,
                    time_spend_company: 2 + (i % 4) as u32,
                    work_accident: i % 11 == 0,
                    promotion_last_5years: false,
                    department: departments[i % 3],
                    salary: salaries[i % 2],
                    left,
                }
            })
            .collect();
        Corpus {
            records,
            fingerprint: "test".to_string(),
            source: None,
        }
    }

    #[test]
    fn trains_and_evaluates_held_out_rows() {
        let (bundle, report) = train(&corpus(), &TrainingConfig::default()).unwrap();
        assert_eq!(report.train_rows + report.test_rows, 60);
        assert_eq!(report.test_rows, 12);
        let evaluation = report.evaluation.unwrap();
        assert_eq!(evaluation.samples, 12);
        assert!(evaluation.accuracy > 0.8);
        assert_eq!(bundle.metadata().train_rows, 48);
        assert_eq!(bundle.metadata().evaluation.as_ref(), Some(&evaluation));
    }

    #[test]
    fn encoders_cover_the_whole_corpus() {
        let (bundle, _) = train(&corpus(), &TrainingConfig::default()).unwrap();
        let departments = bundle
            .encoders()
            .get(crate::dataset::Feature::Department)
            .unwrap()
            .classes()
            .to_vec();
        assert_eq!(departments, vec!["IT", "hr", "sales"]);
    }

    #[test]
    fn zero_test_fraction_skips_evaluation() {
        let config = TrainingConfig {
            test_fraction: 0.0,
            ..TrainingConfig::default()
        };
        let (_, report) = train(&corpus(), &config).unwrap();
        assert_eq!(report.test_rows, 0);
        assert!(report.evaluation.is_none());
    }

    #[test]
    fn training_is_reproducible() {
        let (a, _) = train(&corpus(), &TrainingConfig::default()).unwrap();
        let (b, _) = train(&corpus(), &TrainingConfig::default()).unwrap();
        assert_eq!(a.classifier(), b.classifier());
        assert_eq!(a.scaler(), b.scaler());
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let empty = Corpus {
            records: Vec::new(),
            fingerprint: String::new(),
            source: None,
        };
        assert!(matches!(
            train(&empty, &TrainingConfig::default()),
            Err(TrainError::EmptyCorpus)
        ));
    }
}
