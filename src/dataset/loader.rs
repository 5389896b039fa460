//! Corpus loader for the HR CSV export.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::record::EmployeeRecord;
use super::schema::{
    FEATURE_COUNT, Feature, LEGACY_DEPARTMENT_COLUMN, TARGET_COLUMN, UnknownCategory,
};

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to read corpus {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Corpus is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("Line {line}: invalid value {value:?} in column `{column}`")]
    InvalidValue {
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("Line {line}: {source}")]
    UnknownCategory {
        line: u64,
        source: UnknownCategory,
    },
    #[error("Corpus contains no rows")]
    Empty,
}

/// Parsed HR corpus plus a fingerprint of the bytes it was parsed from.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub records: Vec<EmployeeRecord>,
    /// Hex blake3 digest of the raw CSV bytes.
    pub fingerprint: String,
    /// File the corpus was read from, if any.
    pub source: Option<PathBuf>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load and parse the corpus at `path`.
pub fn load_corpus(path: &Path) -> Result<Corpus, CorpusError> {
    let bytes = std::fs::read(path).map_err(|source| CorpusError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut corpus = parse_corpus(&bytes)?;
    corpus.source = Some(path.to_path_buf());
    info!(
        "Loaded {} employee rows from {} ({})",
        corpus.len(),
        path.display(),
        &corpus.fingerprint[..12]
    );
    Ok(corpus)
}

/// Parse corpus CSV bytes. Column order is free; extra columns are ignored.
pub fn parse_corpus(bytes: &[u8]) -> Result<Corpus, CorpusError> {
    let fingerprint = blake3::hash(bytes).to_hex().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        let line = row
            .position()
            .map(|pos| pos.line())
            .unwrap_or(idx as u64 + 2);
        records.push(columns.parse_row(&row, line)?);
    }
    if records.is_empty() {
        return Err(CorpusError::Empty);
    }
    debug!("Parsed {} corpus rows", records.len());
    Ok(Corpus {
        records,
        fingerprint,
        source: None,
    })
}

/// Header positions of every column the loader needs.
struct ColumnIndex {
    features: [usize; FEATURE_COUNT],
    target: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, CorpusError> {
        let find = |name: &str| headers.iter().position(|header| header == name);
        let mut features = [0usize; FEATURE_COUNT];
        for feature in Feature::ALL {
            let position = match feature {
                Feature::Department => {
                    find(feature.column()).or_else(|| find(LEGACY_DEPARTMENT_COLUMN))
                }
                _ => find(feature.column()),
            };
            features[feature.index()] =
                position.ok_or(CorpusError::MissingColumn(feature.column()))?;
        }
        let target = find(TARGET_COLUMN).ok_or(CorpusError::MissingColumn(TARGET_COLUMN))?;
        Ok(Self { features, target })
    }

    fn parse_row(&self, row: &csv::StringRecord, line: u64) -> Result<EmployeeRecord, CorpusError> {
        let cell = |feature: Feature| row.get(self.features[feature.index()]).unwrap_or("");
        let real = |feature: Feature| parse_real(cell(feature), feature.column(), line);
        let count = |feature: Feature| parse_count(cell(feature), feature.column(), line);
        let flag = |feature: Feature| parse_flag(cell(feature), feature.column(), line);

        Ok(EmployeeRecord {
            satisfaction_level: real(Feature::SatisfactionLevel)?,
            last_evaluation: real(Feature::LastEvaluation)?,
            number_project: count(Feature::NumberProject)?,
            average_monthly_hours: count(Feature::AverageMonthlyHours)?,
            time_spend_company: count(Feature::TimeSpendCompany)?,
            work_accident: flag(Feature::WorkAccident)?,
            promotion_last_5years: flag(Feature::PromotionLast5Years)?,
            department: cell(Feature::Department)
                .parse()
                .map_err(|source| CorpusError::UnknownCategory { line, source })?,
            salary: cell(Feature::Salary)
                .parse()
                .map_err(|source| CorpusError::UnknownCategory { line, source })?,
            left: parse_flag(row.get(self.target).unwrap_or(""), TARGET_COLUMN, line)?,
        })
    }
}

fn invalid(value: &str, column: &'static str, line: u64) -> CorpusError {
    CorpusError::InvalidValue {
        line,
        column,
        value: value.to_string(),
    }
}

fn parse_real(value: &str, column: &'static str, line: u64) -> Result<f64, CorpusError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(value, column, line))
}

fn parse_count(value: &str, column: &'static str, line: u64) -> Result<u32, CorpusError> {
    value.parse::<u32>().map_err(|_| invalid(value, column, line))
}

fn parse_flag(value: &str, column: &'static str, line: u64) -> Result<bool, CorpusError> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(invalid(value, column, line)),
    }
}
