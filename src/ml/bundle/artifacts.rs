//! On-disk layout for a fitted [`ModelBundle`].
//!
//! One JSON file per fitted component plus `manifest.json`, which pins the
//! format version, the feature order and a blake3 digest of every component file.
//! Loading refuses anything that does not match.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{BundleMetadata, ModelBundle};
use crate::dataset::{TARGET_COLUMN, feature_columns};
use crate::fs_atomic::atomic_write;
use crate::ml::encoder::EncoderTable;
use crate::ml::error::ArtifactError;
use crate::ml::logreg::LogRegModel;
use crate::ml::metrics::EvaluationReport;
use crate::ml::scaler::FeatureScaler;

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;
pub const MANIFEST_FILE: &str = "manifest.json";
pub const ENCODERS_FILE: &str = "encoders.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";

/// File name and content digest of one component artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDigest {
    pub file: String,
    pub blake3: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFiles {
    pub encoders: ArtifactDigest,
    pub scaler: ArtifactDigest,
    pub classifier: ArtifactDigest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub format_version: u32,
    /// Feature names in model-vector order.
    pub feature_columns: Vec<String>,
    pub target_column: String,
    pub files: ArtifactFiles,
    #[serde(default)]
    pub corpus_fingerprint: Option<String>,
    #[serde(default)]
    pub trained_at: Option<String>,
    #[serde(default)]
    pub train_rows: usize,
    #[serde(default)]
    pub evaluation: Option<EvaluationReport>,
}

impl ModelBundle {
    /// Persist the bundle into `dir`, creating it if needed.
    ///
    /// Component files are written before the manifest so a crash never leaves a
    /// manifest pointing at missing content.
    pub fn save(&self, dir: &Path) -> Result<ArtifactManifest, ArtifactError> {
        std::fs::create_dir_all(dir).map_err(|source| ArtifactError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        let files = ArtifactFiles {
            encoders: write_component(dir, ENCODERS_FILE, &self.encoders)?,
            scaler: write_component(dir, SCALER_FILE, &self.scaler)?,
            classifier: write_component(dir, CLASSIFIER_FILE, &self.classifier)?,
        };
        let manifest = ArtifactManifest {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_columns: feature_columns(),
            target_column: TARGET_COLUMN.to_string(),
            files,
            corpus_fingerprint: self.metadata.corpus_fingerprint.clone(),
            trained_at: self.metadata.trained_at.clone(),
            train_rows: self.metadata.train_rows,
            evaluation: self.metadata.evaluation.clone(),
        };
        let path = dir.join(MANIFEST_FILE);
        let bytes = to_json(&path, &manifest)?;
        atomic_write(&path, &bytes).map_err(|source| ArtifactError::Write {
            path: path.clone(),
            source,
        })?;
        info!("Saved model artifacts to {}", dir.display());
        Ok(manifest)
    }

    /// Load and verify a bundle previously written by [`ModelBundle::save`].
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let manifest = read_manifest(dir)?;
        let encoders: EncoderTable = read_component(dir, &manifest.files.encoders)?;
        let scaler: FeatureScaler = read_component(dir, &manifest.files.scaler)?;
        let classifier: LogRegModel = read_component(dir, &manifest.files.classifier)?;
        let metadata = BundleMetadata {
            corpus_fingerprint: manifest.corpus_fingerprint,
            trained_at: manifest.trained_at,
            train_rows: manifest.train_rows,
            evaluation: manifest.evaluation,
        };
        let bundle = ModelBundle::new(encoders, scaler, classifier, metadata).map_err(|reason| {
            ArtifactError::Invalid {
                path: dir.to_path_buf(),
                reason,
            }
        })?;
        info!("Loaded model artifacts from {}", dir.display());
        Ok(bundle)
    }
}

/// Read and check the manifest in `dir` without loading the components.
pub fn read_manifest(dir: &Path) -> Result<ArtifactManifest, ArtifactError> {
    let path = dir.join(MANIFEST_FILE);
    let bytes = read_bytes(&path)?;
    let manifest: ArtifactManifest =
        serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
            path: path.clone(),
            source,
        })?;
    if manifest.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            path,
            found: manifest.format_version,
            expected: ARTIFACT_FORMAT_VERSION,
        });
    }
    if manifest.feature_columns != feature_columns() {
        return Err(ArtifactError::Invalid {
            path,
            reason: format!(
                "feature columns {:?} do not match the schema {:?}",
                manifest.feature_columns,
                feature_columns()
            ),
        });
    }
    if manifest.target_column != TARGET_COLUMN {
        return Err(ArtifactError::Invalid {
            path,
            reason: format!("unexpected target column `{}`", manifest.target_column),
        });
    }
    Ok(manifest)
}

fn write_component<T: Serialize>(
    dir: &Path,
    file: &str,
    value: &T,
) -> Result<ArtifactDigest, ArtifactError> {
    let path = dir.join(file);
    let bytes = to_json(&path, value)?;
    atomic_write(&path, &bytes).map_err(|source| ArtifactError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(ArtifactDigest {
        file: file.to_string(),
        blake3: blake3::hash(&bytes).to_hex().to_string(),
    })
}

fn read_component<T: DeserializeOwned>(
    dir: &Path,
    digest: &ArtifactDigest,
) -> Result<T, ArtifactError> {
    let path = component_path(dir, &digest.file)?;
    let bytes = read_bytes(&path)?;
    if blake3::hash(&bytes).to_hex().as_str() != digest.blake3 {
        return Err(ArtifactError::DigestMismatch { path });
    }
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse { path, source })
}

/// Manifest entries must name plain files inside the artifact directory.
fn component_path(dir: &Path, file: &str) -> Result<PathBuf, ArtifactError> {
    let name = Path::new(file);
    if name.file_name().map(|n| n == name.as_os_str()) != Some(true) {
        return Err(ArtifactError::Invalid {
            path: dir.join(MANIFEST_FILE),
            reason: format!("component file `{file}` escapes the artifact directory"),
        });
    }
    Ok(dir.join(name))
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn to_json<T: Serialize>(path: &Path, value: &T) -> Result<Vec<u8>, ArtifactError> {
    serde_json::to_vec_pretty(value).map_err(|source| ArtifactError::Serialize {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Department, EmployeeRecord, FEATURE_COUNT, RawRecord, SalaryBand};
    use ndarray::Array2;
    use tempfile::tempdir;

    fn bundle() -> ModelBundle {
        let base = EmployeeRecord {
            satisfaction_level: 0.4,
            last_evaluation: 0.7,
            number_project: 4,
            average_monthly_hours: 180,
            time_spend_company: 2,
            work_accident: false,
            promotion_last_5years: false,
            department: Department::Sales,
            salary: SalaryBand::Low,
            left: false,
        };
        let records = vec![
            base.clone(),
            EmployeeRecord {
                department: Department::Technical,
                salary: SalaryBand::High,
                ..base
            },
        ];
        let encoders = EncoderTable::fit(&records).unwrap();
        let matrix = Array2::from_shape_fn((3, FEATURE_COUNT), |(r, c)| (r * c) as f64);
        let scaler = FeatureScaler::fit(matrix.view()).unwrap();
        let mut classifier = LogRegModel::zeroed(FEATURE_COUNT);
        classifier.weights = (0..FEATURE_COUNT).map(|i| i as f64 * 0.1 - 0.3).collect();
        classifier.bias = 0.25;
        let metadata = BundleMetadata {
            corpus_fingerprint: Some("abc".to_string()),
            trained_at: Some("2026-01-01T00:00:00Z".to_string()),
            train_rows: 2,
            evaluation: None,
        };
        ModelBundle::new(encoders, scaler, classifier, metadata).unwrap()
    }

    fn raw() -> RawRecord {
        RawRecord::new()
            .with("satisfaction_level", 0.3)
            .with("last_evaluation", 0.9)
            .with("number_project", 6)
            .with("average_montly_hours", 260)
            .with("time_spend_company", 4)
            .with("Work_accident", 0)
            .with("promotion_last_5years", 1)
            .with("Department", "technical")
            .with("salary", "low")
    }

    #[test]
    fn save_then_load_restores_identical_bundle() {
        let dir = tempdir().unwrap();
        let original = bundle();
        let manifest = original.save(dir.path()).unwrap();
        assert_eq!(manifest.format_version, ARTIFACT_FORMAT_VERSION);
        assert_eq!(manifest.feature_columns.len(), FEATURE_COUNT);

        let loaded = ModelBundle::load(dir.path()).unwrap();
        assert_eq!(loaded, original);
        assert_eq!(
            loaded.predict(&raw()).unwrap(),
            original.predict(&raw()).unwrap()
        );
    }

    #[test]
    fn missing_directory_reports_missing_manifest() {
        let dir = tempdir().unwrap();
        let err = ModelBundle::load(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ArtifactError::Missing { .. }));
    }

    #[test]
    fn tampered_component_fails_digest_check() {
        let dir = tempdir().unwrap();
        bundle().save(dir.path()).unwrap();
        let path = dir.path().join(SCALER_FILE);
        let mut text = std::fs::read_to_string(&path).unwrap();
        text.push('\n');
        std::fs::write(&path, text).unwrap();
        let err = ModelBundle::load(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::DigestMismatch { .. }));
    }

    #[test]
    fn unsupported_format_version_is_rejected() {
        let dir = tempdir().unwrap();
        let mut manifest = bundle().save(dir.path()).unwrap();
        manifest.format_version = 99;
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            serde_json::to_vec(&manifest).unwrap(),
        )
        .unwrap();
        let err = ModelBundle::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::UnsupportedVersion { found: 99, .. }
        ));
    }

    #[test]
    fn reordered_feature_columns_are_rejected() {
        let dir = tempdir().unwrap();
        let mut manifest = bundle().save(dir.path()).unwrap();
        manifest.feature_columns.swap(0, 1);
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            serde_json::to_vec(&manifest).unwrap(),
        )
        .unwrap();
        assert!(matches!(
            read_manifest(dir.path()),
            Err(ArtifactError::Invalid { .. })
        ));
    }

    #[test]
    fn component_names_cannot_leave_the_directory() {
        let dir = tempdir().unwrap();
        assert!(component_path(dir.path(), "../scaler.json").is_err());
        assert!(component_path(dir.path(), "scaler.json").is_ok());
    }
}
