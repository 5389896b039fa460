use std::path::PathBuf;

use super::TestConfigEnv;
use super::super::defaults::{MAX_EPOCHS, MAX_TEST_FRACTION};
use super::super::{
    AppSettings, CONFIG_FILE_NAME, ConfigError, config_path, load_from, load_or_default,
    resolve_artifacts_dir,
};
use crate::ml::TrainingConfig;

#[test]
fn missing_file_yields_defaults() {
    let env = TestConfigEnv::new();
    let loaded = load_from(&env.path("absent.toml")).unwrap();
    assert_eq!(loaded, AppSettings::default());
    assert_eq!(loaded.data_file, PathBuf::from("HR_comma_sep.csv"));
    assert_eq!(loaded.training.seed, 42);
    assert_eq!(loaded.thresholds.high_retention, 0.7);
}

#[test]
fn partial_tables_fill_in_defaults() {
    let env = TestConfigEnv::new();
    let path = env.path("cfg.toml");
    let data = r#"
data_file = "data/hr.csv"

[training]
epochs = 25
balance_classes = true

[thresholds]
moderate_risk = 0.4
"#;
    env.write(&path, data);
    let loaded = load_from(&path).unwrap();
    assert_eq!(loaded.data_file, PathBuf::from("data/hr.csv"));
    assert_eq!(loaded.training.epochs, 25);
    assert!(loaded.training.balance_classes);
    assert_eq!(loaded.training.test_fraction, 0.2);
    assert_eq!(loaded.thresholds.moderate_risk, 0.4);
    assert_eq!(loaded.thresholds.high_retention, 0.7);
}

#[test]
fn out_of_range_values_are_clamped_on_load() {
    let env = TestConfigEnv::new();
    let path = env.path("cfg.toml");
    let data = r#"
[training]
test_fraction = 1.5
epochs = 0
learning_rate = -1.0
batch_size = 0

[thresholds]
high_retention = 2.0
"#;
    env.write(&path, data);
    let loaded = load_from(&path).unwrap();
    assert_eq!(loaded.training.test_fraction, MAX_TEST_FRACTION);
    assert_eq!(loaded.training.epochs, 1);
    assert_eq!(loaded.training.learning_rate, 0.1);
    assert_eq!(loaded.training.batch_size, 1);
    assert_eq!(loaded.thresholds.high_retention, 1.0);

    env.write(&path, "[training]\nepochs = 999999\n");
    assert_eq!(load_from(&path).unwrap().training.epochs, MAX_EPOCHS);
}

#[test]
fn malformed_toml_reports_path() {
    let env = TestConfigEnv::new();
    let path = env.path("cfg.toml");
    env.write(&path, "[training\nepochs = ");
    match load_from(&path) {
        Err(ConfigError::ParseToml { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn config_path_lives_in_app_root() {
    let env = TestConfigEnv::new();
    assert_eq!(config_path().unwrap(), env.app_dir().join(CONFIG_FILE_NAME));
    assert_eq!(load_or_default().unwrap(), AppSettings::default());
}

#[test]
fn artifacts_dir_defaults_under_app_root() {
    let env = TestConfigEnv::new();
    let mut settings = AppSettings::default();
    assert_eq!(
        resolve_artifacts_dir(&settings).unwrap(),
        env.app_dir().join("model")
    );
    settings.artifacts_dir = Some(env.path("elsewhere"));
    assert_eq!(
        resolve_artifacts_dir(&settings).unwrap(),
        env.path("elsewhere")
    );
}

#[test]
fn training_settings_map_onto_training_config() {
    let mut settings = AppSettings::default();
    settings.training.seed = 7;
    settings.training.l2 = 0.0;
    let config = TrainingConfig::from(&settings.training);
    assert_eq!(config.test_fraction, 0.2);
    assert_eq!(config.logreg.seed, 7);
    assert_eq!(config.logreg.l2, 0.0);
    assert_eq!(config.logreg.batch_size, 64);
}
