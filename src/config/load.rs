use std::path::{Path, PathBuf};

use serde::de::Error as SerdeDeError;
use tracing::debug;

use crate::app_dirs;

use super::types::AppSettings;
use super::{CONFIG_FILE_NAME, ConfigError, map_app_dir_error};

/// Resolve the configuration file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from the app root, returning defaults if missing.
pub fn load_or_default() -> Result<AppSettings, ConfigError> {
    load_from(&config_path()?)
}

/// Load configuration from `path`; a missing file yields the defaults.
pub fn load_from(path: &Path) -> Result<AppSettings, ConfigError> {
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(AppSettings::default());
    }
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source: SerdeDeError::custom(source),
    })?;
    toml::from_str::<AppSettings>(&text)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
        .map(AppSettings::normalized)
}

/// Artifact directory from the settings, or `<app root>/model`.
pub fn resolve_artifacts_dir(settings: &AppSettings) -> Result<PathBuf, ConfigError> {
    match &settings.artifacts_dir {
        Some(dir) => Ok(dir.clone()),
        None => app_dirs::artifacts_dir().map_err(map_app_dir_error),
    }
}
