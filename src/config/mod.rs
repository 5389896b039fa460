//! `config.toml` handling: data location, artifact directory, training knobs and
//! risk thresholds.

use crate::app_dirs;

mod defaults;
mod errors;
mod load;
mod save;
mod types;

#[cfg(test)]
mod tests;

/// Default filename used to store the configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub use errors::ConfigError;
pub use load::{config_path, load_from, load_or_default, resolve_artifacts_dir};
pub use save::{save, save_to_path};
pub use types::{AppSettings, TrainingSettings};

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}
