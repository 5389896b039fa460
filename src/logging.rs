//! Tracing setup shared by the churnlens command-line tools.
//!
//! Diagnostics go to stderr so stdout stays parseable (`--json`, `--stdin`). Each run
//! also appends to its own `churnlens_<timestamp>.log` under `<app root>/logs`, unless
//! `CHURNLENS_LOG_FILE` turns file output off. Only the newest log files are kept.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use thiserror::Error;
use time::{
    OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem, macros::format_description,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{InitError, RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};

/// Set to `0`, `false`, `off` or `no` to log to stderr only.
pub const LOG_FILE_ENV: &str = "CHURNLENS_LOG_FILE";
const LOG_FILE_PREFIX: &str = "churnlens";
const KEEP_LOG_FILES: usize = 10;

/// Holds the file writer's flush guard for the life of the process; `None` when the
/// run logs to stderr only.
static INSTALLED: OnceLock<Option<WorkerGuard>> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("No base config directory available for the log folder")]
    NoBaseDir,
    #[error("Failed to create log folder {path}: {source}")]
    LogDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to open log file in {dir}: {source}")]
    OpenFile { dir: PathBuf, source: InitError },
    #[error("Failed to prune old logs in {path}: {source}")]
    Prune {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format log file timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("Tracing subscriber already installed: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

impl From<AppDirError> for LoggingError {
    fn from(error: AppDirError) -> Self {
        match error {
            AppDirError::NoBaseDir => Self::NoBaseDir,
            AppDirError::CreateDir { path, source } => Self::LogDir { path, source },
        }
    }
}

/// Install the global subscriber. Later calls return `Ok(())` without reinstalling.
///
/// On error nothing is installed and the caller keeps running without logs.
pub fn init() -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    let stderr_layer = fmt::layer()
        .with_timer(build_timer())
        .with_target(false)
        .with_writer(std::io::stderr);
    let registry = Registry::default().with(env_filter()).with(stderr_layer);

    if !file_logging_enabled(std::env::var(LOG_FILE_ENV).ok().as_deref()) {
        tracing::subscriber::set_global_default(registry)?;
        let _ = INSTALLED.set(None);
        return Ok(());
    }

    let log_dir = app_dirs::logs_dir()?;
    let file_name = log_file_stem(now_local_or_utc())?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.as_str())
        .filename_suffix("log")
        .build(&log_dir)
        .map_err(|source| LoggingError::OpenFile {
            dir: log_dir.clone(),
            source,
        })?;
    prune_logs(&log_dir, KEEP_LOG_FILES)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_timer(build_timer())
        .with_writer(file_writer);

    tracing::subscriber::set_global_default(registry.with(file_layer))?;
    let _ = INSTALLED.set(Some(guard));
    tracing::debug!("log file {}", log_dir.join(format!("{file_name}.log")).display());
    Ok(())
}

fn file_logging_enabled(setting: Option<&str>) -> bool {
    !matches!(
        setting.map(|value| value.trim().to_ascii_lowercase()).as_deref(),
        Some("0" | "false" | "off" | "no")
    )
}

/// Delete all but the `keep` most recently modified `churnlens_*.log` files.
fn prune_logs(dir: &Path, keep: usize) -> Result<(), LoggingError> {
    let prune_error = |source| LoggingError::Prune {
        path: dir.to_path_buf(),
        source,
    };
    let mut logs: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).map_err(prune_error)? {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        let is_ours = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX) && name.ends_with(".log"));
        if !is_ours || !entry.file_type().is_ok_and(|kind| kind.is_file()) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        logs.push((modified, path));
    }
    if logs.len() <= keep {
        return Ok(());
    }
    logs.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, path) in logs.drain(keep..) {
        fs::remove_file(&path).map_err(prune_error)?;
    }
    Ok(())
}

/// `churnlens_<date>_<time>`; the appender adds the `.log` suffix.
fn log_file_stem(now: OffsetDateTime) -> Result<String, LoggingError> {
    const STAMP: &[BorrowedFormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    Ok(format!("{LOG_FILE_PREFIX}_{}", now.format(STAMP)?))
}

fn build_timer() -> fmt::time::OffsetTime<&'static [BorrowedFormatItem<'static>]> {
    const LINE_TIME: &[BorrowedFormatItem<'static>] =
        format_description!("[hour]:[minute]:[second].[subsecond digits:3]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, LINE_TIME)
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn log_file_stem_is_prefixed_and_timestamped() {
        let fixed = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(log_file_stem(fixed).unwrap(), "churnlens_2023-11-14_22-13-20");
    }

    #[test]
    fn file_logging_can_be_switched_off() {
        assert!(file_logging_enabled(None));
        assert!(file_logging_enabled(Some("1")));
        for off in ["0", "false", "OFF", " no "] {
            assert!(!file_logging_enabled(Some(off)), "{off}");
        }
    }

    #[test]
    fn prune_keeps_newest_churnlens_logs_only() {
        let dir = tempdir().unwrap();
        let base = SystemTime::now() - Duration::from_secs(3600);
        for idx in 0..5u64 {
            let path = dir.path().join(format!("churnlens_{idx}.log"));
            let file = fs::File::create(&path).unwrap();
            file.set_modified(base + Duration::from_secs(idx * 60)).unwrap();
        }
        fs::write(dir.path().join("other.log"), b"keep").unwrap();
        fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

        prune_logs(dir.path(), 2).unwrap();

        let mut remaining: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();
        assert_eq!(
            remaining,
            ["churnlens_3.log", "churnlens_4.log", "notes.txt", "other.log"]
        );
    }

    #[test]
    fn missing_base_dir_maps_to_logging_error() {
        assert!(matches!(
            LoggingError::from(AppDirError::NoBaseDir),
            LoggingError::NoBaseDir
        ));
    }
}
