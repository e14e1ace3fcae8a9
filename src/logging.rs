//! File logging bootstrap.
//!
//! Logs go to rotating files because the terminal belongs to the TUI. Events
//! are `key=value` messages, e.g. `event=task_add id=...`.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "daily-routine";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static LOGGER: OnceLock<(PathBuf, LoggerHandle)> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Unsupported log level '{0}'; expected trace|debug|info|warn|error|off")]
    InvalidLevel(String),
    #[error("Failed to create log directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to start logger: {0}")]
    StartError(#[from] flexi_logger::FlexiLoggerError),
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(LoggingError::InvalidLevel(other.to_string())),
    }
}

/// Start file logging into `log_dir`. Later calls are no-ops and return the
/// directory the logger was first started with.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<PathBuf, LoggingError> {
    let level = normalize_level(level)?;
    if let Some((dir, _)) = LOGGER.get() {
        return Ok(dir.clone());
    }

    std::fs::create_dir_all(log_dir).map_err(|source| LoggingError::DirectoryError {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let handle = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    let (dir, _) = LOGGER.get_or_init(|| (log_dir.to_path_buf(), handle));
    log::info!(
        "event=app_start version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        level,
        dir.display()
    );
    Ok(dir.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level("warning").unwrap(), "warn");
        assert!(matches!(normalize_level("loud"), Err(LoggingError::InvalidLevel(_))));
    }
}
