// Per-client file logging
//
// Each client owns its own rolling log file and dispatcher. Facade calls run
// under that dispatcher, so nothing is installed globally and two clients
// with different directories never share output.

use std::{
    future::Future,
    path::{Path, PathBuf},
};

use tracing::{
    Dispatch,
    instrument::{WithDispatch, WithSubscriber},
    warn,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::filter::LevelFilter;

use crate::error::{MaintainerError, Result};

/// Dedicated logger for one maintainer client
pub struct ClientLogger {
    dispatch: Dispatch,
    log_dir: PathBuf,
    // Flushes buffered lines when the client is dropped
    _guard: WorkerGuard,
}

impl ClientLogger {
    /// Create `<log_dir>/<module>.<date>.log`, rotated at midnight, keeping
    /// `backup_count` old files next to the active one
    pub fn new(log_dir: &Path, module: &str, level: &str, backup_count: usize) -> Result<Self> {
        std::fs::create_dir_all(log_dir).map_err(|e| {
            MaintainerError::Configuration(format!(
                "cannot create log directory {}: {}",
                log_dir.display(),
                e
            ))
        })?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(module)
            .filename_suffix("log")
            .max_log_files(backup_count + 1)
            .build(log_dir)
            .map_err(|e| {
                MaintainerError::Configuration(format!(
                    "cannot open log file in {}: {}",
                    log_dir.display(),
                    e
                ))
            })?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_max_level(parse_level(level).unwrap_or(LevelFilter::INFO))
            .finish();

        let logger = Self {
            dispatch: Dispatch::new(subscriber),
            log_dir: log_dir.to_path_buf(),
            _guard: guard,
        };
        if parse_level(level).is_none() {
            logger.in_scope(|| warn!("Unknown log level '{}', using INFO", level));
        }
        Ok(logger)
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Run `fut` with this logger as its subscriber
    pub fn scope<F: Future>(&self, fut: F) -> WithDispatch<F> {
        fut.with_subscriber(self.dispatch.clone())
    }

    /// Run a synchronous closure with this logger as its subscriber
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl std::fmt::Debug for ClientLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientLogger")
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

/// Level names as users tend to write them, `WARNING` and `CRITICAL` included
pub(crate) fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_ascii_uppercase().as_str() {
        "WARNING" => Some(LevelFilter::WARN),
        "CRITICAL" | "FATAL" => Some(LevelFilter::ERROR),
        other => other.parse().ok(),
    }
}
