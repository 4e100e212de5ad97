//! Tracing subscriber setup.
//!
//! The TUI owns the terminal, so it logs to a rolling file under
//! `$TWD_HOME/logs`. Plain CLI commands log to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::SystemTime;

/// Environment variable with an `EnvFilter` directive.
pub const LOG_ENV: &str = "TWD_LOG";

const LOG_FILE_PREFIX: &str = "twd.log";

/// Where log lines go.
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    /// Daily-rolling file in the given directory.
    File(PathBuf),
}

/// Keeps the non-blocking writer alive. Drop it only at process exit.
#[must_use = "dropping the guard stops log output"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Builds the filter from `TWD_LOG`, falling back to the configured level.
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
pub fn init(target: LogTarget, default_level: &str) -> Result<LogGuard> {
    let filter = build_filter(default_level);

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_timer(SystemTime)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))?;
            Ok(LogGuard { _worker: None })
        }
        LogTarget::File(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_timer(SystemTime)
                .with_ansi(false)
                .with_writer(writer)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))?;
            Ok(LogGuard {
                _worker: Some(guard),
            })
        }
    }
}
