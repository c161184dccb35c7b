//! Tracing setup for Trustroute
//!
//! Console output follows the level the user picks; a full trace of the
//! run is written to disk so dropped packets can be followed hop by hop.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::TrustrouteError;

/// File name of the per-run trace log, overwritten on every run.
pub const LOG_FILE_NAME: &str = "trustroute-last-run.log";

/// Location of the trace log inside `logs_dir` (default `./logs`).
pub fn log_file_path(logs_dir: Option<&Path>) -> PathBuf {
    logs_dir.unwrap_or_else(|| Path::new("logs")).join(LOG_FILE_NAME)
}

/// Installs console and file subscribers.
///
/// `RUST_LOG` takes precedence over `console_level` for the console layer.
/// The file layer always records at TRACE. Returns the log file path.
///
/// # Errors
///
/// - `TrustrouteError::Io` - Logs directory or file cannot be created
/// - `TrustrouteError::Configuration` - A global subscriber is already installed
pub fn init_tracing(
    console_level: Level,
    logs_dir: Option<&Path>,
) -> Result<PathBuf, TrustrouteError> {
    let log_file_path = log_file_path(logs_dir);
    if let Some(parent) = log_file_path.parent() {
        create_dir_all(parent)?;
    }
    let log_file = File::create(&log_file_path)?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level.to_string()));
    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(log_file)
        .with_filter(EnvFilter::new("trace"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| TrustrouteError::Configuration {
            reason: format!("tracing already initialized: {e}"),
        })?;

    tracing::info!(
        console = %console_level,
        trace_file = %log_file_path.display(),
        "tracing initialized"
    );
    Ok(log_file_path)
}

/// CLI log levels for user control
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliLogLevel {
    /// Converts to the matching `tracing::Level`.
    ///
    /// # Examples
    /// ```
    /// use trustroute_core::tracing_setup::CliLogLevel;
    ///
    /// assert_eq!(CliLogLevel::Warn.as_tracing_level(), tracing::Level::WARN);
    /// ```
    pub fn as_tracing_level(self) -> Level {
        match self {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CliLogLevel::Error => "error",
            CliLogLevel::Warn => "warn",
            CliLogLevel::Info => "info",
            CliLogLevel::Debug => "debug",
            CliLogLevel::Trace => "trace",
        };
        f.write_str(name)
    }
}
