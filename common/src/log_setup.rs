//! Process-wide `tracing` subscriber for binaries.
//!
//! Console output always goes to stdout, with warnings and errors duplicated
//! to stderr. When [`LogConfig::to_file`] is set, events are also written
//! through a non-blocking daily-rolling appender.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// File name prefix, `<prefix>.<date>.log`.
    pub prefix: String,
    /// Filter directives used when `RUST_LOG` is unset, e.g. `info,vibe=debug`.
    pub level: String,
    pub dir: PathBuf,
    /// Rolled files kept on disk; older ones are deleted on rotation.
    pub max_files: usize,
    pub to_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            prefix: "vibe".to_string(),
            level: "info".to_string(),
            dir: PathBuf::from("logs"),
            max_files: 5,
            to_file: true,
        }
    }
}

impl LogConfig {
    pub fn named(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum LogSetupError {
    #[error("Invalid log filter '{filter}'")]
    Filter {
        filter: String,
        #[source]
        source: ParseError,
    },

    #[error("Failed to create log directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create rolling log file")]
    Appender(#[from] InitError),

    #[error("A global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] TryInitError),
}

/// Flushes buffered file output when dropped. Keep it alive for the whole run.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Installs the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.level`.
pub fn setup_logging(config: &LogConfig) -> Result<LogGuard, LogSetupError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(&config.level)?,
    };

    let (file_writer, guard) = if config.to_file {
        let (writer, guard) = tracing_appender::non_blocking(file_appender(config)?);
        (Some(writer), Some(guard))
    } else {
        (None, None)
    };

    let console_writer = std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(console_writer);

    let file_layer = file_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false)
            .with_writer(writer)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(LogGuard { _file: guard })
}

fn parse_filter(directives: &str) -> Result<EnvFilter, LogSetupError> {
    EnvFilter::try_new(directives).map_err(|source| LogSetupError::Filter {
        filter: directives.to_string(),
        source,
    })
}

fn file_appender(config: &LogConfig) -> Result<RollingFileAppender, LogSetupError> {
    create_dir(&config.dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.prefix)
        .filename_suffix("log")
        .max_log_files(config.max_files.max(1))
        .build(&config.dir)?;
    Ok(appender)
}

fn create_dir(path: &Path) -> Result<(), LogSetupError> {
    std::fs::create_dir_all(path).map_err(|source| LogSetupError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
