//! Logging setup for the `nom024` binary.
//!
//! Library crates only emit `tracing` events; the subscriber lives here.
//!
//! # Log Levels
//!
//! - `error`: mandatory catalogs that failed to load
//! - `warn`: optional catalog failures, unknown providers
//! - `info`: load summaries
//! - `debug`: skipped rows, duplicate codes, unparseable age tokens
//! - `trace`: not used by the engine
//!
//! # Usage
//!
//! ```ignore
//! use nom024_cli::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::default()).expect("init logging");
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Crates whose events pass the default filter at the configured level.
const WORKSPACE_CRATES: &[&str] = &[
    "nom024",
    "nom024_cli",
    "nom024_catalog",
    "nom024_model",
    "nom024_policy",
    "nom024_validate",
];

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` override `level_filter` when set.
    pub use_env_filter: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Logs go to stderr when unset.
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    /// One JSON object per event, timestamped.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
        }
    }
}

/// Install the global subscriber. Call once, before any catalog is loaded.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            init_logging_with_writer(config, Mutex::new(file))
        }
        None => init_logging_with_writer(config, io::stderr),
    }
}

pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W) -> io::Result<()>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    // Human formats drop timestamps; the json format keeps them for log shipping.
    let layer = match config.format {
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .without_time()
            .with_target(false)
            .with_ansi(config.with_ansi)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .without_time()
            .with_target(false)
            .with_ansi(config.with_ansi)
            .with_writer(writer)
            .boxed(),
    };
    tracing_subscriber::registry()
        .with(layer)
        .with(build_env_filter(config.level_filter, config.use_env_filter))
        .try_init()
        .map_err(io::Error::other)
}

/// Default directives: warn for dependencies, `level` for workspace crates.
pub fn default_directives(level: LevelFilter) -> String {
    if level == LevelFilter::OFF {
        return "off".to_string();
    }
    let level = level.to_string().to_lowercase();
    std::iter::once("warn".to_string())
        .chain(
            WORKSPACE_CRATES
                .iter()
                .map(|krate| format!("{krate}={level}")),
        )
        .collect::<Vec<_>>()
        .join(",")
}

fn build_env_filter(level: LevelFilter, use_env: bool) -> EnvFilter {
    if use_env && let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(default_directives(level))
}
