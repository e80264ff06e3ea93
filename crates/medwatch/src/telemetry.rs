//! Log output for the `medwatch` binary and embedding hosts.

use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    /// `APP_LOG_LEVEL` (or `RUST_LOG`) is not a valid filter directive.
    InvalidFilter { value: String, source: ParseError },
    /// A global subscriber was already installed by the host process.
    AlreadyInstalled(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter { value, .. } => {
                write!(f, "log filter '{value}' is not valid; try a level such as info or debug")
            }
            TelemetryError::AlreadyInstalled(err) => {
                write!(f, "medwatch logging could not be installed: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source, .. } => Some(source),
            TelemetryError::AlreadyInstalled(err) => Some(&**err),
        }
    }
}

/// Installs compact, uncoloured logging on stderr so stdout carries only command output
/// (tables, JSON reports). A set `RUST_LOG` overrides `APP_LOG_LEVEL`.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = log_filter(&config.log_level, std::env::var("RUST_LOG").ok())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}

fn log_filter(
    level: &str,
    override_directive: Option<String>,
) -> Result<EnvFilter, TelemetryError> {
    let value = override_directive
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| level.to_string());
    EnvFilter::try_new(&value).map_err(|source| TelemetryError::InvalidFilter { value, source })
}
