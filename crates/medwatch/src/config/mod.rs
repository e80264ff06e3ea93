use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::workflows::audit::DEFAULT_RETENTION_DAYS;
use crate::workflows::risk::{ScoringConfig, DEFAULT_INTERVENTION_THRESHOLD};

const DEFAULT_DATA_PATH: &str = "medwatch-data.json";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub storage: StorageConfig,
    pub scoring: ScoringConfig,
    pub retention: RetentionConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let data_path = env::var("MEDWATCH_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH));

        let retention_days = match env::var("MEDWATCH_RETENTION_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidRetentionDays(raw))?,
            Err(_) => DEFAULT_RETENTION_DAYS,
        };

        let intervention_threshold = match env::var("MEDWATCH_INTERVENTION_THRESHOLD") {
            Ok(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|value| *value <= 100)
                .ok_or(ConfigError::InvalidInterventionThreshold(raw))?,
            Err(_) => DEFAULT_INTERVENTION_THRESHOLD,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            storage: StorageConfig { data_path },
            scoring: ScoringConfig::default().with_intervention_threshold(intervention_threshold),
            retention: RetentionConfig { retention_days },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Location of the JSON dataset the reference store reads and writes.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_path: PathBuf,
}

/// Default audit retention window used when the CLI does not override it.
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    pub retention_days: u32,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidRetentionDays(String),
    InvalidInterventionThreshold(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRetentionDays(raw) => write!(
                f,
                "MEDWATCH_RETENTION_DAYS must be a non-negative whole number of days (found '{raw}')"
            ),
            ConfigError::InvalidInterventionThreshold(raw) => write!(
                f,
                "MEDWATCH_INTERVENTION_THRESHOLD must be between 0 and 100 (found '{raw}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("MEDWATCH_DATA");
        env::remove_var("MEDWATCH_RETENTION_DAYS");
        env::remove_var("MEDWATCH_INTERVENTION_THRESHOLD");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.storage.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.retention.retention_days, 365);
        assert_eq!(config.scoring.intervention_threshold, 60);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn load_reads_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        env::set_var("MEDWATCH_RETENTION_DAYS", "90");
        env::set_var("MEDWATCH_INTERVENTION_THRESHOLD", "70");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.retention.retention_days, 90);
        assert_eq!(config.scoring.intervention_threshold, 70);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MEDWATCH_INTERVENTION_THRESHOLD", "140");
        let result = AppConfig::load();
        reset_env();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidInterventionThreshold(_))
        ));
    }
}
