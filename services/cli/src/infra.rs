use chrono::{NaiveDate, Utc};
use medwatch::config::AppConfig;
use medwatch::error::AppError;
use medwatch::storage::{InMemoryStore, SnapshotError};
use medwatch::telemetry;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// `date`, or the current UTC calendar day.
pub(crate) fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Utc::now().date_naive())
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(SnapshotError::from)?;
    println!("{rendered}");
    Ok(())
}

/// Loaded configuration plus the dataset a command operates on.
pub(crate) struct Workspace {
    pub(crate) config: AppConfig,
    pub(crate) data_path: PathBuf,
    pub(crate) store: Arc<InMemoryStore>,
}

impl Workspace {
    /// Loads config, installs tracing and opens the dataset (`--data` wins over config).
    pub(crate) fn open(data: Option<PathBuf>) -> Result<Self, AppError> {
        let config = AppConfig::load()?;
        telemetry::init(&config.telemetry)?;

        let data_path = data.unwrap_or_else(|| config.storage.data_path.clone());
        let store = InMemoryStore::load_or_default(&data_path)?;
        debug!(path = %data_path.display(), environment = ?config.environment, "dataset opened");

        Ok(Self {
            config,
            data_path,
            store: Arc::new(store),
        })
    }

    pub(crate) fn persist(&self) -> Result<(), AppError> {
        self.store.save(&self.data_path)?;
        info!(path = %self.data_path.display(), "dataset saved");
        Ok(())
    }
}
