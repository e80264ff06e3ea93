use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INTERVENTION_THRESHOLD: u8 = 60;

/// Weights and windows applied by the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub health_weight: f32,
    pub exposure_weight: f32,
    pub compliance_weight: f32,
    pub intervention_threshold: u8,
    pub compliance_window_days: i64,
    pub incident_window_months: u32,
}

impl ScoringConfig {
    pub fn with_intervention_threshold(mut self, threshold: u8) -> Self {
        self.intervention_threshold = threshold;
        self
    }

    /// First day of the trailing compliance-check window ending on `today`.
    pub fn compliance_window_start(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_signed(Duration::days(self.compliance_window_days.max(0)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// First day of the trailing incident window ending on `today`.
    pub fn incident_window_start(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.incident_window_months))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            health_weight: 0.40,
            exposure_weight: 0.35,
            compliance_weight: 0.25,
            intervention_threshold: DEFAULT_INTERVENTION_THRESHOLD,
            compliance_window_days: 30,
            incident_window_months: 12,
        }
    }
}
