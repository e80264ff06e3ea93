mod config;
mod policy;
pub(crate) mod rules;

pub use config::{ScoringConfig, DEFAULT_INTERVENTION_THRESHOLD};
pub use rules::HIGH_RISK_HAZARDS;

use super::domain::{
    ComplianceRecord, DiseaseRecord, IncidentRecord, RiskLevel, RiskProfile, WorkerHealthRecord,
    WorkerId,
};
use chrono::NaiveDate;
use policy::{overall_score, requires_intervention};
use serde::{Deserialize, Serialize};

/// Records the engine needs for one worker.
#[derive(Debug, Clone, Copy)]
pub struct RiskInputs<'a> {
    pub worker: &'a WorkerHealthRecord,
    pub compliance: &'a [ComplianceRecord],
    pub incidents: &'a [IncidentRecord],
    pub diseases: &'a [DiseaseRecord],
}

impl<'a> RiskInputs<'a> {
    pub fn worker_only(worker: &'a WorkerHealthRecord) -> Self {
        Self {
            worker,
            compliance: &[],
            incidents: &[],
            diseases: &[],
        }
    }
}

/// Stateless scorer that applies the configured weights to a worker's records.
#[derive(Debug, Clone, Default)]
pub struct RiskScoringEngine {
    config: ScoringConfig,
}

impl RiskScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn assess(&self, inputs: RiskInputs<'_>, today: NaiveDate) -> RiskAssessment {
        let (components, scores) = rules::score_worker(&inputs, &self.config, today);
        let overall = overall_score(&scores, &self.config);

        RiskAssessment {
            worker_id: inputs.worker.worker_id.clone(),
            health_risk_score: scores.health,
            exposure_risk_score: scores.exposure,
            compliance_risk_score: scores.compliance,
            overall_risk_score: overall,
            intervention_required: requires_intervention(overall, &self.config),
            risk_level: RiskLevel::from_score(overall),
            components,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Health,
    Exposure,
    Compliance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Age,
    Fitness,
    ChronicConditions,
    Allergies,
    ExposureCount,
    HighRiskHazard,
    Tenure,
    ExposureNoncompliance,
    ExamOverdue,
    Incidents,
    Diseases,
    ComplianceNoncompliance,
}

impl RiskFactor {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Age => "Age bracket",
            Self::Fitness => "Fitness status",
            Self::ChronicConditions => "Chronic conditions",
            Self::Allergies => "Allergies",
            Self::ExposureCount => "Exposure count",
            Self::HighRiskHazard => "High-risk hazard",
            Self::Tenure => "Tenure",
            Self::ExposureNoncompliance => "Non-compliant checks (exposure)",
            Self::ExamOverdue => "Medical exam overdue",
            Self::Incidents => "Incidents",
            Self::Diseases => "Occupational diseases",
            Self::ComplianceNoncompliance => "Non-compliant checks (compliance)",
        }
    }
}

/// Non-zero contribution to a sub-score, kept so reports can explain a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub category: RiskCategory,
    pub factor: RiskFactor,
    pub points: u8,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub worker_id: WorkerId,
    pub health_risk_score: u8,
    pub exposure_risk_score: u8,
    pub compliance_risk_score: u8,
    pub overall_risk_score: u8,
    pub intervention_required: bool,
    pub risk_level: RiskLevel,
    pub components: Vec<ScoreComponent>,
}

impl RiskAssessment {
    /// Overwrites every computed field on `profile`.
    pub fn apply_to(&self, profile: &mut RiskProfile, assessed_on: NaiveDate) {
        profile.health_risk_score = self.health_risk_score;
        profile.exposure_risk_score = self.exposure_risk_score;
        profile.compliance_risk_score = self.compliance_risk_score;
        profile.overall_risk_score = self.overall_risk_score;
        profile.intervention_required = self.intervention_required;
        profile.risk_level = self.risk_level;
        profile.last_assessed = Some(assessed_on);
    }

    pub fn top_components(&self, limit: usize) -> Vec<&ScoreComponent> {
        let mut components: Vec<&ScoreComponent> = self.components.iter().collect();
        components.sort_by(|a, b| b.points.cmp(&a.points));
        components.truncate(limit);
        components
    }
}
