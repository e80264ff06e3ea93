//! Occupational-health risk profiles: per-worker scoring over health, exposure and compliance
//! factors, plus the batch entry points that persist the results.

pub mod domain;
pub mod report;
pub mod repository;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ChronicConditions, ComplianceRecord, DiseaseRecord, DiseaseStatus, FitnessStatus,
    IncidentRecord, RiskLevel, RiskProfile, UnitId, WorkUnit, WorkerHealthRecord, WorkerId,
    NO_ALLERGIES,
};
pub use report::{FlaggedWorker, LevelCount, RiskReport};
pub use repository::{ComplianceQuery, DiseaseQuery, IncidentQuery, WorkforceStore};
pub use scoring::{
    RiskAssessment, RiskCategory, RiskFactor, RiskInputs, RiskScoringEngine, ScoreComponent,
    ScoringConfig, DEFAULT_INTERVENTION_THRESHOLD, HIGH_RISK_HAZARDS,
};
pub use service::{BatchOutcome, ProfileUpdate, RiskProfileService, RiskServiceError, SkippedWorker};
