use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Allergy value recorded when a worker has none on file.
pub const NO_ALLERGIES: &str = "NONE";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub String);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Organization unit (site, department, crew) that groups workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkUnit {
    pub unit_id: UnitId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessStatus {
    Fit,
    FitWithRestrictions,
    TemporarilyUnfit,
    PermanentlyUnfit,
}

impl FitnessStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fit => "Fit",
            Self::FitWithRestrictions => "Fit with restrictions",
            Self::TemporarilyUnfit => "Temporarily unfit",
            Self::PermanentlyUnfit => "Permanently unfit",
        }
    }

    /// Parses the stored code (`fit_with_restrictions`) or its upper-case variant.
    pub fn parse_code(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fit" => Some(Self::Fit),
            "fit_with_restrictions" => Some(Self::FitWithRestrictions),
            "temporarily_unfit" => Some(Self::TemporarilyUnfit),
            "permanently_unfit" => Some(Self::PermanentlyUnfit),
            _ => None,
        }
    }
}

/// Chronic conditions are recorded either as a yes/no flag or as a list of diagnoses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChronicConditions {
    Flag(bool),
    Listed(Vec<String>),
}

impl ChronicConditions {
    pub fn any(&self) -> bool {
        match self {
            ChronicConditions::Flag(flag) => *flag,
            ChronicConditions::Listed(conditions) => conditions
                .iter()
                .any(|condition| !condition.trim().is_empty()),
        }
    }
}

/// Occupational-health view of a worker as supplied by the store.
///
/// Every scoring input is optional; a missing value contributes nothing to the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerHealthRecord {
    pub worker_id: WorkerId,
    pub unit_id: UnitId,
    pub full_name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub fitness_status: Option<FitnessStatus>,
    #[serde(default)]
    pub chronic_conditions: Option<ChronicConditions>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    #[serde(default)]
    pub exposure_risks: Option<Vec<String>>,
    #[serde(default)]
    pub next_exam_due: Option<NaiveDate>,
}

impl WorkerHealthRecord {
    pub fn has_reportable_allergies(&self) -> bool {
        self.allergies
            .as_deref()
            .map(str::trim)
            .map(|value| !value.is_empty() && !value.eq_ignore_ascii_case(NO_ALLERGIES))
            .unwrap_or(false)
    }
}

/// Periodic compliance check (PPE, training, fit test) for one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRecord {
    pub worker_id: WorkerId,
    pub checked_on: NaiveDate,
    pub compliant: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub worker_id: WorkerId,
    pub occurred_on: NaiveDate,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseStatus {
    Suspected,
    Active,
    Chronic,
    Resolved,
}

impl DiseaseStatus {
    /// Statuses that keep an occupational disease on a worker's risk profile.
    pub const fn open() -> [Self; 2] {
        [Self::Active, Self::Chronic]
    }

    pub fn is_open(self) -> bool {
        Self::open().contains(&self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    pub worker_id: WorkerId,
    pub disease: String,
    pub status: DiseaseStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub const fn ordered() -> [Self; 4] {
        [Self::Low, Self::Moderate, Self::High, Self::Critical]
    }

    pub const fn from_score(score: u8) -> Self {
        match score {
            0..=29 => Self::Low,
            30..=59 => Self::Moderate,
            60..=79 => Self::High,
            _ => Self::Critical,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

/// Persisted composite risk record, one per worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub worker_id: WorkerId,
    pub health_risk_score: u8,
    pub exposure_risk_score: u8,
    pub compliance_risk_score: u8,
    pub overall_risk_score: u8,
    pub intervention_required: bool,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub last_assessed: Option<NaiveDate>,
}

impl RiskProfile {
    pub fn new(worker_id: WorkerId) -> Self {
        Self {
            worker_id,
            health_risk_score: 0,
            exposure_risk_score: 0,
            compliance_risk_score: 0,
            overall_risk_score: 0,
            intervention_required: false,
            risk_level: RiskLevel::Low,
            last_assessed: None,
        }
    }
}
