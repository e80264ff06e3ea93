use chrono::NaiveDate;

use super::domain::{
    ComplianceRecord, DiseaseRecord, DiseaseStatus, IncidentRecord, RiskProfile, UnitId,
    WorkUnit, WorkerHealthRecord, WorkerId,
};
use crate::storage::{StoreError, Transactional};

/// Compliance checks for one worker recorded on or after `since`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceQuery {
    pub worker_id: WorkerId,
    pub since: NaiveDate,
}

/// Incidents involving one worker that occurred on or after `since`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentQuery {
    pub worker_id: WorkerId,
    pub since: NaiveDate,
}

/// Occupational disease records for one worker restricted to `statuses`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseQuery {
    pub worker_id: WorkerId,
    pub statuses: Vec<DiseaseStatus>,
}

impl DiseaseQuery {
    pub fn open_for(worker_id: WorkerId) -> Self {
        Self {
            worker_id,
            statuses: DiseaseStatus::open().to_vec(),
        }
    }
}

/// Storage abstraction for the worker side of the backend.
pub trait WorkforceStore: Transactional + Send + Sync {
    fn fetch_worker(&self, id: &WorkerId) -> Result<Option<WorkerHealthRecord>, StoreError>;
    fn fetch_unit(&self, id: &UnitId) -> Result<Option<WorkUnit>, StoreError>;
    fn workers_in_unit(&self, id: &UnitId) -> Result<Vec<WorkerHealthRecord>, StoreError>;
    fn all_workers(&self) -> Result<Vec<WorkerHealthRecord>, StoreError>;
    fn workers_missing_profile(&self) -> Result<Vec<WorkerHealthRecord>, StoreError>;

    fn compliance_records(
        &self,
        query: &ComplianceQuery,
    ) -> Result<Vec<ComplianceRecord>, StoreError>;
    fn incidents(&self, query: &IncidentQuery) -> Result<Vec<IncidentRecord>, StoreError>;
    fn diseases(&self, query: &DiseaseQuery) -> Result<Vec<DiseaseRecord>, StoreError>;

    /// Returns the stored profile, creating an empty one when absent. The flag is `true` when
    /// the profile was created by this call.
    fn risk_profile_for(&self, worker_id: &WorkerId) -> Result<(RiskProfile, bool), StoreError>;
    fn save_risk_profile(&self, profile: RiskProfile) -> Result<(), StoreError>;
    fn risk_profiles(&self) -> Result<Vec<RiskProfile>, StoreError>;
    fn clear_risk_profiles(&self) -> Result<usize, StoreError>;
}
