use chrono::{Duration, NaiveDate};

use crate::storage::{InMemoryStore, StoreError, Transactional};
use crate::workflows::risk::domain::{
    ChronicConditions, ComplianceRecord, DiseaseRecord, FitnessStatus, IncidentRecord,
    RiskProfile, UnitId, WorkUnit, WorkerHealthRecord, WorkerId,
};
use crate::workflows::risk::repository::{
    ComplianceQuery, DiseaseQuery, IncidentQuery, WorkforceStore,
};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
}

pub(super) fn days_ago(days: i64) -> NaiveDate {
    today() - Duration::days(days)
}

pub(super) fn worker_id(id: &str) -> WorkerId {
    WorkerId(id.to_string())
}

pub(super) fn unit_id(id: &str) -> UnitId {
    UnitId(id.to_string())
}

/// Worker with no optional data on file.
pub(super) fn bare_worker(id: &str, unit: &str) -> WorkerHealthRecord {
    WorkerHealthRecord {
        worker_id: worker_id(id),
        unit_id: unit_id(unit),
        full_name: format!("Worker {id}"),
        age: None,
        fitness_status: None,
        chronic_conditions: None,
        allergies: None,
        hire_date: None,
        exposure_risks: None,
        next_exam_due: None,
    }
}

/// Age 60, permanently unfit, chronic flag set, no allergies.
pub(super) fn senior_unfit_worker(id: &str, unit: &str) -> WorkerHealthRecord {
    WorkerHealthRecord {
        age: Some(60),
        fitness_status: Some(FitnessStatus::PermanentlyUnfit),
        chronic_conditions: Some(ChronicConditions::Flag(true)),
        allergies: Some("NONE".to_string()),
        ..bare_worker(id, unit)
    }
}

pub(super) fn exposed_worker(id: &str, unit: &str) -> WorkerHealthRecord {
    WorkerHealthRecord {
        age: Some(52),
        fitness_status: Some(FitnessStatus::FitWithRestrictions),
        chronic_conditions: Some(ChronicConditions::Listed(vec!["asthma".to_string()])),
        allergies: Some("latex".to_string()),
        hire_date: Some(NaiveDate::from_ymd_opt(2012, 4, 1).expect("valid date")),
        exposure_risks: Some(vec!["Silica Dust".to_string(), "solvents".to_string()]),
        next_exam_due: Some(days_ago(12)),
        ..bare_worker(id, unit)
    }
}

pub(super) fn compliance(id: &str, checked_on: NaiveDate, compliant: bool) -> ComplianceRecord {
    ComplianceRecord {
        worker_id: worker_id(id),
        checked_on,
        compliant,
    }
}

pub(super) fn incident(id: &str, occurred_on: NaiveDate) -> IncidentRecord {
    IncidentRecord {
        worker_id: worker_id(id),
        occurred_on,
        description: "near miss".to_string(),
    }
}

pub(super) fn store_with_unit(unit: &str) -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .add_unit(WorkUnit {
            unit_id: unit_id(unit),
            name: format!("Unit {unit}"),
        })
        .expect("unit inserted");
    store
}

/// Two failed checks and one incident inside the scoring windows.
pub(super) fn record_recent_history(store: &InMemoryStore, id: &str) {
    store
        .add_compliance_record(compliance(id, days_ago(2), false))
        .expect("compliance inserted");
    store
        .add_compliance_record(compliance(id, days_ago(9), false))
        .expect("compliance inserted");
    store
        .add_incident(incident(id, days_ago(60)))
        .expect("incident inserted");
}

/// Delegates to an [`InMemoryStore`] but fails every query for one worker.
pub(super) struct FlakyStore {
    pub inner: InMemoryStore,
    pub failing: WorkerId,
}

impl FlakyStore {
    fn check(&self, id: &WorkerId) -> Result<(), StoreError> {
        if id == &self.failing {
            return Err(StoreError::Unavailable("replica lag".to_string()));
        }
        Ok(())
    }
}

impl Transactional for FlakyStore {
    fn transaction<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Self) -> Result<T, StoreError>,
        Self: Sized,
    {
        work(self)
    }
}

impl WorkforceStore for FlakyStore {
    fn fetch_worker(&self, id: &WorkerId) -> Result<Option<WorkerHealthRecord>, StoreError> {
        self.inner.fetch_worker(id)
    }

    fn fetch_unit(&self, id: &UnitId) -> Result<Option<WorkUnit>, StoreError> {
        self.inner.fetch_unit(id)
    }

    fn workers_in_unit(&self, id: &UnitId) -> Result<Vec<WorkerHealthRecord>, StoreError> {
        self.inner.workers_in_unit(id)
    }

    fn all_workers(&self) -> Result<Vec<WorkerHealthRecord>, StoreError> {
        self.inner.all_workers()
    }

    fn workers_missing_profile(&self) -> Result<Vec<WorkerHealthRecord>, StoreError> {
        self.inner.workers_missing_profile()
    }

    fn compliance_records(
        &self,
        query: &ComplianceQuery,
    ) -> Result<Vec<ComplianceRecord>, StoreError> {
        self.check(&query.worker_id)?;
        self.inner.compliance_records(query)
    }

    fn incidents(&self, query: &IncidentQuery) -> Result<Vec<IncidentRecord>, StoreError> {
        self.inner.incidents(query)
    }

    fn diseases(&self, query: &DiseaseQuery) -> Result<Vec<DiseaseRecord>, StoreError> {
        self.inner.diseases(query)
    }

    fn risk_profile_for(&self, worker_id: &WorkerId) -> Result<(RiskProfile, bool), StoreError> {
        self.inner.risk_profile_for(worker_id)
    }

    fn save_risk_profile(&self, profile: RiskProfile) -> Result<(), StoreError> {
        self.inner.save_risk_profile(profile)
    }

    fn risk_profiles(&self) -> Result<Vec<RiskProfile>, StoreError> {
        self.inner.risk_profiles()
    }

    fn clear_risk_profiles(&self) -> Result<usize, StoreError> {
        self.inner.clear_risk_profiles()
    }
}
