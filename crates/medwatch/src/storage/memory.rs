use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::{StoreError, Transactional};
use crate::workflows::audit::{
    AuditDailySummary, AuditEvent, AuditEventDetail, AuditEventQuery, AuditStore, EventId,
    EventStream, Organization, OrganizationId, RetentionQuery,
};
use crate::workflows::risk::{
    ComplianceQuery, ComplianceRecord, DiseaseQuery, DiseaseRecord, IncidentQuery,
    IncidentRecord, RiskProfile, UnitId, WorkUnit, WorkerHealthRecord, WorkerId, WorkforceStore,
};

/// Serializable contents of an [`InMemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub units: Vec<WorkUnit>,
    #[serde(default)]
    pub workers: Vec<WorkerHealthRecord>,
    #[serde(default)]
    pub compliance_records: Vec<ComplianceRecord>,
    #[serde(default)]
    pub incidents: Vec<IncidentRecord>,
    #[serde(default)]
    pub diseases: Vec<DiseaseRecord>,
    #[serde(default)]
    pub risk_profiles: Vec<RiskProfile>,
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub audit_events: Vec<AuditEvent>,
    #[serde(default)]
    pub event_details: Vec<AuditEventDetail>,
    #[serde(default)]
    pub daily_summaries: Vec<AuditDailySummary>,
}

/// Failure loading or saving a snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to access dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid dataset: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Mutex-guarded store backing the CLI and tests.
///
/// A transaction holds the lock for its whole unit of work. The work runs against a private
/// copy of the state, which replaces the shared state only when the work returns `Ok`. Other
/// callers block until then and never observe a partial write. The work must go through the
/// handle it is given; calling back into the outer store from inside it deadlocks.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreSnapshot>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    /// Loads a JSON snapshot; a missing file yields an empty store.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(Self::from_snapshot(serde_json::from_str(&raw)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::new()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let snapshot = self.snapshot()?;
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        Ok(self.state()?.clone())
    }

    /// Swaps the whole dataset for `snapshot`.
    pub fn replace(&self, snapshot: StoreSnapshot) -> Result<(), StoreError> {
        *self.state()? = snapshot;
        Ok(())
    }

    fn into_snapshot(self) -> Result<StoreSnapshot, StoreError> {
        self.state
            .into_inner()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    pub fn add_unit(&self, unit: WorkUnit) -> Result<(), StoreError> {
        let mut state = self.state()?;
        if state.units.iter().any(|existing| existing.unit_id == unit.unit_id) {
            return Err(StoreError::Conflict);
        }
        state.units.push(unit);
        Ok(())
    }

    /// Inserts or replaces a worker keyed by id.
    pub fn put_worker(&self, worker: WorkerHealthRecord) -> Result<bool, StoreError> {
        let mut state = self.state()?;
        match state
            .workers
            .iter_mut()
            .find(|existing| existing.worker_id == worker.worker_id)
        {
            Some(existing) => {
                *existing = worker;
                Ok(false)
            }
            None => {
                state.workers.push(worker);
                Ok(true)
            }
        }
    }

    pub fn add_compliance_record(&self, record: ComplianceRecord) -> Result<(), StoreError> {
        self.state()?.compliance_records.push(record);
        Ok(())
    }

    pub fn add_incident(&self, record: IncidentRecord) -> Result<(), StoreError> {
        self.state()?.incidents.push(record);
        Ok(())
    }

    pub fn add_disease(&self, record: DiseaseRecord) -> Result<(), StoreError> {
        self.state()?.diseases.push(record);
        Ok(())
    }

    pub fn add_organization(&self, organization: Organization) -> Result<(), StoreError> {
        let mut state = self.state()?;
        if state
            .organizations
            .iter()
            .any(|existing| existing.organization_id == organization.organization_id)
        {
            return Err(StoreError::Conflict);
        }
        state.organizations.push(organization);
        Ok(())
    }

    /// Inserts or replaces an event keyed by id.
    pub fn put_event(&self, event: AuditEvent) -> Result<bool, StoreError> {
        let mut state = self.state()?;
        match state
            .audit_events
            .iter_mut()
            .find(|existing| existing.event_id == event.event_id)
        {
            Some(existing) => {
                *existing = event;
                Ok(false)
            }
            None => {
                state.audit_events.push(event);
                Ok(true)
            }
        }
    }

    pub fn add_event_detail(&self, detail: AuditEventDetail) -> Result<(), StoreError> {
        self.state()?.event_details.push(detail);
        Ok(())
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreSnapshot>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

impl Transactional for InMemoryStore {
    fn transaction<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Self) -> Result<T, StoreError>,
        Self: Sized,
    {
        let mut state = self.state()?;
        let working = InMemoryStore::from_snapshot(state.clone());
        let value = work(&working)?;
        *state = working.into_snapshot()?;
        Ok(value)
    }
}

impl WorkforceStore for InMemoryStore {
    fn fetch_worker(&self, id: &WorkerId) -> Result<Option<WorkerHealthRecord>, StoreError> {
        let state = self.state()?;
        Ok(state
            .workers
            .iter()
            .find(|worker| &worker.worker_id == id)
            .cloned())
    }

    fn fetch_unit(&self, id: &UnitId) -> Result<Option<WorkUnit>, StoreError> {
        let state = self.state()?;
        Ok(state.units.iter().find(|unit| &unit.unit_id == id).cloned())
    }

    fn workers_in_unit(&self, id: &UnitId) -> Result<Vec<WorkerHealthRecord>, StoreError> {
        let state = self.state()?;
        Ok(state
            .workers
            .iter()
            .filter(|worker| &worker.unit_id == id)
            .cloned()
            .collect())
    }

    fn all_workers(&self) -> Result<Vec<WorkerHealthRecord>, StoreError> {
        Ok(self.state()?.workers.clone())
    }

    fn workers_missing_profile(&self) -> Result<Vec<WorkerHealthRecord>, StoreError> {
        let state = self.state()?;
        let profiled: HashSet<&WorkerId> = state
            .risk_profiles
            .iter()
            .map(|profile| &profile.worker_id)
            .collect();
        Ok(state
            .workers
            .iter()
            .filter(|worker| !profiled.contains(&worker.worker_id))
            .cloned()
            .collect())
    }

    fn compliance_records(
        &self,
        query: &ComplianceQuery,
    ) -> Result<Vec<ComplianceRecord>, StoreError> {
        let state = self.state()?;
        Ok(state
            .compliance_records
            .iter()
            .filter(|record| record.worker_id == query.worker_id && record.checked_on >= query.since)
            .cloned()
            .collect())
    }

    fn incidents(&self, query: &IncidentQuery) -> Result<Vec<IncidentRecord>, StoreError> {
        let state = self.state()?;
        Ok(state
            .incidents
            .iter()
            .filter(|record| record.worker_id == query.worker_id && record.occurred_on >= query.since)
            .cloned()
            .collect())
    }

    fn diseases(&self, query: &DiseaseQuery) -> Result<Vec<DiseaseRecord>, StoreError> {
        let state = self.state()?;
        Ok(state
            .diseases
            .iter()
            .filter(|record| {
                record.worker_id == query.worker_id && query.statuses.contains(&record.status)
            })
            .cloned()
            .collect())
    }

    fn risk_profile_for(&self, worker_id: &WorkerId) -> Result<(RiskProfile, bool), StoreError> {
        let mut state = self.state()?;
        if let Some(profile) = state
            .risk_profiles
            .iter()
            .find(|profile| &profile.worker_id == worker_id)
        {
            return Ok((profile.clone(), false));
        }

        let profile = RiskProfile::new(worker_id.clone());
        state.risk_profiles.push(profile.clone());
        Ok((profile, true))
    }

    fn save_risk_profile(&self, profile: RiskProfile) -> Result<(), StoreError> {
        let mut state = self.state()?;
        match state
            .risk_profiles
            .iter_mut()
            .find(|existing| existing.worker_id == profile.worker_id)
        {
            Some(existing) => {
                *existing = profile;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn risk_profiles(&self) -> Result<Vec<RiskProfile>, StoreError> {
        Ok(self.state()?.risk_profiles.clone())
    }

    fn clear_risk_profiles(&self) -> Result<usize, StoreError> {
        let mut state = self.state()?;
        let removed = state.risk_profiles.len();
        state.risk_profiles.clear();
        Ok(removed)
    }
}

impl AuditStore for InMemoryStore {
    fn organizations(&self) -> Result<Vec<Organization>, StoreError> {
        Ok(self.state()?.organizations.clone())
    }

    fn fetch_organization(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, StoreError> {
        let state = self.state()?;
        Ok(state
            .organizations
            .iter()
            .find(|organization| &organization.organization_id == id)
            .cloned())
    }

    fn audit_events(&self, query: &AuditEventQuery) -> Result<EventStream<'_>, StoreError> {
        let state = self.state()?;
        let events: Vec<AuditEvent> = state
            .audit_events
            .iter()
            .filter(|event| query.matches(event))
            .cloned()
            .collect();
        Ok(Box::new(events.into_iter()))
    }

    fn expired_events(&self, query: &RetentionQuery) -> Result<EventStream<'_>, StoreError> {
        let state = self.state()?;
        let events: Vec<AuditEvent> = state
            .audit_events
            .iter()
            .filter(|event| query.matches(event))
            .cloned()
            .collect();
        Ok(Box::new(events.into_iter()))
    }

    fn upsert_daily_summary(
        &self,
        summary: AuditDailySummary,
    ) -> Result<(AuditDailySummary, bool), StoreError> {
        let mut state = self.state()?;
        match state
            .daily_summaries
            .iter_mut()
            .find(|existing| existing.key() == summary.key())
        {
            Some(existing) => {
                *existing = summary.clone();
                Ok((summary, false))
            }
            None => {
                state.daily_summaries.push(summary.clone());
                Ok((summary, true))
            }
        }
    }

    fn daily_summaries(
        &self,
        organization: Option<&OrganizationId>,
    ) -> Result<Vec<AuditDailySummary>, StoreError> {
        let state = self.state()?;
        Ok(state
            .daily_summaries
            .iter()
            .filter(|summary| organization.map_or(true, |id| &summary.organization_id == id))
            .cloned()
            .collect())
    }

    fn clear_daily_summaries(
        &self,
        organization: Option<&OrganizationId>,
    ) -> Result<usize, StoreError> {
        let mut state = self.state()?;
        let before = state.daily_summaries.len();
        state
            .daily_summaries
            .retain(|summary| organization.map_or(false, |id| &summary.organization_id != id));
        Ok(before - state.daily_summaries.len())
    }

    fn delete_events_older_than(&self, query: &RetentionQuery) -> Result<usize, StoreError> {
        let mut state = self.state()?;
        let before = state.audit_events.len();
        state.audit_events.retain(|event| !query.matches(event));
        Ok(before - state.audit_events.len())
    }

    fn delete_orphaned_dependents(&self) -> Result<usize, StoreError> {
        let mut state = self.state()?;
        let live: HashSet<EventId> = state
            .audit_events
            .iter()
            .map(|event| event.event_id.clone())
            .collect();
        let before = state.event_details.len();
        state
            .event_details
            .retain(|detail| live.contains(&detail.event_id));
        Ok(before - state.event_details.len())
    }
}
