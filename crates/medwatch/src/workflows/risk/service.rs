use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::domain::{RiskProfile, UnitId, WorkerHealthRecord, WorkerId};
use super::report::RiskReport;
use super::repository::{ComplianceQuery, DiseaseQuery, IncidentQuery, WorkforceStore};
use super::scoring::{RiskAssessment, RiskInputs, RiskScoringEngine, ScoringConfig};
use crate::storage::StoreError;

/// Service composing the workforce store and the scoring engine.
pub struct RiskProfileService<S> {
    store: Arc<S>,
    engine: Arc<RiskScoringEngine>,
}

impl<S> RiskProfileService<S>
where
    S: WorkforceStore + 'static,
{
    pub fn new(store: Arc<S>, config: ScoringConfig) -> Self {
        Self {
            store,
            engine: Arc::new(RiskScoringEngine::new(config)),
        }
    }

    pub fn engine(&self) -> &RiskScoringEngine {
        &self.engine
    }

    /// Score one worker, creating the profile when it does not exist yet.
    pub fn compute_for_worker(
        &self,
        worker_id: &WorkerId,
        today: NaiveDate,
    ) -> Result<ProfileUpdate, RiskServiceError> {
        let worker = self
            .store
            .fetch_worker(worker_id)?
            .ok_or_else(|| RiskServiceError::WorkerNotFound(worker_id.clone()))?;

        let update = self.assess_and_store(&worker, today)?;
        info!(
            worker = %worker_id,
            overall = update.profile.overall_risk_score,
            created = update.created,
            "risk profile computed"
        );
        Ok(update)
    }

    /// Score every worker assigned to `unit_id`.
    pub fn compute_for_unit(
        &self,
        unit_id: &UnitId,
        today: NaiveDate,
    ) -> Result<BatchOutcome, RiskServiceError> {
        if self.store.fetch_unit(unit_id)?.is_none() {
            return Err(RiskServiceError::UnitNotFound(unit_id.clone()));
        }

        let workers = self.store.workers_in_unit(unit_id)?;
        Ok(self.run_batch("unit", workers, today))
    }

    /// Score workers that have never been profiled.
    pub fn compute_missing(&self, today: NaiveDate) -> Result<BatchOutcome, RiskServiceError> {
        let workers = self.store.workers_missing_profile()?;
        Ok(self.run_batch("missing", workers, today))
    }

    /// Rescore every known worker.
    pub fn recompute_all(&self, today: NaiveDate) -> Result<BatchOutcome, RiskServiceError> {
        let workers = self.store.all_workers()?;
        Ok(self.run_batch("all", workers, today))
    }

    /// Build a report from the stored profiles.
    pub fn report(&self, as_of: NaiveDate, limit: usize) -> Result<RiskReport, RiskServiceError> {
        let profiles = self.store.risk_profiles()?;
        let names: HashMap<WorkerId, String> = self
            .store
            .all_workers()?
            .into_iter()
            .map(|worker| (worker.worker_id, worker.full_name))
            .collect();

        Ok(RiskReport::build(as_of, &profiles, &names, limit))
    }

    /// Drop every stored profile so the next `compute_missing` run starts fresh.
    pub fn reset_profiles(&self) -> Result<usize, RiskServiceError> {
        let removed = self.store.clear_risk_profiles()?;
        info!(removed, "risk profiles reset");
        Ok(removed)
    }

    fn run_batch(
        &self,
        scope: &'static str,
        workers: Vec<WorkerHealthRecord>,
        today: NaiveDate,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for worker in &workers {
            match self.assess_and_store(worker, today) {
                Ok(update) => outcome.record(&update),
                Err(err) => {
                    warn!(worker = %worker.worker_id, error = %err, "skipping worker");
                    outcome.skipped.push(SkippedWorker {
                        worker_id: worker.worker_id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            scope,
            created = outcome.created,
            updated = outcome.updated,
            skipped = outcome.skipped.len(),
            flagged = outcome.intervention_required,
            "risk batch finished"
        );
        outcome
    }

    fn assess_and_store(
        &self,
        worker: &WorkerHealthRecord,
        today: NaiveDate,
    ) -> Result<ProfileUpdate, StoreError> {
        let config = self.engine.config();
        let compliance = self.store.compliance_records(&ComplianceQuery {
            worker_id: worker.worker_id.clone(),
            since: config.compliance_window_start(today),
        })?;
        let incidents = self.store.incidents(&IncidentQuery {
            worker_id: worker.worker_id.clone(),
            since: config.incident_window_start(today),
        })?;
        let diseases = self
            .store
            .diseases(&DiseaseQuery::open_for(worker.worker_id.clone()))?;

        let assessment = self.engine.assess(
            RiskInputs {
                worker,
                compliance: &compliance,
                incidents: &incidents,
                diseases: &diseases,
            },
            today,
        );
        debug!(
            worker = %worker.worker_id,
            health = assessment.health_risk_score,
            exposure = assessment.exposure_risk_score,
            compliance = assessment.compliance_risk_score,
            "risk assessment"
        );

        self.store.transaction(|store| {
            let (mut profile, created) = store.risk_profile_for(&worker.worker_id)?;
            assessment.apply_to(&mut profile, today);
            store.save_risk_profile(profile.clone())?;
            Ok(ProfileUpdate {
                profile,
                assessment,
                created,
            })
        })
    }
}

/// Result of scoring a single worker.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub profile: RiskProfile,
    pub assessment: RiskAssessment,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedWorker {
    pub worker_id: WorkerId,
    pub reason: String,
}

/// Counts reported by the batch entry points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub created: usize,
    pub updated: usize,
    pub intervention_required: usize,
    pub skipped: Vec<SkippedWorker>,
}

impl BatchOutcome {
    pub fn processed(&self) -> usize {
        self.created + self.updated
    }

    fn record(&mut self, update: &ProfileUpdate) {
        if update.created {
            self.created += 1;
        } else {
            self.updated += 1;
        }
        if update.profile.intervention_required {
            self.intervention_required += 1;
        }
    }
}

/// Error raised by the risk profile service.
#[derive(Debug, thiserror::Error)]
pub enum RiskServiceError {
    #[error("worker {0} not found")]
    WorkerNotFound(WorkerId),
    #[error("organization unit {0} not found")]
    UnitNotFound(UnitId),
    #[error(transparent)]
    Store(#[from] StoreError),
}
