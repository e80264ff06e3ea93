use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::domain::{AuditDailySummary, AuditEvent, AuditSeverity, Organization, OrganizationId};
use super::repository::{AuditEventQuery, AuditStore};
use crate::storage::StoreError;

/// Date summarized when the caller does not name one: the day before `today`.
pub fn default_summary_date(today: NaiveDate) -> NaiveDate {
    today.pred_opt().unwrap_or(today)
}

/// Folds one day's events into a summary. Returns `None` when `events` is empty.
pub fn summarize_events<I>(
    organization_id: &OrganizationId,
    date: NaiveDate,
    events: I,
) -> Option<AuditDailySummary>
where
    I: IntoIterator<Item = AuditEvent>,
{
    let mut summary = AuditDailySummary::empty(organization_id.clone(), date);
    let mut users = HashSet::new();
    let mut addresses = HashSet::new();

    for event in events {
        summary.total_events += 1;
        if event.is_login_success() {
            summary.login_count += 1;
        }
        if event.is_login_failure() {
            summary.failed_login_count += 1;
        }
        if event.is_sale() {
            summary.sales_count += 1;
        }
        if event.is_dispensation() {
            summary.dispense_count += 1;
        }
        if event.is_inventory_change() {
            summary.inventory_change_count += 1;
        }
        match event.severity {
            AuditSeverity::Critical => summary.critical_count += 1,
            AuditSeverity::High => summary.high_severity_count += 1,
            AuditSeverity::Low | AuditSeverity::Medium => {}
        }
        if !event.success {
            summary.failed_action_count += 1;
        }
        if let Some(user) = event.user_id {
            users.insert(user);
        }
        if let Some(address) = event.ip_address {
            addresses.insert(address);
        }
    }

    if summary.total_events == 0 {
        return None;
    }

    summary.active_users = users.len();
    summary.unique_ips = addresses.len();
    Some(summary)
}

/// Which organizations and which day to roll up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryScope {
    pub organization: Option<OrganizationId>,
    pub date: Option<NaiveDate>,
}

/// Counts reported by a summary run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRun {
    pub date: NaiveDate,
    pub organizations: usize,
    pub created: usize,
    pub updated: usize,
    /// Organizations with no events on the day.
    pub skipped: usize,
    /// Organizations whose rollup hit a store error. The run continues past them.
    pub failed: Vec<FailedOrganization>,
    pub summaries: Vec<AuditDailySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedOrganization {
    pub organization_id: OrganizationId,
    pub reason: String,
}

impl SummaryRun {
    fn new(date: NaiveDate, organizations: usize) -> Self {
        Self {
            date,
            organizations,
            created: 0,
            updated: 0,
            skipped: 0,
            failed: Vec::new(),
            summaries: Vec::new(),
        }
    }

    pub fn processed(&self) -> usize {
        self.created + self.updated
    }
}

/// Service rolling audit events up into per-day summaries.
pub struct AuditSummaryService<S> {
    store: Arc<S>,
}

impl<S> AuditSummaryService<S>
where
    S: AuditStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Rolls up `scope.date` (default: the day before `today`) for each organization in scope.
    /// A store error for one organization is logged and recorded in `failed`; the others still run.
    pub fn summarize(
        &self,
        scope: &SummaryScope,
        today: NaiveDate,
    ) -> Result<SummaryRun, AuditServiceError> {
        let date = scope.date.unwrap_or_else(|| default_summary_date(today));
        let organizations = self.resolve_organizations(scope.organization.as_ref())?;
        let mut run = SummaryRun::new(date, organizations.len());

        for organization in &organizations {
            let organization_id = &organization.organization_id;
            match self.summarize_organization(organization_id, date) {
                Ok(Some((stored, true))) => {
                    run.created += 1;
                    run.summaries.push(stored);
                }
                Ok(Some((stored, false))) => {
                    run.updated += 1;
                    run.summaries.push(stored);
                }
                Ok(None) => {
                    debug!(organization = %organization_id, %date, "no audit events, skipping");
                    run.skipped += 1;
                }
                Err(err) => {
                    warn!(
                        organization = %organization_id,
                        %date,
                        error = %err,
                        "skipping organization"
                    );
                    run.failed.push(FailedOrganization {
                        organization_id: organization_id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            %date,
            organizations = run.organizations,
            created = run.created,
            updated = run.updated,
            skipped = run.skipped,
            failed = run.failed.len(),
            "audit summaries generated"
        );
        Ok(run)
    }

    pub fn summaries(
        &self,
        organization: Option<&OrganizationId>,
    ) -> Result<Vec<AuditDailySummary>, AuditServiceError> {
        if let Some(id) = organization {
            self.require_organization(id)?;
        }
        let mut summaries = self.store.daily_summaries(organization)?;
        summaries.sort_by(|a, b| {
            a.organization_id
                .cmp(&b.organization_id)
                .then_with(|| a.date.cmp(&b.date))
        });
        Ok(summaries)
    }

    /// Remove stored summaries, for every organization or only `organization`.
    pub fn reset_summaries(
        &self,
        organization: Option<&OrganizationId>,
    ) -> Result<usize, AuditServiceError> {
        if let Some(id) = organization {
            self.require_organization(id)?;
        }
        let removed = self.store.clear_daily_summaries(organization)?;
        info!(removed, "audit summaries reset");
        Ok(removed)
    }

    fn summarize_organization(
        &self,
        organization_id: &OrganizationId,
        date: NaiveDate,
    ) -> Result<Option<(AuditDailySummary, bool)>, StoreError> {
        let events = self.store.audit_events(&AuditEventQuery {
            organization_id: organization_id.clone(),
            date,
        })?;
        let Some(summary) = summarize_events(organization_id, date, events) else {
            return Ok(None);
        };
        self.store
            .transaction(|store| store.upsert_daily_summary(summary))
            .map(Some)
    }

    fn resolve_organizations(
        &self,
        organization: Option<&OrganizationId>,
    ) -> Result<Vec<Organization>, AuditServiceError> {
        match organization {
            Some(id) => Ok(vec![self.require_organization(id)?]),
            None => Ok(self.store.organizations()?),
        }
    }

    fn require_organization(&self, id: &OrganizationId) -> Result<Organization, AuditServiceError> {
        self.store
            .fetch_organization(id)?
            .ok_or_else(|| AuditServiceError::OrganizationNotFound(id.clone()))
    }
}

/// Error raised by the audit services.
#[derive(Debug, thiserror::Error)]
pub enum AuditServiceError {
    #[error("organization {0} not found")]
    OrganizationNotFound(OrganizationId),
    #[error(transparent)]
    Store(#[from] StoreError),
}
