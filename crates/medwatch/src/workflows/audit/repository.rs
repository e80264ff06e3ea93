use chrono::{DateTime, NaiveDate, Utc};

use super::domain::{
    AuditDailySummary, AuditEvent, AuditSeverity, Organization, OrganizationId,
};
use crate::storage::{StoreError, Transactional};

/// Lazily produced events; stores may stream rows instead of materializing them.
pub type EventStream<'a> = Box<dyn Iterator<Item = AuditEvent> + 'a>;

/// Events of one organization whose UTC timestamp falls on `date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEventQuery {
    pub organization_id: OrganizationId,
    pub date: NaiveDate,
}

impl AuditEventQuery {
    pub fn matches(&self, event: &AuditEvent) -> bool {
        event.organization_id == self.organization_id && event.occurred_on() == self.date
    }
}

/// Events strictly older than `cutoff`, optionally sparing critical ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionQuery {
    pub cutoff: DateTime<Utc>,
    pub exempt_critical: bool,
}

impl RetentionQuery {
    pub fn matches(&self, event: &AuditEvent) -> bool {
        if self.exempt_critical && event.severity == AuditSeverity::Critical {
            return false;
        }
        event.timestamp < self.cutoff
    }
}

/// Storage abstraction for audit events and their derived summaries.
pub trait AuditStore: Transactional + Send + Sync {
    fn organizations(&self) -> Result<Vec<Organization>, StoreError>;
    fn fetch_organization(&self, id: &OrganizationId)
        -> Result<Option<Organization>, StoreError>;

    fn audit_events(&self, query: &AuditEventQuery) -> Result<EventStream<'_>, StoreError>;
    fn expired_events(&self, query: &RetentionQuery) -> Result<EventStream<'_>, StoreError>;

    /// Inserts or overwrites the summary keyed by (organization, date). The flag is `true`
    /// when a new row was created.
    fn upsert_daily_summary(
        &self,
        summary: AuditDailySummary,
    ) -> Result<(AuditDailySummary, bool), StoreError>;
    fn daily_summaries(
        &self,
        organization: Option<&OrganizationId>,
    ) -> Result<Vec<AuditDailySummary>, StoreError>;
    fn clear_daily_summaries(
        &self,
        organization: Option<&OrganizationId>,
    ) -> Result<usize, StoreError>;

    fn delete_events_older_than(&self, query: &RetentionQuery) -> Result<usize, StoreError>;
    /// Removes event details whose parent event no longer exists.
    fn delete_orphaned_dependents(&self) -> Result<usize, StoreError>;
}
