use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::AuditSeverity;
use super::repository::{AuditStore, RetentionQuery};
use super::summary::AuditServiceError;

pub const DEFAULT_RETENTION_DAYS: u32 = 365;

/// Age-based cleanup rules for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub retention_days: u32,
    pub keep_critical: bool,
    pub dry_run: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
            keep_critical: false,
            dry_run: false,
        }
    }
}

impl RetentionPolicy {
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(Duration::days(i64::from(self.retention_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn query(&self, now: DateTime<Utc>) -> RetentionQuery {
        RetentionQuery {
            cutoff: self.cutoff(now),
            exempt_critical: self.keep_critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetentionReport {
    pub cutoff: DateTime<Utc>,
    pub dry_run: bool,
    pub matched_events: usize,
    pub by_severity: BTreeMap<AuditSeverity, usize>,
    pub deleted_events: usize,
    pub deleted_details: usize,
}

/// Service applying a [`RetentionPolicy`] to the audit store.
pub struct RetentionService<S> {
    store: Arc<S>,
}

impl<S> RetentionService<S>
where
    S: AuditStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Deletes expired events and their orphaned details in one transaction. In dry-run mode
    /// only the matching events are counted.
    pub fn run(
        &self,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> Result<RetentionReport, AuditServiceError> {
        let query = policy.query(now);
        let mut by_severity = BTreeMap::new();
        let mut matched_events = 0;
        for event in self.store.expired_events(&query)? {
            matched_events += 1;
            *by_severity.entry(event.severity).or_insert(0) += 1;
        }

        let mut report = RetentionReport {
            cutoff: query.cutoff,
            dry_run: policy.dry_run,
            matched_events,
            by_severity,
            deleted_events: 0,
            deleted_details: 0,
        };

        if policy.dry_run {
            info!(
                cutoff = %report.cutoff,
                matched = report.matched_events,
                "dry run, audit events left in place"
            );
            return Ok(report);
        }

        let (deleted_events, deleted_details) = self.store.transaction(|store| {
            let events = store.delete_events_older_than(&query)?;
            let details = store.delete_orphaned_dependents()?;
            Ok((events, details))
        })?;

        if deleted_events != report.matched_events {
            warn!(
                matched = report.matched_events,
                deleted = deleted_events,
                "audit event count changed between scan and delete"
            );
        }

        report.deleted_events = deleted_events;
        report.deleted_details = deleted_details;
        info!(
            cutoff = %report.cutoff,
            deleted_events,
            deleted_details,
            keep_critical = policy.keep_critical,
            "audit retention applied"
        );
        Ok(report)
    }
}
