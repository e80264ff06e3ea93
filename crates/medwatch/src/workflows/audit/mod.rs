//! Audit trail rollups and retention.

pub mod domain;
pub mod report;
pub mod repository;
pub mod retention;
pub mod summary;

#[cfg(test)]
mod tests;

pub use domain::{
    AuditAction, AuditDailySummary, AuditEvent, AuditEventDetail, AuditModule, AuditSeverity,
    EventId, Organization, OrganizationId, UserId,
};
pub use repository::{AuditEventQuery, AuditStore, EventStream, RetentionQuery};
pub use retention::{RetentionPolicy, RetentionReport, RetentionService, DEFAULT_RETENTION_DAYS};
pub use summary::{
    default_summary_date, summarize_events, AuditServiceError, AuditSummaryService,
    FailedOrganization, SummaryRun, SummaryScope,
};
