use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::storage::{InMemoryStore, StoreError, Transactional};
use crate::workflows::audit::domain::{
    AuditAction, AuditDailySummary, AuditEvent, AuditEventDetail, AuditModule, AuditSeverity,
    EventId, Organization, OrganizationId, UserId,
};
use crate::workflows::audit::repository::{
    AuditEventQuery, AuditStore, EventStream, RetentionQuery,
};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 6, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn today() -> NaiveDate {
    now().date_naive()
}

pub(super) fn yesterday() -> NaiveDate {
    today() - Duration::days(1)
}

pub(super) fn org(id: &str) -> OrganizationId {
    OrganizationId(id.to_string())
}

pub(super) fn at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    date.and_hms_opt(hour, 0, 0)
        .expect("valid time")
        .and_utc()
}

pub(super) struct EventBuilder {
    event: AuditEvent,
}

impl EventBuilder {
    pub(super) fn new(id: &str, organization: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            event: AuditEvent {
                event_id: EventId(id.to_string()),
                organization_id: org(organization),
                timestamp,
                action: AuditAction::View,
                severity: AuditSeverity::Low,
                module: AuditModule::Admin,
                user_id: None,
                ip_address: None,
                success: true,
                description: String::new(),
            },
        }
    }

    pub(super) fn action(mut self, module: AuditModule, action: AuditAction) -> Self {
        self.event.module = module;
        self.event.action = action;
        self
    }

    pub(super) fn severity(mut self, severity: AuditSeverity) -> Self {
        self.event.severity = severity;
        self
    }

    pub(super) fn user(mut self, user: &str, ip: &str) -> Self {
        self.event.user_id = Some(UserId(user.to_string()));
        self.event.ip_address = Some(ip.parse().expect("valid ip"));
        self
    }

    pub(super) fn failed(mut self) -> Self {
        self.event.success = false;
        self
    }

    pub(super) fn build(self) -> AuditEvent {
        self.event
    }
}

pub(super) fn store_with_orgs(ids: &[&str]) -> InMemoryStore {
    let store = InMemoryStore::new();
    for id in ids {
        store
            .add_organization(Organization {
                organization_id: org(id),
                name: format!("Org {id}"),
            })
            .expect("organization inserted");
    }
    store
}

pub(super) fn insert(store: &InMemoryStore, events: Vec<AuditEvent>) {
    for event in events {
        store.put_event(event).expect("event inserted");
    }
}

pub(super) fn detail(id: &str, event: &str) -> AuditEventDetail {
    AuditEventDetail {
        detail_id: id.to_string(),
        event_id: EventId(event.to_string()),
        field: "quantity".to_string(),
        old_value: Some("10".to_string()),
        new_value: Some("8".to_string()),
    }
}

/// One day of mixed activity for `organization` on `date`.
pub(super) fn busy_day(organization: &str, date: NaiveDate) -> Vec<AuditEvent> {
    let id = |n: u32| format!("{organization}-{date}-{n}");
    vec![
        EventBuilder::new(&id(1), organization, at(date, 8))
            .action(AuditModule::Auth, AuditAction::Login)
            .user("u-1", "10.0.0.1")
            .build(),
        EventBuilder::new(&id(2), organization, at(date, 8))
            .action(AuditModule::Auth, AuditAction::Login)
            .user("u-2", "10.0.0.2")
            .failed()
            .build(),
        EventBuilder::new(&id(3), organization, at(date, 9))
            .action(AuditModule::Auth, AuditAction::LoginFailed)
            .user("u-2", "10.0.0.2")
            .severity(AuditSeverity::High)
            .failed()
            .build(),
        EventBuilder::new(&id(4), organization, at(date, 10))
            .action(AuditModule::Sales, AuditAction::Sale)
            .user("u-1", "10.0.0.1")
            .build(),
        EventBuilder::new(&id(5), organization, at(date, 11))
            .action(AuditModule::Pharmacy, AuditAction::Dispense)
            .user("u-3", "10.0.0.3")
            .build(),
        EventBuilder::new(&id(6), organization, at(date, 12))
            .action(AuditModule::Inventory, AuditAction::StockAdjustment)
            .user("u-3", "10.0.0.3")
            .severity(AuditSeverity::Critical)
            .build(),
        EventBuilder::new(&id(7), organization, at(date, 13))
            .action(AuditModule::Admin, AuditAction::Delete)
            .build(),
    ]
}

/// Delegates to an [`InMemoryStore`] but can fail event reads for one organization and the
/// orphan sweep that follows a retention delete.
pub(super) struct FlakyAuditStore {
    pub inner: InMemoryStore,
    pub failing_organization: Option<OrganizationId>,
    pub fail_orphan_sweep: bool,
}

impl FlakyAuditStore {
    pub(super) fn wrap(inner: InMemoryStore) -> Self {
        Self {
            inner,
            failing_organization: None,
            fail_orphan_sweep: false,
        }
    }
}

impl Transactional for FlakyAuditStore {
    fn transaction<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Self) -> Result<T, StoreError>,
        Self: Sized,
    {
        let working = FlakyAuditStore {
            inner: InMemoryStore::from_snapshot(self.inner.snapshot()?),
            failing_organization: self.failing_organization.clone(),
            fail_orphan_sweep: self.fail_orphan_sweep,
        };
        let value = work(&working)?;
        self.inner.replace(working.inner.snapshot()?)?;
        Ok(value)
    }
}

impl AuditStore for FlakyAuditStore {
    fn organizations(&self) -> Result<Vec<Organization>, StoreError> {
        self.inner.organizations()
    }

    fn fetch_organization(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, StoreError> {
        self.inner.fetch_organization(id)
    }

    fn audit_events(&self, query: &AuditEventQuery) -> Result<EventStream<'_>, StoreError> {
        if self.failing_organization.as_ref() == Some(&query.organization_id) {
            return Err(StoreError::Unavailable("partition offline".to_string()));
        }
        self.inner.audit_events(query)
    }

    fn expired_events(&self, query: &RetentionQuery) -> Result<EventStream<'_>, StoreError> {
        self.inner.expired_events(query)
    }

    fn upsert_daily_summary(
        &self,
        summary: AuditDailySummary,
    ) -> Result<(AuditDailySummary, bool), StoreError> {
        self.inner.upsert_daily_summary(summary)
    }

    fn daily_summaries(
        &self,
        organization: Option<&OrganizationId>,
    ) -> Result<Vec<AuditDailySummary>, StoreError> {
        self.inner.daily_summaries(organization)
    }

    fn clear_daily_summaries(
        &self,
        organization: Option<&OrganizationId>,
    ) -> Result<usize, StoreError> {
        self.inner.clear_daily_summaries(organization)
    }

    fn delete_events_older_than(&self, query: &RetentionQuery) -> Result<usize, StoreError> {
        self.inner.delete_events_older_than(query)
    }

    fn delete_orphaned_dependents(&self) -> Result<usize, StoreError> {
        if self.fail_orphan_sweep {
            return Err(StoreError::Unavailable("detail table locked".to_string()));
        }
        self.inner.delete_orphaned_dependents()
    }
}
