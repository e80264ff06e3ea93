//! Audit rollup and cleanup scenarios exercised through the public services.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use medwatch::import::EventCsvImporter;
use medwatch::storage::InMemoryStore;
use medwatch::workflows::audit::{
    AuditEventDetail, AuditStore, AuditSummaryService, EventId, OrganizationId, RetentionPolicy,
    RetentionService, SummaryScope,
};

const EVENTS: &str = "event_id,organization_id,timestamp,action,severity,module,user_id,ip_address,success,description\n\
a-1,pharma-1,2026-10-15T07:55:00Z,LOGIN,LOW,auth,u-1,192.168.1.10,true,morning login\n\
a-2,pharma-1,2026-10-15T08:10:00Z,SALE,MEDIUM,sales,u-1,192.168.1.10,true,otc sale\n\
a-3,pharma-1,2026-10-15T08:20:00Z,DISPENSE,MEDIUM,pharmacy,u-2,192.168.1.11,true,rx fill\n\
a-4,pharma-1,2026-10-15T23:59:59Z,LOGIN_FAILED,HIGH,auth,u-9,203.0.113.7,false,bad password\n\
a-5,pharma-1,2025-06-01T12:00:00Z,DELETE,CRITICAL,inventory,u-2,,true,write-off\n\
a-6,pharma-1,2025-06-01T12:05:00Z,UPDATE,LOW,inventory,u-2,,true,recount\n\
b-1,clinic-2,2025-01-03 10:00:00,EXPORT,HIGH,occupational,u-7,,true,records export\n";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn loaded_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    let events = EventCsvImporter::from_reader(EVENTS.as_bytes()).expect("events parse");
    EventCsvImporter::load_into(&store, events).expect("events load");
    for (detail, event) in [("d-1", "a-5"), ("d-2", "a-6"), ("d-3", "a-2")] {
        store
            .add_event_detail(AuditEventDetail {
                detail_id: detail.to_string(),
                event_id: EventId(event.to_string()),
                field: "quantity".to_string(),
                old_value: None,
                new_value: Some("0".to_string()),
            })
            .expect("detail stored");
    }
    Arc::new(store)
}

#[test]
fn nightly_rollup_summarizes_yesterday_for_each_organization() {
    let store = loaded_store();
    let service = AuditSummaryService::new(store.clone());

    let run = service
        .summarize(&SummaryScope::default(), now().date_naive())
        .expect("rollup runs");

    assert_eq!(run.date, NaiveDate::from_ymd_opt(2026, 10, 15).expect("valid date"));
    assert_eq!(run.organizations, 2);
    assert_eq!(run.created, 1);
    assert_eq!(run.skipped, 1);

    let summary = &run.summaries[0];
    assert_eq!(summary.organization_id, OrganizationId("pharma-1".to_string()));
    assert_eq!(summary.total_events, 4);
    assert_eq!(summary.login_count, 1);
    assert_eq!(summary.failed_login_count, 1);
    assert_eq!(summary.sales_count, 1);
    assert_eq!(summary.dispense_count, 1);
    assert_eq!(summary.high_severity_count, 1);
    assert_eq!(summary.failed_action_count, 1);
    assert_eq!(summary.active_users, 3);
    assert_eq!(summary.unique_ips, 3);

    let rerun = service
        .summarize(&SummaryScope::default(), now().date_naive())
        .expect("rerun");
    assert_eq!(rerun.updated, 1);
    assert_eq!(store.daily_summaries(None).expect("summaries").len(), 1);
}

#[test]
fn cleanup_preview_matches_cleanup_and_spares_critical_events() {
    let store = loaded_store();
    let service = RetentionService::new(store.clone());
    let policy = RetentionPolicy {
        retention_days: 365,
        keep_critical: true,
        dry_run: true,
    };

    let preview = service.run(&policy, now()).expect("preview");
    assert_eq!(preview.matched_events, 2);
    assert_eq!(store.snapshot().expect("snapshot").audit_events.len(), 7);

    let applied = service
        .run(
            &RetentionPolicy {
                dry_run: false,
                ..policy
            },
            now(),
        )
        .expect("cleanup");
    assert_eq!(applied.deleted_events, preview.matched_events);
    assert_eq!(applied.deleted_details, 1);

    let snapshot = store.snapshot().expect("snapshot");
    assert!(snapshot
        .audit_events
        .iter()
        .any(|event| event.event_id.0 == "a-5"));
    assert!(snapshot
        .audit_events
        .iter()
        .all(|event| event.event_id.0 != "a-6" && event.event_id.0 != "b-1"));
    let details: Vec<_> = snapshot
        .event_details
        .iter()
        .map(|detail| detail.detail_id.as_str())
        .collect();
    assert_eq!(details, vec!["d-1", "d-3"]);
}
