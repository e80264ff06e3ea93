use crate::infra::{today_or, Workspace};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::Args;
use medwatch::error::AppError;
use medwatch::storage::{InMemoryStore, StoreError};
use medwatch::workflows::audit::{
    AuditAction, AuditEvent, AuditEventDetail, AuditModule, AuditSeverity, EventId, Organization,
    OrganizationId, UserId,
};
use medwatch::workflows::risk::{
    ChronicConditions, ComplianceRecord, DiseaseRecord, DiseaseStatus, FitnessStatus,
    IncidentRecord, UnitId, WorkUnit, WorkerHealthRecord, WorkerId,
};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct SeedArgs {
    /// Anchor date for the generated history (YYYY-MM-DD). Defaults to today (UTC).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Replace a dataset that already has records
    #[arg(long)]
    pub(crate) force: bool,
}

pub(crate) fn run_seed(workspace: &Workspace, args: SeedArgs) -> Result<(), AppError> {
    let existing = workspace.store.snapshot()?;
    if !args.force && (!existing.workers.is_empty() || !existing.audit_events.is_empty()) {
        eprintln!(
            "{} already holds records; pass --force to replace it",
            workspace.data_path.display()
        );
        return Err(StoreError::Conflict.into());
    }

    let today = today_or(args.today);
    let store = demo_store(today)?;
    workspace.store.replace(store.snapshot()?)?;
    workspace.persist()?;

    let snapshot = store.snapshot()?;
    info!(
        workers = snapshot.workers.len(),
        events = snapshot.audit_events.len(),
        "demo dataset written"
    );
    println!(
        "Seeded {} with {} workers in {} units and {} audit events across {} organizations.",
        workspace.data_path.display(),
        snapshot.workers.len(),
        snapshot.units.len(),
        snapshot.audit_events.len(),
        snapshot.organizations.len()
    );
    Ok(())
}

fn demo_store(today: NaiveDate) -> Result<InMemoryStore, StoreError> {
    let store = InMemoryStore::new();
    let days_ago = |days: i64| today - Duration::days(days);

    for (id, name) in [("foundry", "Foundry Line 2"), ("dispatch", "Dispatch & Warehouse")] {
        store.add_unit(WorkUnit {
            unit_id: UnitId(id.to_string()),
            name: name.to_string(),
        })?;
    }

    let workers = [
        WorkerHealthRecord {
            age: Some(58),
            fitness_status: Some(FitnessStatus::TemporarilyUnfit),
            chronic_conditions: Some(ChronicConditions::Listed(vec![
                "hypertension".to_string(),
                "copd".to_string(),
            ])),
            allergies: Some("penicillin".to_string()),
            hire_date: Some(days_ago(16 * 365)),
            exposure_risks: Some(vec![
                "silica_dust".to_string(),
                "noise".to_string(),
                "heat".to_string(),
            ]),
            next_exam_due: Some(days_ago(45)),
            ..worker("w-1001", "foundry", "Dana Whitfield")
        },
        WorkerHealthRecord {
            age: Some(41),
            fitness_status: Some(FitnessStatus::FitWithRestrictions),
            chronic_conditions: Some(ChronicConditions::Flag(true)),
            allergies: Some("NONE".to_string()),
            hire_date: Some(days_ago(7 * 365)),
            exposure_risks: Some(vec!["cobalt".to_string(), "vibration".to_string()]),
            next_exam_due: Some(days_ago(5)),
            ..worker("w-1002", "foundry", "Marco Ruiz")
        },
        WorkerHealthRecord {
            age: Some(29),
            fitness_status: Some(FitnessStatus::Fit),
            chronic_conditions: Some(ChronicConditions::Flag(false)),
            allergies: Some("NONE".to_string()),
            hire_date: Some(days_ago(3 * 365)),
            exposure_risks: Some(vec!["noise".to_string()]),
            next_exam_due: Some(days_ago(-120)),
            ..worker("w-1003", "foundry", "Priya Natarajan")
        },
        WorkerHealthRecord {
            age: Some(22),
            fitness_status: Some(FitnessStatus::Fit),
            hire_date: Some(days_ago(200)),
            exposure_risks: Some(vec!["manual_handling".to_string()]),
            ..worker("w-2001", "dispatch", "Jordan Blake")
        },
        WorkerHealthRecord {
            age: Some(63),
            fitness_status: Some(FitnessStatus::PermanentlyUnfit),
            chronic_conditions: Some(ChronicConditions::Flag(true)),
            allergies: Some("latex".to_string()),
            ..worker("w-2002", "dispatch", "Hollis Grant")
        },
        worker("w-2003", "dispatch", "Casey Moreau"),
    ];
    for record in workers {
        store.put_worker(record)?;
    }

    for (id, days, compliant) in [
        ("w-1001", 3, false),
        ("w-1001", 17, false),
        ("w-1001", 26, true),
        ("w-1002", 8, false),
        ("w-1003", 12, true),
        ("w-2001", 40, false),
    ] {
        store.add_compliance_record(ComplianceRecord {
            worker_id: WorkerId(id.to_string()),
            checked_on: days_ago(days),
            compliant,
        })?;
    }

    for (id, days, description) in [
        ("w-1001", 90, "heat exhaustion at pour station"),
        ("w-1001", 210, "hand laceration"),
        ("w-1002", 30, "dust mask failure"),
        ("w-2002", 500, "back strain"),
    ] {
        store.add_incident(IncidentRecord {
            worker_id: WorkerId(id.to_string()),
            occurred_on: days_ago(days),
            description: description.to_string(),
        })?;
    }

    for (id, disease, status) in [
        ("w-1001", "silicosis", DiseaseStatus::Chronic),
        ("w-1002", "contact dermatitis", DiseaseStatus::Active),
        ("w-1003", "noise-induced hearing loss", DiseaseStatus::Suspected),
    ] {
        store.add_disease(DiseaseRecord {
            worker_id: WorkerId(id.to_string()),
            disease: disease.to_string(),
            status,
        })?;
    }

    seed_audit_trail(&store, today)?;
    Ok(store)
}

fn worker(id: &str, unit: &str, name: &str) -> WorkerHealthRecord {
    WorkerHealthRecord {
        worker_id: WorkerId(id.to_string()),
        unit_id: UnitId(unit.to_string()),
        full_name: name.to_string(),
        age: None,
        fitness_status: None,
        chronic_conditions: None,
        allergies: None,
        hire_date: None,
        exposure_risks: None,
        next_exam_due: None,
    }
}

struct DemoEvent {
    id: &'static str,
    organization: &'static str,
    days_ago: i64,
    hour: u32,
    module: AuditModule,
    action: AuditAction,
    severity: AuditSeverity,
    user: Option<&'static str>,
    ip: Option<&'static str>,
    success: bool,
}

fn seed_audit_trail(store: &InMemoryStore, today: NaiveDate) -> Result<(), StoreError> {
    use AuditAction::*;
    use AuditSeverity::*;

    let events = [
        demo("e-001", "pharmacy-north", 1, 7, AuditModule::Auth, Login, Low, Some("u-ana"), Some("10.1.0.21"), true),
        demo("e-002", "pharmacy-north", 1, 7, AuditModule::Auth, LoginFailed, High, Some("u-ben"), Some("203.0.113.40"), false),
        demo("e-003", "pharmacy-north", 1, 8, AuditModule::Sales, Sale, Low, Some("u-ana"), Some("10.1.0.21"), true),
        demo("e-004", "pharmacy-north", 1, 9, AuditModule::Pharmacy, Dispense, Medium, Some("u-cho"), Some("10.1.0.22"), true),
        demo("e-005", "pharmacy-north", 1, 11, AuditModule::Inventory, StockAdjustment, Medium, Some("u-cho"), Some("10.1.0.22"), true),
        demo("e-006", "pharmacy-north", 1, 15, AuditModule::Admin, Delete, Critical, Some("u-ana"), Some("10.1.0.21"), false),
        demo("e-007", "occupational-east", 1, 10, AuditModule::Occupational, Update, Low, Some("u-dee"), Some("10.2.0.5"), true),
        demo("e-008", "occupational-east", 1, 16, AuditModule::Occupational, Export, High, Some("u-dee"), Some("10.2.0.5"), true),
        demo("e-009", "pharmacy-north", 420, 9, AuditModule::Inventory, Update, Low, Some("u-ben"), None, true),
        demo("e-010", "pharmacy-north", 430, 13, AuditModule::Admin, Delete, Critical, Some("u-ana"), None, true),
        demo("e-011", "occupational-east", 700, 12, AuditModule::Auth, Login, Low, Some("u-dee"), None, true),
    ];

    for (id, name) in [
        ("pharmacy-north", "North Street Pharmacy"),
        ("occupational-east", "East Occupational Clinic"),
    ] {
        store.add_organization(Organization {
            organization_id: OrganizationId(id.to_string()),
            name: name.to_string(),
        })?;
    }

    for event in events {
        store.put_event(into_event(event, today))?;
    }

    for (detail, event, field) in [
        ("d-001", "e-005", "quantity"),
        ("d-002", "e-009", "reorder_level"),
        ("d-003", "e-010", "status"),
    ] {
        store.add_event_detail(AuditEventDetail {
            detail_id: detail.to_string(),
            event_id: EventId(event.to_string()),
            field: field.to_string(),
            old_value: Some("12".to_string()),
            new_value: Some("9".to_string()),
        })?;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn demo(
    id: &'static str,
    organization: &'static str,
    days_ago: i64,
    hour: u32,
    module: AuditModule,
    action: AuditAction,
    severity: AuditSeverity,
    user: Option<&'static str>,
    ip: Option<&'static str>,
    success: bool,
) -> DemoEvent {
    DemoEvent {
        id,
        organization,
        days_ago,
        hour,
        module,
        action,
        severity,
        user,
        ip,
        success,
    }
}

fn into_event(event: DemoEvent, today: NaiveDate) -> AuditEvent {
    let date = today - Duration::days(event.days_ago);
    let timestamp: DateTime<Utc> = date
        .and_hms_opt(event.hour, 0, 0)
        .unwrap_or_default()
        .and_utc();

    AuditEvent {
        event_id: EventId(event.id.to_string()),
        organization_id: OrganizationId(event.organization.to_string()),
        timestamp,
        action: event.action,
        severity: event.severity,
        module: event.module,
        user_id: event.user.map(|user| UserId(user.to_string())),
        ip_address: event.ip.and_then(|ip| ip.parse().ok()),
        success: event.success,
        description: format!("{} via {}", event.action.code(), event.module.code()),
    }
}
