//! End-to-end scoring scenarios driven through the public import, store and service facade.

use std::sync::Arc;

use chrono::NaiveDate;
use medwatch::import::WorkerCsvImporter;
use medwatch::storage::InMemoryStore;
use medwatch::workflows::risk::{
    ComplianceRecord, IncidentRecord, RiskLevel, RiskProfileService, ScoringConfig, UnitId,
    WorkerId, WorkforceStore,
};

const ROSTER: &str = "worker_id,unit_id,full_name,age,fitness_status,chronic_conditions,allergies,hire_date,exposure_risks,next_exam_due\n\
w-100,foundry,Sam Okafor,58,temporarily_unfit,yes,penicillin,2011-02-14,silica_dust;noise;heat,2026-08-01\n\
w-101,foundry,Kim Haddad,23,fit,no,NONE,2025-06-01,,2027-01-10\n\
w-102,warehouse,Lee Marsh,,,,,,forklift,\n";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
}

fn loaded_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    let workers = WorkerCsvImporter::from_reader(ROSTER.as_bytes()).expect("roster parses");
    WorkerCsvImporter::load_into(&store, workers).expect("roster loads");
    store
        .add_compliance_record(ComplianceRecord {
            worker_id: WorkerId("w-100".to_string()),
            checked_on: NaiveDate::from_ymd_opt(2026, 10, 2).expect("valid date"),
            compliant: false,
        })
        .expect("compliance stored");
    store
        .add_incident(IncidentRecord {
            worker_id: WorkerId("w-100".to_string()),
            occurred_on: NaiveDate::from_ymd_opt(2026, 3, 9).expect("valid date"),
            description: "burn".to_string(),
        })
        .expect("incident stored");
    Arc::new(store)
}

#[test]
fn imported_roster_is_scored_and_high_risk_worker_is_flagged() {
    let store = loaded_store();
    let service = RiskProfileService::new(store.clone(), ScoringConfig::default());

    let outcome = service.compute_missing(today()).expect("batch runs");
    assert_eq!(outcome.created, 3);
    assert!(outcome.skipped.is_empty());

    let profiles = store.risk_profiles().expect("profiles");
    let veteran = profiles
        .iter()
        .find(|profile| profile.worker_id.0 == "w-100")
        .expect("veteran profiled");
    // 40 age + 25 unfit + 15 chronic + 5 allergy
    assert_eq!(veteran.health_risk_score, 85);
    // 24 tags + 20 hazard + 25 tenure + 5 non-compliance
    assert_eq!(veteran.exposure_risk_score, 74);
    // 30 overdue + 10 incident + 5 non-compliance
    assert_eq!(veteran.compliance_risk_score, 45);
    assert_eq!(veteran.overall_risk_score, 71);
    assert!(veteran.intervention_required);
    assert_eq!(veteran.risk_level, RiskLevel::High);

    let sparse = profiles
        .iter()
        .find(|profile| profile.worker_id.0 == "w-102")
        .expect("sparse worker profiled");
    assert_eq!(sparse.health_risk_score, 0);
    assert_eq!(sparse.exposure_risk_score, 8);
    assert!(!sparse.intervention_required);

    let report = service.report(today(), 5).expect("report builds");
    assert_eq!(report.intervention_required, 1);
    assert_eq!(report.flagged[0].full_name, "Sam Okafor");
}

#[test]
fn unit_batches_are_limited_to_their_unit() {
    let store = loaded_store();
    let service = RiskProfileService::new(store.clone(), ScoringConfig::default());

    let outcome = service
        .compute_for_unit(&UnitId("foundry".to_string()), today())
        .expect("unit batch");
    assert_eq!(outcome.processed(), 2);

    let missing = service.compute_missing(today()).expect("missing batch");
    assert_eq!(missing.created, 1);
}

#[test]
fn stricter_threshold_changes_only_the_intervention_flag() {
    let store = loaded_store();
    let service = RiskProfileService::new(
        store,
        ScoringConfig::default().with_intervention_threshold(80),
    );

    let update = service
        .compute_for_worker(&WorkerId("w-100".to_string()), today())
        .expect("worker scored");
    assert_eq!(update.profile.overall_risk_score, 71);
    assert!(!update.profile.intervention_required);
}

#[test]
fn dataset_round_trips_through_json() {
    let store = loaded_store();
    let service = RiskProfileService::new(store.clone(), ScoringConfig::default());
    service.recompute_all(today()).expect("batch runs");

    let path = std::env::temp_dir().join(format!("medwatch-risk-{}.json", std::process::id()));
    store.save(&path).expect("dataset saved");
    let reloaded = InMemoryStore::load_or_default(&path).expect("dataset reloads");
    std::fs::remove_file(&path).ok();

    assert_eq!(
        reloaded.snapshot().expect("snapshot"),
        store.snapshot().expect("snapshot")
    );
}
