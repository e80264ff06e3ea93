use super::super::domain::{
    ComplianceRecord, DiseaseRecord, FitnessStatus, IncidentRecord, WorkerHealthRecord,
};
use super::config::ScoringConfig;
use super::{RiskCategory, RiskFactor, RiskInputs, ScoreComponent};
use chrono::NaiveDate;

pub(crate) const SUB_SCORE_CAP: u32 = 100;

/// Hazards that carry a flat bonus on top of the per-tag exposure points.
pub const HIGH_RISK_HAZARDS: [&str; 4] = ["silica_dust", "noise", "cobalt", "radiation"];

const EXPOSURE_POINTS_PER_TAG: u32 = 8;
const EXPOSURE_TAG_CAP: u32 = 25;
const HIGH_RISK_HAZARD_BONUS: u32 = 20;
const NONCOMPLIANCE_POINTS_PER_CHECK: u32 = 5;
const EXPOSURE_NONCOMPLIANCE_CAP: u32 = 15;
const COMPLIANCE_NONCOMPLIANCE_CAP: u32 = 20;
const EXAM_OVERDUE_CAP: u32 = 30;
const INCIDENT_POINTS: u32 = 10;
const INCIDENT_CAP: u32 = 30;
const DISEASE_POINTS: u32 = 15;
const DISEASE_CAP: u32 = 25;
const DAYS_PER_YEAR: f64 = 365.25;

pub(crate) struct SubScores {
    pub health: u8,
    pub exposure: u8,
    pub compliance: u8,
}

pub(crate) fn score_worker(
    inputs: &RiskInputs<'_>,
    config: &ScoringConfig,
    today: NaiveDate,
) -> (Vec<ScoreComponent>, SubScores) {
    let worker = inputs.worker;
    let noncompliant = noncompliant_checks(
        inputs.compliance,
        config.compliance_window_start(today),
        today,
    );
    let incidents = incidents_in_window(inputs.incidents, config.incident_window_start(today), today);
    let diseases = open_diseases(inputs.diseases);

    let mut components = Vec::new();
    let health = health_components(worker, &mut components);
    let exposure = exposure_components(worker, noncompliant, today, &mut components);
    let compliance =
        compliance_components(worker, noncompliant, incidents, diseases, today, &mut components);

    let scores = SubScores {
        health: cap(health),
        exposure: cap(exposure),
        compliance: cap(compliance),
    };

    (components, scores)
}

fn cap(raw: u32) -> u8 {
    raw.min(SUB_SCORE_CAP) as u8
}

fn push(
    components: &mut Vec<ScoreComponent>,
    category: RiskCategory,
    factor: RiskFactor,
    points: u32,
    notes: String,
) -> u32 {
    if points > 0 {
        components.push(ScoreComponent {
            category,
            factor,
            points: points.min(SUB_SCORE_CAP) as u8,
            notes,
        });
    }
    points
}

fn health_components(worker: &WorkerHealthRecord, components: &mut Vec<ScoreComponent>) -> u32 {
    let mut total = 0;

    if let Some(age) = worker.age {
        total += push(
            components,
            RiskCategory::Health,
            RiskFactor::Age,
            age_points(age),
            format!("age {age}"),
        );
    }

    if let Some(status) = worker.fitness_status {
        total += push(
            components,
            RiskCategory::Health,
            RiskFactor::Fitness,
            fitness_points(status),
            status.label().to_string(),
        );
    }

    if worker
        .chronic_conditions
        .as_ref()
        .map(|conditions| conditions.any())
        .unwrap_or(false)
    {
        total += push(
            components,
            RiskCategory::Health,
            RiskFactor::ChronicConditions,
            15,
            "chronic condition on file".to_string(),
        );
    }

    if worker.has_reportable_allergies() {
        total += push(
            components,
            RiskCategory::Health,
            RiskFactor::Allergies,
            5,
            format!("allergies: {}", worker.allergies.as_deref().unwrap_or_default()),
        );
    }

    total
}

fn exposure_components(
    worker: &WorkerHealthRecord,
    noncompliant: usize,
    today: NaiveDate,
    components: &mut Vec<ScoreComponent>,
) -> u32 {
    let mut total = 0;

    if let Some(tags) = &worker.exposure_risks {
        total += push(
            components,
            RiskCategory::Exposure,
            RiskFactor::ExposureCount,
            exposure_count_points(tags.len()),
            format!("{} exposure tag(s)", tags.len()),
        );

        if let Some(hazard) = tags.iter().find(|tag| is_high_risk_hazard(tag)) {
            total += push(
                components,
                RiskCategory::Exposure,
                RiskFactor::HighRiskHazard,
                HIGH_RISK_HAZARD_BONUS,
                format!("high-risk hazard {}", normalize_hazard(hazard)),
            );
        }
    }

    if let Some(hire_date) = worker.hire_date {
        total += push(
            components,
            RiskCategory::Exposure,
            RiskFactor::Tenure,
            tenure_points(hire_date, today),
            format!("hired {hire_date}"),
        );
    }

    total += push(
        components,
        RiskCategory::Exposure,
        RiskFactor::ExposureNoncompliance,
        noncompliance_points(noncompliant, EXPOSURE_NONCOMPLIANCE_CAP),
        format!("{noncompliant} non-compliant check(s) in window"),
    );

    total
}

fn compliance_components(
    worker: &WorkerHealthRecord,
    noncompliant: usize,
    incidents: usize,
    diseases: usize,
    today: NaiveDate,
    components: &mut Vec<ScoreComponent>,
) -> u32 {
    let mut total = 0;

    if let Some(due) = worker.next_exam_due {
        total += push(
            components,
            RiskCategory::Compliance,
            RiskFactor::ExamOverdue,
            exam_overdue_points(due, today),
            format!("medical exam due {due}"),
        );
    }

    total += push(
        components,
        RiskCategory::Compliance,
        RiskFactor::Incidents,
        incident_points(incidents),
        format!("{incidents} incident(s) in the last year"),
    );

    total += push(
        components,
        RiskCategory::Compliance,
        RiskFactor::Diseases,
        disease_points(diseases),
        format!("{diseases} active or chronic occupational disease(s)"),
    );

    total += push(
        components,
        RiskCategory::Compliance,
        RiskFactor::ComplianceNoncompliance,
        noncompliance_points(noncompliant, COMPLIANCE_NONCOMPLIANCE_CAP),
        format!("{noncompliant} non-compliant check(s) in window"),
    );

    total
}

pub(crate) fn age_points(age: u32) -> u32 {
    match age {
        0..=24 => 10,
        25..=34 => 15,
        35..=44 => 20,
        45..=54 => 30,
        _ => 40,
    }
}

pub(crate) fn fitness_points(status: FitnessStatus) -> u32 {
    match status {
        FitnessStatus::PermanentlyUnfit => 35,
        FitnessStatus::TemporarilyUnfit => 25,
        FitnessStatus::FitWithRestrictions => 15,
        FitnessStatus::Fit => 0,
    }
}

pub(crate) fn exposure_count_points(tags: usize) -> u32 {
    (tags as u32)
        .saturating_mul(EXPOSURE_POINTS_PER_TAG)
        .min(EXPOSURE_TAG_CAP)
}

pub(crate) fn tenure_points(hire_date: NaiveDate, today: NaiveDate) -> u32 {
    let years = (today - hire_date).num_days() as f64 / DAYS_PER_YEAR;
    if years > 10.0 {
        25
    } else if years > 5.0 {
        15
    } else if years > 2.0 {
        10
    } else {
        0
    }
}

pub(crate) fn noncompliance_points(checks: usize, cap: u32) -> u32 {
    (checks as u32)
        .saturating_mul(NONCOMPLIANCE_POINTS_PER_CHECK)
        .min(cap)
}

pub(crate) fn exam_overdue_points(due: NaiveDate, today: NaiveDate) -> u32 {
    let overdue = (today - due).num_days();
    if overdue <= 0 {
        0
    } else {
        (overdue.min(EXAM_OVERDUE_CAP as i64)) as u32
    }
}

pub(crate) fn incident_points(incidents: usize) -> u32 {
    (incidents as u32)
        .saturating_mul(INCIDENT_POINTS)
        .min(INCIDENT_CAP)
}

pub(crate) fn disease_points(diseases: usize) -> u32 {
    (diseases as u32).saturating_mul(DISEASE_POINTS).min(DISEASE_CAP)
}

fn normalize_hazard(tag: &str) -> String {
    tag.trim()
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
}

pub(crate) fn is_high_risk_hazard(tag: &str) -> bool {
    let normalized = normalize_hazard(tag);
    HIGH_RISK_HAZARDS.contains(&normalized.as_str())
}

pub(crate) fn noncompliant_checks(
    records: &[ComplianceRecord],
    since: NaiveDate,
    today: NaiveDate,
) -> usize {
    records
        .iter()
        .filter(|record| !record.compliant)
        .filter(|record| record.checked_on >= since && record.checked_on <= today)
        .count()
}

fn incidents_in_window(records: &[IncidentRecord], since: NaiveDate, today: NaiveDate) -> usize {
    records
        .iter()
        .filter(|record| record.occurred_on >= since && record.occurred_on <= today)
        .count()
}

fn open_diseases(records: &[DiseaseRecord]) -> usize {
    records.iter().filter(|record| record.status.is_open()).count()
}
