use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::net::IpAddr;

use crate::workflows::audit::{
    AuditAction, AuditEvent, AuditModule, AuditSeverity, EventId, OrganizationId, UserId,
};
use crate::workflows::risk::{ChronicConditions, FitnessStatus, UnitId, WorkerHealthRecord, WorkerId};

/// Row-level rejection with the 1-based CSV line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: u64,
    pub reason: String,
}

pub(crate) enum ParseError {
    Csv(csv::Error),
    Row(RowError),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source)
}

#[derive(Debug, Deserialize)]
struct WorkerRow {
    worker_id: String,
    unit_id: String,
    full_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    age: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    fitness_status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    chronic_conditions: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    allergies: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    hire_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    exposure_risks: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    next_exam_due: Option<String>,
}

impl WorkerRow {
    /// Unreadable optional fields are dropped rather than rejecting the row.
    fn into_record(self) -> WorkerHealthRecord {
        WorkerHealthRecord {
            worker_id: WorkerId(self.worker_id),
            unit_id: UnitId(self.unit_id),
            full_name: self.full_name,
            age: self.age.and_then(|raw| raw.trim().parse().ok()),
            fitness_status: self.fitness_status.as_deref().and_then(FitnessStatus::parse_code),
            chronic_conditions: self.chronic_conditions.as_deref().map(parse_chronic),
            allergies: self.allergies,
            hire_date: self.hire_date.as_deref().and_then(parse_date),
            exposure_risks: self.exposure_risks.as_deref().map(split_list),
            next_exam_due: self.next_exam_due.as_deref().and_then(parse_date),
        }
    }
}

pub(crate) fn parse_workers<R: Read>(source: R) -> Result<Vec<WorkerHealthRecord>, ParseError> {
    let mut csv_reader = reader(source);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<WorkerRow>() {
        records.push(row?.into_record());
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct EventRow {
    event_id: String,
    organization_id: String,
    timestamp: String,
    action: String,
    severity: String,
    #[serde(default)]
    module: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    user_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    ip_address: Option<String>,
    success: String,
    #[serde(default)]
    description: String,
}

impl EventRow {
    fn into_event(self, line: u64) -> Result<AuditEvent, RowError> {
        let reject = |reason: String| RowError { line, reason };

        let timestamp = parse_datetime(&self.timestamp)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| reject(format!("invalid timestamp '{}'", self.timestamp)))?;
        let severity = AuditSeverity::parse_label(&self.severity)
            .ok_or_else(|| reject(format!("unknown severity '{}'", self.severity)))?;
        let success = parse_bool(&self.success)
            .ok_or_else(|| reject(format!("invalid success flag '{}'", self.success)))?;
        let ip_address = match self.ip_address.as_deref() {
            Some(raw) => Some(
                raw.parse::<IpAddr>()
                    .map_err(|_| reject(format!("invalid ip address '{raw}'")))?,
            ),
            None => None,
        };

        Ok(AuditEvent {
            event_id: EventId(self.event_id),
            organization_id: OrganizationId(self.organization_id),
            timestamp,
            action: AuditAction::parse_code(&self.action),
            severity,
            module: AuditModule::parse_code(&self.module),
            user_id: self.user_id.map(UserId),
            ip_address,
            success,
            description: self.description,
        })
    }
}

pub(crate) fn parse_events<R: Read>(source: R) -> Result<Vec<AuditEvent>, ParseError> {
    let mut csv_reader = reader(source);
    let mut events = Vec::new();

    let headers = csv_reader.headers()?.clone();

    for record in csv_reader.records() {
        let record = record?;
        // Line the record starts on; quoted fields may span several.
        let line = record.position().map_or(0, csv::Position::line);
        let row: EventRow = record.deserialize(Some(&headers))?;
        events.push(row.into_event(line).map_err(ParseError::Row)?);
    }

    Ok(events)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_chronic(raw: &str) -> ChronicConditions {
    match parse_bool(raw) {
        Some(flag) => ChronicConditions::Flag(flag),
        None => ChronicConditions::Listed(split_list(raw)),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }

    parse_date(trimmed).and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
pub(crate) fn parse_datetime_for_tests(value: &str) -> Option<NaiveDateTime> {
    parse_datetime(value)
}
