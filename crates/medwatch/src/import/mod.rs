//! CSV import of workers and audit events into the reference store.

mod parser;

pub use parser::RowError;

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use parser::ParseError;
use tracing::info;

use crate::storage::{InMemoryStore, StoreError};
use crate::workflows::audit::{AuditEvent, AuditStore, Organization};
use crate::workflows::risk::{WorkUnit, WorkerHealthRecord, WorkforceStore};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row(RowError),
    Store(StoreError),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read CSV file: {}", err),
            ImportError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            ImportError::Row(err) => write!(f, "rejected row on line {}: {}", err.line, err.reason),
            ImportError::Store(err) => write!(f, "could not store imported records: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Row(_) => None,
            ImportError::Store(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<StoreError> for ImportError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<ParseError> for ImportError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Csv(err) => Self::Csv(err),
            ParseError::Row(err) => Self::Row(err),
        }
    }
}

/// Counts of rows written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub replaced: usize,
    pub new_scopes: usize,
}

pub struct WorkerCsvImporter;

impl WorkerCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<WorkerHealthRecord>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<WorkerHealthRecord>, ImportError> {
        Ok(parser::parse_workers(reader)?)
    }

    /// Writes workers into `store`, registering any organization unit not seen before.
    pub fn load_into(
        store: &InMemoryStore,
        workers: Vec<WorkerHealthRecord>,
    ) -> Result<ImportSummary, ImportError> {
        let mut summary = ImportSummary::default();
        let units: BTreeSet<_> = workers.iter().map(|worker| worker.unit_id.clone()).collect();

        for unit_id in units {
            if store.fetch_unit(&unit_id)?.is_none() {
                store.add_unit(WorkUnit {
                    name: unit_id.to_string(),
                    unit_id,
                })?;
                summary.new_scopes += 1;
            }
        }

        for worker in workers {
            if store.put_worker(worker)? {
                summary.inserted += 1;
            } else {
                summary.replaced += 1;
            }
        }

        info!(
            inserted = summary.inserted,
            replaced = summary.replaced,
            units = summary.new_scopes,
            "workers imported"
        );
        Ok(summary)
    }
}

pub struct EventCsvImporter;

impl EventCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<AuditEvent>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<AuditEvent>, ImportError> {
        Ok(parser::parse_events(reader)?)
    }

    /// Writes events into `store`, registering any organization not seen before.
    pub fn load_into(
        store: &InMemoryStore,
        events: Vec<AuditEvent>,
    ) -> Result<ImportSummary, ImportError> {
        let mut summary = ImportSummary::default();
        let organizations: BTreeSet<_> = events
            .iter()
            .map(|event| event.organization_id.clone())
            .collect();

        for organization_id in organizations {
            if store.fetch_organization(&organization_id)?.is_none() {
                store.add_organization(Organization {
                    name: organization_id.to_string(),
                    organization_id,
                })?;
                summary.new_scopes += 1;
            }
        }

        for event in events {
            if store.put_event(event)? {
                summary.inserted += 1;
            } else {
                summary.replaced += 1;
            }
        }

        info!(
            inserted = summary.inserted,
            replaced = summary.replaced,
            organizations = summary.new_scopes,
            "audit events imported"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::audit::{AuditAction, AuditModule, AuditSeverity};
    use crate::workflows::risk::{ChronicConditions, FitnessStatus};
    use chrono::NaiveDate;
    use std::io::Cursor;

    const WORKERS: &str = "worker_id,unit_id,full_name,age,fitness_status,chronic_conditions,allergies,hire_date,exposure_risks,next_exam_due\n\
w-1,plant-a,Avery Lee,52,fit_with_restrictions,asthma;hypertension,NONE,2012-04-01,noise;silica_dust,2026-01-15\n\
w-2,plant-a,Jules Moreno,,unknown,no,,not-a-date,,\n";

    const EVENTS: &str = "event_id,organization_id,timestamp,action,severity,module,user_id,ip_address,success,description\n\
e-1,clinic-1,2026-10-15T08:30:00Z,LOGIN,LOW,auth,u-1,10.0.0.4,true,login\n\
e-2,clinic-1,2026-10-15 09:00:00,SALE,MEDIUM,sales,u-2,,yes,counter sale\n\
e-3,clinic-2,2026-10-15,ARCHIVE,HIGH,reports,,,false,\n";

    #[test]
    fn parse_datetime_supports_rfc3339_sql_and_date_strings() {
        let rfc = parser::parse_datetime_for_tests("2026-10-15T10:00:00+02:00").expect("rfc");
        assert_eq!(
            rfc,
            NaiveDate::from_ymd_opt(2026, 10, 15)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
        );

        let sql = parser::parse_datetime_for_tests("2026-10-15 09:15:00").expect("sql");
        assert_eq!(sql.time().to_string(), "09:15:00");

        let date = parser::parse_datetime_for_tests("2026-10-15").expect("date");
        assert_eq!(date.time().to_string(), "00:00:00");

        assert!(parser::parse_datetime_for_tests("  ").is_none());
        assert!(parser::parse_datetime_for_tests("yesterday").is_none());
    }

    #[test]
    fn worker_rows_keep_readable_fields_and_drop_malformed_ones() {
        let workers = WorkerCsvImporter::from_reader(Cursor::new(WORKERS)).expect("parse");
        assert_eq!(workers.len(), 2);

        let avery = &workers[0];
        assert_eq!(avery.age, Some(52));
        assert_eq!(avery.fitness_status, Some(FitnessStatus::FitWithRestrictions));
        assert_eq!(
            avery.chronic_conditions,
            Some(ChronicConditions::Listed(vec![
                "asthma".to_string(),
                "hypertension".to_string()
            ]))
        );
        assert_eq!(avery.allergies.as_deref(), Some("NONE"));
        assert_eq!(
            avery.exposure_risks,
            Some(vec!["noise".to_string(), "silica_dust".to_string()])
        );

        let jules = &workers[1];
        assert_eq!(jules.age, None);
        assert_eq!(jules.fitness_status, None);
        assert_eq!(jules.chronic_conditions, Some(ChronicConditions::Flag(false)));
        assert_eq!(jules.allergies, None);
        assert_eq!(jules.hire_date, None);
        assert_eq!(jules.exposure_risks, None);
    }

    #[test]
    fn event_rows_map_codes_and_unknown_values() {
        let events = EventCsvImporter::from_reader(Cursor::new(EVENTS)).expect("parse");
        assert_eq!(events.len(), 3);

        assert_eq!(events[0].action, AuditAction::Login);
        assert_eq!(events[0].module, AuditModule::Auth);
        assert!(events[0].ip_address.is_some());
        assert_eq!(events[1].action, AuditAction::Sale);
        assert!(events[1].success);
        assert_eq!(events[2].action, AuditAction::Other);
        assert_eq!(events[2].module, AuditModule::Other);
        assert_eq!(events[2].severity, AuditSeverity::High);
        assert!(events[2].user_id.is_none());
    }

    #[test]
    fn event_rows_with_bad_severity_are_rejected_with_line_number() {
        let csv = "event_id,organization_id,timestamp,action,severity,module,user_id,ip_address,success,description\n\
e-1,clinic-1,2026-10-15T08:30:00Z,LOGIN,LOW,auth,u-1,,true,\n\
e-2,clinic-1,2026-10-15T08:31:00Z,LOGIN,SEVERE,auth,u-1,,true,\n";

        match EventCsvImporter::from_reader(Cursor::new(csv)) {
            Err(ImportError::Row(RowError { line, reason })) => {
                assert_eq!(line, 3);
                assert!(reason.contains("SEVERE"));
            }
            other => panic!("expected row error, got {other:?}"),
        }
    }

    #[test]
    fn rejected_row_line_accounts_for_multiline_descriptions() {
        let csv = "event_id,organization_id,timestamp,action,severity,module,user_id,ip_address,success,description\n\
e-1,clinic-1,2026-10-15T08:30:00Z,UPDATE,LOW,inventory,u-1,,true,\"recount\nshelf 4\nbin 2\"\n\
e-2,clinic-1,2026-10-15T08:31:00Z,LOGIN,SEVERE,auth,u-1,,true,\n";

        match EventCsvImporter::from_reader(Cursor::new(csv)) {
            Err(ImportError::Row(RowError { line, .. })) => assert_eq!(line, 5),
            other => panic!("expected row error, got {other:?}"),
        }
    }

    #[test]
    fn load_into_registers_scopes_and_counts_replacements() {
        let store = InMemoryStore::new();
        let events = EventCsvImporter::from_reader(Cursor::new(EVENTS)).expect("parse");

        let first = EventCsvImporter::load_into(&store, events.clone()).expect("first load");
        assert_eq!(first.inserted, 3);
        assert_eq!(first.new_scopes, 2);

        let second = EventCsvImporter::load_into(&store, events).expect("second load");
        assert_eq!(second.inserted, 0);
        assert_eq!(second.replaced, 3);
        assert_eq!(second.new_scopes, 0);
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = WorkerCsvImporter::from_path("./does-not-exist.csv").expect_err("io error");
        match error {
            ImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
