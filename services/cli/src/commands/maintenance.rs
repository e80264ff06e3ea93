use crate::infra::Workspace;
use clap::{ArgGroup, Args, Subcommand};
use medwatch::error::AppError;
use medwatch::import::{EventCsvImporter, ImportSummary, WorkerCsvImporter};
use medwatch::workflows::audit::{AuditSummaryService, OrganizationId};
use medwatch::workflows::risk::RiskProfileService;
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("derived")
        .required(true)
        .args(["profiles", "summaries"])
))]
pub(crate) struct ResetArgs {
    /// Remove every stored risk profile
    #[arg(long)]
    pub(crate) profiles: bool,
    /// Remove stored audit daily summaries
    #[arg(long)]
    pub(crate) summaries: bool,
    /// Only remove summaries for this organization
    #[arg(long, requires = "summaries")]
    pub(crate) org: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ImportCommand {
    /// Import workers (creates unknown organization units)
    Workers {
        /// CSV export with worker health records
        #[arg(long)]
        csv: PathBuf,
    },
    /// Import audit events (creates unknown organizations)
    Events {
        /// CSV export with audit events
        #[arg(long)]
        csv: PathBuf,
    },
}

pub(crate) fn run_reset(workspace: &Workspace, args: ResetArgs) -> Result<(), AppError> {
    if args.profiles {
        let service =
            RiskProfileService::new(workspace.store.clone(), workspace.config.scoring.clone());
        let removed = service.reset_profiles()?;
        println!("Removed {removed} risk profile(s).");
    } else {
        let service = AuditSummaryService::new(workspace.store.clone());
        let organization = args.org.map(OrganizationId);
        let removed = service.reset_summaries(organization.as_ref())?;
        match &organization {
            Some(id) => println!("Removed {removed} daily summary(ies) for {id}."),
            None => println!("Removed {removed} daily summary(ies)."),
        }
    }

    workspace.persist()
}

pub(crate) fn run_import(workspace: &Workspace, command: ImportCommand) -> Result<(), AppError> {
    let (kind, summary) = match command {
        ImportCommand::Workers { csv } => {
            let workers = WorkerCsvImporter::from_path(&csv)?;
            ("worker", WorkerCsvImporter::load_into(&workspace.store, workers)?)
        }
        ImportCommand::Events { csv } => {
            let events = EventCsvImporter::from_path(&csv)?;
            ("audit event", EventCsvImporter::load_into(&workspace.store, events)?)
        }
    };

    workspace.persist()?;
    print_import(kind, &summary);
    Ok(())
}

fn print_import(kind: &str, summary: &ImportSummary) {
    println!(
        "Imported {} new {kind} record(s), replaced {}, registered {} new scope(s).",
        summary.inserted, summary.replaced, summary.new_scopes
    );
}
