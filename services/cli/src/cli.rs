use crate::commands::audit::{
    run_cleanup, run_report, run_summarize, CleanupArgs, ReportArgs, SummarizeArgs,
};
use crate::commands::maintenance::{run_import, run_reset, ImportCommand, ResetArgs};
use crate::commands::risk::{run_compute, run_risk_report, ComputeArgs, RiskReportArgs};
use crate::infra::Workspace;
use crate::seed::{run_seed, SeedArgs};
use clap::{Parser, Subcommand};
use medwatch::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "medwatch",
    about = "Score occupational-health risk and roll up audit trails against a medwatch dataset",
    version
)]
struct Cli {
    /// Dataset file to operate on (defaults to MEDWATCH_DATA or medwatch-data.json)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute or report worker risk profiles
    Risk {
        #[command(subcommand)]
        command: RiskCommand,
    },
    /// Summarize or clean up audit events
    Audit {
        #[command(subcommand)]
        command: AuditCommand,
    },
    /// Drop derived records so they can be rebuilt
    Reset(ResetArgs),
    /// Load workers or audit events from a CSV export
    Import {
        #[command(subcommand)]
        command: ImportCommand,
    },
    /// Write a demo dataset
    Seed(SeedArgs),
}

#[derive(Subcommand, Debug)]
enum RiskCommand {
    /// Score one worker, one unit, unprofiled workers, or everyone
    Compute(ComputeArgs),
    /// Print the level distribution and workers requiring intervention
    Report(RiskReportArgs),
}

#[derive(Subcommand, Debug)]
enum AuditCommand {
    /// Build daily summaries (defaults to yesterday for every organization)
    Summarize(SummarizeArgs),
    /// Delete audit events older than the retention window
    Cleanup(CleanupArgs),
    /// List stored daily summaries
    Report(ReportArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let workspace = Workspace::open(cli.data)?;

    match cli.command {
        Command::Risk {
            command: RiskCommand::Compute(args),
        } => run_compute(&workspace, args),
        Command::Risk {
            command: RiskCommand::Report(args),
        } => run_risk_report(&workspace, args),
        Command::Audit {
            command: AuditCommand::Summarize(args),
        } => run_summarize(&workspace, args),
        Command::Audit {
            command: AuditCommand::Cleanup(args),
        } => run_cleanup(&workspace, args),
        Command::Audit {
            command: AuditCommand::Report(args),
        } => run_report(&workspace, args),
        Command::Reset(args) => run_reset(&workspace, args),
        Command::Import { command } => run_import(&workspace, command),
        Command::Seed(args) => run_seed(&workspace, args),
    }
}
