use crate::infra::{print_json, Workspace};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use medwatch::error::AppError;
use medwatch::workflows::audit::report::{render_retention, render_summaries};
use medwatch::workflows::audit::{
    default_summary_date, AuditSummaryService, OrganizationId, RetentionPolicy, RetentionService,
    SummaryScope,
};

#[derive(Args, Debug)]
pub(crate) struct SummarizeArgs {
    /// Limit the run to one organization
    #[arg(long)]
    pub(crate) org: Option<String>,
    /// Day to summarize (YYYY-MM-DD). Defaults to yesterday.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct CleanupArgs {
    /// Retention window in days (defaults to MEDWATCH_RETENTION_DAYS)
    #[arg(long)]
    pub(crate) days: Option<u32>,
    /// Never delete CRITICAL events
    #[arg(long)]
    pub(crate) keep_critical: bool,
    /// Report what would be deleted without deleting it
    #[arg(long)]
    pub(crate) dry_run: bool,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Only list summaries for this organization
    #[arg(long)]
    pub(crate) org: Option<String>,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_summarize(workspace: &Workspace, args: SummarizeArgs) -> Result<(), AppError> {
    let service = AuditSummaryService::new(workspace.store.clone());
    let now = Utc::now();
    let scope = SummaryScope {
        organization: args.org.map(OrganizationId),
        date: Some(summary_date(args.date, now)),
    };

    let run = service.summarize(&scope, now.date_naive())?;
    workspace.persist()?;

    println!(
        "Audit summaries for {}: {} organization(s), {} created, {} updated, {} without events",
        run.date, run.organizations, run.created, run.updated, run.skipped
    );
    for failure in &run.failed {
        println!("  {} failed: {}", failure.organization_id, failure.reason);
    }
    Ok(())
}

/// Audit days are UTC calendar days, so the default is the UTC day before `now`.
fn summary_date(requested: Option<NaiveDate>, now: DateTime<Utc>) -> NaiveDate {
    requested.unwrap_or_else(|| default_summary_date(now.date_naive()))
}

pub(crate) fn run_cleanup(workspace: &Workspace, args: CleanupArgs) -> Result<(), AppError> {
    let policy = RetentionPolicy {
        retention_days: args
            .days
            .unwrap_or(workspace.config.retention.retention_days),
        keep_critical: args.keep_critical,
        dry_run: args.dry_run,
    };

    let report = RetentionService::new(workspace.store.clone()).run(&policy, Utc::now())?;
    if !policy.dry_run {
        workspace.persist()?;
    }

    if args.json {
        return print_json(&report);
    }
    print!("{}", render_retention(&report));
    Ok(())
}

pub(crate) fn run_report(workspace: &Workspace, args: ReportArgs) -> Result<(), AppError> {
    let service = AuditSummaryService::new(workspace.store.clone());
    let organization = args.org.map(OrganizationId);
    let summaries = service.summaries(organization.as_ref())?;

    if args.json {
        return print_json(&summaries);
    }
    print!("{}", render_summaries(&summaries));
    Ok(())
}
