use crate::infra::{print_json, today_or, Workspace};
use chrono::NaiveDate;
use clap::{ArgGroup, Args};
use medwatch::error::AppError;
use medwatch::workflows::risk::{
    BatchOutcome, ProfileUpdate, RiskProfileService, UnitId, WorkerId,
};

const TOP_FACTORS: usize = 3;

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["worker", "unit", "missing", "all"])
))]
pub(crate) struct ComputeArgs {
    /// Score a single worker by id
    #[arg(long)]
    pub(crate) worker: Option<String>,
    /// Score every worker in an organization unit
    #[arg(long)]
    pub(crate) unit: Option<String>,
    /// Score workers that have no risk profile yet
    #[arg(long)]
    pub(crate) missing: bool,
    /// Rescore every worker
    #[arg(long)]
    pub(crate) all: bool,
    /// Assessment date (YYYY-MM-DD). Defaults to today (UTC).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct RiskReportArgs {
    /// Maximum number of flagged workers to list
    #[arg(long, default_value_t = 20)]
    pub(crate) limit: usize,
    /// Report date (YYYY-MM-DD). Defaults to today (UTC).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_compute(workspace: &Workspace, args: ComputeArgs) -> Result<(), AppError> {
    let ComputeArgs {
        worker,
        unit,
        missing,
        all: _,
        today,
    } = args;
    let today = today_or(today);
    let service = RiskProfileService::new(workspace.store.clone(), workspace.config.scoring.clone());

    if let Some(worker) = worker {
        let update = service.compute_for_worker(&WorkerId(worker), today)?;
        workspace.persist()?;
        print_update(&update);
        return Ok(());
    }

    let (scope, outcome) = if let Some(unit) = unit {
        let label = format!("unit {unit}");
        (label, service.compute_for_unit(&UnitId(unit), today)?)
    } else if missing {
        ("workers without a profile".to_string(), service.compute_missing(today)?)
    } else {
        // clap guarantees `--all` here
        ("all workers".to_string(), service.recompute_all(today)?)
    };

    workspace.persist()?;
    print_outcome(&scope, &outcome);
    Ok(())
}

pub(crate) fn run_risk_report(workspace: &Workspace, args: RiskReportArgs) -> Result<(), AppError> {
    let service = RiskProfileService::new(workspace.store.clone(), workspace.config.scoring.clone());
    let report = service.report(today_or(args.today), args.limit)?;

    if args.json {
        return print_json(&report);
    }
    print!("{}", report.render());
    Ok(())
}

fn print_update(update: &ProfileUpdate) {
    let profile = &update.profile;
    let action = if update.created { "created" } else { "updated" };
    println!(
        "Risk profile {action} for {}: overall {} ({}), health {}, exposure {}, compliance {}",
        profile.worker_id,
        profile.overall_risk_score,
        profile.risk_level.label(),
        profile.health_risk_score,
        profile.exposure_risk_score,
        profile.compliance_risk_score
    );
    if profile.intervention_required {
        println!("Intervention required.");
    }
    for component in update.assessment.top_components(TOP_FACTORS) {
        println!(
            "  {} +{} ({})",
            component.factor.label(),
            component.points,
            component.notes
        );
    }
}

fn print_outcome(scope: &str, outcome: &BatchOutcome) {
    println!(
        "Scored {scope}: {} created, {} updated, {} requiring intervention",
        outcome.created, outcome.updated, outcome.intervention_required
    );
    if !outcome.skipped.is_empty() {
        println!("Skipped {} worker(s):", outcome.skipped.len());
        for skipped in &outcome.skipped {
            println!("  {}: {}", skipped.worker_id, skipped.reason);
        }
    }
}
