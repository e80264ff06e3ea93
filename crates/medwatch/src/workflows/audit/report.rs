use std::fmt::Write;

use super::domain::AuditDailySummary;
use super::retention::RetentionReport;

pub fn render_summaries(summaries: &[AuditDailySummary]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Audit Daily Summaries");
    if summaries.is_empty() {
        let _ = writeln!(output, "No summaries recorded.");
        return output;
    }

    for summary in summaries {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {} on {}", summary.organization_id, summary.date);
        let _ = writeln!(
            output,
            "- events: {} ({} failed)",
            summary.total_events, summary.failed_action_count
        );
        let _ = writeln!(
            output,
            "- logins: {} ok, {} failed",
            summary.login_count, summary.failed_login_count
        );
        let _ = writeln!(
            output,
            "- sales: {}, dispensations: {}, inventory changes: {}",
            summary.sales_count, summary.dispense_count, summary.inventory_change_count
        );
        let _ = writeln!(
            output,
            "- severity: {} critical, {} high",
            summary.critical_count, summary.high_severity_count
        );
        let _ = writeln!(
            output,
            "- active users: {}, distinct IPs: {}",
            summary.active_users, summary.unique_ips
        );
    }

    output
}

pub fn render_retention(report: &RetentionReport) -> String {
    let mut output = String::new();

    let mode = if report.dry_run { "dry run" } else { "applied" };
    let _ = writeln!(
        output,
        "Audit retention ({mode}), cutoff {}",
        report.cutoff.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(output, "Matched events: {}", report.matched_events);
    for (severity, count) in &report.by_severity {
        let _ = writeln!(output, "  {}: {}", severity.label(), count);
    }
    if !report.dry_run {
        let _ = writeln!(output, "Deleted events: {}", report.deleted_events);
        let _ = writeln!(output, "Deleted orphaned details: {}", report.deleted_details);
    }

    output
}
