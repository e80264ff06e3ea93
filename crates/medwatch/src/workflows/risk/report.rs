use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{RiskLevel, RiskProfile, WorkerId};

#[derive(Debug, Clone, Serialize)]
pub struct LevelCount {
    pub level: RiskLevel,
    pub level_label: &'static str,
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlaggedWorker {
    pub worker_id: WorkerId,
    pub full_name: String,
    pub overall_risk_score: u8,
    pub health_risk_score: u8,
    pub exposure_risk_score: u8,
    pub compliance_risk_score: u8,
    pub risk_level: RiskLevel,
    pub last_assessed: Option<NaiveDate>,
}

/// Snapshot of stored risk profiles for occupational-health reviews.
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub as_of: NaiveDate,
    pub total_profiles: usize,
    pub intervention_required: usize,
    pub levels: Vec<LevelCount>,
    pub flagged: Vec<FlaggedWorker>,
}

impl RiskReport {
    pub fn build(
        as_of: NaiveDate,
        profiles: &[RiskProfile],
        names: &HashMap<WorkerId, String>,
        limit: usize,
    ) -> Self {
        let mut by_level: BTreeMap<RiskLevel, usize> = BTreeMap::new();
        for profile in profiles {
            *by_level.entry(profile.risk_level).or_insert(0) += 1;
        }

        let levels = RiskLevel::ordered()
            .into_iter()
            .map(|level| LevelCount {
                level,
                level_label: level.label(),
                workers: by_level.get(&level).copied().unwrap_or(0),
            })
            .collect();

        let mut flagged: Vec<FlaggedWorker> = profiles
            .iter()
            .filter(|profile| profile.intervention_required)
            .map(|profile| FlaggedWorker {
                worker_id: profile.worker_id.clone(),
                full_name: names
                    .get(&profile.worker_id)
                    .cloned()
                    .unwrap_or_else(|| profile.worker_id.to_string()),
                overall_risk_score: profile.overall_risk_score,
                health_risk_score: profile.health_risk_score,
                exposure_risk_score: profile.exposure_risk_score,
                compliance_risk_score: profile.compliance_risk_score,
                risk_level: profile.risk_level,
                last_assessed: profile.last_assessed,
            })
            .collect();
        let intervention_required = flagged.len();

        flagged.sort_by(|a, b| {
            b.overall_risk_score
                .cmp(&a.overall_risk_score)
                .then_with(|| a.worker_id.cmp(&b.worker_id))
        });
        flagged.truncate(limit);

        Self {
            as_of,
            total_profiles: profiles.len(),
            intervention_required,
            levels,
            flagged,
        }
    }

    pub fn render(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "# Occupational Health Risk Report");
        let _ = writeln!(
            output,
            "As of {} ({} profiles, {} requiring intervention)",
            self.as_of, self.total_profiles, self.intervention_required
        );
        let _ = writeln!(output);
        let _ = writeln!(output, "## Risk Levels");
        for entry in &self.levels {
            let _ = writeln!(output, "- {}: {}", entry.level_label, entry.workers);
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "## Intervention Required");
        if self.flagged.is_empty() {
            let _ = writeln!(output, "No workers currently require intervention.");
        } else {
            for worker in &self.flagged {
                let assessed = worker
                    .last_assessed
                    .map(|date| date.to_string())
                    .unwrap_or_else(|| "never".to_string());
                let _ = writeln!(
                    output,
                    "- {} ({}) overall {} [health {}, exposure {}, compliance {}] assessed {}",
                    worker.full_name,
                    worker.worker_id,
                    worker.overall_risk_score,
                    worker.health_risk_score,
                    worker.exposure_risk_score,
                    worker.compliance_risk_score,
                    assessed
                );
            }
        }

        output
    }
}
