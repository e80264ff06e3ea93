use super::config::ScoringConfig;
use super::rules::{SubScores, SUB_SCORE_CAP};

const BASIS_POINTS: u32 = 10_000;

/// Weighted average of the three sub-scores, rounded half up to the nearest point.
///
/// Weights are normalized to basis points so the default 40/35/25 split is exact. Falls back to
/// the default weights when the configured ones are negative, non-finite, or sum to zero.
pub(crate) fn overall_score(scores: &SubScores, config: &ScoringConfig) -> u8 {
    let [health, exposure, compliance] = weight_basis_points(config);

    let weighted = scores.health as u32 * health
        + scores.exposure as u32 * exposure
        + scores.compliance as u32 * compliance;
    let rounded = (weighted + BASIS_POINTS / 2) / BASIS_POINTS;

    rounded.min(SUB_SCORE_CAP) as u8
}

fn weight_basis_points(config: &ScoringConfig) -> [u32; 3] {
    let weights = [
        config.health_weight,
        config.exposure_weight,
        config.compliance_weight,
    ];
    let valid = weights
        .iter()
        .all(|weight| weight.is_finite() && *weight >= 0.0);
    let total: f32 = weights.iter().sum();

    if !valid || total <= 0.0 {
        return weight_basis_points(&ScoringConfig::default());
    }

    let health = ((weights[0] / total) * BASIS_POINTS as f32).round() as u32;
    let exposure = ((weights[1] / total) * BASIS_POINTS as f32).round() as u32;
    let compliance = BASIS_POINTS.saturating_sub(health + exposure);
    [health, exposure, compliance]
}

pub(crate) fn requires_intervention(overall: u8, config: &ScoringConfig) -> bool {
    overall >= config.intervention_threshold
}
