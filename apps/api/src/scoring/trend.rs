//! GitHub activity trend: how the latest analysis moved against the most
//! recent superseded snapshot.

use crate::models::candidate::GithubAnalysisRow;
use crate::scoring::breakdown::Breakdown;

/// Score points per point of `overall_score` change; flat history scores 50.
pub const TREND_SENSITIVITY: f64 = 2.5;
const FLAT_TREND_SCORE: f64 = 50.0;

pub fn score_trend(
    latest: Option<&GithubAnalysisRow>,
    history: &[GithubAnalysisRow],
) -> Breakdown {
    let Some(latest) = latest else {
        return Breakdown::absent("no GitHub analysis");
    };
    let previous = history
        .iter()
        .filter(|h| h.analyzed_at < latest.analyzed_at)
        .max_by_key(|h| (h.analyzed_at, h.id));
    let Some(previous) = previous else {
        return Breakdown::absent("no earlier GitHub analysis to compare against");
    };

    let mut breakdown = Breakdown::new();
    let delta = latest.overall_score - previous.overall_score;
    let normalized = (FLAT_TREND_SCORE + TREND_SENSITIVITY * delta).clamp(0.0, 100.0);
    let score = breakdown.weighted("overall_score_delta", Some(delta), normalized, 1.0);

    breakdown.informational(
        "originality_delta",
        latest.originality_score - previous.originality_score,
    );
    breakdown.informational("activity_delta", latest.activity_score - previous.activity_score);
    breakdown.informational("depth_delta", latest.depth_score - previous.depth_score);
    breakdown.informational(
        "collaboration_delta",
        latest.collaboration_score - previous.collaboration_score,
    );
    breakdown.note(format!(
        "compared analysis of {} against {}",
        latest.analyzed_at.format("%Y-%m-%d"),
        previous.analyzed_at.format("%Y-%m-%d")
    ));

    breakdown.score = Some(score);
    breakdown
}
