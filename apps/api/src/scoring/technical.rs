//! Technical scoring: GitHub analysis combined with vibe-coding sessions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::candidate::{GithubAnalysisRow, VibeCodeSessionRow};
use crate::scoring::breakdown::{Breakdown, Confidence};

pub const GITHUB_WEIGHT: f64 = 0.6;
pub const VIBE_WEIGHT: f64 = 0.4;

/// How multiple vibe-coding sessions collapse into one builder score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibeAggregation {
    /// Most recently uploaded session only.
    Latest,
    /// Mean over all sessions. Least sensitive to a single new upload.
    #[default]
    Average,
    /// Highest-scoring session.
    Best,
}

impl VibeAggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            VibeAggregation::Latest => "latest",
            VibeAggregation::Average => "average",
            VibeAggregation::Best => "best",
        }
    }
}

impl fmt::Display for VibeAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VibeAggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latest" => Ok(VibeAggregation::Latest),
            "average" => Ok(VibeAggregation::Average),
            "best" => Ok(VibeAggregation::Best),
            other => Err(format!("unknown vibe session aggregation '{other}'")),
        }
    }
}

/// Collapses sessions into a single 0–10 builder score. `None` without sessions.
pub fn aggregate_vibe_sessions(
    sessions: &[VibeCodeSessionRow],
    mode: VibeAggregation,
) -> Option<f64> {
    if sessions.is_empty() {
        return None;
    }
    match mode {
        VibeAggregation::Latest => sessions
            .iter()
            .max_by_key(|s| (s.uploaded_at, s.id))
            .map(VibeCodeSessionRow::effective_builder_score),
        VibeAggregation::Average => {
            let sum: f64 = sessions.iter().map(|s| s.effective_builder_score()).sum();
            Some(sum / sessions.len() as f64)
        }
        VibeAggregation::Best => sessions
            .iter()
            .map(VibeCodeSessionRow::effective_builder_score)
            .reduce(f64::max),
    }
}

pub fn score_technical(
    github: Option<&GithubAnalysisRow>,
    sessions: &[VibeCodeSessionRow],
    mode: VibeAggregation,
) -> Breakdown {
    let vibe = aggregate_vibe_sessions(sessions, mode);

    let (github_weight, vibe_weight) = match (github.is_some(), vibe.is_some()) {
        (true, true) => (GITHUB_WEIGHT, VIBE_WEIGHT),
        (true, false) => (1.0, 0.0),
        (false, true) => (0.0, 1.0),
        (false, false) => {
            return Breakdown::absent("no GitHub analysis and no vibe-coding sessions");
        }
    };

    let mut breakdown = Breakdown::new();
    let mut score = 0.0;

    if let Some(gh) = github {
        score += breakdown.weighted(
            "github_overall",
            Some(gh.overall_score),
            gh.overall_score.clamp(0.0, 100.0),
            github_weight,
        );
        breakdown.informational("github_originality", gh.originality_score);
        breakdown.informational("github_activity", gh.activity_score);
        breakdown.informational("github_depth", gh.depth_score);
        breakdown.informational("github_collaboration", gh.collaboration_score);
    } else {
        breakdown.note("no GitHub analysis; technical score rests on vibe-coding sessions");
        breakdown.downgrade(Confidence::Medium);
    }

    if let Some(builder) = vibe {
        score += breakdown.weighted("vibe_builder", Some(builder), builder * 10.0, vibe_weight);
        breakdown.informational("vibe_session_count", sessions.len() as f64);
        breakdown.note(format!(
            "vibe sessions aggregated with '{mode}' over {} session(s)",
            sessions.len()
        ));
    } else {
        breakdown.note("no vibe-coding sessions; technical score rests on GitHub analysis");
        breakdown.downgrade(Confidence::Medium);
    }

    breakdown.score = Some(score.clamp(0.0, 100.0));
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn github(overall: f64) -> GithubAnalysisRow {
        GithubAnalysisRow {
            id: Uuid::from_u128(1),
            originality_score: 70.0,
            activity_score: 60.0,
            depth_score: 80.0,
            collaboration_score: 50.0,
            overall_score: overall,
            analyzed_at: Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap(),
        }
    }

    fn session(builder: Option<f64>, days: i64) -> VibeCodeSessionRow {
        VibeCodeSessionRow {
            id: Uuid::new_v4(),
            direction_score: 6.0,
            design_thinking_score: 7.0,
            iteration_quality_score: 8.0,
            product_sense_score: 5.0,
            ai_leadership_score: 9.0,
            builder_score: builder,
            uploaded_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(days),
        }
    }

    #[test]
    fn test_aggregation_modes() {
        let sessions = vec![session(Some(4.0), 0), session(Some(9.0), 1), session(Some(5.0), 2)];
        assert_eq!(aggregate_vibe_sessions(&sessions, VibeAggregation::Latest), Some(5.0));
        assert_eq!(aggregate_vibe_sessions(&sessions, VibeAggregation::Best), Some(9.0));
        assert_eq!(aggregate_vibe_sessions(&sessions, VibeAggregation::Average), Some(6.0));
        assert_eq!(aggregate_vibe_sessions(&[], VibeAggregation::Average), None);
    }

    #[test]
    fn test_missing_builder_score_uses_sub_score_mean() {
        let s = session(None, 0);
        assert!((s.effective_builder_score() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_both_sources_weighted() {
        let sessions = [session(Some(6.0), 0)];
        let b = score_technical(Some(&github(80.0)), &sessions, VibeAggregation::Average);
        // 0.6*80 + 0.4*60
        assert!((b.score.unwrap() - 72.0).abs() < 1e-9);
        assert_eq!(b.confidence, Confidence::High);
    }

    #[test]
    fn test_github_only_carries_full_weight() {
        let b = score_technical(Some(&github(80.0)), &[], VibeAggregation::Average);
        assert!((b.score.unwrap() - 80.0).abs() < 1e-9);
        assert_eq!(b.confidence, Confidence::Medium);
    }

    #[test]
    fn test_vibe_only_carries_full_weight() {
        let b = score_technical(None, &[session(Some(7.5), 0)], VibeAggregation::Latest);
        assert!((b.score.unwrap() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_signal_is_absent_not_zero() {
        let b = score_technical(None, &[], VibeAggregation::Average);
        assert!(b.score.is_none());
    }

    #[test]
    fn test_parse_aggregation() {
        assert_eq!("LATEST".parse::<VibeAggregation>(), Ok(VibeAggregation::Latest));
        assert_eq!(" best ".parse::<VibeAggregation>(), Ok(VibeAggregation::Best));
        assert!("median".parse::<VibeAggregation>().is_err());
        assert_eq!(VibeAggregation::default(), VibeAggregation::Average);
    }
}
