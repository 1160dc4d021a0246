//! Conversion between `ProfileScore` and the stored `candidate_profile_scores`
//! row. Breakdowns become JSON here and nowhere else.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::score::CandidateProfileScoreRow;
use crate::scoring::aggregator::{ComputationStep, ProfileScore};
use crate::scoring::breakdown::Breakdown;

pub fn to_row(
    score: &ProfileScore,
    computed_at: DateTime<Utc>,
) -> Result<CandidateProfileScoreRow, serde_json::Error> {
    Ok(CandidateProfileScoreRow {
        candidate_id: score.candidate_id,
        total_score: score.total_score,
        education_score: score.education.score,
        technical_score: score.technical.score,
        experience_score: score.experience.score,
        trend_score: score.trend.score,
        education_breakdown: serde_json::to_value(&score.education)?,
        technical_breakdown: serde_json::to_value(&score.technical)?,
        experience_breakdown: serde_json::to_value(&score.experience)?,
        trend_breakdown: serde_json::to_value(&score.trend)?,
        scoring_version: score.scoring_version.clone(),
        computed_at,
        raw_inputs: serde_json::to_value(&score.raw_inputs)?,
        computation_log: serde_json::to_value(&score.computation_log)?,
    })
}

/// Typed read model of a stored score row. `null` scores mean insufficient
/// data, never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreView {
    pub candidate_id: Uuid,
    pub total_score: Option<f64>,
    pub education_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub experience_score: Option<f64>,
    pub trend_score: Option<f64>,
    pub education_breakdown: Breakdown,
    pub technical_breakdown: Breakdown,
    pub experience_breakdown: Breakdown,
    pub trend_breakdown: Breakdown,
    pub scoring_version: String,
    pub computed_at: DateTime<Utc>,
    pub computation_log: Vec<ComputationStep>,
}

impl TryFrom<CandidateProfileScoreRow> for ScoreView {
    type Error = serde_json::Error;

    fn try_from(row: CandidateProfileScoreRow) -> Result<Self, Self::Error> {
        Ok(ScoreView {
            candidate_id: row.candidate_id,
            total_score: row.total_score,
            education_score: row.education_score,
            technical_score: row.technical_score,
            experience_score: row.experience_score,
            trend_score: row.trend_score,
            education_breakdown: serde_json::from_value(row.education_breakdown)?,
            technical_breakdown: serde_json::from_value(row.technical_breakdown)?,
            experience_breakdown: serde_json::from_value(row.experience_breakdown)?,
            trend_breakdown: serde_json::from_value(row.trend_breakdown)?,
            scoring_version: row.scoring_version,
            computed_at: row.computed_at,
            computation_log: serde_json::from_value(row.computation_log)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::CandidateRow;
    use crate::reference::ReferenceData;
    use crate::scoring::aggregator::compute_profile_score;
    use crate::scoring::inputs::CandidateSnapshot;
    use crate::scoring::ScoringConfig;
    use serde_json::json;

    fn sample_score() -> ProfileScore {
        let reference = ReferenceData::bundled().unwrap();
        let snapshot = CandidateSnapshot::empty(CandidateRow {
            id: Uuid::from_u128(42),
            university_id: Some("stanford".to_string()),
            major_id: None,
            major_name: Some("Computer Science".to_string()),
            gpa: Some(3.7),
        });
        compute_profile_score(snapshot, &reference, &ScoringConfig::default())
    }

    #[test]
    fn test_row_round_trips_into_view() {
        let score = sample_score();
        let row = to_row(&score, Utc::now()).unwrap();
        let view = ScoreView::try_from(row).unwrap();
        assert_eq!(view.total_score, score.total_score);
        assert_eq!(view.education_breakdown, score.education);
        assert_eq!(view.technical_score, None);
        assert_eq!(view.computation_log, score.computation_log);
    }

    #[test]
    fn test_absent_dimension_stored_as_breakdown_not_null() {
        let row = to_row(&sample_score(), Utc::now()).unwrap();
        assert!(row.technical_breakdown.is_object());
        assert_eq!(row.technical_breakdown["score"], json!(null));
    }

    #[test]
    fn test_same_score_serializes_identically() {
        let at = Utc::now();
        let a = to_row(&sample_score(), at).unwrap();
        let b = to_row(&sample_score(), at).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_malformed_breakdown_fails_to_decode() {
        let mut row = to_row(&sample_score(), Utc::now()).unwrap();
        row.experience_breakdown = json!({ "legacy": [1, 2, 3] });
        assert!(ScoreView::try_from(row).is_err());
    }
}
