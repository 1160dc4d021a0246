use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One row per candidate in `candidate_profile_scores`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateProfileScoreRow {
    pub candidate_id: Uuid,
    pub total_score: Option<f64>,
    pub education_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub experience_score: Option<f64>,
    pub trend_score: Option<f64>,
    pub education_breakdown: Value,
    pub technical_breakdown: Value,
    pub experience_breakdown: Value,
    pub trend_breakdown: Value,
    pub scoring_version: String,
    pub computed_at: DateTime<Utc>,
    pub raw_inputs: Value,
    pub computation_log: Value,
}
