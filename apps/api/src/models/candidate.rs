use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub university_id: Option<String>,
    pub major_id: Option<String>,
    /// Free-text major from the resume parse, used when `major_id` is unset.
    pub major_name: Option<String>,
    /// Self-reported GPA on the university's scale.
    pub gpa: Option<f64>,
}

/// GitHub analysis snapshot. The same shape is stored in `github_analyses`
/// (current) and `github_analysis_history` (superseded snapshots).
/// Snapshots sharing an `analyzed_at` are ordered by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GithubAnalysisRow {
    pub id: Uuid,
    pub originality_score: f64,
    pub activity_score: f64,
    pub depth_score: f64,
    pub collaboration_score: f64,
    pub overall_score: f64,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct VibeCodeSessionRow {
    pub id: Uuid,
    pub direction_score: f64,
    pub design_thinking_score: f64,
    pub iteration_quality_score: f64,
    pub product_sense_score: f64,
    pub ai_leadership_score: f64,
    pub builder_score: Option<f64>,
    pub uploaded_at: DateTime<Utc>,
}

impl VibeCodeSessionRow {
    /// Builder score on the 0–10 scale, falling back to the mean of the five sub-scores.
    pub fn effective_builder_score(&self) -> f64 {
        let score = self.builder_score.unwrap_or_else(|| {
            (self.direction_score
                + self.design_thinking_score
                + self.iteration_quality_score
                + self.product_sense_score
                + self.ai_leadership_score)
                / 5.0
        });
        score.clamp(0.0, 10.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CandidateTranscriptRow {
    pub university_id: Option<String>,
    pub cumulative_gpa: Option<f64>,
    pub major_gpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TranscriptCourseRow {
    pub course_code: String,
    pub term_index: i32,
    pub credits: f64,
    pub grade: String,
    pub rigor_tier: Option<i16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CandidateActivityRow {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub role_tier: i16,
    pub club_id: Option<String>,
    pub duration_months: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CandidateAwardRow {
    pub id: Uuid,
    pub title: String,
    pub prestige_tier: i16,
}
