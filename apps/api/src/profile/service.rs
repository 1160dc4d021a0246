use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::profile::record::{to_row, ScoreView};
use crate::profile::repository::ScoreRepository;
use crate::reference::ReferenceData;
use crate::scoring::aggregator::{compute_profile_score, Dimension};
use crate::scoring::ScoringConfig;

/// Candidate data changes that invalidate the stored score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeTrigger {
    ResumeParsed,
    GithubConnected,
    TranscriptUploaded,
    VibeSessionAnalyzed,
    Manual,
    StoredScoreUnreadable,
    ScoreMissing,
}

impl fmt::Display for RecomputeTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecomputeTrigger::ResumeParsed => "resume_parsed",
            RecomputeTrigger::GithubConnected => "github_connected",
            RecomputeTrigger::TranscriptUploaded => "transcript_uploaded",
            RecomputeTrigger::VibeSessionAnalyzed => "vibe_session_analyzed",
            RecomputeTrigger::Manual => "manual",
            RecomputeTrigger::StoredScoreUnreadable => "stored_score_unreadable",
            RecomputeTrigger::ScoreMissing => "score_missing",
        };
        f.write_str(s)
    }
}

/// Recomputes one candidate's score from a fresh snapshot and overwrites the
/// stored row. Safe to call concurrently for the same candidate: each call
/// reads everything anew and the last upsert wins.
pub async fn recompute_candidate_score(
    repository: &dyn ScoreRepository,
    reference: &ReferenceData,
    config: &ScoringConfig,
    candidate_id: Uuid,
    trigger: RecomputeTrigger,
) -> Result<ScoreView, AppError> {
    let snapshot = repository
        .load_snapshot(candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;

    let score = compute_profile_score(snapshot, reference, config);

    let present: Vec<&str> = Dimension::ALL
        .iter()
        .filter(|d| score.breakdown(**d).is_present())
        .map(|d| d.as_str())
        .collect();
    info!(
        %candidate_id,
        %trigger,
        total_score = ?score.total_score,
        present = ?present,
        "Recomputed profile score ({})",
        score.scoring_version
    );

    let row = to_row(&score, Utc::now())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize score: {e}")))?;
    repository.upsert_score(&row, score.transcript.as_ref()).await?;

    ScoreView::try_from(row)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to decode fresh score: {e}")))
}

/// Returns the stored score, recomputing it when the row is missing or its
/// JSON no longer decodes. Stored rows from older scoring versions are
/// returned as-is, tagged with the version that produced them.
pub async fn get_candidate_score(
    repository: &dyn ScoreRepository,
    reference: &ReferenceData,
    config: &ScoringConfig,
    candidate_id: Uuid,
) -> Result<ScoreView, AppError> {
    let trigger = match repository.fetch_score(candidate_id).await? {
        Some(row) => match ScoreView::try_from(row) {
            Ok(view) => return Ok(view),
            Err(e) => {
                warn!(%candidate_id, "Stored score is unreadable, recomputing: {e}");
                RecomputeTrigger::StoredScoreUnreadable
            }
        },
        None => RecomputeTrigger::ScoreMissing,
    };

    recompute_candidate_score(repository, reference, config, candidate_id, trigger).await
}
