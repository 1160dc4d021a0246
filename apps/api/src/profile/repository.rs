//! Storage seam for the scoring service.
//!
//! `PgScoreRepository` is the production backend. Recompute code only sees
//! `dyn ScoreRepository`, carried in `AppState`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{
    CandidateActivityRow, CandidateAwardRow, CandidateRow, CandidateTranscriptRow,
    GithubAnalysisRow, TranscriptCourseRow, VibeCodeSessionRow,
};
use crate::models::score::CandidateProfileScoreRow;
use crate::scoring::inputs::{CandidateSnapshot, TranscriptRecord};
use crate::scoring::transcript::TranscriptScores;

#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Reads every input the scorers need. `None` if the candidate does not exist.
    async fn load_snapshot(&self, candidate_id: Uuid)
        -> Result<Option<CandidateSnapshot>, AppError>;

    /// Writes the single score row for a candidate (last writer wins) and,
    /// when present, the transcript sub-scores.
    async fn upsert_score(
        &self,
        row: &CandidateProfileScoreRow,
        transcript: Option<&TranscriptScores>,
    ) -> Result<(), AppError>;

    async fn fetch_score(&self, candidate_id: Uuid)
        -> Result<Option<CandidateProfileScoreRow>, AppError>;
}

#[derive(Clone)]
pub struct PgScoreRepository {
    pool: PgPool,
}

impl PgScoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScoreRepository for PgScoreRepository {
    async fn load_snapshot(
        &self,
        candidate_id: Uuid,
    ) -> Result<Option<CandidateSnapshot>, AppError> {
        // One repeatable-read transaction so every dimension sees the same moment.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let candidate = sqlx::query_as::<_, CandidateRow>(
            "SELECT id, university_id, major_id, major_name, gpa FROM candidates WHERE id = $1",
        )
        .bind(candidate_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(candidate) = candidate else {
            tx.rollback().await?;
            return Ok(None);
        };

        let github = sqlx::query_as::<_, GithubAnalysisRow>(
            r#"
            SELECT id, originality_score, activity_score, depth_score, collaboration_score,
                   overall_score, analyzed_at
            FROM github_analyses
            WHERE candidate_id = $1
            "#,
        )
        .bind(candidate_id)
        .fetch_optional(&mut *tx)
        .await?;

        let github_history = sqlx::query_as::<_, GithubAnalysisRow>(
            r#"
            SELECT id, originality_score, activity_score, depth_score, collaboration_score,
                   overall_score, analyzed_at
            FROM github_analysis_history
            WHERE candidate_id = $1
            ORDER BY analyzed_at ASC, id ASC
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&mut *tx)
        .await?;

        let vibe_sessions = sqlx::query_as::<_, VibeCodeSessionRow>(
            r#"
            SELECT id, direction_score, design_thinking_score, iteration_quality_score,
                   product_sense_score, ai_leadership_score, builder_score, uploaded_at
            FROM vibe_code_sessions
            WHERE candidate_id = $1
            ORDER BY uploaded_at ASC, id ASC
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&mut *tx)
        .await?;

        let transcript_row = sqlx::query_as::<_, CandidateTranscriptRow>(
            r#"
            SELECT university_id, cumulative_gpa, major_gpa
            FROM candidate_transcripts
            WHERE candidate_id = $1
            "#,
        )
        .bind(candidate_id)
        .fetch_optional(&mut *tx)
        .await?;

        let transcript = match transcript_row {
            Some(transcript) => {
                let courses = sqlx::query_as::<_, TranscriptCourseRow>(
                    r#"
                    SELECT course_code, term_index, credits, grade, rigor_tier
                    FROM transcript_courses
                    WHERE candidate_id = $1
                    ORDER BY term_index ASC, course_code ASC
                    "#,
                )
                .bind(candidate_id)
                .fetch_all(&mut *tx)
                .await?;
                Some(TranscriptRecord {
                    transcript,
                    courses,
                })
            }
            None => None,
        };

        let activities = sqlx::query_as::<_, CandidateActivityRow>(
            r#"
            SELECT id, title, category, role_tier, club_id, duration_months
            FROM candidate_activities
            WHERE candidate_id = $1
            ORDER BY id
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&mut *tx)
        .await?;

        let awards = sqlx::query_as::<_, CandidateAwardRow>(
            r#"
            SELECT id, title, prestige_tier
            FROM candidate_awards
            WHERE candidate_id = $1
            ORDER BY id
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut snapshot = CandidateSnapshot::empty(candidate);
        snapshot.github = github;
        snapshot.github_history = github_history;
        snapshot.vibe_sessions = vibe_sessions;
        snapshot.transcript = transcript;
        snapshot.activities = activities;
        snapshot.awards = awards;
        Ok(Some(snapshot))
    }

    async fn upsert_score(
        &self,
        row: &CandidateProfileScoreRow,
        transcript: Option<&TranscriptScores>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO candidate_profile_scores
                (candidate_id, total_score, education_score, technical_score,
                 experience_score, trend_score, education_breakdown, technical_breakdown,
                 experience_breakdown, trend_breakdown, scoring_version, computed_at,
                 raw_inputs, computation_log)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (candidate_id) DO UPDATE SET
                total_score = EXCLUDED.total_score,
                education_score = EXCLUDED.education_score,
                technical_score = EXCLUDED.technical_score,
                experience_score = EXCLUDED.experience_score,
                trend_score = EXCLUDED.trend_score,
                education_breakdown = EXCLUDED.education_breakdown,
                technical_breakdown = EXCLUDED.technical_breakdown,
                experience_breakdown = EXCLUDED.experience_breakdown,
                trend_breakdown = EXCLUDED.trend_breakdown,
                scoring_version = EXCLUDED.scoring_version,
                computed_at = EXCLUDED.computed_at,
                raw_inputs = EXCLUDED.raw_inputs,
                computation_log = EXCLUDED.computation_log
            "#,
        )
        .bind(row.candidate_id)
        .bind(row.total_score)
        .bind(row.education_score)
        .bind(row.technical_score)
        .bind(row.experience_score)
        .bind(row.trend_score)
        .bind(&row.education_breakdown)
        .bind(&row.technical_breakdown)
        .bind(&row.experience_breakdown)
        .bind(&row.trend_breakdown)
        .bind(&row.scoring_version)
        .bind(row.computed_at)
        .bind(&row.raw_inputs)
        .bind(&row.computation_log)
        .execute(&mut *tx)
        .await?;

        if let Some(t) = transcript {
            let breakdown = serde_json::to_value(&t.breakdown)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("transcript breakdown: {e}")))?;
            sqlx::query(
                r#"
                UPDATE candidate_transcripts
                SET rigor_score = $2, performance_score = $3, trajectory_score = $4,
                    load_score = $5, score_breakdown = $6
                WHERE candidate_id = $1
                "#,
            )
            .bind(row.candidate_id)
            .bind(t.rigor_score)
            .bind(t.performance_score)
            .bind(t.trajectory_score)
            .bind(t.load_score)
            .bind(breakdown)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn fetch_score(
        &self,
        candidate_id: Uuid,
    ) -> Result<Option<CandidateProfileScoreRow>, AppError> {
        Ok(sqlx::query_as::<_, CandidateProfileScoreRow>(
            r#"
            SELECT candidate_id, total_score, education_score, technical_score,
                   experience_score, trend_score, education_breakdown, technical_breakdown,
                   experience_breakdown, trend_breakdown, scoring_version, computed_at,
                   raw_inputs, computation_log
            FROM candidate_profile_scores
            WHERE candidate_id = $1
            "#,
        )
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}

/// In-memory repository for service and router tests.
#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct InMemoryScoreRepository {
        pub snapshots: Mutex<HashMap<Uuid, CandidateSnapshot>>,
        pub scores: Mutex<HashMap<Uuid, CandidateProfileScoreRow>>,
        pub transcript_scores: Mutex<HashMap<Uuid, TranscriptScores>>,
        pub upserts: Mutex<usize>,
    }

    impl InMemoryScoreRepository {
        pub fn with_snapshot(snapshot: CandidateSnapshot) -> Self {
            let repo = Self::default();
            repo.snapshots
                .lock()
                .unwrap()
                .insert(snapshot.candidate.id, snapshot);
            repo
        }

        pub fn upsert_count(&self) -> usize {
            *self.upserts.lock().unwrap()
        }
    }

    #[async_trait]
    impl ScoreRepository for InMemoryScoreRepository {
        async fn load_snapshot(
            &self,
            candidate_id: Uuid,
        ) -> Result<Option<CandidateSnapshot>, AppError> {
            Ok(self.snapshots.lock().unwrap().get(&candidate_id).cloned())
        }

        async fn upsert_score(
            &self,
            row: &CandidateProfileScoreRow,
            transcript: Option<&TranscriptScores>,
        ) -> Result<(), AppError> {
            self.scores
                .lock()
                .unwrap()
                .insert(row.candidate_id, row.clone());
            if let Some(t) = transcript {
                self.transcript_scores
                    .lock()
                    .unwrap()
                    .insert(row.candidate_id, t.clone());
            }
            *self.upserts.lock().unwrap() += 1;
            Ok(())
        }

        async fn fetch_score(
            &self,
            candidate_id: Uuid,
        ) -> Result<Option<CandidateProfileScoreRow>, AppError> {
            Ok(self.scores.lock().unwrap().get(&candidate_id).cloned())
        }
    }
}
