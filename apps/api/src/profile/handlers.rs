use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::profile::record::ScoreView;
use crate::profile::service::{get_candidate_score, recompute_candidate_score, RecomputeTrigger};
use crate::reference::ReferenceSummary;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScoreEventRequest {
    pub event: RecomputeTrigger,
}

#[derive(Debug, Serialize)]
pub struct ScoreEventResponse {
    pub candidate_id: Uuid,
    pub event: RecomputeTrigger,
    pub status: &'static str,
}

/// GET /api/v1/candidates/:id/score
pub async fn handle_get_score(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<ScoreView>, AppError> {
    let view = get_candidate_score(
        state.repository.as_ref(),
        &state.reference,
        &state.scoring,
        candidate_id,
    )
    .await?;
    Ok(Json(view))
}

/// POST /api/v1/candidates/:id/score/recompute
pub async fn handle_recompute(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<ScoreView>, AppError> {
    let view = recompute_candidate_score(
        state.repository.as_ref(),
        &state.reference,
        &state.scoring,
        candidate_id,
        RecomputeTrigger::Manual,
    )
    .await?;
    Ok(Json(view))
}

/// POST /api/v1/candidates/:id/events
///
/// Called by the profile endpoints after a resume parse, GitHub connect,
/// transcript upload or vibe-session analysis. Recomputes in the background.
pub async fn handle_score_event(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Json(request): Json<ScoreEventRequest>,
) -> Result<(StatusCode, Json<ScoreEventResponse>), AppError> {
    let event = request.event;
    if !matches!(
        event,
        RecomputeTrigger::ResumeParsed
            | RecomputeTrigger::GithubConnected
            | RecomputeTrigger::TranscriptUploaded
            | RecomputeTrigger::VibeSessionAnalyzed
    ) {
        return Err(AppError::Validation(format!(
            "'{event}' is not a candidate data event"
        )));
    }

    tokio::spawn(async move {
        if let Err(e) = recompute_candidate_score(
            state.repository.as_ref(),
            &state.reference,
            &state.scoring,
            candidate_id,
            event,
        )
        .await
        {
            error!(%candidate_id, %event, "Background score recompute failed: {e}");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(ScoreEventResponse {
            candidate_id,
            event,
            status: "queued",
        }),
    ))
}

/// GET /api/v1/reference/summary
pub async fn handle_reference_summary(State(state): State<AppState>) -> Json<ReferenceSummary> {
    Json(state.reference.summary())
}
