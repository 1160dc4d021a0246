use std::sync::Arc;

use crate::profile::repository::ScoreRepository;
use crate::reference::ReferenceData;
use crate::scoring::ScoringConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend for candidate snapshots and score rows. Default: `PgScoreRepository`.
    pub repository: Arc<dyn ScoreRepository>,
    /// Immutable lookup tables, loaded once at startup.
    pub reference: Arc<ReferenceData>,
    pub scoring: ScoringConfig,
}
