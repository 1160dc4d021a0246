pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::profile::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Candidate profile score
        .route(
            "/api/v1/candidates/:id/score",
            get(handlers::handle_get_score),
        )
        .route(
            "/api/v1/candidates/:id/score/recompute",
            post(handlers::handle_recompute),
        )
        .route(
            "/api/v1/candidates/:id/events",
            post(handlers::handle_score_event),
        )
        // Reference data
        .route(
            "/api/v1/reference/summary",
            get(handlers::handle_reference_summary),
        )
        .with_state(state)
}
