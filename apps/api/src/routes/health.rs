use axum::Json;
use serde_json::{json, Value};

use crate::scoring::SCORING_VERSION;

/// GET /health
/// Returns a simple status object with service and scoring versions.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "talent-score-api",
        "scoring_version": SCORING_VERSION
    }))
}
