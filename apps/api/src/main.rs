mod config;
mod db;
mod errors;
mod models;
mod profile;
mod reference;
mod routes;
mod scoring;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::profile::repository::PgScoreRepository;
use crate::reference::seed::load_reference_data;
use crate::routes::build_router;
use crate::scoring::{ScoringConfig, SCORING_VERSION};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting talent score API v{} (scoring {})",
        env!("CARGO_PKG_VERSION"),
        SCORING_VERSION
    );

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Reference data is immutable for the life of the process
    let reference = load_reference_data(config.reference_data_path.as_deref(), &db).await?;
    let summary = reference.summary();
    info!(
        "Reference data {}: {} universities, {} majors, {} clubs, {} grade mappings",
        summary.version,
        summary.universities,
        summary.majors,
        summary.clubs,
        summary.grade_mappings
    );

    let scoring = ScoringConfig {
        vibe_aggregation: config.vibe_aggregation,
    };
    info!("Vibe session aggregation: {}", scoring.vibe_aggregation);

    let state = AppState {
        repository: Arc::new(PgScoreRepository::new(db)),
        reference: Arc::new(reference),
        scoring,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
