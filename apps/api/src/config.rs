use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::scoring::technical::VibeAggregation;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// JSON reference-data file. When unset, lookup tables are read from Postgres.
    pub reference_data_path: Option<PathBuf>,
    pub vibe_aggregation: VibeAggregation,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            reference_data_path: std::env::var("REFERENCE_DATA_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            vibe_aggregation: match std::env::var("VIBE_SESSION_AGGREGATION") {
                Ok(value) => value
                    .parse::<VibeAggregation>()
                    .map_err(anyhow::Error::msg)
                    .context("VIBE_SESSION_AGGREGATION must be one of: latest, average, best")?,
                Err(_) => VibeAggregation::default(),
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
