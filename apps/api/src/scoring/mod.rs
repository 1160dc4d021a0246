//! Candidate profile scoring.
//!
//! Pure, deterministic scorers over a `CandidateSnapshot` and the shared
//! `ReferenceData`. Nothing in this module touches storage and nothing here
//! can fail: missing data degrades to documented defaults or an absent
//! dimension.

pub mod aggregator;
pub mod breakdown;
pub mod education;
pub mod experience;
pub mod inputs;
pub mod technical;
pub mod transcript;
pub mod trend;

use serde::{Deserialize, Serialize};

use crate::scoring::technical::VibeAggregation;

/// Tag stored with every score row. Bump whenever a weight, constant or
/// formula in this module changes.
pub const SCORING_VERSION: &str = "v1.0";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub vibe_aggregation: VibeAggregation,
}
