//! Combines the four dimension breakdowns into one profile score.
//!
//! Canonical weights are renormalized proportionally over the dimensions that
//! actually have data: a missing dimension is excluded, never scored as zero.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reference::ReferenceData;
use crate::scoring::breakdown::Breakdown;
use crate::scoring::education::score_education;
use crate::scoring::experience::score_experience;
use crate::scoring::inputs::CandidateSnapshot;
use crate::scoring::technical::{score_technical, VibeAggregation};
use crate::scoring::transcript::{score_transcript, TranscriptScores};
use crate::scoring::trend::score_trend;
use crate::scoring::{ScoringConfig, SCORING_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Education,
    Technical,
    Experience,
    Trend,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Education,
        Dimension::Technical,
        Dimension::Experience,
        Dimension::Trend,
    ];

    pub fn canonical_weight(&self) -> f64 {
        match self {
            Dimension::Education => 0.35,
            Dimension::Technical => 0.35,
            Dimension::Experience => 0.15,
            Dimension::Trend => 0.15,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Education => "education",
            Dimension::Technical => "technical",
            Dimension::Experience => "experience",
            Dimension::Trend => "trend",
        }
    }
}

/// Redistributes canonical weights over `present` so they sum to 1.0.
/// Dimensions keep their relative proportions.
pub fn renormalize(present: &[Dimension]) -> Vec<(Dimension, f64)> {
    let total: f64 = present.iter().map(Dimension::canonical_weight).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    present
        .iter()
        .map(|d| (*d, d.canonical_weight() / total))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationStep {
    pub step: u32,
    pub stage: String,
    pub message: String,
}

#[derive(Debug, Default)]
struct ComputationLog(Vec<ComputationStep>);

impl ComputationLog {
    fn record(&mut self, stage: &str, message: impl Into<String>) {
        let step = self.0.len() as u32 + 1;
        self.0.push(ComputationStep {
            step,
            stage: stage.to_string(),
            message: message.into(),
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub total_score: Option<f64>,
    pub weights_used: Vec<(Dimension, f64)>,
}

/// Weighted sum over present dimensions, clamped to [0, 100].
pub fn aggregate(scores: &[(Dimension, Option<f64>)]) -> Aggregate {
    let present: Vec<Dimension> = scores
        .iter()
        .filter(|(_, s)| s.is_some())
        .map(|(d, _)| *d)
        .collect();
    let weights_used = renormalize(&present);

    let total_score = (!weights_used.is_empty()).then(|| {
        weights_used
            .iter()
            .filter_map(|(d, w)| {
                scores
                    .iter()
                    .find(|(sd, _)| sd == d)
                    .and_then(|(_, s)| *s)
                    .map(|s| s * w)
            })
            .sum::<f64>()
            .clamp(0.0, 100.0)
    });

    Aggregate {
        total_score,
        weights_used,
    }
}

/// Snapshot of what a computation read, persisted as `raw_inputs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    pub reference_data_version: String,
    pub vibe_aggregation: VibeAggregation,
    pub snapshot: CandidateSnapshot,
}

/// Output of one recomputation. Carries no timestamp, so two computations
/// over the same inputs compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileScore {
    pub candidate_id: Uuid,
    pub total_score: Option<f64>,
    pub education: Breakdown,
    pub technical: Breakdown,
    pub experience: Breakdown,
    pub trend: Breakdown,
    pub transcript: Option<TranscriptScores>,
    pub scoring_version: String,
    pub raw_inputs: RawInputs,
    pub computation_log: Vec<ComputationStep>,
}

impl ProfileScore {
    pub fn breakdown(&self, dimension: Dimension) -> &Breakdown {
        match dimension {
            Dimension::Education => &self.education,
            Dimension::Technical => &self.technical,
            Dimension::Experience => &self.experience,
            Dimension::Trend => &self.trend,
        }
    }
}

/// Runs every scorer over a fresh snapshot and aggregates the result.
pub fn compute_profile_score(
    snapshot: CandidateSnapshot,
    reference: &ReferenceData,
    config: &ScoringConfig,
) -> ProfileScore {
    let snapshot = snapshot.into_canonical();
    let mut log = ComputationLog::default();

    log.record(
        "inputs",
        format!(
            "github={}, github_history={}, vibe_sessions={}, transcript={}, \
             activities={}, awards={}; reference_data={}",
            if snapshot.github.is_some() { "present" } else { "absent" },
            snapshot.github_history.len(),
            snapshot.vibe_sessions.len(),
            if snapshot.transcript.is_some() { "present" } else { "absent" },
            snapshot.activities.len(),
            snapshot.awards.len(),
            reference.version(),
        ),
    );

    let transcript = snapshot.transcript.as_ref().map(|record| {
        score_transcript(record, snapshot.candidate.university_id.as_deref(), reference)
    });
    match &transcript {
        Some(t) => log.record(
            "transcript",
            format!(
                "rigor={:.4}, performance={:.4}, trajectory={:.4}, load={:.4}, total={:.4}",
                t.rigor_score, t.performance_score, t.trajectory_score, t.load_score, t.total
            ),
        ),
        None => log.record("transcript", "absent"),
    }

    let education = score_education(&snapshot, transcript.as_ref(), reference);
    let technical = score_technical(
        snapshot.github.as_ref(),
        &snapshot.vibe_sessions,
        config.vibe_aggregation,
    );
    let experience = score_experience(&snapshot.activities, &snapshot.awards, reference);
    let trend = score_trend(snapshot.github.as_ref(), &snapshot.github_history);

    let scores = [
        (Dimension::Education, education.score),
        (Dimension::Technical, technical.score),
        (Dimension::Experience, experience.score),
        (Dimension::Trend, trend.score),
    ];
    for (dimension, breakdown) in [
        (Dimension::Education, &education),
        (Dimension::Technical, &technical),
        (Dimension::Experience, &experience),
        (Dimension::Trend, &trend),
    ] {
        let message = match breakdown.score {
            Some(score) => format!(
                "present score={score:.4} confidence={:?}",
                breakdown.confidence
            )
            .to_lowercase(),
            None => format!(
                "absent ({})",
                breakdown.notes.first().map(String::as_str).unwrap_or("no data")
            ),
        };
        log.record(dimension.as_str(), message);
    }

    let result = aggregate(&scores);
    if result.weights_used.is_empty() {
        log.record("weights", "no dimension present; nothing to weight");
    } else {
        let weights = result
            .weights_used
            .iter()
            .map(|(d, w)| format!("{}={w:.4}", d.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        log.record("weights", format!("renormalized: {weights}"));
    }
    match result.total_score {
        Some(total) => log.record("total", format!("total_score={total:.4}")),
        None => log.record("total", "total_score=null (insufficient data)"),
    }

    ProfileScore {
        candidate_id: snapshot.candidate.id,
        total_score: result.total_score,
        education,
        technical,
        experience,
        trend,
        transcript,
        scoring_version: SCORING_VERSION.to_string(),
        raw_inputs: RawInputs {
            reference_data_version: reference.version().to_string(),
            vibe_aggregation: config.vibe_aggregation,
            snapshot,
        },
        computation_log: log.0,
    }
}
