//! Education scoring: major rigor, GPA normalized against the major's
//! average, and university tier, optionally blended with the transcript.

use crate::reference::{MajorSource, ReferenceData};
use crate::scoring::breakdown::{Breakdown, Confidence};
use crate::scoring::inputs::CandidateSnapshot;
use crate::scoring::transcript::TranscriptScores;

/// Spread assumed for GPAs within a major when only the mean is known.
pub const ASSUMED_GPA_STD_DEV: f64 = 0.35;
/// GPA factor for a candidate exactly at the major's average (midpoint of 0–10).
pub const AT_MEDIAN_GPA_FACTOR: f64 = 5.0;

const DEFAULT_RIGOR_TIER: u8 = 3;
const DEFAULT_RIGOR_SCORE: f64 = 5.0;
const DEFAULT_UNIVERSITY_TIER: u8 = 3;
const NEUTRAL_GPA_FACTOR: f64 = AT_MEDIAN_GPA_FACTOR;
const MAX_Z: f64 = 2.0;
const TRANSCRIPT_WEIGHT: f64 = 0.2;

struct FactorWeights {
    rigor: f64,
    gpa: f64,
    university: f64,
}

const STEM_WEIGHTS: FactorWeights = FactorWeights {
    rigor: 0.45,
    gpa: 0.35,
    university: 0.20,
};

const NON_STEM_WEIGHTS: FactorWeights = FactorWeights {
    rigor: 0.30,
    gpa: 0.50,
    university: 0.20,
};

/// Maps a GPA onto 0–10.
///
/// With a known major average the GPA becomes a z-score clamped to ±2 and is
/// spread linearly over the range, so the average itself lands on 5.0.
/// Without one the raw GPA is scaled against the school's GPA scale.
pub fn normalize_gpa(gpa: f64, average_gpa: Option<f64>, gpa_scale: f64) -> f64 {
    match average_gpa {
        Some(avg) => {
            let z = ((gpa - avg) / ASSUMED_GPA_STD_DEV).clamp(-MAX_Z, MAX_Z);
            (z + MAX_Z) / (2.0 * MAX_Z) * 10.0
        }
        None => (gpa / gpa_scale * 10.0).clamp(0.0, 10.0),
    }
}

/// Tier 1 → 10.0, tier 5 → 2.0.
fn university_factor(tier: u8) -> f64 {
    f64::from(6 - tier.clamp(1, 5)) / 5.0 * 10.0
}

pub fn score_education(
    snapshot: &CandidateSnapshot,
    transcript: Option<&TranscriptScores>,
    reference: &ReferenceData,
) -> Breakdown {
    let candidate = &snapshot.candidate;
    let transcript_row = snapshot.transcript.as_ref().map(|t| &t.transcript);

    let university_id = candidate
        .university_id
        .as_deref()
        .or_else(|| transcript_row.and_then(|t| t.university_id.as_deref()));

    let (gpa, gpa_source) = match transcript_row {
        Some(t) if t.major_gpa.is_some() => (t.major_gpa, "transcript major GPA"),
        Some(t) if t.cumulative_gpa.is_some() => (t.cumulative_gpa, "transcript cumulative GPA"),
        _ => (candidate.gpa, "self-reported GPA"),
    };

    let has_major = candidate.major_id.is_some()
        || candidate
            .major_name
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty());
    if university_id.is_none() && !has_major && gpa.is_none() && transcript.is_none() {
        return Breakdown::absent("no university, major, GPA or transcript on file");
    }

    let mut breakdown = Breakdown::new();

    let university = university_id.and_then(|id| reference.university(id));
    let (tier, gpa_scale) = match university {
        Some(u) => (u.tier, u.gpa_scale),
        None => {
            breakdown.defaulted(
                "university_tier",
                f64::from(DEFAULT_UNIVERSITY_TIER),
                match university_id {
                    Some(id) => format!("university '{id}' not in reference data"),
                    None => "no university on file".to_string(),
                },
            );
            breakdown.downgrade(Confidence::Medium);
            (DEFAULT_UNIVERSITY_TIER, 4.0)
        }
    };

    let major = reference.resolve_major(
        university_id,
        candidate.major_id.as_deref(),
        candidate.major_name.as_deref(),
    );
    let (rigor_tier, rigor_score, average_gpa, is_stem) = match major {
        Some((m, source)) => {
            if source == MajorSource::Generic {
                breakdown.note(format!("major matched generic entry '{}'", m.name));
                breakdown.downgrade(Confidence::Medium);
            }
            (m.rigor_tier, m.rigor_score, m.average_gpa, m.is_stem)
        }
        None => {
            breakdown.defaulted(
                "major_rigor_tier",
                f64::from(DEFAULT_RIGOR_TIER),
                "major not found in reference data",
            );
            breakdown.downgrade(Confidence::Low);
            (DEFAULT_RIGOR_TIER, DEFAULT_RIGOR_SCORE, None, false)
        }
    };

    let gpa_factor = match gpa {
        Some(gpa) => {
            breakdown.note(format!("GPA source: {gpa_source}"));
            if average_gpa.is_none() {
                breakdown
                    .note("major has no average GPA; raw GPA scaled to the school's GPA scale");
            }
            normalize_gpa(gpa, average_gpa, gpa_scale)
        }
        None => {
            breakdown.defaulted("gpa", NEUTRAL_GPA_FACTOR, "no GPA on file");
            breakdown.downgrade(Confidence::Low);
            NEUTRAL_GPA_FACTOR
        }
    };

    let weights = if is_stem { &STEM_WEIGHTS } else { &NON_STEM_WEIGHTS };
    let scale = if transcript.is_some() {
        1.0 - TRANSCRIPT_WEIGHT
    } else {
        1.0
    };

    // Factors are 0–10; weights × 10 put the sum on the 0–100 scale.
    breakdown.weighted(
        "major_rigor",
        Some(f64::from(rigor_tier)),
        rigor_score,
        weights.rigor * scale * 10.0,
    );
    breakdown.weighted("gpa", gpa, gpa_factor, weights.gpa * scale * 10.0);
    breakdown.weighted(
        "university_tier",
        Some(f64::from(tier)),
        university_factor(tier),
        weights.university * scale * 10.0,
    );
    if let Some(t) = transcript {
        breakdown.weighted(
            "transcript",
            Some(t.total),
            t.total / 10.0,
            TRANSCRIPT_WEIGHT * 10.0,
        );
        breakdown.downgrade(t.breakdown.confidence.max(Confidence::Medium));
    }

    breakdown.score = Some(breakdown.weighted_total().clamp(0.0, 100.0));
    breakdown
}
