//! Transcript scoring: rigor, performance, trajectory and load sub-scores
//! computed from course rows and the school's grade mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::reference::ReferenceData;
use crate::scoring::breakdown::{Breakdown, Confidence};
use crate::scoring::inputs::TranscriptRecord;

const RIGOR_WEIGHT: f64 = 0.35;
const PERFORMANCE_WEIGHT: f64 = 0.35;
const TRAJECTORY_WEIGHT: f64 = 0.15;
const LOAD_WEIGHT: f64 = 0.15;

const DEFAULT_COURSE_RIGOR_TIER: f64 = 3.0;
const FULL_LOAD_CREDITS: f64 = 15.0;
const NEUTRAL_SUB_SCORE: f64 = 50.0;

/// Sub-scores written back to `candidate_transcripts`, all 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptScores {
    pub rigor_score: f64,
    pub performance_score: f64,
    pub trajectory_score: f64,
    pub load_score: f64,
    pub total: f64,
    pub breakdown: Breakdown,
}

struct GradedCourse {
    term_index: i32,
    credits: f64,
    points: f64,
}

pub fn score_transcript(
    record: &TranscriptRecord,
    fallback_university_id: Option<&str>,
    reference: &ReferenceData,
) -> TranscriptScores {
    let mut breakdown = Breakdown::new();

    let university = record
        .transcript
        .university_id
        .as_deref()
        .or(fallback_university_id)
        .and_then(|id| reference.university(id));
    let gpa_scale = university.map(|u| u.gpa_scale).unwrap_or(4.0);
    if university.is_none() {
        breakdown.defaulted("gpa_scale", gpa_scale, "university not in reference data");
        breakdown.downgrade(Confidence::Medium);
    }

    let courses = &record.courses;
    if courses.is_empty() {
        return score_without_courses(record, gpa_scale, breakdown);
    }

    let mut graded = Vec::with_capacity(courses.len());
    let mut ungraded = 0usize;
    for course in courses {
        match reference.grade_points(university, &course.grade) {
            Some(points) => graded.push(GradedCourse {
                term_index: course.term_index,
                credits: course.credits.max(0.0),
                points,
            }),
            None => ungraded += 1,
        }
    }
    if ungraded > 0 {
        breakdown.note(format!(
            "{ungraded} course(s) without a mapped letter grade were excluded from performance"
        ));
    }

    // Rigor: credit-weighted course tier over every course taken.
    let total_credits: f64 = courses.iter().map(|c| c.credits.max(0.0)).sum();
    let rigor_score = if total_credits > 0.0 {
        let weighted_tier: f64 = courses
            .iter()
            .map(|c| {
                let tier = c
                    .rigor_tier
                    .map(|t| f64::from(t.clamp(1, 5)))
                    .unwrap_or(DEFAULT_COURSE_RIGOR_TIER);
                tier * c.credits.max(0.0)
            })
            .sum();
        ((weighted_tier / total_credits - 1.0) / 4.0 * 100.0).clamp(0.0, 100.0)
    } else {
        breakdown.defaulted("rigor", NEUTRAL_SUB_SCORE, "courses carry no credits");
        NEUTRAL_SUB_SCORE
    };

    let performance_score = match credit_weighted_gpa(graded.iter()) {
        Some(gpa) => (gpa / gpa_scale * 100.0).clamp(0.0, 100.0),
        None => {
            breakdown.defaulted("performance", NEUTRAL_SUB_SCORE, "no graded courses");
            breakdown.downgrade(Confidence::Low);
            NEUTRAL_SUB_SCORE
        }
    };

    let trajectory_score = trajectory(&graded, gpa_scale, &mut breakdown);

    let terms = courses
        .iter()
        .map(|c| c.term_index)
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    let credits_per_term = total_credits / terms.max(1) as f64;
    let load_score = (credits_per_term / FULL_LOAD_CREDITS).min(1.0) * 100.0;

    let total = breakdown.weighted("rigor", None, rigor_score, RIGOR_WEIGHT)
        + breakdown.weighted("performance", None, performance_score, PERFORMANCE_WEIGHT)
        + breakdown.weighted("trajectory", None, trajectory_score, TRAJECTORY_WEIGHT)
        + breakdown.weighted("load", Some(credits_per_term), load_score, LOAD_WEIGHT);
    let total = total.clamp(0.0, 100.0);
    breakdown.score = Some(total);

    TranscriptScores {
        rigor_score,
        performance_score,
        trajectory_score,
        load_score,
        total,
        breakdown,
    }
}

fn score_without_courses(
    record: &TranscriptRecord,
    gpa_scale: f64,
    mut breakdown: Breakdown,
) -> TranscriptScores {
    breakdown.downgrade(Confidence::Low);
    breakdown.note("transcript has no course rows; only cumulative GPA is scored");

    let gpa = record.transcript.cumulative_gpa.or(record.transcript.major_gpa);
    let performance_score = match gpa {
        Some(gpa) => (gpa / gpa_scale * 100.0).clamp(0.0, 100.0),
        None => {
            breakdown.defaulted("performance", NEUTRAL_SUB_SCORE, "transcript has no GPA");
            NEUTRAL_SUB_SCORE
        }
    };
    for factor in ["rigor", "trajectory", "load"] {
        breakdown.defaulted(factor, NEUTRAL_SUB_SCORE, "no course rows");
    }

    let total = breakdown.weighted("rigor", None, NEUTRAL_SUB_SCORE, RIGOR_WEIGHT)
        + breakdown.weighted("performance", gpa, performance_score, PERFORMANCE_WEIGHT)
        + breakdown.weighted("trajectory", None, NEUTRAL_SUB_SCORE, TRAJECTORY_WEIGHT)
        + breakdown.weighted("load", None, NEUTRAL_SUB_SCORE, LOAD_WEIGHT);
    breakdown.score = Some(total);

    TranscriptScores {
        rigor_score: NEUTRAL_SUB_SCORE,
        performance_score,
        trajectory_score: NEUTRAL_SUB_SCORE,
        load_score: NEUTRAL_SUB_SCORE,
        total,
        breakdown,
    }
}

fn credit_weighted_gpa<'a>(courses: impl Iterator<Item = &'a GradedCourse>) -> Option<f64> {
    let (points, credits) = courses.fold((0.0, 0.0), |(p, c), course| {
        (p + course.points * course.credits, c + course.credits)
    });
    (credits > 0.0).then(|| points / credits)
}

/// Later-half GPA minus earlier-half GPA, expressed on a 4.0 scale and mapped
/// so that a flat record scores 50.
fn trajectory(graded: &[GradedCourse], gpa_scale: f64, breakdown: &mut Breakdown) -> f64 {
    let mut by_term: BTreeMap<i32, Vec<&GradedCourse>> = BTreeMap::new();
    for course in graded {
        by_term.entry(course.term_index).or_default().push(course);
    }
    if by_term.len() < 2 {
        breakdown.defaulted("trajectory", NEUTRAL_SUB_SCORE, "fewer than two graded terms");
        return NEUTRAL_SUB_SCORE;
    }

    let terms: Vec<_> = by_term.values().collect();
    let split = terms.len() / 2;
    let early = credit_weighted_gpa(terms[..split].iter().flat_map(|t| t.iter().copied()));
    let late = credit_weighted_gpa(terms[split..].iter().flat_map(|t| t.iter().copied()));

    match (early, late) {
        (Some(early), Some(late)) => {
            let delta = (late - early) * 4.0 / gpa_scale;
            breakdown.informational("gpa_delta_late_vs_early", delta);
            (NEUTRAL_SUB_SCORE + 50.0 * delta).clamp(0.0, 100.0)
        }
        _ => {
            breakdown.defaulted("trajectory", NEUTRAL_SUB_SCORE, "graded terms carry no credits");
            NEUTRAL_SUB_SCORE
        }
    }
}
