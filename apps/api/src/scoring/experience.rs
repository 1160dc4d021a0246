//! Experience scoring from extracurricular activities and awards.
//!
//! Points are summed per category and each category is capped at 40% of the
//! ceiling, so a pile of memberships in one kind of activity cannot carry the
//! whole dimension.

use std::collections::BTreeMap;

use crate::models::candidate::{CandidateActivityRow, CandidateAwardRow};
use crate::reference::ReferenceData;
use crate::scoring::breakdown::{Breakdown, Confidence, Contribution};

pub const EXPERIENCE_CEILING: f64 = 100.0;
pub const CATEGORY_CAP: f64 = 0.4 * EXPERIENCE_CEILING;

const ROLE_MULTIPLIERS: [f64; 5] = [1.0, 1.25, 1.5, 1.75, 2.0];
const LEADERSHIP_ROLE_TIER: i16 = 3;
const DEFAULT_PRESTIGE_SCORE: f64 = 3.0;
const FULL_DURATION_MONTHS: f64 = 24.0;
const MIN_DURATION_FACTOR: f64 = 0.25;
const UNKNOWN_DURATION_FACTOR: f64 = 0.5;
const AWARD_POINTS_PER_TIER: f64 = 4.0;
const AWARDS_CATEGORY: &str = "awards";

pub fn role_multiplier(role_tier: i16) -> f64 {
    ROLE_MULTIPLIERS[(role_tier.clamp(1, 5) - 1) as usize]
}

pub fn duration_factor(months: Option<i32>) -> f64 {
    match months {
        Some(m) => (f64::from(m.max(0)) / FULL_DURATION_MONTHS).clamp(MIN_DURATION_FACTOR, 1.0),
        None => UNKNOWN_DURATION_FACTOR,
    }
}

fn category_key(category: &str) -> String {
    let key = category.trim().to_lowercase();
    if key.is_empty() {
        "other".to_string()
    } else {
        key
    }
}

pub fn score_experience(
    activities: &[CandidateActivityRow],
    awards: &[CandidateAwardRow],
    reference: &ReferenceData,
) -> Breakdown {
    if activities.is_empty() && awards.is_empty() {
        return Breakdown::absent("no activities or awards on file");
    }

    let mut breakdown = Breakdown::new();
    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();

    for activity in activities {
        let club = activity.club_id.as_deref().and_then(|id| reference.club(id));
        let (prestige_score, leadership_bonus) = match club {
            Some(c) => (c.prestige_score, c.leadership_bonus),
            None => {
                match activity.club_id.as_deref() {
                    Some(id) => {
                        breakdown.note(format!("club '{id}' not in reference data"));
                        breakdown.downgrade(Confidence::Low);
                    }
                    None => breakdown.downgrade(Confidence::Medium),
                }
                (DEFAULT_PRESTIGE_SCORE, 1.0)
            }
        };
        let leadership_bonus = if activity.role_tier >= LEADERSHIP_ROLE_TIER {
            leadership_bonus
        } else {
            1.0
        };

        let role_multiplier = role_multiplier(activity.role_tier);
        let duration_factor = duration_factor(activity.duration_months);
        let points = role_multiplier * prestige_score * duration_factor * leadership_bonus;

        let category = category_key(&activity.category);
        *by_category.entry(category.clone()).or_default() += points;
        breakdown.push(Contribution::Activity {
            factor: activity.title.clone(),
            category,
            role_multiplier,
            prestige_score,
            duration_factor,
            leadership_bonus,
            points,
        });
    }

    for award in awards {
        let prestige_tier = award.prestige_tier.clamp(1, 5) as u8;
        let points = AWARD_POINTS_PER_TIER * f64::from(prestige_tier);
        *by_category.entry(AWARDS_CATEGORY.to_string()).or_default() += points;
        breakdown.push(Contribution::Award {
            factor: award.title.clone(),
            prestige_tier,
            points,
        });
    }

    let mut total = 0.0;
    for (category, uncapped) in by_category {
        let contribution = uncapped.min(CATEGORY_CAP);
        if uncapped > CATEGORY_CAP {
            breakdown.note(format!(
                "category '{category}' capped at {CATEGORY_CAP:.0} (had {uncapped:.2})"
            ));
        }
        total += contribution;
        breakdown.push(Contribution::Capped {
            factor: category,
            uncapped,
            cap: CATEGORY_CAP,
            contribution,
        });
    }

    breakdown.score = Some(total.clamp(0.0, EXPERIENCE_CEILING));
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn activity(
        category: &str,
        role_tier: i16,
        club: Option<&str>,
        months: Option<i32>,
    ) -> CandidateActivityRow {
        CandidateActivityRow {
            id: Uuid::new_v4(),
            title: format!("{category} role {role_tier}"),
            category: category.to_string(),
            role_tier,
            club_id: club.map(String::from),
            duration_months: months,
        }
    }

    fn award(tier: i16) -> CandidateAwardRow {
        CandidateAwardRow {
            id: Uuid::new_v4(),
            title: format!("Tier {tier} award"),
            prestige_tier: tier,
        }
    }

    #[test]
    fn test_duration_factor_bounds() {
        assert_eq!(duration_factor(Some(0)), MIN_DURATION_FACTOR);
        assert_eq!(duration_factor(Some(12)), 0.5);
        assert_eq!(duration_factor(Some(48)), 1.0);
        assert_eq!(duration_factor(None), UNKNOWN_DURATION_FACTOR);
    }

    #[test]
    fn test_role_multiplier_clamps_tier() {
        assert_eq!(role_multiplier(0), 1.0);
        assert_eq!(role_multiplier(3), 1.5);
        assert_eq!(role_multiplier(9), 2.0);
    }

    #[test]
    fn test_leadership_bonus_applies_to_leaders_only() {
        let reference = ReferenceData::bundled().unwrap();
        // Cal Hacks: prestige 9.0, leadership bonus 1.5
        let member = activity("hackathon", 1, Some("berkeley-calhacks"), Some(24));
        let member = score_experience(&[member], &[], &reference);
        assert!((member.score.unwrap() - 9.0).abs() < 1e-9);

        let lead = activity("hackathon", 3, Some("berkeley-calhacks"), Some(12));
        let lead = score_experience(&[lead], &[], &reference);
        // 1.5 * 9.0 * 0.5 * 1.5
        assert!((lead.score.unwrap() - 10.125).abs() < 1e-9);
    }

    #[test]
    fn test_ten_low_tier_activities_capped_per_category() {
        let reference = ReferenceData::bundled().unwrap();
        let activities: Vec<_> = (0..10)
            .map(|_| activity("club", 1, Some("generic-robotics"), Some(24)))
            .collect();
        let b = score_experience(&activities, &[], &reference);
        // uncapped: 10 × 1.0 × 6.0 × 1.0 = 60
        assert_eq!(b.score.unwrap(), CATEGORY_CAP);
        assert!(b.contributions.iter().any(|c| matches!(
            c,
            Contribution::Capped { uncapped, contribution, .. }
                if (*uncapped - 60.0).abs() < 1e-9 && *contribution == CATEGORY_CAP
        )));
    }

    #[test]
    fn test_categories_sum_and_ceiling() {
        let reference = ReferenceData::bundled().unwrap();
        let mut activities = Vec::new();
        for category in ["club", "research", "athletics"] {
            for _ in 0..5 {
                activities.push(activity(category, 5, Some("berkeley-calhacks"), Some(36)));
            }
        }
        let b = score_experience(&activities, &[award(5), award(5), award(5)], &reference);
        // four categories each at the 40 cap → clamped to the ceiling
        assert_eq!(b.score.unwrap(), EXPERIENCE_CEILING);
    }

    #[test]
    fn test_unknown_club_uses_default_prestige() {
        let reference = ReferenceData::bundled().unwrap();
        let unknown = activity("club", 1, Some("no-such-club"), Some(24));
        let b = score_experience(&[unknown], &[], &reference);
        assert!((b.score.unwrap() - DEFAULT_PRESTIGE_SCORE).abs() < 1e-9);
        assert_eq!(b.confidence, Confidence::Low);
        assert!(b.notes.iter().any(|n| n.contains("no-such-club")));
    }

    #[test]
    fn test_awards_only() {
        let reference = ReferenceData::bundled().unwrap();
        let b = score_experience(&[], &[award(3), award(2)], &reference);
        assert!((b.score.unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(b.confidence, Confidence::High);
    }

    #[test]
    fn test_activity_without_club_is_medium_confidence() {
        let reference = ReferenceData::bundled().unwrap();
        let b = score_experience(&[activity("research", 2, None, None)], &[], &reference);
        // 1.25 × 3.0 × 0.5
        assert!((b.score.unwrap() - 1.875).abs() < 1e-9);
        assert_eq!(b.confidence, Confidence::Medium);
    }

    #[test]
    fn test_nothing_on_file_is_absent() {
        let reference = ReferenceData::bundled().unwrap();
        assert!(score_experience(&[], &[], &reference).score.is_none());
    }
}
