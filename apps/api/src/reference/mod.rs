//! Reference data: immutable lookup tables (universities, majors, clubs,
//! course grade mappings) keyed by their natural keys.
//!
//! Built once at startup and shared as `Arc<ReferenceData>`. Scorers only ever
//! read from it; missing entries are the caller's cue to fall back to defaults.

pub mod seed;

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::models::reference::{ClubRow, CourseGradeMappingRow, MajorRow, UniversityRow};

#[derive(Debug, Error)]
pub enum ReferenceDataError {
    #[error("Duplicate university id '{0}'")]
    DuplicateUniversity(String),

    #[error("Duplicate major '{name}' for university {university:?}")]
    DuplicateMajor {
        university: Option<String>,
        name: String,
    },

    #[error("{kind} '{id}' references unknown university '{university_id}'")]
    UnknownUniversity {
        kind: &'static str,
        id: String,
        university_id: String,
    },

    #[error("{kind} '{id}' has tier {tier}, expected 1-5")]
    TierOutOfRange {
        kind: &'static str,
        id: String,
        tier: i16,
    },

    #[error("Failed to read reference data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed reference data: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct University {
    pub id: String,
    pub name: String,
    pub tier: u8,
    pub gpa_scale: f64,
    pub uses_plus_minus: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Major {
    pub id: String,
    pub university_id: Option<String>,
    pub name: String,
    pub rigor_tier: u8,
    pub rigor_score: f64,
    pub average_gpa: Option<f64>,
    pub is_stem: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Club {
    pub id: String,
    pub university_id: Option<String>,
    pub name: String,
    pub prestige_tier: u8,
    pub prestige_score: f64,
    pub leadership_bonus: f64,
}

/// How a candidate's major was matched against the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MajorSource {
    ById,
    UniversitySpecific,
    Generic,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceSummary {
    pub version: String,
    pub universities: usize,
    pub majors: usize,
    pub clubs: usize,
    pub grade_mappings: usize,
}

type NaturalKey = (Option<String>, String);

#[derive(Debug, Clone)]
pub struct ReferenceData {
    version: String,
    universities: HashMap<String, University>,
    majors: HashMap<String, Major>,
    majors_by_key: HashMap<NaturalKey, String>,
    clubs: HashMap<String, Club>,
    grade_points: HashMap<NaturalKey, f64>,
}

/// Maps a CS program ranking onto the 1–5 university tier bands.
pub fn tier_from_cs_ranking(rank: u32) -> u8 {
    match rank {
        0..=10 => 1,
        11..=25 => 2,
        26..=50 => 3,
        51..=75 => 4,
        _ => 5,
    }
}

/// Lowercases and collapses whitespace so "Computer  Science" == "computer science".
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn normalize_grade(grade: &str) -> String {
    grade.trim().to_uppercase()
}

fn checked_tier(kind: &'static str, id: &str, tier: i16) -> Result<u8, ReferenceDataError> {
    if (1..=5).contains(&tier) {
        Ok(tier as u8)
    } else {
        Err(ReferenceDataError::TierOutOfRange {
            kind,
            id: id.to_string(),
            tier,
        })
    }
}

impl ReferenceData {
    /// Validates and indexes raw lookup rows.
    ///
    /// Rejects duplicate `(university_id, name)` majors and rows pointing at
    /// universities that are not part of the same data set.
    pub fn from_rows(
        version: impl Into<String>,
        universities: Vec<UniversityRow>,
        majors: Vec<MajorRow>,
        clubs: Vec<ClubRow>,
        grade_mappings: Vec<CourseGradeMappingRow>,
    ) -> Result<Self, ReferenceDataError> {
        let mut university_map = HashMap::with_capacity(universities.len());
        for row in universities {
            let tier = match (row.cs_ranking, row.tier) {
                (Some(rank), _) => tier_from_cs_ranking(rank.max(0) as u32),
                (None, Some(tier)) => checked_tier("University", &row.id, tier)?,
                (None, None) => 5,
            };
            let university = University {
                id: row.id.clone(),
                name: row.name,
                tier,
                gpa_scale: if row.gpa_scale > 0.0 { row.gpa_scale } else { 4.0 },
                uses_plus_minus: row.uses_plus_minus,
            };
            if university_map.insert(row.id.clone(), university).is_some() {
                return Err(ReferenceDataError::DuplicateUniversity(row.id));
            }
        }

        let ensure_university = |kind: &'static str, id: &str, university_id: &Option<String>| {
            match university_id {
                Some(uid) if !university_map.contains_key(uid) => {
                    Err(ReferenceDataError::UnknownUniversity {
                        kind,
                        id: id.to_string(),
                        university_id: uid.clone(),
                    })
                }
                _ => Ok(()),
            }
        };

        let mut major_map = HashMap::with_capacity(majors.len());
        let mut majors_by_key = HashMap::with_capacity(majors.len());
        for row in majors {
            ensure_university("Major", &row.id, &row.university_id)?;
            let key = (row.university_id.clone(), normalize_name(&row.name));
            if majors_by_key.insert(key, row.id.clone()).is_some() {
                return Err(ReferenceDataError::DuplicateMajor {
                    university: row.university_id,
                    name: row.name,
                });
            }
            let major = Major {
                rigor_tier: checked_tier("Major", &row.id, row.rigor_tier)?,
                rigor_score: row.rigor_score.clamp(0.0, 10.0),
                id: row.id.clone(),
                university_id: row.university_id,
                name: row.name,
                average_gpa: row.average_gpa,
                is_stem: row.is_stem,
            };
            major_map.insert(row.id, major);
        }

        let mut club_map = HashMap::with_capacity(clubs.len());
        for row in clubs {
            ensure_university("Club", &row.id, &row.university_id)?;
            let club = Club {
                prestige_tier: checked_tier("Club", &row.id, row.prestige_tier)?,
                prestige_score: row.prestige_score.clamp(0.0, 10.0),
                leadership_bonus: row.leadership_bonus.max(1.0),
                id: row.id.clone(),
                university_id: row.university_id,
                name: row.name,
            };
            club_map.insert(row.id, club);
        }

        let grade_points = grade_mappings
            .into_iter()
            .map(|row| ((row.university_id, normalize_grade(&row.grade)), row.grade_points))
            .collect();

        Ok(Self {
            version: version.into(),
            universities: university_map,
            majors: major_map,
            majors_by_key,
            clubs: club_map,
            grade_points,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn university(&self, id: &str) -> Option<&University> {
        self.universities.get(id)
    }

    pub fn club(&self, id: &str) -> Option<&Club> {
        self.clubs.get(id)
    }

    /// Resolves a major by id, then by `(university, name)`, then by the generic
    /// `(None, name)` row.
    pub fn resolve_major(
        &self,
        university_id: Option<&str>,
        major_id: Option<&str>,
        major_name: Option<&str>,
    ) -> Option<(&Major, MajorSource)> {
        if let Some(major) = major_id.and_then(|id| self.majors.get(id)) {
            return Some((major, MajorSource::ById));
        }

        let name = normalize_name(major_name?);
        if name.is_empty() {
            return None;
        }

        if let Some(uid) = university_id {
            if let Some(major) = self
                .majors_by_key
                .get(&(Some(uid.to_string()), name.clone()))
                .and_then(|id| self.majors.get(id))
            {
                return Some((major, MajorSource::UniversitySpecific));
            }
        }

        self.majors_by_key
            .get(&(None, name))
            .and_then(|id| self.majors.get(id))
            .map(|major| (major, MajorSource::Generic))
    }

    /// Grade points for a letter grade. University-specific mappings win over
    /// generic ones; schools without plus/minus grading collapse `B+` to `B`.
    pub fn grade_points(&self, university: Option<&University>, grade: &str) -> Option<f64> {
        let mut grade = normalize_grade(grade);
        if let Some(u) = university {
            if !u.uses_plus_minus {
                grade = grade.trim_end_matches(&['+', '-'][..]).to_string();
            }
            if let Some(points) = self.grade_points.get(&(Some(u.id.clone()), grade.clone())) {
                return Some(*points);
            }
        }
        self.grade_points.get(&(None, grade)).copied()
    }

    pub fn summary(&self) -> ReferenceSummary {
        ReferenceSummary {
            version: self.version.clone(),
            universities: self.universities.len(),
            majors: self.majors.len(),
            clubs: self.clubs.len(),
            grade_mappings: self.grade_points.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn university(id: &str, cs_ranking: Option<i32>, uses_plus_minus: bool) -> UniversityRow {
        UniversityRow {
            id: id.to_string(),
            name: id.to_uppercase(),
            cs_ranking,
            tier: None,
            gpa_scale: 4.0,
            uses_plus_minus,
        }
    }

    fn major(id: &str, university_id: Option<&str>, name: &str) -> MajorRow {
        MajorRow {
            id: id.to_string(),
            university_id: university_id.map(String::from),
            name: name.to_string(),
            rigor_tier: 4,
            rigor_score: 8.0,
            average_gpa: None,
            is_stem: true,
        }
    }

    fn grade(university_id: Option<&str>, grade: &str, points: f64) -> CourseGradeMappingRow {
        CourseGradeMappingRow {
            university_id: university_id.map(String::from),
            grade: grade.to_string(),
            grade_points: points,
        }
    }

    #[test]
    fn test_tier_bands() {
        assert_eq!(tier_from_cs_ranking(1), 1);
        assert_eq!(tier_from_cs_ranking(10), 1);
        assert_eq!(tier_from_cs_ranking(11), 2);
        assert_eq!(tier_from_cs_ranking(25), 2);
        assert_eq!(tier_from_cs_ranking(50), 3);
        assert_eq!(tier_from_cs_ranking(75), 4);
        assert_eq!(tier_from_cs_ranking(76), 5);
    }

    #[test]
    fn test_tier_derived_from_ranking_over_explicit_tier() {
        let mut row = university("mit", Some(1), true);
        row.tier = Some(4);
        let data = ReferenceData::from_rows("t", vec![row], vec![], vec![], vec![]).unwrap();
        assert_eq!(data.university("mit").unwrap().tier, 1);
    }

    #[test]
    fn test_duplicate_major_rejected() {
        let result = ReferenceData::from_rows(
            "t",
            vec![university("berkeley", Some(2), true)],
            vec![
                major("m1", Some("berkeley"), "Physics"),
                major("m2", Some("berkeley"), "  physics "),
            ],
            vec![],
            vec![],
        );
        assert!(matches!(
            result,
            Err(ReferenceDataError::DuplicateMajor { .. })
        ));
    }

    #[test]
    fn test_normalize_name_collapses_whitespace_and_case() {
        assert_eq!(normalize_name("Computer  Science"), "computer science");
        assert_eq!(normalize_name("\tcomputer science \n"), "computer science");
    }

    #[test]
    fn test_whitespace_variants_are_one_major() {
        let result = ReferenceData::from_rows(
            "t",
            vec![],
            vec![
                major("m1", None, "Computer  Science"),
                major("m2", None, "computer science"),
            ],
            vec![],
            vec![],
        );
        assert!(matches!(
            result,
            Err(ReferenceDataError::DuplicateMajor { .. })
        ));
    }

    #[test]
    fn test_major_unique_index_uses_loader_normalization() {
        let migration = include_str!("../../migrations/0001_profile_scoring.sql");
        let key = r"lower(btrim(regexp_replace(name, '\s+', ' ', 'g')))";
        let index_lines: Vec<_> = migration
            .lines()
            .filter(|l| l.trim_start().starts_with("ON majors"))
            .collect();
        assert_eq!(index_lines.len(), 2);
        assert!(index_lines.iter().all(|l| l.contains(key)), "{index_lines:?}");
    }

    #[test]
    fn test_same_name_allowed_across_universities() {
        let result = ReferenceData::from_rows(
            "t",
            vec![university("berkeley", Some(2), true)],
            vec![
                major("m1", Some("berkeley"), "Physics"),
                major("m2", None, "Physics"),
            ],
            vec![],
            vec![],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_unknown_university_rejected() {
        let result = ReferenceData::from_rows(
            "t",
            vec![],
            vec![major("m1", Some("nowhere"), "Physics")],
            vec![],
            vec![],
        );
        assert!(matches!(
            result,
            Err(ReferenceDataError::UnknownUniversity { .. })
        ));
    }

    #[test]
    fn test_major_resolution_falls_back_to_generic() {
        let data = ReferenceData::from_rows(
            "t",
            vec![
                university("berkeley", Some(2), true),
                university("ucla", Some(13), true),
            ],
            vec![
                major("berkeley-physics", Some("berkeley"), "Physics"),
                major("generic-physics", None, "Physics"),
            ],
            vec![],
            vec![],
        )
        .unwrap();

        let (m, source) = data
            .resolve_major(Some("berkeley"), None, Some("physics"))
            .unwrap();
        assert_eq!(m.id, "berkeley-physics");
        assert_eq!(source, MajorSource::UniversitySpecific);

        let (m, source) = data.resolve_major(Some("ucla"), None, Some("Physics")).unwrap();
        assert_eq!(m.id, "generic-physics");
        assert_eq!(source, MajorSource::Generic);

        let (m, source) = data
            .resolve_major(Some("ucla"), Some("berkeley-physics"), Some("Basket Weaving"))
            .unwrap();
        assert_eq!(m.id, "berkeley-physics");
        assert_eq!(source, MajorSource::ById);

        assert!(data
            .resolve_major(Some("ucla"), None, Some("Basket Weaving"))
            .is_none());
    }

    #[test]
    fn test_grade_points_plus_minus_collapse() {
        let data = ReferenceData::from_rows(
            "t",
            vec![university("coarse", Some(40), false)],
            vec![],
            vec![],
            vec![
                grade(None, "A", 4.0),
                grade(None, "A-", 3.7),
                grade(None, "B+", 3.3),
                grade(None, "B", 3.0),
            ],
        )
        .unwrap();

        let coarse = data.university("coarse");
        assert_eq!(data.grade_points(coarse, "a-"), Some(4.0));
        assert_eq!(data.grade_points(coarse, "B+"), Some(3.0));
        assert_eq!(data.grade_points(None, "B+"), Some(3.3));
        assert_eq!(data.grade_points(None, "P"), None);
    }

    #[test]
    fn test_university_specific_grade_mapping_wins() {
        let data = ReferenceData::from_rows(
            "t",
            vec![university("mit", Some(1), true)],
            vec![],
            vec![],
            vec![grade(None, "A+", 4.0), grade(Some("mit"), "A+", 5.0)],
        )
        .unwrap();
        assert_eq!(data.grade_points(data.university("mit"), "A+"), Some(5.0));
    }
}
