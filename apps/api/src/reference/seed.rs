use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::models::reference::{ClubRow, CourseGradeMappingRow, MajorRow, UniversityRow};
use crate::reference::{ReferenceData, ReferenceDataError};

/// Seed shipped with the service, used when no other source has data.
pub const BUNDLED_SEED: &str = include_str!("../../data/reference_data.json");

/// On-disk layout of a reference data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceDataFile {
    pub version: String,
    #[serde(default)]
    pub universities: Vec<UniversityRow>,
    #[serde(default)]
    pub majors: Vec<MajorRow>,
    #[serde(default)]
    pub clubs: Vec<ClubRow>,
    #[serde(default)]
    pub course_grade_mappings: Vec<CourseGradeMappingRow>,
}

impl ReferenceData {
    pub fn from_json_str(json: &str) -> Result<Self, ReferenceDataError> {
        let file: ReferenceDataFile = serde_json::from_str(json)?;
        Self::from_rows(
            file.version,
            file.universities,
            file.majors,
            file.clubs,
            file.course_grade_mappings,
        )
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ReferenceDataError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn bundled() -> Result<Self, ReferenceDataError> {
        Self::from_json_str(BUNDLED_SEED)
    }
}

/// Reads the lookup tables from Postgres. Returns `None` when they are empty.
pub async fn load_from_db(pool: &PgPool) -> Result<Option<ReferenceData>> {
    let universities = sqlx::query_as::<_, UniversityRow>(
        r#"
        SELECT id, name, cs_ranking, tier, gpa_scale, uses_plus_minus
        FROM universities
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    if universities.is_empty() {
        return Ok(None);
    }

    let majors = sqlx::query_as::<_, MajorRow>(
        r#"
        SELECT id, university_id, name, rigor_tier, rigor_score, average_gpa, is_stem
        FROM majors
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let clubs = sqlx::query_as::<_, ClubRow>(
        r#"
        SELECT id, university_id, name, prestige_tier, prestige_score, leadership_bonus
        FROM clubs
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let grade_mappings = sqlx::query_as::<_, CourseGradeMappingRow>(
        "SELECT university_id, grade, grade_points FROM course_grade_mappings",
    )
    .fetch_all(pool)
    .await?;

    let version: Option<String> = sqlx::query_scalar(
        "SELECT version FROM reference_data_versions ORDER BY applied_at DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    let data = ReferenceData::from_rows(
        version.unwrap_or_else(|| "unversioned".to_string()),
        universities,
        majors,
        clubs,
        grade_mappings,
    )?;
    Ok(Some(data))
}

/// Picks the reference data source: an explicit file, then the database,
/// then the bundled seed.
pub async fn load_reference_data(path: Option<&Path>, pool: &PgPool) -> Result<ReferenceData> {
    if let Some(path) = path {
        let data = ReferenceData::from_json_file(path)
            .with_context(|| format!("Failed to load reference data from {}", path.display()))?;
        info!(
            "Loaded reference data {} from {}",
            data.version(),
            path.display()
        );
        return Ok(data);
    }

    if let Some(data) = load_from_db(pool).await? {
        info!("Loaded reference data {} from database", data.version());
        return Ok(data);
    }

    warn!("Reference tables are empty; falling back to bundled seed");
    ReferenceData::bundled().context("Bundled reference seed is invalid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bundled_seed_is_valid() {
        let data = ReferenceData::bundled().unwrap();
        let summary = data.summary();
        assert!(summary.universities > 0);
        assert!(summary.majors > 0);
        assert!(summary.clubs > 0);
        assert!(summary.grade_mappings > 0);
    }

    #[test]
    fn test_bundled_seed_has_berkeley_eecs() {
        let data = ReferenceData::bundled().unwrap();
        let berkeley = data.university("berkeley").unwrap();
        assert_eq!(berkeley.tier, 1);

        let (major, _) = data
            .resolve_major(
                Some("berkeley"),
                None,
                Some("Electrical Engineering and Computer Sciences"),
            )
            .unwrap();
        assert_eq!(major.rigor_tier, 5);
        assert_eq!(major.average_gpa, Some(3.20));
        assert!(major.is_stem);
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "version": "test-1",
                "universities": [{{ "id": "state", "name": "State U", "cs_ranking": 60 }}],
                "majors": [{{
                    "id": "history", "name": "History", "rigor_tier": 2, "rigor_score": 4.0
                }}]
            }}"#
        )
        .unwrap();

        let data = ReferenceData::from_json_file(file.path()).unwrap();
        assert_eq!(data.version(), "test-1");
        let state = data.university("state").unwrap();
        assert_eq!(state.tier, 4);
        assert_eq!(state.gpa_scale, 4.0);
        assert!(state.uses_plus_minus);
        assert!(data.resolve_major(Some("state"), None, Some("history")).is_some());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            ReferenceData::from_json_file(file.path()),
            Err(ReferenceDataError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ReferenceData::from_json_file(&dir.path().join("absent.json")),
            Err(ReferenceDataError::Io(_))
        ));
    }
}
