use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UniversityRow {
    pub id: String,
    pub name: String,
    /// CS program ranking; drives the tier when present.
    #[serde(default)]
    pub cs_ranking: Option<i32>,
    #[serde(default)]
    pub tier: Option<i16>,
    #[serde(default = "default_gpa_scale")]
    pub gpa_scale: f64,
    #[serde(default = "default_true")]
    pub uses_plus_minus: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MajorRow {
    pub id: String,
    /// `None` marks a generic major usable at any school.
    #[serde(default)]
    pub university_id: Option<String>,
    pub name: String,
    pub rigor_tier: i16,
    pub rigor_score: f64,
    #[serde(default)]
    pub average_gpa: Option<f64>,
    #[serde(default)]
    pub is_stem: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClubRow {
    pub id: String,
    #[serde(default)]
    pub university_id: Option<String>,
    pub name: String,
    pub prestige_tier: i16,
    pub prestige_score: f64,
    #[serde(default = "default_leadership_bonus")]
    pub leadership_bonus: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseGradeMappingRow {
    #[serde(default)]
    pub university_id: Option<String>,
    pub grade: String,
    pub grade_points: f64,
}

fn default_gpa_scale() -> f64 {
    4.0
}

fn default_true() -> bool {
    true
}

fn default_leadership_bonus() -> f64 {
    1.0
}
