//! Breakdown records: the per-factor explanation stored next to every score.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// One explained input to a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Contribution {
    /// `contribution = normalized × weight`, in the score's own units.
    Weighted {
        factor: String,
        raw_value: Option<f64>,
        normalized: f64,
        weight: f64,
        contribution: f64,
    },
    /// A default substituted for missing data.
    Defaulted {
        factor: String,
        assumed: f64,
        reason: String,
    },
    /// `points = role_multiplier × prestige_score × duration_factor × leadership_bonus`
    Activity {
        factor: String,
        category: String,
        role_multiplier: f64,
        prestige_score: f64,
        duration_factor: f64,
        leadership_bonus: f64,
        points: f64,
    },
    Award {
        factor: String,
        prestige_tier: u8,
        points: f64,
    },
    /// Summed points of one category after the per-category cap.
    Capped {
        factor: String,
        uncapped: f64,
        cap: f64,
        contribution: f64,
    },
    /// Recorded for audit only; does not feed the score.
    Informational { factor: String, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// 0–100, or `None` when the dimension has no data.
    pub score: Option<f64>,
    pub confidence: Confidence,
    pub contributions: Vec<Contribution>,
    pub notes: Vec<String>,
}

impl Breakdown {
    pub fn new() -> Self {
        Self {
            score: None,
            confidence: Confidence::High,
            contributions: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Breakdown for a dimension without any data.
    pub fn absent(reason: impl Into<String>) -> Self {
        Self {
            score: None,
            confidence: Confidence::Low,
            contributions: Vec::new(),
            notes: vec![reason.into()],
        }
    }

    pub fn is_present(&self) -> bool {
        self.score.is_some()
    }

    /// Lowers confidence; never raises it.
    pub fn downgrade(&mut self, to: Confidence) {
        self.confidence = self.confidence.min(to);
    }

    pub fn push(&mut self, contribution: Contribution) {
        self.contributions.push(contribution);
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn weighted(
        &mut self,
        factor: &str,
        raw_value: Option<f64>,
        normalized: f64,
        weight: f64,
    ) -> f64 {
        let contribution = normalized * weight;
        self.push(Contribution::Weighted {
            factor: factor.to_string(),
            raw_value,
            normalized,
            weight,
            contribution,
        });
        contribution
    }

    pub fn defaulted(&mut self, factor: &str, assumed: f64, reason: impl Into<String>) {
        self.push(Contribution::Defaulted {
            factor: factor.to_string(),
            assumed,
            reason: reason.into(),
        });
    }

    pub fn informational(&mut self, factor: &str, value: f64) {
        self.push(Contribution::Informational {
            factor: factor.to_string(),
            value,
        });
    }

    /// Sum of the `Weighted` contributions.
    pub fn weighted_total(&self) -> f64 {
        self.contributions
            .iter()
            .map(|c| match c {
                Contribution::Weighted { contribution, .. } => *contribution,
                _ => 0.0,
            })
            .sum()
    }
}

impl Default for Breakdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_downgrade_never_raises() {
        let mut b = Breakdown::new();
        b.downgrade(Confidence::Low);
        b.downgrade(Confidence::Medium);
        assert_eq!(b.confidence, Confidence::Low);
    }

    #[test]
    fn test_weighted_total_ignores_other_kinds() {
        let mut b = Breakdown::new();
        b.weighted("rigor", Some(9.0), 9.0, 0.5);
        b.weighted("gpa", Some(3.2), 5.0, 0.5);
        b.informational("originality", 80.0);
        b.defaulted("university_tier", 3.0, "unknown university");
        assert!((b.weighted_total() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_contribution_serializes_with_kind_tag() {
        let c = Contribution::Informational {
            factor: "depth".to_string(),
            value: 42.0,
        };
        assert_eq!(
            serde_json::to_value(&c).unwrap(),
            json!({ "kind": "informational", "factor": "depth", "value": 42.0 })
        );
    }

    #[test]
    fn test_absent_breakdown_has_no_score() {
        let b = Breakdown::absent("no data");
        assert!(!b.is_present());
        assert_eq!(b.confidence, Confidence::Low);
        assert_eq!(b.notes, vec!["no data".to_string()]);
    }
}
