use serde::{Deserialize, Serialize};

use crate::models::candidate::{
    CandidateActivityRow, CandidateAwardRow, CandidateRow, CandidateTranscriptRow,
    GithubAnalysisRow, TranscriptCourseRow, VibeCodeSessionRow,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub transcript: CandidateTranscriptRow,
    pub courses: Vec<TranscriptCourseRow>,
}

/// Everything the scorers read for one candidate, captured at a single point
/// in time. Also persisted as `raw_inputs` for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSnapshot {
    pub candidate: CandidateRow,
    pub github: Option<GithubAnalysisRow>,
    pub github_history: Vec<GithubAnalysisRow>,
    pub vibe_sessions: Vec<VibeCodeSessionRow>,
    pub transcript: Option<TranscriptRecord>,
    pub activities: Vec<CandidateActivityRow>,
    pub awards: Vec<CandidateAwardRow>,
}

impl CandidateSnapshot {
    pub fn empty(candidate: CandidateRow) -> Self {
        Self {
            candidate,
            github: None,
            github_history: Vec::new(),
            vibe_sessions: Vec::new(),
            transcript: None,
            activities: Vec::new(),
            awards: Vec::new(),
        }
    }

    /// Sorts every collection into a stable order so that identical data
    /// always produces identical scores and breakdown JSON.
    pub fn into_canonical(mut self) -> Self {
        self.github_history.sort_by_key(|h| (h.analyzed_at, h.id));
        self.vibe_sessions.sort_by_key(|s| (s.uploaded_at, s.id));
        self.activities.sort_by_key(|a| a.id);
        self.awards.sort_by_key(|a| a.id);
        if let Some(record) = self.transcript.as_mut() {
            record.courses.sort_by(|a, b| {
                (a.term_index, &a.course_code).cmp(&(b.term_index, &b.course_code))
            });
        }
        self
    }
}
