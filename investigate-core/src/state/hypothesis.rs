//! Hypothesis tracking types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{HypothesisCategory, HypothesisGenerationMode, HypothesisStatus};

/// Unique identifier for a [`Hypothesis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HypothesisId(pub Uuid);

impl HypothesisId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HypothesisId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HypothesisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candidate root cause with evidence-weighted confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub id: HypothesisId,
    pub statement: String,
    pub category: HypothesisCategory,
    pub status: HypothesisStatus,
    pub likelihood: f64,
    pub initial_likelihood: f64,
    /// Ordered `(turn, likelihood)` history.
    pub confidence_trajectory: Vec<(u32, f64)>,
    pub supporting_evidence_ids: Vec<crate::state::evidence::EvidenceId>,
    pub refuting_evidence_ids: Vec<crate::state::evidence::EvidenceId>,
    pub captured_at_turn: u32,
    pub validated_at_turn: Option<u32>,
    pub last_progress_at_turn: u32,
    pub iterations_without_progress: u32,
    pub generation_mode: HypothesisGenerationMode,
}

impl Hypothesis {
    /// Create a newly captured hypothesis at the given turn.
    pub fn new(
        statement: impl Into<String>,
        category: HypothesisCategory,
        likelihood: f64,
        captured_at_turn: u32,
        generation_mode: HypothesisGenerationMode,
    ) -> Self {
        let likelihood = likelihood.clamp(0.0, 1.0);
        Self {
            id: HypothesisId::new(),
            statement: statement.into(),
            category,
            status: HypothesisStatus::Captured,
            likelihood,
            initial_likelihood: likelihood,
            confidence_trajectory: vec![(captured_at_turn, likelihood)],
            supporting_evidence_ids: Vec::new(),
            refuting_evidence_ids: Vec::new(),
            captured_at_turn,
            validated_at_turn: None,
            last_progress_at_turn: captured_at_turn,
            iterations_without_progress: 0,
            generation_mode,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            HypothesisStatus::Validated
                | HypothesisStatus::Refuted
                | HypothesisStatus::Retired
                | HypothesisStatus::Superseded
        )
    }
}
