//! Evidence tracking types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::hypothesis::HypothesisId;
use crate::types::{EvidenceCategory, EvidenceForm, EvidenceSourceType};

/// Unique identifier for an [`Evidence`] item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceId(pub Uuid);

impl EvidenceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EvidenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A datum linked to zero or more hypotheses as support or refutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: EvidenceId,
    pub description: String,
    pub category: EvidenceCategory,
    pub form: EvidenceForm,
    pub source_type: EvidenceSourceType,
    pub content_summary: String,
    pub collected_at_turn: u32,
    pub supports_hypothesis_ids: Vec<HypothesisId>,
    pub refutes_hypothesis_ids: Vec<HypothesisId>,
}

impl Evidence {
    pub fn new(
        description: impl Into<String>,
        category: EvidenceCategory,
        form: EvidenceForm,
        source_type: EvidenceSourceType,
        collected_at_turn: u32,
    ) -> Self {
        Self {
            id: EvidenceId::new(),
            description: description.into(),
            category,
            form,
            source_type,
            content_summary: String::new(),
            collected_at_turn,
            supports_hypothesis_ids: Vec::new(),
            refutes_hypothesis_ids: Vec::new(),
        }
    }
}
