//! The engine's current best narrative answer, regardless of certainty.

use serde::{Deserialize, Serialize};

use crate::types::ConfidenceLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingConclusion {
    pub statement: String,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub supporting_evidence_count: u32,
    pub caveats: Vec<String>,
    pub alternative_explanations: Vec<String>,
    pub can_proceed_with_solution: bool,
    pub next_evidence_needed: Vec<String>,
    pub generated_at_turn: u32,
}
