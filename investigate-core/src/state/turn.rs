//! Turn audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::evidence::EvidenceId;
use crate::state::hypothesis::HypothesisId;
use crate::types::{InvestigationPhase, TurnOutcome};

/// An immutable record of a single investigation turn, appended once per
/// turn. `turn_number` is unique within a case and forms a contiguous
/// sequence beginning at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn_number: u32,
    pub timestamp: DateTime<Utc>,
    pub phase: InvestigationPhase,
    pub user_input_summary: String,
    pub agent_action_summary: String,
    pub milestones_completed: Vec<String>,
    pub hypotheses_updated: Vec<HypothesisId>,
    pub evidence_collected: Vec<EvidenceId>,
    pub outcome: TurnOutcome,
    pub progress_made: bool,
}
