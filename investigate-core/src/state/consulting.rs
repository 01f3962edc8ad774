//! Pre-investigation CONSULTING-status framing data (SPEC_FULL §B.5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConsultingData {
    pub proposed_problem_statement: Option<String>,
    pub problem_statement_confirmed: bool,
    pub problem_statement_confirmed_at: Option<DateTime<Utc>>,
    pub quick_suggestions: Vec<String>,
    pub decided_to_investigate: bool,
    pub decision_made_at: Option<DateTime<Utc>>,
    pub consultation_turns: u32,
}
