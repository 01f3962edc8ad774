//! OODA execution state — the fine-grained within-phase step tracker.

use serde::{Deserialize, Serialize};

use crate::types::{OodaIntensity, OodaStep};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OodaState {
    pub current_step: OodaStep,
    pub current_iteration: u32,
    pub adaptive_intensity: OodaIntensity,
}

impl Default for OodaState {
    fn default() -> Self {
        Self {
            current_step: OodaStep::Observe,
            current_iteration: 0,
            adaptive_intensity: OodaIntensity::None,
        }
    }
}
