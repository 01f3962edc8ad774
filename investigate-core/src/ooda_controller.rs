//! OODA Loop Controller: per-phase iteration budgets with adaptive
//! intensity and an anchoring-aware continuation gate.

use crate::config::{OodaConfig, PhaseBudget};
use crate::hypothesis_manager::AnchoringResult;
use crate::state::Hypothesis;
use crate::types::{HypothesisStatus, InvestigationPhase, OodaIntensity};

/// Observe/Orient/Decide/Act intensity for a given phase and iteration.
pub fn intensity_for(phase: InvestigationPhase, iteration: u32) -> OodaIntensity {
    use InvestigationPhase::*;
    match phase {
        Intake => OodaIntensity::None,
        BlastRadius | Timeline | Document => OodaIntensity::Light,
        Hypothesis => {
            if iteration <= 2 {
                OodaIntensity::Light
            } else {
                OodaIntensity::Medium
            }
        }
        Validation => {
            if iteration <= 2 {
                OodaIntensity::Medium
            } else {
                OodaIntensity::Full
            }
        }
        Solution => OodaIntensity::Medium,
    }
}

/// The per-phase iteration budget, as configured.
pub fn budget_for(cfg: &OodaConfig, phase: InvestigationPhase) -> PhaseBudget {
    cfg.budget_for(phase)
}

/// The continuation decision for the current iteration of a phase.
pub fn should_continue(
    phase: InvestigationPhase,
    iteration: u32,
    budget: PhaseBudget,
    anchoring: &AnchoringResult,
    hypotheses: &[Hypothesis],
) -> (bool, String) {
    if iteration < budget.min {
        return (true, "below minimum".to_string());
    }
    if iteration >= budget.max {
        return (false, "max reached".to_string());
    }
    if anchoring.triggered {
        let reason = anchoring
            .reason
            .clone()
            .unwrap_or_else(|| "anchoring detected".to_string());
        return (true, reason);
    }
    if phase == InvestigationPhase::Validation {
        let has_strong_validation = hypotheses
            .iter()
            .any(|h| h.status == HypothesisStatus::Validated && h.likelihood >= 0.70);
        if !has_strong_validation {
            return (true, "no confirmed hypothesis yet".to_string());
        }
    }
    (false, "objectives achieved".to_string())
}
