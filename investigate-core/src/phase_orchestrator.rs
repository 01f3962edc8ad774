//! Phase Orchestrator: decides the next `InvestigationPhase` from the
//! outcome the LLM (or the engine itself) signals for the current turn.

use crate::config::PhaseOrchestratorConfig;
use crate::state::PhaseLoopback;
use crate::types::{DegradedModeType, InvestigationPhase, PhaseTransitionOutcome};

/// The result of requesting a phase transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionDecision {
    pub next_phase: InvestigationPhase,
    pub is_loopback: bool,
    /// Set only when the loop-back safety limit was exceeded or the
    /// outcome itself is STALLED.
    pub degraded_mode: Option<(DegradedModeType, String)>,
}

/// Determine the next phase for `outcome`, honoring the loop-back safety
/// limit. `loopback_count` is the number of loop-backs already recorded
/// for this investigation.
pub fn next_phase(
    current: InvestigationPhase,
    outcome: PhaseTransitionOutcome,
    reason: &str,
    loopback_count: u32,
    cfg: &PhaseOrchestratorConfig,
) -> TransitionDecision {
    use PhaseTransitionOutcome::*;

    match outcome {
        Completed => TransitionDecision {
            next_phase: current.next().unwrap_or(current),
            is_loopback: false,
            degraded_mode: None,
        },
        HypothesisRefuted => loopback_decision(
            current,
            InvestigationPhase::Hypothesis,
            loopback_count,
            cfg,
        ),
        ScopeChanged => loopback_decision(
            current,
            InvestigationPhase::BlastRadius,
            loopback_count,
            cfg,
        ),
        TimelineWrong => loopback_decision(
            current,
            InvestigationPhase::Timeline,
            loopback_count,
            cfg,
        ),
        NeedMoreData | EscalationNeeded => TransitionDecision {
            next_phase: current,
            is_loopback: false,
            degraded_mode: None,
        },
        Stalled => TransitionDecision {
            next_phase: current,
            is_loopback: false,
            degraded_mode: Some((
                DegradedModeType::NoProgress,
                if reason.is_empty() {
                    "investigation stalled".to_string()
                } else {
                    reason.to_string()
                },
            )),
        },
    }
}

fn loopback_decision(
    current: InvestigationPhase,
    target: InvestigationPhase,
    loopback_count: u32,
    cfg: &PhaseOrchestratorConfig,
) -> TransitionDecision {
    if loopback_count >= cfg.max_loopbacks {
        return TransitionDecision {
            next_phase: current,
            is_loopback: false,
            degraded_mode: Some((
                DegradedModeType::LoopbackLimitExceeded,
                "loop-back limit exceeded".to_string(),
            )),
        };
    }
    TransitionDecision {
        next_phase: target,
        is_loopback: true,
        degraded_mode: None,
    }
}

/// Build the audit record appended to `InvestigationState::phase_loopbacks`
/// for a loop-back transition.
pub fn record_loopback(
    at_turn: u32,
    from_phase: InvestigationPhase,
    to_phase: InvestigationPhase,
    outcome: PhaseTransitionOutcome,
    reason: impl Into<String>,
) -> PhaseLoopback {
    PhaseLoopback {
        at_turn,
        from_phase,
        to_phase,
        outcome,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_advances_linearly() {
        let cfg = PhaseOrchestratorConfig::default();
        let decision = next_phase(
            InvestigationPhase::BlastRadius,
            PhaseTransitionOutcome::Completed,
            "",
            0,
            &cfg,
        );
        assert_eq!(decision.next_phase, InvestigationPhase::Timeline);
        assert!(!decision.is_loopback);
    }

    #[test]
    fn completed_at_document_stays_at_document() {
        let cfg = PhaseOrchestratorConfig::default();
        let decision = next_phase(
            InvestigationPhase::Document,
            PhaseTransitionOutcome::Completed,
            "",
            0,
            &cfg,
        );
        assert_eq!(decision.next_phase, InvestigationPhase::Document);
    }

    #[test]
    fn hypothesis_refuted_loops_back_to_hypothesis() {
        let cfg = PhaseOrchestratorConfig::default();
        let decision = next_phase(
            InvestigationPhase::Validation,
            PhaseTransitionOutcome::HypothesisRefuted,
            "",
            0,
            &cfg,
        );
        assert_eq!(decision.next_phase, InvestigationPhase::Hypothesis);
        assert!(decision.is_loopback);
        assert!(decision.degraded_mode.is_none());
    }

    #[test]
    fn need_more_data_and_escalation_needed_stay_in_place() {
        let cfg = PhaseOrchestratorConfig::default();
        let decision = next_phase(
            InvestigationPhase::Timeline,
            PhaseTransitionOutcome::NeedMoreData,
            "",
            0,
            &cfg,
        );
        assert_eq!(decision.next_phase, InvestigationPhase::Timeline);
    }

    #[test]
    fn stalled_enters_degraded_mode_without_changing_phase() {
        let cfg = PhaseOrchestratorConfig::default();
        let decision = next_phase(
            InvestigationPhase::Hypothesis,
            PhaseTransitionOutcome::Stalled,
            "no new leads",
            0,
            &cfg,
        );
        assert_eq!(decision.next_phase, InvestigationPhase::Hypothesis);
        assert_eq!(
            decision.degraded_mode,
            Some((DegradedModeType::NoProgress, "no new leads".to_string()))
        );
    }

    #[test]
    fn fourth_loopback_triggers_degraded_mode_and_holds_phase() {
        let cfg = PhaseOrchestratorConfig::default();
        for count in 0..3 {
            let decision = next_phase(
                InvestigationPhase::Validation,
                PhaseTransitionOutcome::HypothesisRefuted,
                "",
                count,
                &cfg,
            );
            assert!(decision.is_loopback, "loopback {count} should be allowed");
        }
        let fourth = next_phase(
            InvestigationPhase::Validation,
            PhaseTransitionOutcome::HypothesisRefuted,
            "",
            3,
            &cfg,
        );
        assert!(!fourth.is_loopback);
        assert_eq!(fourth.next_phase, InvestigationPhase::Validation);
        assert_eq!(
            fourth.degraded_mode,
            Some((
                DegradedModeType::LoopbackLimitExceeded,
                "loop-back limit exceeded".to_string()
            ))
        );
    }
}
