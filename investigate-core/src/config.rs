//! Engine-wide configuration.
//!
//! Thresholds and budgets named as part of the contract in the design
//! (confidence-level cutoffs, evidence deltas, decay factor, OODA
//! iteration budgets, anchoring thresholds, memory tier sizes, loop-back
//! limit, report version cap) live here so they can be overridden without
//! recompiling. No component reads a literal threshold from its own body —
//! everything is threaded through `EngineConfig`, mirroring how
//! `OrchestratorConfig` is passed through the orchestration loop this
//! engine is modeled on.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::InvestigationPhase;

/// Confidence-level thresholds. Must not be silently redefined — the
/// boundaries are inclusive on the lower bound of each level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    pub possible: f64,
    pub moderate: f64,
    pub likely: f64,
    pub certain: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            possible: 0.30,
            moderate: 0.50,
            likely: 0.70,
            certain: 0.85,
        }
    }
}

/// Hypothesis confidence arithmetic constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HypothesisConfig {
    pub supporting_evidence_delta: f64,
    pub refuting_evidence_delta: f64,
    pub progress_delta_threshold: f64,
    pub decay_factor: f64,
    pub decay_min_iterations_without_progress: u32,
    pub validated_min_likelihood: f64,
    pub validated_min_supporting: usize,
    pub refuted_max_likelihood: f64,
    pub refuted_min_refuting: usize,
    pub retired_max_likelihood: f64,
    pub anchoring_min_iteration: u32,
    pub anchoring_same_category_count: usize,
    pub anchoring_stalled_count: usize,
    pub anchoring_stalled_iterations: u32,
    pub anchoring_top_ranked_iterations: u32,
    pub anchoring_top_ranked_likelihood: f64,
    pub forced_alternative_min_iterations: u32,
    pub min_new_hypotheses_on_anchoring: usize,
}

impl Default for HypothesisConfig {
    fn default() -> Self {
        Self {
            supporting_evidence_delta: 0.15,
            refuting_evidence_delta: -0.20,
            progress_delta_threshold: 0.05,
            decay_factor: 0.85,
            decay_min_iterations_without_progress: 2,
            validated_min_likelihood: 0.70,
            validated_min_supporting: 2,
            refuted_max_likelihood: 0.20,
            refuted_min_refuting: 2,
            retired_max_likelihood: 0.30,
            anchoring_min_iteration: 3,
            anchoring_same_category_count: 4,
            anchoring_stalled_count: 2,
            anchoring_stalled_iterations: 3,
            anchoring_top_ranked_iterations: 3,
            anchoring_top_ranked_likelihood: 0.70,
            forced_alternative_min_iterations: 2,
            min_new_hypotheses_on_anchoring: 2,
        }
    }
}

/// Per-phase OODA iteration budget (min, max).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseBudget {
    pub min: u32,
    pub max: u32,
}

/// OODA controller configuration: per-phase budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OodaConfig {
    pub budgets: HashMap<InvestigationPhase, PhaseBudget>,
}

impl Default for OodaConfig {
    fn default() -> Self {
        use InvestigationPhase::*;
        let mut budgets = HashMap::new();
        budgets.insert(Intake, PhaseBudget { min: 0, max: 0 });
        budgets.insert(BlastRadius, PhaseBudget { min: 1, max: 2 });
        budgets.insert(Timeline, PhaseBudget { min: 1, max: 2 });
        budgets.insert(Hypothesis, PhaseBudget { min: 2, max: 3 });
        budgets.insert(Validation, PhaseBudget { min: 3, max: 6 });
        budgets.insert(Solution, PhaseBudget { min: 2, max: 4 });
        budgets.insert(Document, PhaseBudget { min: 1, max: 1 });
        Self { budgets }
    }
}

impl OodaConfig {
    pub fn budget_for(&self, phase: InvestigationPhase) -> PhaseBudget {
        self.budgets
            .get(&phase)
            .copied()
            .unwrap_or(PhaseBudget { min: 0, max: 0 })
    }
}

/// Memory tier capacities and compression cadence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    pub hot_capacity: usize,
    pub warm_capacity: usize,
    pub cold_capacity: usize,
    pub compress_every_n_turns: u32,
    pub compress_when_hot_exceeds: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            hot_capacity: 3,
            warm_capacity: 5,
            cold_capacity: 10,
            compress_every_n_turns: 3,
            compress_when_hot_exceeds: 5,
        }
    }
}

/// Phase orchestrator safety limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseOrchestratorConfig {
    pub max_loopbacks: u32,
}

impl Default for PhaseOrchestratorConfig {
    fn default() -> Self {
        Self { max_loopbacks: 3 }
    }
}

/// Degraded-mode detection thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedModeConfig {
    pub turns_without_progress: u32,
    pub blocked_evidence_count: u32,
}

impl Default for DegradedModeConfig {
    fn default() -> Self {
        Self {
            turns_without_progress: 3,
            blocked_evidence_count: 3,
        }
    }
}

/// Report Generator limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub max_versions_per_type: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_versions_per_type: 5,
        }
    }
}

/// Root configuration object threaded through every stateful component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    pub confidence_thresholds: ConfidenceThresholds,
    pub hypothesis: HypothesisConfig,
    pub ooda: OodaConfig,
    pub memory: MemoryConfig,
    pub phase_orchestrator: PhaseOrchestratorConfig,
    pub degraded_mode: DegradedModeConfig,
    pub report: ReportConfig,
}
