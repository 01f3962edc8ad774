//! The Investigation State document — the engine's working document,
//! serialised into `case.metadata.investigation`.
//!
//! Re-expressed as a tagged-sum of structs rather than an open dictionary,
//! per the design notes. Unknown fields in persisted JSON are preserved
//! on round-trip via the `extra` catch-all so rolling upgrades don't
//! truncate state written by a newer engine version.

pub mod conclusion;
pub mod consulting;
pub mod degraded;
pub mod evidence;
pub mod frames;
pub mod hypothesis;
pub mod memory;
pub mod ooda;
pub mod progress;
pub mod turn;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{
    InvestigationPhase, InvestigationStrategy, PhaseTransitionOutcome, TemporalState,
    UrgencyLevel,
};

pub use conclusion::WorkingConclusion;
pub use consulting::ConsultingData;
pub use degraded::DegradedModeData;
pub use evidence::{Evidence, EvidenceId};
pub use frames::{AnomalyFrame, TemporalFrame};
pub use hypothesis::{Hypothesis, HypothesisId};
pub use memory::{HierarchicalMemory, MemorySnapshot};
pub use ooda::OodaState;
pub use progress::{Progress, ProgressMetrics};
pub use turn::TurnRecord;

use crate::types::HypothesisStatus;

/// A single backward phase transition, recorded for the loop-back safety
/// limit (see `crate::phase_orchestrator`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseLoopback {
    pub at_turn: u32,
    pub from_phase: InvestigationPhase,
    pub to_phase: InvestigationPhase,
    pub outcome: PhaseTransitionOutcome,
    pub reason: String,
}

/// The root investigation document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationState {
    pub investigation_id: String,
    pub current_phase: InvestigationPhase,
    pub current_turn: u32,
    pub started_at: DateTime<Utc>,

    pub temporal_state: TemporalState,
    pub urgency_level: UrgencyLevel,
    pub strategy: InvestigationStrategy,

    pub anomaly_frame: Option<AnomalyFrame>,
    pub temporal_frame: Option<TemporalFrame>,

    pub hypotheses: Vec<Hypothesis>,
    pub evidence: Vec<Evidence>,

    pub progress: Progress,
    pub progress_metrics: ProgressMetrics,

    pub working_conclusion: Option<WorkingConclusion>,
    pub ooda_state: OodaState,
    pub memory: HierarchicalMemory,
    pub consulting_data: Option<ConsultingData>,
    pub degraded_mode: Option<DegradedModeData>,

    /// State-level counter, per the design notes: used for degraded-mode
    /// detection. Distinct from each hypothesis's own
    /// `iterations_without_progress`, which drives anchoring/decay.
    pub turns_without_progress: u32,

    pub turn_history: Vec<TurnRecord>,
    pub phase_loopbacks: Vec<PhaseLoopback>,

    /// Unknown fields from a newer engine version, preserved verbatim on
    /// round-trip.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl InvestigationState {
    /// Seed a fresh state at the start of a formal investigation (i.e. on
    /// the CONSULTING -> INVESTIGATING transition).
    pub fn new(
        temporal_state: TemporalState,
        urgency_level: UrgencyLevel,
        started_at: DateTime<Utc>,
    ) -> Self {
        let strategy = InvestigationStrategy::from_matrix(temporal_state, urgency_level);
        Self {
            investigation_id: Uuid::new_v4().to_string(),
            current_phase: InvestigationPhase::Intake,
            current_turn: 0,
            started_at,
            temporal_state,
            urgency_level,
            strategy,
            anomaly_frame: None,
            temporal_frame: None,
            hypotheses: Vec::new(),
            evidence: Vec::new(),
            progress: Progress::default(),
            progress_metrics: ProgressMetrics::default(),
            working_conclusion: None,
            ooda_state: OodaState::default(),
            memory: HierarchicalMemory::default(),
            consulting_data: None,
            degraded_mode: None,
            turns_without_progress: 0,
            turn_history: Vec::new(),
            phase_loopbacks: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// A minimal CONSULTING-only state: no formal investigation yet, just
    /// room for pre-commitment framing.
    pub fn new_consulting(started_at: DateTime<Utc>) -> Self {
        let mut state = Self::new(TemporalState::Ongoing, UrgencyLevel::Unknown, started_at);
        state.consulting_data = Some(ConsultingData::default());
        state
    }

    pub fn get_hypothesis(&self, id: HypothesisId) -> Option<&Hypothesis> {
        self.hypotheses.iter().find(|h| h.id == id)
    }

    pub fn get_hypothesis_mut(&mut self, id: HypothesisId) -> Option<&mut Hypothesis> {
        self.hypotheses.iter_mut().find(|h| h.id == id)
    }

    pub fn get_evidence(&self, id: EvidenceId) -> Option<&Evidence> {
        self.evidence.iter().find(|e| e.id == id)
    }

    pub fn active_hypotheses(&self) -> impl Iterator<Item = &Hypothesis> {
        self.hypotheses
            .iter()
            .filter(|h| h.status == HypothesisStatus::Active)
    }

    pub fn validated_hypothesis(&self) -> Option<&Hypothesis> {
        self.hypotheses
            .iter()
            .find(|h| h.status == HypothesisStatus::Validated)
    }

    /// Serialise into the JSON value stored at `case.metadata.investigation`.
    pub fn to_json(&self) -> crate::error::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialise from `case.metadata.investigation`.
    pub fn from_json(value: serde_json::Value) -> crate::error::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_has_zero_turn_and_intake_phase() {
        let s = InvestigationState::new(
            TemporalState::Ongoing,
            UrgencyLevel::Critical,
            Utc::now(),
        );
        assert_eq!(s.current_turn, 0);
        assert_eq!(s.current_phase, InvestigationPhase::Intake);
        assert_eq!(s.strategy, InvestigationStrategy::MitigationFirst);
    }

    #[test]
    fn json_round_trip_preserves_equality_example() {
        let s = InvestigationState::new(
            TemporalState::Historical,
            UrgencyLevel::Low,
            Utc::now(),
        );
        let json = s.to_json().unwrap();
        let back = InvestigationState::from_json(json).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let s = InvestigationState::new(
            TemporalState::Ongoing,
            UrgencyLevel::Medium,
            Utc::now(),
        );
        let mut json = s.to_json().unwrap();
        json.as_object_mut()
            .unwrap()
            .insert("future_field".to_string(), serde_json::json!("from a newer engine"));
        let back = InvestigationState::from_json(json.clone()).unwrap();
        let round_tripped = back.to_json().unwrap();
        assert_eq!(
            round_tripped.get("future_field"),
            Some(&serde_json::json!("from a newer engine"))
        );
    }

    mod proptests {
        use super::*;
        use crate::types::{HypothesisCategory, HypothesisGenerationMode};
        use proptest::prelude::*;

        fn hypothesis_category() -> impl Strategy<Value = HypothesisCategory> {
            prop_oneof![
                Just(HypothesisCategory::Infrastructure),
                Just(HypothesisCategory::Code),
                Just(HypothesisCategory::Configuration),
                Just(HypothesisCategory::Data),
                Just(HypothesisCategory::ExternalDependency),
                Just(HypothesisCategory::HumanError),
                Just(HypothesisCategory::Network),
                Just(HypothesisCategory::Performance),
            ]
        }

        fn phase() -> impl Strategy<Value = InvestigationPhase> {
            prop_oneof![
                Just(InvestigationPhase::Intake),
                Just(InvestigationPhase::BlastRadius),
                Just(InvestigationPhase::Timeline),
                Just(InvestigationPhase::Hypothesis),
                Just(InvestigationPhase::Validation),
                Just(InvestigationPhase::Solution),
                Just(InvestigationPhase::Document),
            ]
        }

        proptest! {
            /// `from_json(to_json(state)) == state` for any reachable mix of
            /// phase, turn counter, and hypothesis set — not just the one
            /// fixed example above.
            #[test]
            fn json_round_trip_preserves_equality(
                phase in phase(),
                turn in 0u32..500,
                statements in prop::collection::vec("[a-z ]{3,30}", 0..6),
                categories in prop::collection::vec(hypothesis_category(), 0..6),
                likelihoods in prop::collection::vec(0.0f64..1.0, 0..6),
            ) {
                let mut state = InvestigationState::new(TemporalState::Ongoing, UrgencyLevel::Medium, Utc::now());
                state.current_phase = phase;
                state.current_turn = turn;

                let n = statements.len().min(categories.len()).min(likelihoods.len());
                for i in 0..n {
                    state.hypotheses.push(Hypothesis::new(
                        statements[i].clone(),
                        categories[i],
                        likelihoods[i],
                        turn,
                        HypothesisGenerationMode::Opportunistic,
                    ));
                }

                let json = state.to_json().unwrap();
                let back = InvestigationState::from_json(json).unwrap();
                prop_assert_eq!(state, back);
            }
        }
    }
}
