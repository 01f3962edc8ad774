//! Milestone Engine — the heart of the investigation turn.
//!
//! `process_turn` is the only entry point the outer HTTP layer calls. It
//! loads the investigation state, builds a status-specific prompt, calls
//! the LLM, applies the returned structured update through the other
//! components, and persists the result. Everything below step 6 composes
//! the pure transformations in [`crate::hypothesis_manager`],
//! [`crate::phase_orchestrator`], [`crate::memory_manager`], and
//! [`crate::conclusion`] — none of which perform I/O themselves.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::config::EngineConfig;
use crate::conclusion;
use crate::error::{Error, Result};
use crate::hypothesis_manager;
use crate::memory_manager;
use crate::ports::{CaseRepositoryPort, CaseRecord, ChatRequest, LlmPort};
use crate::prompts;
use crate::state::{Evidence, Hypothesis, HypothesisId, InvestigationState};
use crate::status;
use crate::types::{
    CaseStatus, EvidenceCategory, EvidenceForm, EvidenceSourceType, HypothesisCategory,
    HypothesisGenerationMode, InvestigationStrategy, PhaseTransitionOutcome, TemporalState,
    TurnOutcome, UrgencyLevel,
};

/// A raw attachment on the incoming turn; the engine synthesises an
/// `Evidence` record for each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub description: String,
    pub content_type: String,
}

/// A proposed new hypothesis from the structured-update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHypothesis {
    pub statement: String,
    pub category: HypothesisCategory,
    pub likelihood: f64,
}

/// An evidence link against an existing hypothesis, by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HypothesisUpdate {
    pub hypothesis_id: String,
    #[serde(default)]
    pub supporting_evidence_ids: Vec<String>,
    #[serde(default)]
    pub refuting_evidence_ids: Vec<String>,
}

/// The structured state-update payload the LLM returns alongside prose
/// (spec §4.I step 5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StateUpdatePayload {
    #[serde(default)]
    pub new_hypotheses: Vec<NewHypothesis>,
    #[serde(default)]
    pub hypothesis_updates: Vec<HypothesisUpdate>,
    #[serde(default)]
    pub milestones_completed: Vec<String>,
    pub phase_transition: Option<PhaseTransitionOutcome>,
    #[serde(default)]
    pub phase_transition_reason: String,
    pub proposed_problem_statement: Option<String>,
    #[serde(default)]
    pub commit_to_investigation: bool,
}

/// `{turn_number, outcome, milestones_completed, hypotheses_changed,
/// phase_transitioned?, degraded_mode_entered?}` — the engine's only
/// externally visible per-turn output besides `agent_response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnMetadata {
    pub turn_number: u32,
    pub outcome: TurnOutcome,
    pub milestones_completed: Vec<String>,
    pub hypotheses_changed: Vec<HypothesisId>,
    pub phase_transitioned: bool,
    pub degraded_mode_entered: bool,
}

pub struct MilestoneEngine {
    config: Arc<EngineConfig>,
}

impl MilestoneEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    /// Step 1: load state from `case.metadata.investigation`, or seed a
    /// minimal CONSULTING-only state if absent.
    pub fn load_state(&self, case: &CaseRecord) -> Result<InvestigationState> {
        match case.metadata.get("investigation") {
            Some(value) => InvestigationState::from_json(value.clone()),
            None if case.status == CaseStatus::Consulting => {
                Ok(InvestigationState::new_consulting(Utc::now()))
            }
            None => Err(Error::invariant_violation(
                "missing investigation state for a non-consulting case",
            )),
        }
    }

    /// Step 3: synthesise an `Evidence` item per attachment, inferring
    /// category from current progress.
    pub fn attachment_evidence(
        &self,
        state: &InvestigationState,
        attachments: &[Attachment],
        turn: u32,
    ) -> Vec<Evidence> {
        let category = if state.progress.solution_proposed {
            EvidenceCategory::Resolution
        } else if state.progress.verification_complete() {
            EvidenceCategory::Causal
        } else {
            EvidenceCategory::Symptom
        };

        attachments
            .iter()
            .map(|attachment| {
                let mut evidence = Evidence::new(
                    attachment.description.clone(),
                    category,
                    EvidenceForm::DirectObservation,
                    EvidenceSourceType::UserProvided,
                    turn,
                );
                evidence.content_summary = attachment.content_type.clone();
                evidence
            })
            .collect()
    }

    /// Steps 6-10: apply the structured update, run auto-closure, the
    /// degraded-mode check, memory maintenance, and append the turn
    /// record. Returns the metadata for this turn.
    #[instrument(skip(self, state, payload), fields(turn = state.current_turn))]
    pub fn apply_turn(
        &self,
        state: &mut InvestigationState,
        case_status: &mut CaseStatus,
        payload: StateUpdatePayload,
        new_evidence: Vec<Evidence>,
        user_input_summary: String,
        _user_id: &str,
        now: chrono::DateTime<Utc>,
    ) -> TurnMetadata {
        let turn = state.current_turn;
        let mut hypotheses_changed = Vec::new();
        let mut milestones_completed = Vec::new();
        let was_degraded_at_start = state.degraded_mode.is_some();

        for evidence in &new_evidence {
            state.evidence.push(evidence.clone());
        }

        for new_hyp in payload.new_hypotheses {
            let mut hyp = Hypothesis::new(
                new_hyp.statement,
                new_hyp.category,
                new_hyp.likelihood,
                turn,
                HypothesisGenerationMode::Opportunistic,
            );
            hypothesis_manager::evaluate_auto_transition(&mut hyp, &self.config.hypothesis);
            hypotheses_changed.push(hyp.id);
            state.hypotheses.push(hyp);
        }

        for update in payload.hypothesis_updates {
            let Ok(target_id) = update.hypothesis_id.parse::<uuid::Uuid>() else {
                warn!(raw = %update.hypothesis_id, "skipping hypothesis update with unparsable id");
                continue;
            };
            let target_id = HypothesisId(target_id);
            let Some(hyp) = state.get_hypothesis_mut(target_id) else {
                warn!(%target_id, "skipping update for unknown hypothesis id");
                continue;
            };
            if hyp.is_terminal() {
                warn!(%target_id, "skipping update for a hypothesis already in a terminal status");
                continue;
            }
            for raw_id in &update.supporting_evidence_ids {
                if let Ok(evidence_id) = raw_id.parse::<uuid::Uuid>() {
                    hypothesis_manager::apply_supporting_evidence(
                        hyp,
                        crate::state::EvidenceId(evidence_id),
                        turn,
                        &self.config.hypothesis,
                    );
                }
            }
            for raw_id in &update.refuting_evidence_ids {
                if let Ok(evidence_id) = raw_id.parse::<uuid::Uuid>() {
                    hypothesis_manager::apply_refuting_evidence(
                        hyp,
                        crate::state::EvidenceId(evidence_id),
                        turn,
                        &self.config.hypothesis,
                    );
                }
            }
            hypotheses_changed.push(target_id);
        }

        for milestone in &payload.milestones_completed {
            let was_complete = state.progress.is_completed(milestone);
            state.progress.complete(milestone, now);
            if !was_complete && state.progress.is_completed(milestone) {
                milestones_completed.push(milestone.clone());
            }
        }

        for hyp in state.hypotheses.iter_mut() {
            if hyp.status == crate::types::HypothesisStatus::Active
                && !hypotheses_changed.contains(&hyp.id)
            {
                hyp.iterations_without_progress += 1;
                hypothesis_manager::apply_decay(hyp, turn, &self.config.hypothesis);
            }
        }

        state.ooda_state.current_iteration += 1;
        let anchoring = hypothesis_manager::detect_anchoring(
            &state.hypotheses,
            state.ooda_state.current_iteration,
            &self.config.hypothesis,
        );
        if anchoring.triggered {
            hypothesis_manager::force_alternatives(&mut state.hypotheses, &anchoring, &self.config.hypothesis);
            for id in &anchoring.affected_ids {
                if !hypotheses_changed.contains(id) {
                    hypotheses_changed.push(*id);
                }
            }
        }
        state.ooda_state.adaptive_intensity =
            crate::ooda_controller::intensity_for(state.current_phase, state.ooda_state.current_iteration);

        let mut phase_transitioned = false;
        if let Some(outcome) = payload.phase_transition {
            let decision = crate::phase_orchestrator::next_phase(
                state.current_phase,
                outcome,
                &payload.phase_transition_reason,
                state.phase_loopbacks.len() as u32,
                &self.config.phase_orchestrator,
            );
            if decision.is_loopback {
                state.phase_loopbacks.push(crate::phase_orchestrator::record_loopback(
                    turn,
                    state.current_phase,
                    decision.next_phase,
                    outcome,
                    payload.phase_transition_reason.clone(),
                ));
            }
            if decision.next_phase != state.current_phase {
                phase_transitioned = true;
            }
            state.current_phase = decision.next_phase;
            if let Some((mode_type, reason)) = decision.degraded_mode {
                enter_degraded_mode(state, mode_type, reason, now);
            }
        }

        if *case_status == CaseStatus::Consulting && payload.commit_to_investigation {
            if status::assert_valid(*case_status, CaseStatus::Investigating).is_ok() {
                commit_to_investigation(state, payload.proposed_problem_statement);
                *case_status = CaseStatus::Investigating;
            }
        } else if let Some(statement) = payload.proposed_problem_statement {
            if let Some(consulting) = state.consulting_data.as_mut() {
                consulting.proposed_problem_statement = Some(statement);
            }
        }

        state.working_conclusion = Some(conclusion::generate(
            &state.hypotheses,
            state.current_phase,
            turn,
            &self.config.confidence_thresholds,
            &self.config.hypothesis,
        ));

        // Step 7: automatic closure.
        if *case_status == CaseStatus::Investigating && state.progress.solution_verified {
            if status::assert_valid(*case_status, CaseStatus::Resolved).is_ok() {
                *case_status = CaseStatus::Resolved;
            }
        }

        // Step 8: degraded-mode check.
        let all_terminal_none_validated = !state.hypotheses.is_empty()
            && state.hypotheses.iter().all(|h| h.is_terminal())
            && state.validated_hypothesis().is_none();
        let blocked_over_threshold = state.progress_metrics.evidence_blocked_count
            >= self.config.degraded_mode.blocked_evidence_count;
        let step8_trigger = state.degraded_mode.is_none()
            && (state.turns_without_progress >= self.config.degraded_mode.turns_without_progress
                || all_terminal_none_validated
                || blocked_over_threshold);
        if step8_trigger {
            let reason = if state.turns_without_progress >= self.config.degraded_mode.turns_without_progress {
                "no progress for multiple turns"
            } else if all_terminal_none_validated {
                "all hypotheses exhausted without validation"
            } else {
                "too much blocked evidence"
            };
            enter_degraded_mode(
                state,
                crate::types::DegradedModeType::NoProgress,
                reason.to_string(),
                now,
            );
        }
        let degraded_mode_entered = !was_degraded_at_start && state.degraded_mode.is_some();

        // Step 9: memory maintenance.
        if memory_manager::should_compress(&state.memory, turn, &self.config.memory) {
            let mut memory = std::mem::take(&mut state.memory);
            memory_manager::compress(
                &mut memory,
                &state.turn_history,
                &state.hypotheses,
                &state.evidence,
                turn,
                now,
                &self.config.memory,
            );
            state.memory = memory;
        }

        // Step 10: turn outcome classification and log.
        let outcome = classify_outcome(&milestones_completed, &new_evidence, &hypotheses_changed, state);
        let progress_made = outcome == TurnOutcome::Progress
            || outcome == TurnOutcome::HypothesisValidated
            || outcome == TurnOutcome::SolutionApplied;
        if progress_made {
            state.turns_without_progress = 0;
        } else {
            state.turns_without_progress += 1;
        }

        state.turn_history.push(crate::state::TurnRecord {
            turn_number: turn,
            timestamp: now,
            phase: state.current_phase,
            user_input_summary,
            agent_action_summary: format!("{outcome:?}"),
            milestones_completed: milestones_completed.clone(),
            hypotheses_updated: hypotheses_changed.clone(),
            evidence_collected: new_evidence.iter().map(|e| e.id).collect(),
            outcome,
            progress_made,
        });

        TurnMetadata {
            turn_number: turn,
            outcome,
            milestones_completed,
            hypotheses_changed,
            phase_transitioned,
            degraded_mode_entered,
        }
    }

    /// High-level orchestration wiring the LLM and case repository ports
    /// around [`Self::apply_turn`]. On LLM failure, the turn is partially
    /// committed per spec §4.I: attachment evidence and the turn counter
    /// increment survive, no structured updates are applied, and the
    /// agent response is a fixed unavailability message.
    #[instrument(skip(self, llm, repo))]
    pub async fn process_turn(
        &self,
        llm: &dyn LlmPort,
        repo: &dyn CaseRepositoryPort,
        case_id: &str,
        user_id: &str,
        user_message: &str,
        attachments: Vec<Attachment>,
    ) -> Result<(String, TurnMetadata)> {
        let mut case = repo
            .get(case_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("case {case_id}")))?;
        if case.owner_id != user_id {
            return Err(Error::Unauthorized);
        }
        if case.status.is_terminal() {
            return Err(Error::invalid_transition(
                case.status.to_string(),
                case.status.to_string(),
                "case is in a terminal status",
            ));
        }

        let mut state = self.load_state(&case)?;
        state.current_turn += 1;
        let now = Utc::now();

        let new_evidence = self.attachment_evidence(&state, &attachments, state.current_turn);

        let ranked = hypothesis_manager::rank_by_likelihood(&state.hypotheses);
        let ranked_summary = ranked
            .iter()
            .take(5)
            .map(|h| format!("{} ({:.2})", h.statement, h.likelihood))
            .collect::<Vec<_>>()
            .join("; ");
        let anchoring = hypothesis_manager::detect_anchoring(
            &state.hypotheses,
            state.ooda_state.current_iteration,
            &self.config.hypothesis,
        );
        let messages = prompts::build_prompt(
            case.status,
            &state,
            user_message,
            "",
            "",
            &ranked_summary,
            anchoring.reason.as_deref(),
        );

        let response = llm
            .chat(ChatRequest {
                messages,
                model: None,
                temperature: None,
                max_tokens: None,
                response_format: Some(crate::ports::ResponseFormat::JsonObject),
            })
            .await;

        let (agent_response, payload) = match response {
            Ok(response) => {
                let payload = response
                    .parsed
                    .as_ref()
                    .and_then(|value| serde_json::from_value::<StateUpdatePayload>(value.clone()).ok())
                    .unwrap_or_default();
                (response.content, payload)
            }
            Err(_) => {
                for evidence in &new_evidence {
                    state.evidence.push(evidence.clone());
                }
                state.turn_history.push(crate::state::TurnRecord {
                    turn_number: state.current_turn,
                    timestamp: now,
                    phase: state.current_phase,
                    user_input_summary: user_message.to_string(),
                    agent_action_summary: "LLM unavailable".to_string(),
                    milestones_completed: Vec::new(),
                    hypotheses_updated: Vec::new(),
                    evidence_collected: new_evidence.iter().map(|e| e.id).collect(),
                    outcome: TurnOutcome::Blocked,
                    progress_made: false,
                });
                let metadata = TurnMetadata {
                    turn_number: state.current_turn,
                    outcome: TurnOutcome::Blocked,
                    milestones_completed: Vec::new(),
                    hypotheses_changed: Vec::new(),
                    phase_transitioned: false,
                    degraded_mode_entered: false,
                };
                case.metadata
                    .insert("investigation".to_string(), state.to_json()?);
                case.current_turn = state.current_turn;
                case.updated_at = now;
                repo.save(&case, true).await?;
                return Ok(("LLM unavailable — please try again shortly.".to_string(), metadata));
            }
        };

        let mut status = case.status;
        let metadata = self.apply_turn(
            &mut state,
            &mut status,
            payload,
            new_evidence,
            user_message.to_string(),
            user_id,
            now,
        );
        case.status = status;
        case.current_turn = state.current_turn;
        case.metadata
            .insert("investigation".to_string(), state.to_json()?);
        case.updated_at = now;
        repo.save(&case, true).await?;

        Ok((agent_response, metadata))
    }
}

fn commit_to_investigation(state: &mut InvestigationState, proposed_problem_statement: Option<String>) {
    let consulting = state.consulting_data.take().unwrap_or_default();
    if let Some(statement) = proposed_problem_statement.or(consulting.proposed_problem_statement) {
        state.anomaly_frame = Some(crate::state::AnomalyFrame::new(statement, state.current_turn));
    }
    state.strategy = InvestigationStrategy::from_matrix(state.temporal_state, state.urgency_level);
}

fn enter_degraded_mode(
    state: &mut InvestigationState,
    mode_type: crate::types::DegradedModeType,
    reason: String,
    now: chrono::DateTime<Utc>,
) {
    if state.degraded_mode.is_some() {
        return;
    }
    state.degraded_mode = Some(crate::state::DegradedModeData {
        mode_type,
        entered_at: now,
        reason,
        user_acknowledged: false,
    });
}

fn classify_outcome(
    milestones_completed: &[String],
    new_evidence: &[Evidence],
    hypotheses_changed: &[HypothesisId],
    state: &InvestigationState,
) -> TurnOutcome {
    if !milestones_completed.is_empty() {
        return TurnOutcome::Progress;
    }
    for id in hypotheses_changed {
        if let Some(hyp) = state.get_hypothesis(*id) {
            if hyp.status == crate::types::HypothesisStatus::Validated {
                return TurnOutcome::HypothesisValidated;
            }
            if hyp.status == crate::types::HypothesisStatus::Refuted {
                return TurnOutcome::HypothesisRefuted;
            }
        }
    }
    if state.progress.solution_applied {
        return TurnOutcome::SolutionApplied;
    }
    if !new_evidence.is_empty() {
        return TurnOutcome::EvidenceCollected;
    }
    TurnOutcome::Conversation
}
