//! Investigation Service: the thin façade a host application calls into.
//!
//! Every operation takes `(case_id, user_id)` and rejects ownership
//! mismatches with [`Error::Unauthorized`] before doing anything else —
//! the same shape as the Milestone Engine's own ownership check in
//! `process_turn`, kept consistent here for the operations that don't go
//! through a full LLM turn.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::ports::{CaseRecord, CaseRepositoryPort};
use crate::state::{Evidence, EvidenceId, Hypothesis, HypothesisId, InvestigationState};
use crate::types::{
    CaseStatus, EvidenceCategory, EvidenceForm, EvidenceSourceType, HypothesisCategory,
    HypothesisGenerationMode, HypothesisStatus, TemporalState, UrgencyLevel,
};
use crate::{hypothesis_manager, status};

/// A read-only snapshot of investigation progress for display, built
/// fresh on every call rather than cached on the state document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub current_phase: crate::types::InvestigationPhase,
    pub current_turn: u32,
    pub completed_milestones: Vec<String>,
    pub pending_milestones: Vec<String>,
    pub completion_percentage: f64,
    pub current_stage: String,
    pub active_hypothesis_count: usize,
    pub validated_hypothesis: Option<String>,
    pub degraded: bool,
}

/// Façade over the Investigation Engine for operations that don't require
/// a full LLM turn: initialization, direct hypothesis/evidence edits, and
/// progress reads. `process_turn` itself lives on
/// [`crate::engine::MilestoneEngine`] — this service delegates to the
/// same repository port rather than duplicating persistence.
pub struct InvestigationService {
    config: Arc<EngineConfig>,
}

impl InvestigationService {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    async fn load_owned(
        &self,
        repo: &dyn CaseRepositoryPort,
        case_id: &str,
        user_id: &str,
    ) -> Result<(CaseRecord, InvestigationState)> {
        let case = repo
            .get(case_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("case {case_id}")))?;
        if case.owner_id != user_id {
            return Err(Error::Unauthorized);
        }
        let state = match case.metadata.get("investigation") {
            Some(value) => InvestigationState::from_json(value.clone())?,
            None => return Err(Error::invariant_violation("case has no investigation state")),
        };
        Ok((case, state))
    }

    fn persist(case: &mut CaseRecord, state: &InvestigationState, now: DateTime<Utc>) -> Result<()> {
        case.metadata.insert("investigation".to_string(), state.to_json()?);
        case.updated_at = now;
        Ok(())
    }

    /// Start a formal investigation for a brand-new case, seeding the
    /// strategy from the temporal/urgency matrix. Refuses if a state
    /// document already exists.
    #[instrument(skip(self, repo))]
    pub async fn initialize(
        &self,
        repo: &dyn CaseRepositoryPort,
        case_id: &str,
        user_id: &str,
        problem_statement: Option<String>,
        temporal_state: TemporalState,
        urgency_level: UrgencyLevel,
        now: DateTime<Utc>,
    ) -> Result<InvestigationState> {
        let mut case = repo
            .get(case_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("case {case_id}")))?;
        if case.owner_id != user_id {
            return Err(Error::Unauthorized);
        }
        if case.metadata.contains_key("investigation") {
            return Err(Error::invariant_violation(
                "investigation already initialized for this case",
            ));
        }

        let mut state = InvestigationState::new(temporal_state, urgency_level, now);
        if let Some(statement) = problem_statement {
            state.anomaly_frame = Some(crate::state::AnomalyFrame::new(statement, 0));
        }

        Self::persist(&mut case, &state, now)?;
        case.status = CaseStatus::Investigating;
        repo.save(&case, true).await?;
        Ok(state)
    }

    /// Manually record a hypothesis, bypassing the LLM turn loop.
    #[instrument(skip(self, repo))]
    pub async fn add_hypothesis(
        &self,
        repo: &dyn CaseRepositoryPort,
        case_id: &str,
        user_id: &str,
        statement: String,
        category: HypothesisCategory,
        likelihood: f64,
        now: DateTime<Utc>,
    ) -> Result<HypothesisId> {
        let (mut case, mut state) = self.load_owned(repo, case_id, user_id).await?;
        let hypothesis = Hypothesis::new(
            statement,
            category,
            likelihood,
            state.current_turn,
            HypothesisGenerationMode::Opportunistic,
        );
        let id = hypothesis.id;
        state.hypotheses.push(hypothesis);
        Self::persist(&mut case, &state, now)?;
        repo.save(&case, true).await?;
        Ok(id)
    }

    /// Directly set a hypothesis's status, applying supporting/refuting
    /// evidence links first if given. Rejects edits against a hypothesis
    /// already in a terminal status, same as the turn-processing path.
    #[instrument(skip(self, repo, evidence_ids))]
    pub async fn update_hypothesis_status(
        &self,
        repo: &dyn CaseRepositoryPort,
        case_id: &str,
        user_id: &str,
        hypothesis_id: HypothesisId,
        new_status: HypothesisStatus,
        evidence_ids: Vec<EvidenceId>,
        supports: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let (mut case, mut state) = self.load_owned(repo, case_id, user_id).await?;
        let turn = state.current_turn;
        let hyp = state
            .get_hypothesis_mut(hypothesis_id)
            .ok_or_else(|| Error::not_found(format!("hypothesis {hypothesis_id}")))?;
        if hyp.is_terminal() {
            return Err(Error::invariant_violation(format!(
                "hypothesis {hypothesis_id} is already in a terminal status"
            )));
        }
        for evidence_id in evidence_ids {
            if supports {
                hypothesis_manager::apply_supporting_evidence(
                    hyp,
                    evidence_id,
                    turn,
                    &self.config.hypothesis,
                );
            } else {
                hypothesis_manager::apply_refuting_evidence(
                    hyp,
                    evidence_id,
                    turn,
                    &self.config.hypothesis,
                );
            }
        }
        hyp.status = new_status;
        Self::persist(&mut case, &state, now)?;
        repo.save(&case, true).await?;
        Ok(())
    }

    /// Record evidence directly, without linking it to any hypothesis yet.
    #[instrument(skip(self, repo, description))]
    pub async fn add_evidence(
        &self,
        repo: &dyn CaseRepositoryPort,
        case_id: &str,
        user_id: &str,
        description: String,
        category: EvidenceCategory,
        form: EvidenceForm,
        source_type: EvidenceSourceType,
        now: DateTime<Utc>,
    ) -> Result<crate::state::EvidenceId> {
        let (mut case, mut state) = self.load_owned(repo, case_id, user_id).await?;
        let evidence = Evidence::new(description, category, form, source_type, state.current_turn);
        let id = evidence.id;
        state.evidence.push(evidence);
        state.progress_metrics.evidence_provided_count += 1;
        Self::persist(&mut case, &state, now)?;
        repo.save(&case, true).await?;
        Ok(id)
    }

    /// Force-recompute the working conclusion outside the normal turn
    /// cadence (e.g. in response to a UI "refresh" action).
    #[instrument(skip(self, repo))]
    pub async fn refresh_working_conclusion(
        &self,
        repo: &dyn CaseRepositoryPort,
        case_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<crate::state::WorkingConclusion> {
        let (mut case, mut state) = self.load_owned(repo, case_id, user_id).await?;
        let conclusion = crate::conclusion::generate(
            &state.hypotheses,
            state.current_phase,
            state.current_turn,
            &self.config.confidence_thresholds,
            &self.config.hypothesis,
        );
        state.working_conclusion = Some(conclusion.clone());
        Self::persist(&mut case, &state, now)?;
        repo.save(&case, true).await?;
        Ok(conclusion)
    }

    /// Read-only progress snapshot. Returns `None` if no investigation has
    /// been initialized yet rather than erroring, so callers can render an
    /// empty-state view.
    #[instrument(skip(self, repo))]
    pub async fn get_progress(
        &self,
        repo: &dyn CaseRepositoryPort,
        case_id: &str,
        user_id: &str,
    ) -> Result<Option<ProgressSummary>> {
        let case = repo
            .get(case_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("case {case_id}")))?;
        if case.owner_id != user_id {
            return Err(Error::Unauthorized);
        }
        let Some(value) = case.metadata.get("investigation") else {
            return Ok(None);
        };
        let state = InvestigationState::from_json(value.clone())?;

        Ok(Some(ProgressSummary {
            current_phase: state.current_phase,
            current_turn: state.current_turn,
            completed_milestones: state
                .progress
                .completed_milestones()
                .into_iter()
                .map(String::from)
                .collect(),
            pending_milestones: state
                .progress
                .pending_milestones()
                .into_iter()
                .map(String::from)
                .collect(),
            completion_percentage: state.progress.completion_percentage(),
            current_stage: state.progress.current_stage().to_string(),
            active_hypothesis_count: state.active_hypotheses().count(),
            validated_hypothesis: state.validated_hypothesis().map(|h| h.statement.clone()),
            degraded: state.degraded_mode.is_some(),
        }))
    }

    /// Acknowledge the current degraded-mode episode: marks it
    /// user-acknowledged and resets the stall counter that triggered it,
    /// without clearing `degraded_mode` itself — the episode stays on the
    /// record until the next turn naturally resolves or escalates it.
    #[instrument(skip(self, repo))]
    pub async fn acknowledge_degraded_mode(
        &self,
        repo: &dyn CaseRepositoryPort,
        case_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let (mut case, mut state) = self.load_owned(repo, case_id, user_id).await?;
        let Some(degraded) = state.degraded_mode.as_mut() else {
            return Err(Error::invariant_violation("no active degraded-mode episode"));
        };
        degraded.user_acknowledged = true;
        state.turns_without_progress = 0;
        Self::persist(&mut case, &state, now)?;
        repo.save(&case, true).await?;
        Ok(())
    }

    /// Apply a manual status transition (e.g. operator-forced closure),
    /// going through the same status machine the turn loop uses.
    #[instrument(skip(self, repo))]
    pub async fn set_case_status(
        &self,
        repo: &dyn CaseRepositoryPort,
        case_id: &str,
        user_id: &str,
        new_status: CaseStatus,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let case = repo
            .get(case_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("case {case_id}")))?;
        if case.owner_id != user_id {
            return Err(Error::Unauthorized);
        }
        status::assert_valid(case.status, new_status)?;
        let mut case = case;
        case.status = new_status;
        let _ = reason;
        case.updated_at = now;
        repo.save(&case, false).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeRepo {
        cases: Mutex<std::collections::HashMap<String, CaseRecord>>,
    }

    impl FakeRepo {
        fn with_case(case: CaseRecord) -> Self {
            let mut cases = std::collections::HashMap::new();
            cases.insert(case.case_id.clone(), case);
            Self { cases: Mutex::new(cases) }
        }
    }

    #[async_trait]
    impl CaseRepositoryPort for FakeRepo {
        async fn get(&self, case_id: &str) -> Result<Option<CaseRecord>> {
            Ok(self.cases.lock().unwrap().get(case_id).cloned())
        }
        async fn save(&self, case: &CaseRecord, _dirty: bool) -> Result<()> {
            self.cases
                .lock()
                .unwrap()
                .insert(case.case_id.clone(), case.clone());
            Ok(())
        }
        async fn list_for_owner(
            &self,
            _owner_id: &str,
            _filters: crate::ports::CaseFilters,
            _pagination: crate::ports::Pagination,
        ) -> Result<Vec<CaseRecord>> {
            Ok(Vec::new())
        }
        async fn delete(&self, case_id: &str) -> Result<()> {
            self.cases.lock().unwrap().remove(case_id);
            Ok(())
        }
    }

    fn bare_case(case_id: &str, owner_id: &str) -> CaseRecord {
        CaseRecord {
            case_id: case_id.to_string(),
            owner_id: owner_id.to_string(),
            status: CaseStatus::Consulting,
            current_turn: 0,
            metadata: serde_json::Map::new(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn initialize_seeds_state_and_flips_status_to_investigating() {
        let repo = FakeRepo::with_case(bare_case("case-1", "user-1"));
        let service = InvestigationService::new(Arc::new(EngineConfig::default()));
        let state = service
            .initialize(
                &repo,
                "case-1",
                "user-1",
                Some("checkout returns 500".to_string()),
                TemporalState::Ongoing,
                UrgencyLevel::High,
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(state.current_turn, 0);
        let case = repo.get("case-1").await.unwrap().unwrap();
        assert_eq!(case.status, CaseStatus::Investigating);
        assert!(case.metadata.contains_key("investigation"));
    }

    #[tokio::test]
    async fn initialize_twice_is_rejected() {
        let repo = FakeRepo::with_case(bare_case("case-1", "user-1"));
        let service = InvestigationService::new(Arc::new(EngineConfig::default()));
        service
            .initialize(&repo, "case-1", "user-1", None, TemporalState::Ongoing, UrgencyLevel::Low, Utc::now())
            .await
            .unwrap();
        let err = service
            .initialize(&repo, "case-1", "user-1", None, TemporalState::Ongoing, UrgencyLevel::Low, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
    }

    #[tokio::test]
    async fn operations_reject_mismatched_owner() {
        let repo = FakeRepo::with_case(bare_case("case-1", "user-1"));
        let service = InvestigationService::new(Arc::new(EngineConfig::default()));
        let err = service
            .get_progress(&repo, "case-1", "someone-else")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
    }

    #[tokio::test]
    async fn get_progress_is_none_before_initialization() {
        let repo = FakeRepo::with_case(bare_case("case-1", "user-1"));
        let service = InvestigationService::new(Arc::new(EngineConfig::default()));
        let progress = service.get_progress(&repo, "case-1", "user-1").await.unwrap();
        assert!(progress.is_none());
    }

    #[tokio::test]
    async fn add_hypothesis_then_validate_rejects_second_edit_after_terminal() {
        let repo = FakeRepo::with_case(bare_case("case-1", "user-1"));
        let service = InvestigationService::new(Arc::new(EngineConfig::default()));
        service
            .initialize(&repo, "case-1", "user-1", None, TemporalState::Ongoing, UrgencyLevel::Low, Utc::now())
            .await
            .unwrap();
        let hyp_id = service
            .add_hypothesis(
                &repo,
                "case-1",
                "user-1",
                "bad deploy".to_string(),
                HypothesisCategory::Code,
                0.9,
                Utc::now(),
            )
            .await
            .unwrap();
        service
            .update_hypothesis_status(
                &repo,
                "case-1",
                "user-1",
                hyp_id,
                HypothesisStatus::Validated,
                Vec::new(),
                true,
                Utc::now(),
            )
            .await
            .unwrap();
        let err = service
            .update_hypothesis_status(
                &repo,
                "case-1",
                "user-1",
                hyp_id,
                HypothesisStatus::Refuted,
                Vec::new(),
                false,
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
    }

    #[tokio::test]
    async fn acknowledge_degraded_mode_resets_stall_counter() {
        let repo = FakeRepo::with_case(bare_case("case-1", "user-1"));
        let service = InvestigationService::new(Arc::new(EngineConfig::default()));
        service
            .initialize(&repo, "case-1", "user-1", None, TemporalState::Ongoing, UrgencyLevel::Low, Utc::now())
            .await
            .unwrap();
        {
            let mut case = repo.get("case-1").await.unwrap().unwrap();
            let mut state =
                InvestigationState::from_json(case.metadata.get("investigation").unwrap().clone())
                    .unwrap();
            state.turns_without_progress = 5;
            state.degraded_mode = Some(crate::state::DegradedModeData {
                mode_type: crate::types::DegradedModeType::NoProgress,
                entered_at: Utc::now(),
                reason: "stalled".to_string(),
                user_acknowledged: false,
            });
            case.metadata
                .insert("investigation".to_string(), state.to_json().unwrap());
            repo.save(&case, true).await.unwrap();
        }
        service
            .acknowledge_degraded_mode(&repo, "case-1", "user-1", Utc::now())
            .await
            .unwrap();
        let case = repo.get("case-1").await.unwrap().unwrap();
        let state =
            InvestigationState::from_json(case.metadata.get("investigation").unwrap().clone())
                .unwrap();
        assert_eq!(state.turns_without_progress, 0);
        assert!(state.degraded_mode.unwrap().user_acknowledged);
    }
}
