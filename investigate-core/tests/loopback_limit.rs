//! Phase loop-back safety limit: the fourth HYPOTHESIS_REFUTED signal in a
//! row pushes the investigation into degraded mode instead of looping
//! back a fourth time.

mod common;

use std::sync::Arc;

use investigate_core::{
    CaseRepositoryPort, CaseStatus, DegradedModeType, EngineConfig, InvestigationPhase,
    InvestigationState, MilestoneEngine, TemporalState, UrgencyLevel,
};
use serde_json::json;

fn case_at_validation_phase() -> investigate_core::CaseRecord {
    let mut state = InvestigationState::new(TemporalState::Ongoing, UrgencyLevel::High, chrono::Utc::now());
    state.current_phase = InvestigationPhase::Validation;
    let mut case = common::bare_case("case-5", "user-1", CaseStatus::Investigating);
    case.metadata
        .insert("investigation".to_string(), state.to_json().unwrap());
    case
}

#[tokio::test]
async fn fourth_consecutive_refutation_enters_degraded_mode_instead_of_looping_again() {
    let repo = common::InMemoryRepo::new(case_at_validation_phase());
    let engine = MilestoneEngine::new(Arc::new(EngineConfig::default()));

    for round in 0..3 {
        let llm = common::scripted_llm(vec![Some(json!({
            "phase_transition": "hypothesis_refuted",
            "phase_transition_reason": "evidence contradicted the leading hypothesis"
        }))]);
        let (_, metadata) = engine
            .process_turn(&llm, &repo, "case-5", "user-1", "that wasn't it either", Vec::new())
            .await
            .unwrap();
        assert!(metadata.phase_transitioned, "loopback {round} should move the phase back to hypothesis");
        assert!(!metadata.degraded_mode_entered, "loopback {round} should not yet be degraded");

        // Move back to Validation so the next round can loop back again.
        let mut case = repo.snapshot("case-5");
        let mut state = InvestigationState::from_json(
            case.metadata.get("investigation").unwrap().clone(),
        )
        .unwrap();
        state.current_phase = InvestigationPhase::Validation;
        case.metadata
            .insert("investigation".to_string(), state.to_json().unwrap());
        repo.save(&case, true).await.unwrap();
    }

    let llm_fourth = common::scripted_llm(vec![Some(json!({
        "phase_transition": "hypothesis_refuted",
        "phase_transition_reason": "still wrong"
    }))]);
    let (_, metadata_fourth) = engine
        .process_turn(&llm_fourth, &repo, "case-5", "user-1", "nope, still broken", Vec::new())
        .await
        .unwrap();
    assert!(!metadata_fourth.phase_transitioned);
    assert!(metadata_fourth.degraded_mode_entered);

    let case = repo.snapshot("case-5");
    let state = InvestigationState::from_json(case.metadata.get("investigation").unwrap().clone()).unwrap();
    assert_eq!(state.current_phase, InvestigationPhase::Validation);
    assert_eq!(
        state.degraded_mode.unwrap().mode_type,
        DegradedModeType::LoopbackLimitExceeded
    );
    assert_eq!(state.phase_loopbacks.len(), 3);
}
