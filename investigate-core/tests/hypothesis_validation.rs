//! Hypothesis validation across two turns of supporting evidence, and the
//! resulting working conclusion.

mod common;

use std::sync::Arc;

use investigate_core::{CaseStatus, ConfidenceLevel, EngineConfig, MilestoneEngine};
use serde_json::json;

#[tokio::test]
async fn two_supporting_links_validate_a_hypothesis_and_update_the_conclusion() {
    let repo = common::InMemoryRepo::new(common::bare_case("case-2", "user-1", CaseStatus::Investigating));
    let engine = MilestoneEngine::new(Arc::new(EngineConfig::default()));

    let llm = common::scripted_llm(vec![Some(json!({
        "new_hypotheses": [
            {"statement": "connection pool exhaustion", "category": "infrastructure", "likelihood": 0.5}
        ]
    }))]);
    engine
        .process_turn(&llm, &repo, "case-2", "user-1", "pool looks maxed out", Vec::new())
        .await
        .unwrap();

    let case = repo.snapshot("case-2");
    let state = investigate_core::InvestigationState::from_json(
        case.metadata.get("investigation").unwrap().clone(),
    )
    .unwrap();
    let hyp_id = state.hypotheses[0].id;
    assert_eq!(state.hypotheses[0].likelihood, 0.5);

    let llm2 = common::scripted_llm(vec![Some(json!({
        "hypothesis_updates": [{
            "hypothesis_id": hyp_id.to_string(),
            "supporting_evidence_ids": [uuid::Uuid::new_v4().to_string()]
        }]
    }))]);
    let (_, metadata2) = engine
        .process_turn(&llm2, &repo, "case-2", "user-1", "metrics confirm it", Vec::new())
        .await
        .unwrap();
    assert_eq!(metadata2.outcome, investigate_core::TurnOutcome::Conversation);

    let llm3 = common::scripted_llm(vec![Some(json!({
        "hypothesis_updates": [{
            "hypothesis_id": hyp_id.to_string(),
            "supporting_evidence_ids": [uuid::Uuid::new_v4().to_string()]
        }]
    }))]);
    let (_, metadata3) = engine
        .process_turn(&llm3, &repo, "case-2", "user-1", "second data point confirms it", Vec::new())
        .await
        .unwrap();
    assert_eq!(metadata3.outcome, investigate_core::TurnOutcome::HypothesisValidated);

    let case_final = repo.snapshot("case-2");
    let state_final = investigate_core::InvestigationState::from_json(
        case_final.metadata.get("investigation").unwrap().clone(),
    )
    .unwrap();
    let hyp = &state_final.hypotheses[0];
    assert_eq!(hyp.status, investigate_core::HypothesisStatus::Validated);
    assert!((hyp.likelihood - 0.80).abs() < 1e-9);

    let conclusion = state_final.working_conclusion.unwrap();
    assert_eq!(conclusion.statement, "connection pool exhaustion");
    assert_eq!(conclusion.confidence_level, ConfidenceLevel::Likely);
    assert!(conclusion.can_proceed_with_solution);
}
