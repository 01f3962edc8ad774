//! Closure automation: once `solution_verified` flips, the case moves to
//! RESOLVED without a separate status-change call, and a subsequent turn
//! on the closed case is rejected.

mod common;

use std::sync::Arc;

use investigate_core::{CaseStatus, EngineConfig, Error, MilestoneEngine};
use serde_json::json;

#[tokio::test]
async fn resolved_case_rejects_further_turns() {
    let repo = common::InMemoryRepo::new(common::bare_case("case-4", "user-1", CaseStatus::Investigating));
    let engine = MilestoneEngine::new(Arc::new(EngineConfig::default()));

    let llm = common::scripted_llm(vec![Some(json!({
        "milestones_completed": [
            "symptom_verified", "scope_assessed", "timeline_established",
            "changes_identified", "root_cause_identified",
            "solution_proposed", "solution_applied", "solution_verified"
        ]
    }))]);
    engine
        .process_turn(&llm, &repo, "case-4", "user-1", "fix confirmed in prod", Vec::new())
        .await
        .unwrap();

    let case = repo.snapshot("case-4");
    assert_eq!(case.status, CaseStatus::Resolved);

    let llm2 = common::scripted_llm(vec![Some(json!({}))]);
    let err = engine
        .process_turn(&llm2, &repo, "case-4", "user-1", "one more question", Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
}
