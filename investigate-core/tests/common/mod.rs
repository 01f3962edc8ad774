//! Shared fakes for the integration tests in this directory: an
//! in-memory repository and a scripted LLM that returns one queued
//! response per call.

use std::sync::Mutex;

use async_trait::async_trait;
use investigate_core::{
    CaseFilters, CaseRecord, CaseRepositoryPort, CaseStatus, ChatRequest, ChatResponse, Error,
    LlmPort, Pagination, Result, TokenUsage,
};
use serde_json::Value;

pub struct InMemoryRepo {
    cases: Mutex<std::collections::HashMap<String, CaseRecord>>,
}

impl InMemoryRepo {
    pub fn new(case: CaseRecord) -> Self {
        let mut cases = std::collections::HashMap::new();
        cases.insert(case.case_id.clone(), case);
        Self { cases: Mutex::new(cases) }
    }

    pub fn snapshot(&self, case_id: &str) -> CaseRecord {
        self.cases.lock().unwrap().get(case_id).cloned().unwrap()
    }
}

#[async_trait]
impl CaseRepositoryPort for InMemoryRepo {
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
        owner_id: &str,
        filters: CaseFilters,
        pagination: Pagination,
    ) -> Result<Vec<CaseRecord>> {
        let mut matching: Vec<CaseRecord> = self
            .cases
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.owner_id == owner_id)
            .filter(|c| filters.status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();
        matching.sort_by_key(|c| std::cmp::Reverse(c.updated_at));
        let start = pagination.offset as usize;
        let end = start.saturating_add(pagination.limit as usize);
        Ok(matching.into_iter().skip(start).take(end.saturating_sub(start)).collect())
    }

    async fn delete(&self, case_id: &str) -> Result<()> {
        self.cases.lock().unwrap().remove(case_id);
        Ok(())
    }
}

pub fn bare_case(case_id: &str, owner_id: &str, status: CaseStatus) -> CaseRecord {
    CaseRecord {
        case_id: case_id.to_string(),
        owner_id: owner_id.to_string(),
        status,
        current_turn: 0,
        metadata: serde_json::Map::new(),
        updated_at: chrono::Utc::now(),
    }
}

/// A scripted LLM: each call pops the next queued outcome. Once the queue
/// is drained, calls fail with `UpstreamUnavailable` — exercising the
/// partial-turn-commit path without extra test plumbing.
pub struct ScriptedLlm {
    responses: Mutex<Vec<Option<Value>>>,
}

impl ScriptedLlm {
    pub fn queue(responses: Vec<Option<Value>>) -> Self {
        Self { responses: Mutex::new(responses) }
    }
}

#[async_trait]
impl LlmPort for ScriptedLlm {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        let next = self.responses.lock().unwrap().pop();
        match next {
            Some(Some(payload)) => Ok(ChatResponse {
                content: "acknowledged".to_string(),
                model: "scripted".to_string(),
                usage: TokenUsage::default(),
                finish_reason: "stop".to_string(),
                tool_calls: Vec::new(),
                parsed: Some(payload),
            }),
            Some(None) => Err(Error::upstream_unavailable("scripted-llm", "simulated failure")),
            None => Err(Error::upstream_unavailable("scripted-llm", "queue exhausted")),
        }
    }

    async fn embed(&self, _text: &str, _model: Option<&str>) -> Result<Vec<f32>> {
        Ok(vec![0.0; 8])
    }
}

/// Helper to queue responses in call order (the fake pops from the back,
/// so push in reverse).
pub fn scripted_llm(mut responses: Vec<Option<Value>>) -> ScriptedLlm {
    responses.reverse();
    ScriptedLlm::queue(responses)
}
