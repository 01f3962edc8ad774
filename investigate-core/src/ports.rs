//! External collaborator contracts.
//!
//! These traits are the engine's only window onto the outside world: an
//! LLM, the case repository, file storage, a vector index, and a job
//! queue. Concrete adapters live outside this crate; here we only fix the
//! shape so the engine can be driven by fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A single chat message in an LLM request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// The response format requested of the LLM for a structured-update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponseFormat {
    Text,
    JsonObject,
    JsonSchema(Value),
}

/// A tool call the model requested, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments_json: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: String,
    pub tool_calls: Vec<ToolCall>,
    /// The parsed structured-update payload, when a JSON response format
    /// was requested and the model complied.
    pub parsed: Option<Value>,
}

/// The engine's view of an LLM provider. Retries, timeouts, and routing
/// across providers are the concrete adapter's responsibility; the core
/// only ever calls `chat` and treats any failure as
/// [`crate::error::Error::UpstreamUnavailable`].
#[async_trait]
pub trait LlmPort: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    async fn embed(&self, text: &str, model: Option<&str>) -> Result<Vec<f32>>;
}

/// A case record as the core sees it: status, ownership, and the opaque
/// `metadata` JSON object housing `investigation` and `status_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: String,
    pub owner_id: String,
    pub status: crate::types::CaseStatus,
    pub current_turn: u32,
    pub metadata: serde_json::Map<String, Value>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Narrowing filters for [`CaseRepositoryPort::list_for_owner`]. `None`
/// means unfiltered on that field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseFilters {
    pub status: Option<crate::types::CaseStatus>,
}

/// Offset-based pagination for `list_for_owner`, mirroring the
/// `limit`/`offset` pair the outer HTTP layer exposes on its list
/// endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { limit: 20, offset: 0 }
    }
}

/// Case repository port. The `dirty` flag on `save` hints to the
/// underlying store that the JSON `metadata` column must be re-persisted
/// even if the surrounding row looks unchanged.
#[async_trait]
pub trait CaseRepositoryPort: Send + Sync {
    async fn get(&self, case_id: &str) -> Result<Option<CaseRecord>>;

    async fn save(&self, case: &CaseRecord, dirty: bool) -> Result<()>;

    async fn list_for_owner(
        &self,
        owner_id: &str,
        filters: CaseFilters,
        pagination: Pagination,
    ) -> Result<Vec<CaseRecord>>;

    async fn delete(&self, case_id: &str) -> Result<()>;
}

/// Blob storage for evidence attachments and generated report files.
#[async_trait]
pub trait FilePort: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    async fn download(&self, path: &str) -> Result<Vec<u8>>;

    async fn delete(&self, path: &str) -> Result<()>;

    async fn exists(&self, path: &str) -> Result<bool>;

    async fn get_url(&self, path: &str, expires_in_secs: Option<u64>) -> Result<String>;
}

/// Semantic search over embedded evidence/hypotheses. A search failure is
/// treated as an empty result, not a fatal turn error.
#[async_trait]
pub trait VectorPort: Send + Sync {
    async fn upsert(&self, collection: &str, id: &str, vector: Vec<f32>, metadata: Value) -> Result<()>;

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        top_k: usize,
        filter: Option<Value>,
    ) -> Result<Vec<(String, f32)>>;

    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: String,
    pub state: String,
}

/// Background job submission for document/evidence processing and batch
/// report generation. The engine core never blocks on a job; it only
/// enqueues.
#[async_trait]
pub trait JobQueuePort: Send + Sync {
    async fn enqueue(
        &self,
        job_type: &str,
        payload: Value,
        queue: Option<&str>,
        priority: Option<i32>,
    ) -> Result<String>;

    async fn get_status(&self, job_id: &str) -> Result<JobStatus>;

    async fn get_result(&self, job_id: &str) -> Result<Option<Value>>;

    async fn cancel(&self, job_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_role_serializes_snake_case() {
        let json = serde_json::to_string(&ChatRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn token_usage_defaults_to_zero() {
        let usage = TokenUsage::default();
        assert_eq!(usage.prompt_tokens, 0);
        assert_eq!(usage.completion_tokens, 0);
    }
}
