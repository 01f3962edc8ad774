//! Hierarchical memory tiers bounding the engine's prompt context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::evidence::EvidenceId;
use crate::state::hypothesis::HypothesisId;
use crate::types::MemoryTier;

/// A compressed window of turn history at a given fidelity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub snapshot_id: String,
    pub turn_range: (u32, u32),
    pub tier: MemoryTier,
    pub content_summary: String,
    pub key_insights: Vec<String>,
    pub evidence_ids: Vec<EvidenceId>,
    pub hypothesis_ids: Vec<HypothesisId>,
    pub confidence_delta: f64,
    pub token_count_estimate: u32,
    pub created_at: DateTime<Utc>,
}

/// Hot/warm/cold tiering of turn history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HierarchicalMemory {
    pub hot: Vec<MemorySnapshot>,
    pub warm: Vec<MemorySnapshot>,
    pub cold: Vec<MemorySnapshot>,
    /// Turn number at which compression last ran.
    pub last_compressed_at_turn: u32,
}
