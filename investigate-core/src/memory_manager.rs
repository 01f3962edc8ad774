//! Memory Manager: tiers `turn_history` into hot/warm/cold snapshots to
//! bound the prompt context. Cold also carries a standing archive of
//! VALIDATED/REFUTED hypotheses, built directly from hypothesis status
//! rather than from warm-tier overflow.
//!
//! Compression is idempotent and deterministic — the same input state
//! always produces the same tiering, so callers can re-run it freely.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::MemoryConfig;
use crate::state::{Evidence, HierarchicalMemory, Hypothesis, MemorySnapshot, TurnRecord};
use crate::types::{HypothesisStatus, MemoryTier};

/// Whether compression should run this turn.
pub fn should_compress(memory: &HierarchicalMemory, current_turn: u32, cfg: &MemoryConfig) -> bool {
    let turns_since = current_turn.saturating_sub(memory.last_compressed_at_turn);
    turns_since >= cfg.compress_every_n_turns || memory.hot.len() > cfg.compress_when_hot_exceeds
}

/// Run one compression pass: demote overflow hot snapshots to warm,
/// overflow warm into cold, and discard overflow cold.
///
/// Falls back deterministically to concatenation-with-truncation for the
/// summary text — no LLM call happens here; an LLM-backed summariser, if
/// wired in by the caller, is expected to replace `content_summary`
/// afterwards and fall back to this same output on any error.
pub fn compress(
    memory: &mut HierarchicalMemory,
    turn_history: &[TurnRecord],
    hypotheses: &[Hypothesis],
    evidence: &[Evidence],
    current_turn: u32,
    now: DateTime<Utc>,
    cfg: &MemoryConfig,
) {
    refresh_hot(memory, turn_history, cfg, now);
    refresh_warm(memory, hypotheses, evidence, cfg, now);
    refresh_cold(memory, hypotheses, now);

    while memory.cold.len() > cfg.cold_capacity {
        memory.cold.remove(0);
    }

    memory.last_compressed_at_turn = current_turn;
    debug!(
        hot = memory.hot.len(),
        warm = memory.warm.len(),
        cold = memory.cold.len(),
        "memory compression pass complete"
    );
}

fn refresh_hot(
    memory: &mut HierarchicalMemory,
    turn_history: &[TurnRecord],
    cfg: &MemoryConfig,
    now: DateTime<Utc>,
) {
    let recent: Vec<&TurnRecord> = turn_history
        .iter()
        .rev()
        .take(cfg.hot_capacity)
        .collect();

    memory.hot = recent
        .into_iter()
        .rev()
        .map(|turn| MemorySnapshot {
            snapshot_id: format!("hot-{}", turn.turn_number),
            turn_range: (turn.turn_number, turn.turn_number),
            tier: MemoryTier::Hot,
            content_summary: format!(
                "turn {}: {} | {}",
                turn.turn_number, turn.user_input_summary, turn.agent_action_summary
            ),
            key_insights: turn.milestones_completed.clone(),
            evidence_ids: turn.evidence_collected.clone(),
            hypothesis_ids: turn.hypotheses_updated.clone(),
            confidence_delta: 0.0,
            token_count_estimate: 500,
            created_at: now,
        })
        .collect();

    while memory.hot.len() > cfg.hot_capacity {
        let demoted = memory.hot.remove(0);
        memory.warm.push(demoted);
    }
}

fn refresh_warm(
    memory: &mut HierarchicalMemory,
    hypotheses: &[Hypothesis],
    evidence: &[Evidence],
    cfg: &MemoryConfig,
    now: DateTime<Utc>,
) {
    let active_ids: Vec<_> = hypotheses
        .iter()
        .filter(|h| h.status == HypothesisStatus::Active)
        .map(|h| h.id)
        .collect();

    if !active_ids.is_empty() {
        let recent_evidence: Vec<_> = evidence.iter().rev().take(5).map(|e| e.id).collect();
        memory.warm.push(MemorySnapshot {
            snapshot_id: format!("warm-active-{now}"),
            turn_range: (0, 0),
            tier: MemoryTier::Warm,
            content_summary: format!("{} active hypotheses under test", active_ids.len()),
            key_insights: Vec::new(),
            evidence_ids: recent_evidence,
            hypothesis_ids: active_ids,
            confidence_delta: 0.0,
            token_count_estimate: 300,
            created_at: now,
        });
    }

    while memory.warm.len() > cfg.warm_capacity {
        let oldest = memory.warm.remove(0);
        memory.cold.push(MemorySnapshot {
            tier: MemoryTier::Cold,
            token_count_estimate: 100,
            ..oldest
        });
    }
}

const COLD_ARCHIVE_SNAPSHOT_ID: &str = "cold-archived-hypotheses";

/// Archive terminal hypotheses (VALIDATED/REFUTED) into a dedicated cold
/// snapshot, independent of whatever overflowed out of warm. Re-running
/// this replaces the previous archive snapshot rather than appending to
/// it, so repeated compression passes stay idempotent.
fn refresh_cold(memory: &mut HierarchicalMemory, hypotheses: &[Hypothesis], now: DateTime<Utc>) {
    memory.cold.retain(|s| s.snapshot_id != COLD_ARCHIVE_SNAPSHOT_ID);

    let archived: Vec<&Hypothesis> = hypotheses
        .iter()
        .filter(|h| matches!(h.status, HypothesisStatus::Validated | HypothesisStatus::Refuted))
        .collect();
    if archived.is_empty() {
        return;
    }

    let key_insights: Vec<String> = archived
        .iter()
        .map(|h| format!("{:?}: {}", h.status, h.statement))
        .collect();

    memory.cold.push(MemorySnapshot {
        snapshot_id: COLD_ARCHIVE_SNAPSHOT_ID.to_string(),
        turn_range: (0, 0),
        tier: MemoryTier::Cold,
        content_summary: format!("{} archived hypotheses (validated/refuted)", archived.len()),
        key_insights,
        evidence_ids: Vec::new(),
        hypothesis_ids: archived.iter().map(|h| h.id).collect(),
        confidence_delta: 0.0,
        token_count_estimate: 100,
        created_at: now,
    });
}
