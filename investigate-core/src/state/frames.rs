//! Problem framing: the "what/where" and "when" of an investigation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Problem statement with scope assessment — the "what" and "where".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFrame {
    pub statement: String,
    pub affected_components: Vec<String>,
    pub affected_scope: String,
    pub started_at: Option<DateTime<Utc>>,
    pub severity: String,
    pub confidence: f64,
    pub framed_at_turn: u32,
    pub revision_count: u32,
}

impl AnomalyFrame {
    pub fn new(statement: impl Into<String>, framed_at_turn: u32) -> Self {
        Self {
            statement: statement.into(),
            affected_components: Vec::new(),
            affected_scope: String::new(),
            started_at: None,
            severity: "unknown".to_string(),
            confidence: 0.0,
            framed_at_turn,
            revision_count: 0,
        }
    }
}

/// Timeline information — the "when" and its correlation with recent
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TemporalFrame {
    pub first_noticed_at: Option<DateTime<Utc>>,
    pub actually_started_at: Option<DateTime<Utc>>,
    pub temporal_pattern: String,
    pub recent_changes: Vec<String>,
    pub change_correlation: Option<String>,
    pub confidence: f64,
    pub completeness: f64,
    pub established_at_turn: u32,
}
