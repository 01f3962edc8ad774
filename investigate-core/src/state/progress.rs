//! Milestone-based progress tracking.
//!
//! Eight boolean milestones plus timestamps and root-cause confidence, as
//! defined in the data model. `ProgressMetrics` supplements this with the
//! momentum/evidence-completeness tracking the Working-Conclusion
//! Generator consumes (SPEC_FULL §B.4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::InvestigationMomentum;

/// The eight milestone booleans plus their stamped timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Progress {
    pub symptom_verified: bool,
    pub scope_assessed: bool,
    pub timeline_established: bool,
    pub changes_identified: bool,
    pub root_cause_identified: bool,
    pub solution_proposed: bool,
    pub solution_applied: bool,
    pub solution_verified: bool,

    pub root_cause_confidence: f64,

    pub verification_completed_at: Option<DateTime<Utc>>,
    pub investigation_completed_at: Option<DateTime<Utc>>,
    pub resolution_completed_at: Option<DateTime<Utc>>,
}

impl Progress {
    /// All eight milestone names in a fixed, stable order.
    pub const MILESTONE_NAMES: [&'static str; 8] = [
        "symptom_verified",
        "scope_assessed",
        "timeline_established",
        "changes_identified",
        "root_cause_identified",
        "solution_proposed",
        "solution_applied",
        "solution_verified",
    ];

    /// Whether the milestone of the given name is currently completed.
    pub fn is_completed(&self, name: &str) -> bool {
        match name {
            "symptom_verified" => self.symptom_verified,
            "scope_assessed" => self.scope_assessed,
            "timeline_established" => self.timeline_established,
            "changes_identified" => self.changes_identified,
            "root_cause_identified" => self.root_cause_identified,
            "solution_proposed" => self.solution_proposed,
            "solution_applied" => self.solution_applied,
            "solution_verified" => self.solution_verified,
            _ => false,
        }
    }

    /// Mark a milestone complete by name. Unknown names are ignored.
    /// Idempotent: completing an already-completed milestone is a no-op.
    pub fn complete(&mut self, name: &str, now: DateTime<Utc>) {
        match name {
            "symptom_verified" => self.symptom_verified = true,
            "scope_assessed" => self.scope_assessed = true,
            "timeline_established" => self.timeline_established = true,
            "changes_identified" => self.changes_identified = true,
            "root_cause_identified" => self.root_cause_identified = true,
            "solution_proposed" => self.solution_proposed = true,
            "solution_applied" => self.solution_applied = true,
            "solution_verified" => self.solution_verified = true,
            _ => return,
        }
        if self.verification_complete() && self.verification_completed_at.is_none() {
            self.verification_completed_at = Some(now);
        }
        if self.root_cause_identified && self.investigation_completed_at.is_none() {
            self.investigation_completed_at = Some(now);
        }
        if self.solution_verified && self.resolution_completed_at.is_none() {
            self.resolution_completed_at = Some(now);
        }
    }

    pub fn verification_complete(&self) -> bool {
        self.symptom_verified
            && self.scope_assessed
            && self.timeline_established
            && self.changes_identified
    }

    pub fn completed_milestones(&self) -> Vec<&'static str> {
        Self::MILESTONE_NAMES
            .iter()
            .copied()
            .filter(|name| self.is_completed(name))
            .collect()
    }

    pub fn pending_milestones(&self) -> Vec<&'static str> {
        Self::MILESTONE_NAMES
            .iter()
            .copied()
            .filter(|name| !self.is_completed(name))
            .collect()
    }

    /// `completed / (completed + pending) * 100`, clamped to `[0, 100]`.
    pub fn completion_percentage(&self) -> f64 {
        let total = Self::MILESTONE_NAMES.len() as f64;
        if total == 0.0 {
            return 0.0;
        }
        (self.completed_milestones().len() as f64 / total * 100.0).clamp(0.0, 100.0)
    }

    /// Coarse derived stage label (SPEC_FULL §B.1).
    pub fn current_stage(&self) -> &'static str {
        if self.solution_proposed || self.solution_applied || self.solution_verified {
            "solution"
        } else if self.root_cause_identified {
            "hypothesis_validation"
        } else if self.symptom_verified {
            "hypothesis_formulation"
        } else {
            "symptom_verification"
        }
    }
}

/// Progress indicators consumed by the Working-Conclusion Generator and
/// report recommendations (SPEC_FULL §B.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProgressMetrics {
    pub evidence_provided_count: u32,
    pub evidence_blocked_count: u32,
    pub active_hypotheses_count: u32,
    pub evidence_completeness: f64,
    pub momentum: InvestigationMomentum,
    pub turns_without_progress: u32,
    pub blocked_reasons: Vec<String>,
}
