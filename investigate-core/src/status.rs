//! Case Status Machine: gatekeeps every `case.status` mutation.
//!
//! The manager never stores state itself — callers pass `current`/`target`
//! and get back a validated decision, an audit record to persist, or an
//! [`Error::InvalidTransition`](crate::error::Error::InvalidTransition).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::CaseStatus;

/// Allowed targets for each source status. Terminal statuses map to an
/// empty slice.
fn allowed_transitions(current: CaseStatus) -> &'static [CaseStatus] {
    use CaseStatus::*;
    match current {
        Consulting => &[Investigating, Closed],
        Investigating => &[Resolved, Closed],
        Resolved => &[],
        Closed => &[],
    }
}

/// Check whether `current -> target` is allowed, without raising.
pub fn validate(current: CaseStatus, target: CaseStatus) -> (bool, Option<String>) {
    if current.is_terminal() {
        return (
            false,
            Some(format!("cannot transition from terminal status '{current}'")),
        );
    }
    let allowed = allowed_transitions(current);
    if !allowed.contains(&target) {
        let allowed_str = if allowed.is_empty() {
            "none".to_string()
        } else {
            allowed
                .iter()
                .map(CaseStatus::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        return (
            false,
            Some(format!(
                "invalid transition '{current}' -> '{target}'. allowed targets: {allowed_str}"
            )),
        );
    }
    (true, None)
}

/// Assert a transition is valid, raising [`Error::InvalidTransition`] if not.
pub fn assert_valid(current: CaseStatus, target: CaseStatus) -> Result<()> {
    let (ok, reason) = validate(current, target);
    if !ok {
        return Err(Error::invalid_transition(
            current.to_string(),
            target.to_string(),
            reason.unwrap_or_else(|| "transition not allowed".to_string()),
        ));
    }
    Ok(())
}

/// The statuses reachable from `current` in one step.
pub fn allowed_targets(current: CaseStatus) -> Vec<CaseStatus> {
    allowed_transitions(current).to_vec()
}

/// Timestamp/actor fields to stamp on the case when entering a terminal
/// status. Empty for non-terminal targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalFields {
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<String>,
}

impl TerminalFields {
    fn none() -> Self {
        Self {
            resolved_at: None,
            resolved_by: None,
            closed_at: None,
            closed_by: None,
        }
    }
}

pub fn terminal_fields(target: CaseStatus, user_id: &str, now: DateTime<Utc>) -> TerminalFields {
    match target {
        CaseStatus::Resolved => TerminalFields {
            resolved_at: Some(now),
            resolved_by: Some(user_id.to_string()),
            ..TerminalFields::none()
        },
        CaseStatus::Closed => TerminalFields {
            closed_at: Some(now),
            closed_by: Some(user_id.to_string()),
            ..TerminalFields::none()
        },
        _ => TerminalFields::none(),
    }
}

/// A structured log entry for `case.metadata.status_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusAuditRecord {
    pub from_status: CaseStatus,
    pub to_status: CaseStatus,
    pub changed_at: DateTime<Utc>,
    pub changed_by: String,
    pub auto: bool,
    pub reason: Option<String>,
}

pub fn audit_record(
    old: CaseStatus,
    new: CaseStatus,
    user_id: &str,
    auto: bool,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> StatusAuditRecord {
    StatusAuditRecord {
        from_status: old,
        to_status: new,
        changed_at: now,
        changed_by: user_id.to_string(),
        auto,
        reason,
    }
}

/// The message injected into the next prompt to tell the agent a status
/// change happened, simulating a user turn. `None` for transitions that
/// don't carry one (SPEC_FULL §B.2).
pub fn transition_message(old: CaseStatus, new: CaseStatus) -> Option<&'static str> {
    use CaseStatus::*;
    match (old, new) {
        (Consulting, Investigating) => Some(
            "The user has confirmed the problem description. \
             Begin formal investigation with milestone tracking.",
        ),
        (Investigating, Resolved) => Some(
            "The solution has been verified and the problem is resolved. \
             Document the resolution for future reference.",
        ),
        (Investigating, Closed) => Some(
            "The investigation has been closed without resolution. \
             This may be due to escalation or abandonment.",
        ),
        (Consulting, Closed) => Some(
            "The case has been closed during the consulting phase. \
             No formal investigation was started.",
        ),
        _ => None,
    }
}

/// A human-readable description of a status transition, for display in
/// case history UIs (SPEC_FULL §B.3).
pub fn describe(old: CaseStatus, new: CaseStatus) -> String {
    use CaseStatus::*;
    match (old, new) {
        (Consulting, Investigating) => "Starting formal investigation".to_string(),
        (Investigating, Resolved) => "Problem resolved with verified solution".to_string(),
        (Investigating, Closed) => "Investigation closed without resolution".to_string(),
        (Consulting, Closed) => "Case closed during initial consultation".to_string(),
        _ => format!("Status changed from {old} to {new}"),
    }
}
