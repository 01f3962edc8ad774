//! Report Generator (core part): versioning, lifecycle, and the
//! status-driven recommendation set. Rendering itself (template text,
//! optional LLM enhancement) is an outer-layer concern; this module owns
//! the invariants around versions, status, and linkage to closure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::types::{CaseStatus, ReportStatus, ReportType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub id: String,
    pub case_id: String,
    pub report_type: ReportType,
    pub version: u32,
    pub is_current: bool,
    pub status: ReportStatus,
    pub format: String,
    pub content: Option<String>,
    pub linked_to_closure: bool,
    pub generation_time_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
}

/// Start a new report generation: demote any current version of the same
/// `(case_id, type)` and allocate `max(existing.version) + 1`.
///
/// Returns [`Error::VersionLimitExceeded`] once `existing` already holds
/// `max_versions_per_type` reports for this type.
pub fn begin_generation(
    case_id: &str,
    report_type: ReportType,
    existing: &mut [CaseReport],
    cfg: &ReportConfig,
    now: DateTime<Utc>,
) -> Result<CaseReport> {
    let same_type: Vec<&mut CaseReport> = existing
        .iter_mut()
        .filter(|r| r.case_id == case_id && r.report_type == report_type)
        .collect();

    if same_type.len() as u32 >= cfg.max_versions_per_type {
        return Err(Error::version_limit_exceeded(format!(
            "{report_type} already has {} versions for case {case_id}",
            same_type.len()
        )));
    }

    let next_version = same_type.iter().map(|r| r.version).max().unwrap_or(0) + 1;
    for r in same_type {
        r.is_current = false;
    }

    Ok(CaseReport {
        id: uuid::Uuid::new_v4().to_string(),
        case_id: case_id.to_string(),
        report_type,
        version: next_version,
        is_current: true,
        status: ReportStatus::Pending,
        format: "markdown".to_string(),
        content: None,
        linked_to_closure: false,
        generation_time_ms: None,
        created_at: now,
    })
}

/// Mark a report COMPLETED with rendered content and timing. Template
/// rendering always succeeds; LLM enhancement failures degrade silently
/// to the template output rather than marking the report FAILED.
pub fn complete_generation(report: &mut CaseReport, content: String, generation_time_ms: u64) {
    report.status = ReportStatus::Completed;
    report.content = Some(content);
    report.generation_time_ms = Some(generation_time_ms);
}

pub fn fail_generation(report: &mut CaseReport, generation_time_ms: u64) {
    report.status = ReportStatus::Failed;
    report.generation_time_ms = Some(generation_time_ms);
}

/// Link reports to case closure. Only permitted when the case is in a
/// terminal status. Linked reports cannot subsequently be deleted — that
/// invariant is enforced by the caller's delete path, not here.
pub fn link_to_closure(
    reports: &mut [CaseReport],
    case_status: CaseStatus,
    report_ids: &[String],
) -> Result<()> {
    if !case_status.is_terminal() {
        return Err(Error::invariant_violation(
            "cannot link reports to closure before the case reaches a terminal status",
        ));
    }
    for report in reports.iter_mut() {
        if report_ids.contains(&report.id) {
            report.linked_to_closure = true;
        }
    }
    Ok(())
}

/// The status-driven recommendation set (spec §4.K), filtered by the
/// report types the case already has at least one version of.
pub fn recommendations(case_status: CaseStatus, existing: &[CaseReport]) -> Vec<ReportType> {
    let wanted: &[ReportType] = match case_status {
        CaseStatus::Resolved => &[
            ReportType::IncidentReport,
            ReportType::Runbook,
            ReportType::PostMortem,
        ],
        CaseStatus::Investigating => &[ReportType::IncidentReport],
        CaseStatus::Closed => &[ReportType::PostMortem],
        CaseStatus::Consulting => &[],
    };
    wanted
        .iter()
        .copied()
        .filter(|rt| !existing.iter().any(|r| r.report_type == *rt))
        .collect()
}
