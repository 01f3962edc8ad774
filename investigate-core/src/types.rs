//! Fixed, named enumerations and small value types shared across the
//! engine.
//!
//! These are the contract: phases, statuses, outcomes, and categories are
//! spelled out here once and referenced everywhere else. Thresholds that
//! pair with [`ConfidenceLevel`] live in [`crate::config::ConfidenceThresholds`]
//! rather than beside the enum, so they can be overridden without
//! recompiling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse-grained investigation stage. Not strictly linear — the Phase
/// Orchestrator can loop back to an earlier phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationPhase {
    Intake = 0,
    BlastRadius = 1,
    Timeline = 2,
    Hypothesis = 3,
    Validation = 4,
    Solution = 5,
    Document = 6,
}

impl InvestigationPhase {
    /// Linear phase order used by `COMPLETED` transitions.
    pub const ORDER: [InvestigationPhase; 7] = [
        InvestigationPhase::Intake,
        InvestigationPhase::BlastRadius,
        InvestigationPhase::Timeline,
        InvestigationPhase::Hypothesis,
        InvestigationPhase::Validation,
        InvestigationPhase::Solution,
        InvestigationPhase::Document,
    ];

    /// The phase that follows this one in the linear order, or `None` if
    /// this is the terminal phase.
    pub fn next(self) -> Option<InvestigationPhase> {
        let idx = Self::ORDER.iter().position(|p| *p == self)?;
        Self::ORDER.get(idx + 1).copied()
    }
}

impl fmt::Display for InvestigationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Intake => "intake",
            Self::BlastRadius => "blast_radius",
            Self::Timeline => "timeline",
            Self::Hypothesis => "hypothesis",
            Self::Validation => "validation",
            Self::Solution => "solution",
            Self::Document => "document",
        };
        write!(f, "{s}")
    }
}

/// Hypothesis lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisStatus {
    Captured,
    Active,
    Validated,
    Refuted,
    Retired,
    Superseded,
}

impl fmt::Display for HypothesisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Captured => "captured",
            Self::Active => "active",
            Self::Validated => "validated",
            Self::Refuted => "refuted",
            Self::Retired => "retired",
            Self::Superseded => "superseded",
        };
        write!(f, "{s}")
    }
}

/// Categorical confidence, derived from a numeric likelihood via
/// [`crate::config::ConfidenceThresholds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Speculation,
    Possible,
    Moderate,
    Likely,
    Certain,
}

impl ConfidenceLevel {
    /// Classify a likelihood value using the given thresholds.
    pub fn from_likelihood(
        likelihood: f64,
        thresholds: &crate::config::ConfidenceThresholds,
    ) -> Self {
        if likelihood >= thresholds.certain {
            Self::Certain
        } else if likelihood >= thresholds.likely {
            Self::Likely
        } else if likelihood >= thresholds.moderate {
            Self::Moderate
        } else if likelihood >= thresholds.possible {
            Self::Possible
        } else {
            Self::Speculation
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Speculation => "speculation",
            Self::Possible => "possible",
            Self::Moderate => "moderate",
            Self::Likely => "likely",
            Self::Certain => "certain",
        };
        write!(f, "{s}")
    }
}

/// Category/domain of a hypothesis. Used for anchoring-bias detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisCategory {
    Infrastructure,
    Code,
    Configuration,
    Data,
    ExternalDependency,
    HumanError,
    Network,
    Performance,
}

impl fmt::Display for HypothesisCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Infrastructure => "infrastructure",
            Self::Code => "code",
            Self::Configuration => "configuration",
            Self::Data => "data",
            Self::ExternalDependency => "external_dependency",
            Self::HumanError => "human_error",
            Self::Network => "network",
            Self::Performance => "performance",
        };
        write!(f, "{s}")
    }
}

/// How a hypothesis was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisGenerationMode {
    /// Captured opportunistically from early phases (0-2).
    Opportunistic,
    /// Generated systematically in the hypothesis phase (3).
    Systematic,
}

/// Evidence classification by investigation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceCategory {
    Symptom,
    Causal,
    Resolution,
    Other,
}

/// Form/nature of evidence — how it manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceForm {
    DirectObservation,
    Symptom,
    Metric,
    LogEntry,
    ConfigValue,
    TestResult,
    CodeSnippet,
}

/// Source/origin of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSourceType {
    UserProvided,
    SystemQuery,
    LogAnalysis,
    MetricQuery,
    CodeInspection,
    AutomatedTest,
}

/// Case lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Consulting,
    Investigating,
    Resolved,
    Closed,
}

impl CaseStatus {
    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Consulting => "consulting",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

/// Problem temporal classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalState {
    Ongoing,
    Historical,
}

/// Problem urgency classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Critical,
    High,
    Medium,
    Low,
    Unknown,
}

/// Investigation path strategy, derived from the temporal × urgency
/// matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationStrategy {
    MitigationFirst,
    RootCause,
    UserChoice,
}

impl InvestigationStrategy {
    /// Strategy matrix: ONGOING + (CRITICAL or HIGH) -> mitigation first;
    /// HISTORICAL + (LOW or MEDIUM) -> root cause; else user choice.
    pub fn from_matrix(temporal: TemporalState, urgency: UrgencyLevel) -> Self {
        use TemporalState::*;
        use UrgencyLevel::*;
        match (temporal, urgency) {
            (Ongoing, Critical | High) => Self::MitigationFirst,
            (Historical, Low | Medium) => Self::RootCause,
            _ => Self::UserChoice,
        }
    }
}

/// OODA framework step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OodaStep {
    Observe,
    Orient,
    Decide,
    Act,
}

/// Adaptive OODA intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OodaIntensity {
    None,
    Light,
    Medium,
    Full,
}

/// Outcome classification for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    Progress,
    Conversation,
    Blocked,
    EvidenceCollected,
    HypothesisValidated,
    HypothesisRefuted,
    SolutionApplied,
    PhaseTransitioned,
}

/// Type of investigation degradation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedModeType {
    CriticalEvidenceMissing,
    ExpertiseRequired,
    SystemicIssue,
    HypothesisSpaceExhausted,
    GeneralLimitation,
    /// 3+ turns without advancement.
    NoProgress,
    /// The Phase Orchestrator's loop-back safety limit was exceeded.
    LoopbackLimitExceeded,
}

/// Phase-transition outcome signalled by the LLM or the engine itself,
/// consumed by the Phase Orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseTransitionOutcome {
    Completed,
    HypothesisRefuted,
    ScopeChanged,
    TimelineWrong,
    NeedMoreData,
    Stalled,
    EscalationNeeded,
}

/// Memory tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryTier {
    Hot,
    Warm,
    Cold,
}

/// Momentum derived from recent-turn progress ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationMomentum {
    #[default]
    Early,
    Steady,
    Accelerating,
    Stalled,
}

/// Report artefact type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    IncidentReport,
    Runbook,
    PostMortem,
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::IncidentReport => "incident_report",
            Self::Runbook => "runbook",
            Self::PostMortem => "post_mortem",
        };
        write!(f, "{s}")
    }
}

/// Report generation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Generating,
    Completed,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfidenceThresholds;

    #[test]
    fn phase_order_is_linear_and_terminates_at_document() {
        assert_eq!(
            InvestigationPhase::Intake.next(),
            Some(InvestigationPhase::BlastRadius)
        );
        assert_eq!(InvestigationPhase::Document.next(), None);
    }

    #[test]
    fn confidence_level_boundaries_are_inclusive() {
        let t = ConfidenceThresholds::default();
        assert_eq!(
            ConfidenceLevel::from_likelihood(0.70, &t),
            ConfidenceLevel::Likely
        );
        assert_eq!(
            ConfidenceLevel::from_likelihood(0.6999, &t),
            ConfidenceLevel::Moderate
        );
        assert_eq!(
            ConfidenceLevel::from_likelihood(0.85, &t),
            ConfidenceLevel::Certain
        );
    }

    #[test]
    fn strategy_matrix_matches_contract() {
        assert_eq!(
            InvestigationStrategy::from_matrix(TemporalState::Ongoing, UrgencyLevel::Critical),
            InvestigationStrategy::MitigationFirst
        );
        assert_eq!(
            InvestigationStrategy::from_matrix(TemporalState::Historical, UrgencyLevel::Low),
            InvestigationStrategy::RootCause
        );
        assert_eq!(
            InvestigationStrategy::from_matrix(TemporalState::Ongoing, UrgencyLevel::Low),
            InvestigationStrategy::UserChoice
        );
    }

    #[test]
    fn case_status_terminal_classification() {
        assert!(CaseStatus::Resolved.is_terminal());
        assert!(CaseStatus::Closed.is_terminal());
        assert!(!CaseStatus::Consulting.is_terminal());
        assert!(!CaseStatus::Investigating.is_terminal());
    }

    #[test]
    fn enum_json_round_trip_uses_snake_case() {
        let json = serde_json::to_string(&HypothesisCategory::ExternalDependency).unwrap();
        assert_eq!(json, "\"external_dependency\"");
    }
}
