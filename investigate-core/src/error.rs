//! Error types for the investigation engine.

use thiserror::Error;

/// Result type alias using the engine's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core.
///
/// Pure components (hypothesis manager, OODA controller, memory manager,
/// working-conclusion generator, phase orchestrator) raise these as
/// explicit values; the Milestone Engine decides whether to continue or
/// abort the turn.
#[derive(Error, Debug)]
pub enum Error {
    /// Case, report, or hypothesis id unknown. Recovered by the caller.
    #[error("not found: {0}")]
    NotFound(String),

    /// Ownership check failed. Never elevates detail; the outer layer
    /// translates this to a 404, not a 403.
    #[error("unauthorized")]
    Unauthorized,

    /// Status Machine rejected a transition. Fatal to the current
    /// operation, never swallowed.
    #[error("invalid transition: {from} -> {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Report generation exceeded the per-(case, type) version cap.
    #[error("version limit exceeded: {0}")]
    VersionLimitExceeded(String),

    /// LLM, vector, or file port failed after retries.
    #[error("upstream unavailable: {service}: {message}")]
    UpstreamUnavailable { service: String, message: String },

    /// Programming error — e.g. non-contiguous turn numbers. Fatal; abort
    /// the turn and surface to operators.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Round-trip (de)serialization of persisted state failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error — invalid threshold or budget value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_transition(
        from: impl Into<String>,
        to: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
            reason: reason.into(),
        }
    }

    pub fn version_limit_exceeded(what: impl Into<String>) -> Self {
        Self::VersionLimitExceeded(what.into())
    }

    pub fn upstream_unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
