//! # investigate-core
//!
//! Stateful, milestone-driven orchestrator for AI-assisted incident
//! investigations. This crate owns the Case Status State Machine, the
//! Milestone Engine, the Hypothesis Manager, the OODA Loop Controller,
//! the investigation-state persistence shape, the Degraded-Mode Detector,
//! the Memory Manager, the Working-Conclusion Generator, the Phase
//! Orchestrator, the Investigation Service façade, and the Report
//! Generator's core invariants.
//!
//! It is deliberately silent on transport, storage engines, and LLM
//! provider wiring — those live behind the traits in [`ports`] so this
//! crate can be driven by fakes in tests and by real adapters in a host
//! application.

extern crate self as investigate_core;

pub mod conclusion;
pub mod config;
pub mod engine;
pub mod error;
pub mod hypothesis_manager;
pub mod memory_manager;
pub mod ooda_controller;
pub mod phase_orchestrator;
pub mod ports;
pub mod prompts;
pub mod report;
pub mod service;
pub mod state;
pub mod status;
pub mod types;

// Re-exports for convenience
pub use conclusion::compute_progress_metrics;
pub use config::{
    ConfidenceThresholds, DegradedModeConfig, EngineConfig, HypothesisConfig, MemoryConfig,
    OodaConfig, PhaseBudget, PhaseOrchestratorConfig, ReportConfig,
};
pub use engine::{
    Attachment, HypothesisUpdate, MilestoneEngine, NewHypothesis, StateUpdatePayload, TurnMetadata,
};
pub use error::{Error, Result};
pub use hypothesis_manager::{AnchoringResult, DiversificationConstraints};
pub use ooda_controller::{budget_for, intensity_for, should_continue};
pub use phase_orchestrator::{next_phase, record_loopback, TransitionDecision};
pub use ports::{
    CaseFilters, CaseRecord, CaseRepositoryPort, ChatMessage, ChatRequest, ChatResponse, ChatRole,
    FilePort, JobQueuePort, JobStatus, LlmPort, Pagination, ResponseFormat, TokenUsage, ToolCall,
    VectorPort,
};
pub use prompts::{build_prompt, state_update_schema, FieldSpec, FieldType, PromptSchema};
pub use report::CaseReport;
pub use service::{InvestigationService, ProgressSummary};
pub use state::InvestigationState;
pub use status::{assert_valid, describe, transition_message};
pub use types::{
    CaseStatus, ConfidenceLevel, DegradedModeType, EvidenceCategory, EvidenceForm,
    EvidenceSourceType, HypothesisCategory, HypothesisGenerationMode, HypothesisStatus,
    InvestigationMomentum, InvestigationPhase, InvestigationStrategy, OodaIntensity, OodaStep,
    PhaseTransitionOutcome, ReportStatus, ReportType, TemporalState, TurnOutcome, UrgencyLevel,
};
