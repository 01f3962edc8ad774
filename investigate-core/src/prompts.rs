//! Prompt construction and the typed-signature machinery used to ask the
//! LLM for a structured state-update payload alongside its prose.
//!
//! `FieldSpec`/`FieldType` describe an I/O contract the way a DSPy-style
//! signature would: enough to both render a human-readable prompt
//! fragment and emit a JSON Schema an LLM provider can be constrained to.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::InvestigationState;
use crate::types::CaseStatus;

/// Specification for a field in a structured-update schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub description: String,
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            description: String::new(),
            required: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn to_prompt_line(&self) -> String {
        let hint = self.field_type.to_prompt_hint();
        let required_marker = if self.required { "" } else { " (optional)" };
        if self.description.is_empty() {
            format!("{} ({hint}){required_marker}", self.name)
        } else {
            format!("{} ({hint}){required_marker}: {}", self.name, self.description)
        }
    }
}

/// Type of a structured-update field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    List(Box<FieldType>),
    Object(Vec<FieldSpec>),
    Enum(Vec<String>),
}

impl FieldType {
    pub fn list(inner: FieldType) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn object(fields: Vec<FieldSpec>) -> Self {
        Self::Object(fields)
    }

    pub fn enum_of(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Enum(values.into_iter().map(|v| v.into()).collect())
    }

    pub fn to_prompt_hint(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Float => "number".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::List(inner) => format!("list[{}]", inner.to_prompt_hint()),
            Self::Object(_) => "object".to_string(),
            Self::Enum(values) => values.join("|"),
        }
    }

    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::String => serde_json::json!({ "type": "string" }),
            Self::Integer => serde_json::json!({ "type": "integer" }),
            Self::Float => serde_json::json!({ "type": "number" }),
            Self::Boolean => serde_json::json!({ "type": "boolean" }),
            Self::List(inner) => serde_json::json!({
                "type": "array",
                "items": inner.to_json_schema(),
            }),
            Self::Object(fields) => {
                let properties: serde_json::Map<String, Value> = fields
                    .iter()
                    .map(|f| (f.name.clone(), f.field_type.to_json_schema()))
                    .collect();
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|f| f.required)
                    .map(|f| f.name.as_str())
                    .collect();
                serde_json::json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                })
            }
            Self::Enum(values) => serde_json::json!({
                "type": "string",
                "enum": values,
            }),
        }
    }
}

/// Implemented by types that can describe themselves as a [`FieldSpec`]
/// list, typically via `#[derive(investigate_core_derive::PromptSchema)]`.
pub trait PromptSchema {
    fn field_specs() -> Vec<FieldSpec>;
}

/// The JSON Schema for the structured-update payload the LLM returns
/// alongside its prose during INVESTIGATING turns (spec §4.I step 5).
pub fn state_update_schema() -> Value {
    let fields = vec![
        FieldSpec::new(
            "new_hypotheses",
            FieldType::list(FieldType::object(vec![
                FieldSpec::new("statement", FieldType::String),
                FieldSpec::new(
                    "category",
                    FieldType::enum_of([
                        "infrastructure",
                        "code",
                        "configuration",
                        "data",
                        "external_dependency",
                        "human_error",
                        "network",
                        "performance",
                    ]),
                ),
                FieldSpec::new("likelihood", FieldType::Float),
            ])),
        )
        .optional()
        .with_description("Candidate root causes not yet tracked"),
        FieldSpec::new(
            "hypothesis_updates",
            FieldType::list(FieldType::object(vec![
                FieldSpec::new("hypothesis_id", FieldType::String),
                FieldSpec::new("supporting_evidence_ids", FieldType::list(FieldType::String))
                    .optional(),
                FieldSpec::new("refuting_evidence_ids", FieldType::list(FieldType::String))
                    .optional(),
            ])),
        )
        .optional()
        .with_description("Evidence links against existing hypotheses, by id"),
        FieldSpec::new("milestones_completed", FieldType::list(FieldType::String))
            .optional()
            .with_description("Milestone names newly satisfied this turn"),
        FieldSpec::new(
            "phase_transition",
            FieldType::enum_of([
                "completed",
                "hypothesis_refuted",
                "scope_changed",
                "timeline_wrong",
                "need_more_data",
                "stalled",
                "escalation_needed",
            ]),
        )
        .optional(),
        FieldSpec::new("proposed_problem_statement", FieldType::String).optional(),
        FieldSpec::new("commit_to_investigation", FieldType::Boolean).optional(),
    ];
    FieldType::object(fields).to_json_schema()
}

/// Build the system/user prompt for the current turn, selected by case
/// status (spec §4.I step 4).
pub fn build_prompt(
    status: CaseStatus,
    state: &InvestigationState,
    user_message: &str,
    memory_context: &str,
    working_conclusion_summary: &str,
    ranked_hypotheses_summary: &str,
    anchoring_constraints_note: Option<&str>,
) -> Vec<crate::ports::ChatMessage> {
    use crate::ports::{ChatMessage, ChatRole};

    let system = match status {
        CaseStatus::Consulting => {
            "You are triaging an incident report. Produce a crisp problem statement, \
             offer any immediately obvious quick-win guidance, and ask the user whether \
             they want to commit to a formal investigation."
                .to_string()
        }
        CaseStatus::Investigating => {
            let mut s = format!(
                "You are running turn {} of a formal incident investigation, currently in \
                 the {} phase.\n\nMilestone checklist: {:?}\nWorking conclusion: {}\n\
                 Top ranked hypotheses: {}\nRecent memory: {}\n",
                state.current_turn,
                state.current_phase,
                crate::state::Progress::MILESTONE_NAMES,
                working_conclusion_summary,
                ranked_hypotheses_summary,
                memory_context,
            );
            if let Some(note) = anchoring_constraints_note {
                s.push_str(&format!("\nAnchoring prevention: {note}\n"));
            }
            s
        }
        CaseStatus::Resolved | CaseStatus::Closed => {
            "This case is closed. Do not propose reopening it or changing its status. \
             Answer clarifying questions about the recorded resolution only."
                .to_string()
        }
    };

    vec![
        ChatMessage {
            role: ChatRole::System,
            content: system,
        },
        ChatMessage {
            role: ChatRole::User,
            content: user_message.to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_to_prompt_line_includes_description_and_hint() {
        let field = FieldSpec::new("likelihood", FieldType::Float)
            .with_description("Confidence in the hypothesis");
        assert_eq!(
            field.to_prompt_line(),
            "likelihood (number): Confidence in the hypothesis"
        );
    }

    #[test]
    fn object_schema_lists_only_required_fields() {
        let schema = FieldType::object(vec![
            FieldSpec::new("a", FieldType::String),
            FieldSpec::new("b", FieldType::Integer).optional(),
        ])
        .to_json_schema();
        assert_eq!(schema["required"], serde_json::json!(["a"]));
    }

    #[test]
    fn state_update_schema_is_an_object_with_optional_top_level_fields() {
        let schema = state_update_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], serde_json::json!([] as [&str; 0]));
    }

    #[test]
    fn consulting_prompt_asks_for_commitment_decision() {
        let state = InvestigationState::new_consulting(chrono::Utc::now());
        let messages = build_prompt(
            CaseStatus::Consulting,
            &state,
            "my service is down",
            "",
            "",
            "",
            None,
        );
        assert!(messages[0].content.contains("commit"));
    }

    #[test]
    fn closed_prompt_forbids_reopening() {
        let state = InvestigationState::new(
            crate::types::TemporalState::Ongoing,
            crate::types::UrgencyLevel::Low,
            chrono::Utc::now(),
        );
        let messages = build_prompt(CaseStatus::Closed, &state, "why?", "", "", "", None);
        assert!(messages[0].content.contains("closed"));
    }
}
