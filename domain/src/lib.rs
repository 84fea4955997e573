//! Domain layer for kalendo
//!
//! This crate contains the core business logic of the calendar-assistant
//! orchestration engine: entities, value objects, the decision parser,
//! intent heuristics, and prompt templates. It has no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Orchestration run
//!
//! One end-to-end execution of the engine for a single user message.
//! Every unit of work performed during a run is recorded as an
//! [`OrchestrationStep`] in an append-only [`RunTrace`].
//!
//! ## Decision parsing
//!
//! The engine drives a text-completion model and must tolerate the
//! several equivalent textual encodings the model may produce. The
//! [`orchestration::parsing`] module owns that grammar and guarantees a
//! non-throwing contract: unparseable output means "no action", never
//! an error.

pub mod chat;
pub mod core;
pub mod orchestration;
pub mod prompt;
pub mod tool;

// Re-export commonly used types
pub use chat::{ChatMessage, Role, format_history};
pub use self::core::{model::ModelId, string::truncate};
pub use orchestration::{
    entities::{
        OrchestrationResult, OrchestrationStep, RunTrace, StepKind, ToolExecution,
    },
    intent::{is_action_request, is_scheduling_request, wants_itemized_breakdown},
    parsing::{
        FormatVerdict, ProgressVerdict, extract_change_requests, parse_format_verdict,
        parse_progress_verdict, parse_tool_decisions, requests_more_tools,
    },
};
pub use prompt::OrchestratorPromptTemplate;
pub use tool::{
    entities::{ToolCategory, ToolDescriptor, ToolInvocation, ToolParameter},
    value_objects::ToolOutcome,
};
