//! Orchestration domain: the step trace, decision parsing, and intent
//! heuristics consumed by the engine.

pub mod entities;
pub mod intent;
pub mod parsing;

pub use entities::{OrchestrationResult, OrchestrationStep, RunTrace, StepKind, ToolExecution};
pub use intent::{is_action_request, is_scheduling_request, wants_itemized_breakdown};
pub use parsing::{
    FormatVerdict, ProgressVerdict, extract_change_requests, parse_format_verdict,
    parse_progress_verdict, parse_tool_decisions, requests_more_tools,
};
