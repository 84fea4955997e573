//! Orchestration entities — the append-only audit trail of a run.
//!
//! A [`RunTrace`] collects every [`OrchestrationStep`] and
//! [`ToolExecution`] performed during one `orchestrate` call. Steps are
//! append-only with strictly increasing ids; nothing is mutated after
//! creation. The trace converts into the engine's single return value,
//! [`OrchestrationResult`], at the end of the run.

use crate::core::string::truncate;
use crate::tool::entities::ToolInvocation;
use crate::tool::value_objects::ToolOutcome;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of work a step records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Initial decomposition of the user's request
    Analysis,
    /// One tool execution
    ToolCall,
    /// A control-flow judgement (tool decision, progress check, format validation)
    Evaluation,
    /// A draft or final answer
    Synthesis,
}

impl StepKind {
    pub fn as_str(&self) -> &str {
        match self {
            StepKind::Analysis => "analysis",
            StepKind::ToolCall => "tool_call",
            StepKind::Evaluation => "evaluation",
            StepKind::Synthesis => "synthesis",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One record of a single tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecution {
    /// Name of the tool that was invoked
    pub tool_name: String,
    /// Arguments sent to the tool
    pub parameters: HashMap<String, serde_json::Value>,
    /// The uniform result envelope the tool returned
    pub result: ToolOutcome,
    /// Wall-clock start, milliseconds since the epoch
    pub started_at: u64,
    /// Wall-clock end, milliseconds since the epoch
    pub finished_at: u64,
}

impl ToolExecution {
    pub fn new(invocation: &ToolInvocation, result: ToolOutcome, started_at: u64, finished_at: u64) -> Self {
        Self {
            tool_name: invocation.tool_name.clone(),
            parameters: invocation.arguments.clone(),
            result,
            started_at,
            finished_at,
        }
    }

    /// Duration of the execution in milliseconds; never negative.
    pub fn duration_ms(&self) -> u64 {
        self.finished_at.saturating_sub(self.started_at)
    }
}

/// One immutable record of work performed during the loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationStep {
    /// Sequence identifier, strictly increasing within a run
    pub id: u64,
    /// Kind of work this step records
    pub kind: StepKind,
    /// Creation time, milliseconds since the epoch
    pub timestamp: u64,
    /// Free-text output the model produced (or a fixed description for tool calls)
    pub content: String,
    /// Present only for tool_call steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_execution: Option<ToolExecution>,
    /// Short machine-generated justification for audit/debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// The engine's single return value per run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    /// Whether the run completed without a fatal error
    pub success: bool,
    /// The text to present to the user
    pub final_answer: String,
    /// Ordered step trace (synthesis-only unless development mode)
    pub steps: Vec<OrchestrationStep>,
    /// Every tool execution performed, in order
    pub tool_calls: Vec<ToolExecution>,
    /// Present only when `success == false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-step character budget when embedding prior steps into later prompts.
///
/// Keeps prompt size bounded over long loops; without this the running
/// trace grows without limit.
pub const STEP_PROMPT_BUDGET: usize = 600;

/// Append-only collector for the steps and tool calls of one run.
#[derive(Debug, Default)]
pub struct RunTrace {
    steps: Vec<OrchestrationStep>,
    tool_calls: Vec<ToolExecution>,
    next_id: u64,
}

impl RunTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reasoning step and return its id.
    pub fn record(
        &mut self,
        kind: StepKind,
        content: impl Into<String>,
        reasoning: Option<String>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.steps.push(OrchestrationStep {
            id,
            kind,
            timestamp: current_timestamp(),
            content: content.into(),
            tool_execution: None,
            reasoning,
        });
        id
    }

    /// Record one tool execution: appends a `tool_call` step and adds the
    /// execution to the tool-call trace.
    pub fn record_tool_execution(&mut self, execution: ToolExecution) {
        let id = self.next_id;
        self.next_id += 1;
        let status = if execution.result.is_success() {
            "succeeded"
        } else {
            "failed"
        };
        self.steps.push(OrchestrationStep {
            id,
            kind: StepKind::ToolCall,
            timestamp: current_timestamp(),
            content: format!("Executed tool: {} ({})", execution.tool_name, status),
            reasoning: None,
            tool_execution: Some(execution.clone()),
        });
        self.tool_calls.push(execution);
    }

    pub fn steps(&self) -> &[OrchestrationStep] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn tool_call_count(&self) -> usize {
        self.tool_calls.len()
    }

    pub fn synthesis_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.kind == StepKind::Synthesis)
            .count()
    }

    /// The most recent synthesis step, if any.
    pub fn last_synthesis(&self) -> Option<&OrchestrationStep> {
        self.steps
            .iter()
            .rev()
            .find(|s| s.kind == StepKind::Synthesis)
    }

    /// Names of all tools attempted so far (successes and failures).
    pub fn attempted_tools(&self) -> impl Iterator<Item = &str> {
        self.tool_calls.iter().map(|t| t.tool_name.as_str())
    }

    /// Whether any attempted tool failed.
    pub fn any_tool_failed(&self) -> bool {
        self.tool_calls.iter().any(|t| !t.result.is_success())
    }

    /// Render prior steps for inclusion in a prompt, each truncated to
    /// [`STEP_PROMPT_BUDGET`] characters.
    pub fn to_prompt_context(&self) -> String {
        if self.steps.is_empty() {
            return "(no steps recorded yet)".to_string();
        }
        self.steps
            .iter()
            .map(|s| {
                format!(
                    "{}. [{}] {}",
                    s.id + 1,
                    s.kind,
                    truncate(&s.content, STEP_PROMPT_BUDGET)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the full tool-call trace, including failures, for the
    /// synthesis prompt.
    pub fn tool_results_block(&self) -> String {
        if self.tool_calls.is_empty() {
            return "(no tools were executed)".to_string();
        }
        self.tool_calls
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let status = if t.result.is_success() {
                    "SUCCEEDED"
                } else {
                    "FAILED"
                };
                let params =
                    serde_json::to_string(&t.parameters).unwrap_or_else(|_| "{}".to_string());
                format!(
                    "{}. {} {} ({} ms)\n   args: {}\n   result: {}",
                    i + 1,
                    t.tool_name,
                    status,
                    t.duration_ms(),
                    truncate(&params, STEP_PROMPT_BUDGET),
                    truncate(&t.result.describe(), STEP_PROMPT_BUDGET)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convert the trace into the engine's return value.
    ///
    /// Unless `development_mode` is set, the step trace is trimmed to
    /// synthesis-only entries.
    pub fn into_result(
        self,
        success: bool,
        final_answer: impl Into<String>,
        error: Option<String>,
        development_mode: bool,
    ) -> OrchestrationResult {
        let steps = if development_mode {
            self.steps
        } else {
            self.steps
                .into_iter()
                .filter(|s| s.kind == StepKind::Synthesis)
                .collect()
        };
        OrchestrationResult {
            success,
            final_answer: final_answer.into(),
            steps,
            tool_calls: self.tool_calls,
            error,
        }
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_execution(tool: &str, success: bool) -> ToolExecution {
        let invocation = ToolInvocation::new(tool).with_arg("query", "standup");
        let result = if success {
            ToolOutcome::success(json!([{"id": "1"}]))
        } else {
            ToolOutcome::failure("backend unavailable")
        };
        ToolExecution::new(&invocation, result, 100, 140)
    }

    #[test]
    fn test_step_ids_strictly_increase() {
        let mut trace = RunTrace::new();
        let a = trace.record(StepKind::Analysis, "decompose", None);
        let b = trace.record(StepKind::Evaluation, "decide", None);
        trace.record_tool_execution(sample_execution("get_events", true));
        let ids: Vec<u64> = trace.steps().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(a < b);
    }

    #[test]
    fn test_tool_execution_duration() {
        let exec = sample_execution("get_events", true);
        assert_eq!(exec.duration_ms(), 40);

        // Clock skew must never produce a negative duration
        let invocation = ToolInvocation::new("get_events");
        let skewed = ToolExecution::new(&invocation, ToolOutcome::success_message("ok"), 200, 100);
        assert_eq!(skewed.duration_ms(), 0);
    }

    #[test]
    fn test_record_tool_execution_appends_both_traces() {
        let mut trace = RunTrace::new();
        trace.record_tool_execution(sample_execution("search_events", false));

        assert_eq!(trace.tool_call_count(), 1);
        assert_eq!(trace.step_count(), 1);
        let step = &trace.steps()[0];
        assert_eq!(step.kind, StepKind::ToolCall);
        assert!(step.content.contains("search_events"));
        assert!(step.content.contains("failed"));
        assert!(step.tool_execution.is_some());
    }

    #[test]
    fn test_synthesis_bookkeeping() {
        let mut trace = RunTrace::new();
        trace.record(StepKind::Synthesis, "draft one", None);
        trace.record(StepKind::Evaluation, "needs refinement", None);
        trace.record(StepKind::Synthesis, "draft two", None);

        assert_eq!(trace.synthesis_count(), 2);
        assert_eq!(trace.last_synthesis().unwrap().content, "draft two");
    }

    #[test]
    fn test_to_prompt_context_truncates() {
        let mut trace = RunTrace::new();
        trace.record(StepKind::Analysis, "x".repeat(5000), None);
        let rendered = trace.to_prompt_context();
        assert!(rendered.len() < 1000);
        assert!(rendered.contains("[analysis]"));
    }

    #[test]
    fn test_tool_results_block_includes_failures() {
        let mut trace = RunTrace::new();
        trace.record_tool_execution(sample_execution("get_events", true));
        trace.record_tool_execution(sample_execution("create_event", false));

        let block = trace.tool_results_block();
        assert!(block.contains("get_events SUCCEEDED"));
        assert!(block.contains("create_event FAILED"));
        assert!(block.contains("backend unavailable"));
        assert!(trace.any_tool_failed());
    }

    #[test]
    fn test_into_result_filters_steps_by_default() {
        let mut trace = RunTrace::new();
        trace.record(StepKind::Analysis, "decompose", None);
        trace.record(StepKind::Evaluation, "decide", None);
        trace.record(StepKind::Synthesis, "the answer", None);

        let result = trace.into_result(true, "the answer", None, false);
        assert!(result.success);
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].kind, StepKind::Synthesis);
    }

    #[test]
    fn test_into_result_keeps_full_trace_in_development_mode() {
        let mut trace = RunTrace::new();
        trace.record(StepKind::Analysis, "decompose", None);
        trace.record(StepKind::Synthesis, "the answer", None);

        let result = trace.into_result(true, "the answer", None, true);
        assert_eq!(result.steps.len(), 2);
        assert_eq!(result.steps.last().unwrap().kind, StepKind::Synthesis);
    }

    #[test]
    fn test_into_result_error_path() {
        let mut trace = RunTrace::new();
        trace.record(StepKind::Analysis, "decompose", None);

        let result = trace.into_result(false, "apology", Some("gateway down".into()), false);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("gateway down"));
        // No synthesis happened, so the filtered trace is empty
        assert!(result.steps.is_empty());
    }
}
