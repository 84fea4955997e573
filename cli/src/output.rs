//! Console output formatting for orchestration results

use chrono::DateTime;
use colored::Colorize;
use kalendo_domain::OrchestrationResult;

/// Formats orchestration results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format only the final answer (the default output)
    pub fn format_answer(result: &OrchestrationResult) -> String {
        let mut output = String::new();
        output.push_str(&result.final_answer);
        output.push('\n');

        if let Some(error) = &result.error {
            output.push_str(&format!("\n{} {}\n", "Error:".red().bold(), error));
        }

        output
    }

    /// Format the complete result with the step trace and tool calls
    pub fn format_full(result: &OrchestrationResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Orchestration Result"));
        output.push('\n');

        let status = if result.success {
            "success".green().bold().to_string()
        } else {
            "failed".red().bold().to_string()
        };
        output.push_str(&format!("{} {}\n", "Status:".cyan().bold(), status));
        if let Some(error) = &result.error {
            output.push_str(&format!("{} {}\n", "Error:".red().bold(), error));
        }

        if !result.steps.is_empty() {
            output.push_str(&Self::section_header("Steps"));
            for step in &result.steps {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!(
                        "── {} {} [{}] ──",
                        step.id + 1,
                        step.kind,
                        Self::clock(step.timestamp)
                    )
                    .yellow()
                    .bold(),
                    step.content
                ));
                if let Some(reasoning) = &step.reasoning {
                    output.push_str(&format!("{}\n", format!("({})", reasoning).dimmed()));
                }
            }
        }

        if !result.tool_calls.is_empty() {
            output.push_str(&Self::section_header("Tool Calls"));
            for (i, call) in result.tool_calls.iter().enumerate() {
                let status = if call.result.is_success() {
                    "ok".green().to_string()
                } else {
                    "failed".red().to_string()
                };
                output.push_str(&format!(
                    "\n{} {} ({} ms)\n  {}\n",
                    format!("{}. {}", i + 1, call.tool_name).yellow().bold(),
                    status,
                    call.duration_ms(),
                    call.result.describe()
                ));
            }
        }

        output.push_str(&Self::section_header("Answer"));
        output.push_str(&format!("\n{}\n", result.final_answer));
        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &OrchestrationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Render an epoch-millisecond timestamp as a wall-clock time.
    fn clock(timestamp_ms: u64) -> String {
        DateTime::from_timestamp_millis(timestamp_ms as i64)
            .map(|dt| dt.format("%H:%M:%S%.3f").to_string())
            .unwrap_or_else(|| timestamp_ms.to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kalendo_domain::{RunTrace, StepKind, ToolExecution, ToolInvocation, ToolOutcome};

    fn sample_result(development_mode: bool) -> OrchestrationResult {
        let mut trace = RunTrace::new();
        trace.record(StepKind::Analysis, "decompose the request", None);
        trace.record_tool_execution(ToolExecution::new(
            &ToolInvocation::new("get_events"),
            ToolOutcome::success(serde_json::json!([{"id": "1", "summary": "Standup"}])),
            100,
            150,
        ));
        trace.record(StepKind::Synthesis, "You have one event: Standup.", None);
        trace.into_result(true, "You have one event: Standup.", None, development_mode)
    }

    #[test]
    fn test_format_answer() {
        let output = ConsoleFormatter::format_answer(&sample_result(false));
        assert!(output.contains("You have one event: Standup."));
        assert!(!output.contains("Error:"));
    }

    #[test]
    fn test_format_answer_surfaces_error() {
        let trace = RunTrace::new();
        let result = trace.into_result(false, "apology", Some("gateway down".into()), false);
        let output = ConsoleFormatter::format_answer(&result);
        assert!(output.contains("apology"));
        assert!(output.contains("gateway down"));
    }

    #[test]
    fn test_format_full_lists_steps_and_tools() {
        let output = ConsoleFormatter::format_full(&sample_result(true));
        assert!(output.contains("Orchestration Result"));
        assert!(output.contains("analysis"));
        assert!(output.contains("tool_call"));
        assert!(output.contains("get_events"));
        assert!(output.contains("(50 ms)"));
        assert!(output.contains("You have one event: Standup."));
    }

    #[test]
    fn test_format_json_round_trips() {
        let json = ConsoleFormatter::format_json(&sample_result(true));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["tool_calls"][0]["tool_name"], "get_events");
    }

    #[test]
    fn test_clock_renders_valid_timestamp() {
        assert!(ConsoleFormatter::clock(0).starts_with("00:00:00"));
        // Out-of-range values fall back to the raw number
        let out_of_range = i64::MAX as u64;
        assert_eq!(ConsoleFormatter::clock(out_of_range), out_of_range.to_string());
    }
}
