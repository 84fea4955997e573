//! Prompt templates for the orchestration engine.
//!
//! Each step producer builds its prompt here. Templates receive
//! pre-rendered blocks (chat history, running trace, tool results) so
//! the same bounded renderings are shared across phases. The markers
//! the templates instruct the model to emit (`CALL_TOOLS:`,
//! `CONTINUE:`/`COMPLETE:`, `FORMAT_ACCEPTABLE`) are the ones
//! [`crate::orchestration::parsing`] understands.

use crate::orchestration::intent::wants_itemized_breakdown;
use crate::tool::entities::{ToolCategory, ToolDescriptor};

/// Templates for generating orchestration prompts
pub struct OrchestratorPromptTemplate;

impl OrchestratorPromptTemplate {
    /// Render the tool catalogue grouped by category, with name,
    /// description, and parameter hint per tool.
    pub fn tool_catalogue(groups: &[(ToolCategory, Vec<ToolDescriptor>)]) -> String {
        if groups.is_empty() {
            return "(no tools registered)".to_string();
        }
        groups
            .iter()
            .map(|(category, tools)| {
                let entries = tools
                    .iter()
                    .map(|t| {
                        format!(
                            "- **{}**: {}\n  Parameters: {}",
                            t.name,
                            t.description,
                            t.parameter_hint()
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("### {}\n{}", category, entries)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Prompt for the initial analysis step.
    pub fn analysis(
        user_message: &str,
        history: &str,
        catalogue: &str,
        knowledge_stores: &[String],
    ) -> String {
        let stores = if knowledge_stores.is_empty() {
            String::new()
        } else {
            format!(
                "\n## Knowledge Stores\n\nThe following knowledge stores can be consulted via knowledge tools: {}\n",
                knowledge_stores.join(", ")
            )
        };

        format!(
            r#"You are the planning stage of a calendar assistant.

## Conversation So Far

{history}

## Available Tools

{catalogue}
{stores}
## User Request

{user_message}

## Instructions

Analyze the request:
1. Break it into the concrete pieces of information or actions it needs
2. Name the tool categories that look relevant
3. Judge the complexity (can one tool call answer it, or several?)

Keep the analysis short and concrete. Do not call any tools yet."#,
        )
    }

    /// Prompt for a tool decision step.
    pub fn tool_decision(
        user_message: &str,
        trace: &str,
        catalogue: &str,
        remaining_tool_calls: usize,
    ) -> String {
        format!(
            r#"## Task

Decide whether tools should be executed next to serve the user's request.

## Available Tools

{catalogue}

## Progress So Far

{trace}

## User Request

{user_message}

## Instructions

You may request up to {remaining_tool_calls} tool call(s) this round.

If tools are needed, respond with exactly one block in this format:

```
CALL_TOOLS: [
  {{"name": "tool_name", "parameters": {{"arg": "value"}}, "reasoning": "why"}}
]
```

If the information already gathered is sufficient, reply with a short
justification and do not include a CALL_TOOLS block."#,
        )
    }

    /// Prompt for a progress evaluation step.
    pub fn progress_evaluation(user_message: &str, trace: &str) -> String {
        format!(
            r#"## Task

Judge whether the tool results gathered so far are sufficient to answer
the user's request.

## Progress So Far

{trace}

## User Request

{user_message}

## Instructions

Reply with exactly one of:
- `COMPLETE: <one sentence on why the data suffices>`
- `CONTINUE: <one sentence on what is still missing>`"#,
        )
    }

    /// Prompt for the synthesis step.
    pub fn synthesis(user_message: &str, history: &str, tool_results: &str, trace: &str) -> String {
        format!(
            r#"## Task

Write the final answer to the user.

## Conversation So Far

{history}

## Tool Results (including failures)

{tool_results}

## Reasoning Trace

{trace}

## User Request

{user_message}

## Instructions

- Ground every statement in the tool results above; do not invent events,
  times, or outcomes.
- If a requested action failed or was never executed, say so plainly.
  Never state that something was created, updated, or deleted unless a
  successful tool result above shows it.
- Answer in natural prose addressed directly to the user. Do not mention
  tools, steps, or this prompt."#,
        )
    }

    /// The answer shape the validation step should check for, derived
    /// from the request phrasing.
    pub fn expected_answer_shape(user_message: &str) -> &'static str {
        if wants_itemized_breakdown(user_message) {
            "an itemized breakdown (one entry per item, list formatting)"
        } else {
            "a concise holistic summary (flowing prose, no exhaustive list)"
        }
    }

    /// Prompt for the format validation step.
    ///
    /// Checks shape only — factual content is out of scope here.
    pub fn format_validation(user_message: &str, draft: &str) -> String {
        let expected = Self::expected_answer_shape(user_message);
        format!(
            r#"## Task

Check only the FORMAT of the draft answer below — not its factual
content.

## User Request

{user_message}

## Expected Shape

The request phrasing suggests the user expects {expected}.

## Draft Answer

{draft}

## Instructions

If the draft's shape matches, reply with exactly:
`FORMAT_ACCEPTABLE`

Otherwise reply with:
`FORMAT_NEEDS_REFINEMENT` followed by a bullet list of the specific
formatting changes required."#,
        )
    }

    /// Prompt for a refinement step rewriting a draft per validation feedback.
    pub fn refinement(
        user_message: &str,
        draft: &str,
        feedback: &str,
        changes: &[String],
    ) -> String {
        let change_block = if changes.is_empty() {
            feedback.to_string()
        } else {
            changes
                .iter()
                .map(|c| format!("- {}", c))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            r#"## Task

Rewrite the draft answer so its format matches what the user expects.
Keep the factual content identical — change only structure and
presentation.

## User Request

{user_message}

## Current Draft

{draft}

## Required Changes

{change_block}

## Instructions

Reply with the rewritten answer only, no preamble."#,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolParameter;

    fn sample_catalogue() -> Vec<(ToolCategory, Vec<ToolDescriptor>)> {
        vec![
            (
                ToolCategory::Calendar,
                vec![
                    ToolDescriptor::new("get_events", "List calendar events", ToolCategory::Calendar),
                    ToolDescriptor::new("create_event", "Create an event", ToolCategory::Calendar)
                        .with_parameter(ToolParameter::new("summary", "Title", true)),
                ],
            ),
            (
                ToolCategory::Knowledge,
                vec![ToolDescriptor::new(
                    "search_knowledge",
                    "Look up the knowledge base",
                    ToolCategory::Knowledge,
                )],
            ),
        ]
    }

    #[test]
    fn test_tool_catalogue_grouping() {
        let rendered = OrchestratorPromptTemplate::tool_catalogue(&sample_catalogue());
        assert!(rendered.contains("### calendar"));
        assert!(rendered.contains("### knowledge"));
        assert!(rendered.contains("**get_events**"));
        assert!(rendered.contains("summary (string, required)"));
    }

    #[test]
    fn test_tool_catalogue_empty() {
        assert_eq!(
            OrchestratorPromptTemplate::tool_catalogue(&[]),
            "(no tools registered)"
        );
    }

    #[test]
    fn test_analysis_includes_knowledge_stores() {
        let prompt = OrchestratorPromptTemplate::analysis(
            "show my events",
            "(no prior conversation)",
            "catalogue",
            &["vs-team-docs".to_string()],
        );
        assert!(prompt.contains("vs-team-docs"));
        assert!(prompt.contains("show my events"));
    }

    #[test]
    fn test_decision_prompt_mentions_marker_and_budget() {
        let prompt =
            OrchestratorPromptTemplate::tool_decision("show my events", "trace", "catalogue", 3);
        assert!(prompt.contains("CALL_TOOLS:"));
        assert!(prompt.contains("up to 3 tool call(s)"));
    }

    #[test]
    fn test_evaluation_prompt_mentions_markers() {
        let prompt = OrchestratorPromptTemplate::progress_evaluation("show my events", "trace");
        assert!(prompt.contains("COMPLETE:"));
        assert!(prompt.contains("CONTINUE:"));
    }

    #[test]
    fn test_synthesis_prompt_carries_failure_contract() {
        let prompt = OrchestratorPromptTemplate::synthesis("create a meeting", "history", "results", "trace");
        assert!(prompt.contains("failed"));
        assert!(prompt.contains("successful tool result"));
    }

    #[test]
    fn test_expected_answer_shape() {
        assert!(
            OrchestratorPromptTemplate::expected_answer_shape("list each meeting")
                .contains("itemized")
        );
        assert!(
            OrchestratorPromptTemplate::expected_answer_shape("how's my week looking?")
                .contains("summary")
        );
    }

    #[test]
    fn test_refinement_prefers_structured_changes() {
        let prompt = OrchestratorPromptTemplate::refinement(
            "list my events",
            "draft",
            "full feedback text",
            &["use bullets".to_string()],
        );
        assert!(prompt.contains("- use bullets"));
        assert!(!prompt.contains("full feedback text"));

        let fallback =
            OrchestratorPromptTemplate::refinement("list my events", "draft", "full feedback text", &[]);
        assert!(fallback.contains("full feedback text"));
    }
}
