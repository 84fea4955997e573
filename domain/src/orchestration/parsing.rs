//! Decision parsing from model responses.
//!
//! The engine drives a text-completion model as its decision-maker, so
//! every control-flow branch runs through free text. These functions
//! extract structured decisions from the several equivalent encodings
//! the model may produce non-deterministically. They are pure domain
//! logic — no I/O, just text pattern matching — and they never fail:
//! unparseable input degrades to "no action" / "done", not an error.
//!
//! # Functions
//!
//! | Function | Use Case | Markers |
//! |----------|----------|---------|
//! | [`parse_tool_decisions`] | Tool decision step | `CALL_TOOLS:` / `EXECUTE:` |
//! | [`parse_progress_verdict`] | Progress evaluation | `CONTINUE:` / `COMPLETE:` |
//! | [`parse_format_verdict`] | Format validation | `FORMAT_ACCEPTABLE` |

use crate::tool::entities::ToolInvocation;
use std::collections::HashMap;

const CALL_TOOLS_MARKER: &str = "CALL_TOOLS:";
const CONTINUE_MARKER: &str = "CONTINUE:";
const COMPLETE_MARKER: &str = "COMPLETE:";
const FORMAT_ACCEPTABLE_MARKER: &str = "FORMAT_ACCEPTABLE";

/// Phrases implying the evaluator wants more tool work.
const CONTINUE_PHRASES: &[&str] = &[
    "need more",
    "needs more",
    "insufficient",
    "not enough",
    "retry",
    "no relevant data",
    "still missing",
];

/// Phrases implying the evaluator considers the gathered data sufficient.
const COMPLETE_PHRASES: &[&str] = &[
    "sufficient data retrieved",
    "successfully retrieved",
    "enough information",
    "all requested data",
    "no further tools",
];

/// Extract proposed tool calls from a decision response.
///
/// Accepts, in priority order:
///
/// 1. A fenced code block containing `CALL_TOOLS:` followed by a JSON array
/// 2. The same marker without fencing
/// 3. A bare JSON array whose first element has a `name` field
/// 4. The legacy `EXECUTE: <tool>` / `PARAMETERS: {...}` textual form
///
/// Returns an empty list — meaning "no tools requested" — when none of
/// the patterns match or JSON parsing fails. Never panics for any input.
pub fn parse_tool_decisions(response: &str) -> Vec<ToolInvocation> {
    // 1. Fenced code block containing the marker
    for block in fenced_blocks(response) {
        if let Some(idx) = block.find(CALL_TOOLS_MARKER)
            && let Some(calls) = parse_call_array(&block[idx + CALL_TOOLS_MARKER.len()..])
        {
            return calls;
        }
    }

    // 2. Marker without fencing
    if let Some(idx) = response.find(CALL_TOOLS_MARKER)
        && let Some(calls) = parse_call_array(&response[idx + CALL_TOOLS_MARKER.len()..])
    {
        return calls;
    }

    // 3. Bare JSON array whose first element carries a name
    let trimmed = response.trim();
    if trimmed.starts_with('[')
        && let Ok(serde_json::Value::Array(items)) = serde_json::from_str(trimmed)
        && items
            .first()
            .map(|v| v.get("name").is_some())
            .unwrap_or(false)
    {
        return items.iter().filter_map(invocation_from_json).collect();
    }

    // 4. Legacy EXECUTE/PARAMETERS form
    parse_legacy_form(response)
}

/// Whether a decision response that proposed no tools nonetheless asks
/// for more tool work (which keeps the loop going).
pub fn requests_more_tools(response: &str) -> bool {
    let lower = response.to_lowercase();
    ["need more tool", "additional tool", "more tools", "another tool"]
        .iter()
        .any(|phrase| lower.contains(phrase))
}

/// Verdict of a progress evaluation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressVerdict {
    /// More tool work is needed; loop back to the tool decision
    Continue,
    /// The gathered data is sufficient; proceed to synthesis
    Complete,
}

/// Classify a progress evaluation response as continue or complete.
///
/// The literal `CONTINUE:` marker forces [`ProgressVerdict::Continue`];
/// `COMPLETE:` forces [`ProgressVerdict::Complete`]. Without either
/// marker, keyword scoring applies. Ambiguous or conflicting signals
/// default to complete so the loop always terminates.
pub fn parse_progress_verdict(response: &str) -> ProgressVerdict {
    if response.contains(CONTINUE_MARKER) {
        return ProgressVerdict::Continue;
    }
    if response.contains(COMPLETE_MARKER) {
        return ProgressVerdict::Complete;
    }

    let lower = response.to_lowercase();
    let wants_more = CONTINUE_PHRASES.iter().any(|p| lower.contains(p));
    let is_done = COMPLETE_PHRASES.iter().any(|p| lower.contains(p));

    if wants_more && !is_done {
        ProgressVerdict::Continue
    } else {
        ProgressVerdict::Complete
    }
}

/// Verdict of a format validation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVerdict {
    /// The answer's shape matches the user's likely intent
    Acceptable,
    /// The answer should be rewritten per the validation feedback
    NeedsRefinement,
}

/// Classify a format validation response.
///
/// Only the literal `FORMAT_ACCEPTABLE` marker accepts; anything else
/// (notably `FORMAT_NEEDS_REFINEMENT`) requests refinement.
pub fn parse_format_verdict(response: &str) -> FormatVerdict {
    if response.contains(FORMAT_ACCEPTABLE_MARKER) {
        FormatVerdict::Acceptable
    } else {
        FormatVerdict::NeedsRefinement
    }
}

/// Extract the bullet/numbered change requests from a validation response.
///
/// Returns an empty list when the response has no list structure; the
/// refinement prompt then falls back to the full response text.
pub fn extract_change_requests(response: &str) -> Vec<String> {
    response
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            let rest = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
                .or_else(|| {
                    let (head, tail) = trimmed.split_once(". ")?;
                    head.parse::<u32>().ok().map(|_| tail)
                })?;
            let rest = rest.trim();
            (!rest.is_empty()).then(|| rest.to_string())
        })
        .collect()
}

/// Collect the contents of all fenced code blocks (``` ... ```),
/// ignoring any language tag on the opening fence.
fn fenced_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            match current.take() {
                Some(block) => blocks.push(block),
                None => current = Some(String::new()),
            }
        } else if let Some(block) = current.as_mut() {
            block.push_str(line);
            block.push('\n');
        }
    }
    blocks
}

/// Parse a JSON array of tool calls from the text following a marker.
///
/// Returns `None` when no array is found or JSON parsing fails, so the
/// caller can fall through to the next accepted form.
fn parse_call_array(text: &str) -> Option<Vec<ToolInvocation>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    let items: Vec<serde_json::Value> = serde_json::from_str(&text[start..=end]).ok()?;
    Some(items.iter().filter_map(invocation_from_json).collect())
}

/// Build a [`ToolInvocation`] from one JSON array element.
///
/// Elements without a non-empty `name` string are skipped. Parameters
/// are read from `parameters`, `params`, or `arguments`.
fn invocation_from_json(value: &serde_json::Value) -> Option<ToolInvocation> {
    let name = value.get("name")?.as_str()?;
    if name.is_empty() {
        return None;
    }

    let arguments: HashMap<String, serde_json::Value> = ["parameters", "params", "arguments"]
        .iter()
        .find_map(|key| value.get(*key)?.as_object().cloned())
        .map(|obj| obj.into_iter().collect())
        .unwrap_or_default();

    let mut invocation = ToolInvocation::new(name);
    invocation.arguments = arguments;
    if let Some(reasoning) = value.get("reasoning").and_then(|v| v.as_str())
        && !reasoning.is_empty()
    {
        invocation = invocation.with_reasoning(reasoning);
    }
    Some(invocation)
}

/// Parse the legacy textual form:
///
/// ```text
/// EXECUTE: get_events
/// PARAMETERS: {"from": "2025-06-01"}
/// ```
///
/// Multiple EXECUTE blocks are accepted. A missing or malformed
/// PARAMETERS line yields an invocation with empty arguments.
fn parse_legacy_form(response: &str) -> Vec<ToolInvocation> {
    let mut calls = Vec::new();
    let mut lines = response.lines().peekable();

    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        let Some(name) = trimmed.strip_prefix("EXECUTE:") else {
            continue;
        };
        let name = name.trim().trim_matches('`');
        if name.is_empty() {
            continue;
        }

        let mut invocation = ToolInvocation::new(name);

        // Look ahead past blank lines for a PARAMETERS line
        while let Some(next) = lines.peek() {
            let next_trimmed = next.trim();
            if next_trimmed.is_empty() {
                lines.next();
                continue;
            }
            if let Some(rest) = next_trimmed.strip_prefix("PARAMETERS:") {
                lines.next();
                if let Some(json) = extract_balanced_object(rest)
                    && let Ok(serde_json::Value::Object(obj)) = serde_json::from_str(json)
                {
                    invocation.arguments = obj.into_iter().collect();
                }
            }
            break;
        }

        calls.push(invocation);
    }
    calls
}

/// Find the first balanced `{...}` object in a string, tolerating nested
/// braces and braces inside string literals.
fn extract_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== parse_tool_decisions ====================

    #[test]
    fn test_parse_fenced_call_tools() {
        let response = r#"I'll look at the calendar first.

```
CALL_TOOLS: [
  {"name": "get_events", "parameters": {}, "reasoning": "User asked for events"},
  {"name": "search_events", "parameters": {"query": "standup"}}
]
```
"#;
        let calls = parse_tool_decisions(response);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].tool_name, "get_events");
        assert_eq!(calls[0].reasoning.as_deref(), Some("User asked for events"));
        assert_eq!(calls[1].get_string("query"), Some("standup"));
    }

    #[test]
    fn test_parse_fenced_with_language_tag() {
        let response = "```json\nCALL_TOOLS: [{\"name\": \"get_events\", \"parameters\": {}}]\n```";
        let calls = parse_tool_decisions(response);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_name, "get_events");
    }

    #[test]
    fn test_parse_unfenced_marker() {
        let response = r#"CALL_TOOLS: [{"name": "create_event", "params": {"summary": "Standup", "start": "2025-06-02T09:00"}}]"#;
        let calls = parse_tool_decisions(response);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_name, "create_event");
        assert_eq!(calls[0].get_string("summary"), Some("Standup"));
    }

    #[test]
    fn test_parse_bare_json_array() {
        let response = r#"[{"name": "get_events", "arguments": {"from": "2025-06-01"}}]"#;
        let calls = parse_tool_decisions(response);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].get_string("from"), Some("2025-06-01"));
    }

    #[test]
    fn test_parse_bare_array_without_names_is_ignored() {
        let response = r#"["just", "some", "strings"]"#;
        assert!(parse_tool_decisions(response).is_empty());
    }

    #[test]
    fn test_parse_legacy_form() {
        let response = "EXECUTE: delete_event\nPARAMETERS: {\"id\": \"42\"}";
        let calls = parse_tool_decisions(response);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_name, "delete_event");
        assert_eq!(calls[0].get_string("id"), Some("42"));
    }

    #[test]
    fn test_parse_legacy_form_multiple_blocks() {
        let response = "EXECUTE: get_events\nPARAMETERS: {}\n\nEXECUTE: search_knowledge\nPARAMETERS: {\"query\": \"holidays\"}";
        let calls = parse_tool_decisions(response);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].tool_name, "search_knowledge");
    }

    #[test]
    fn test_parse_legacy_form_without_parameters() {
        let response = "EXECUTE: get_events";
        let calls = parse_tool_decisions(response);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].arguments.is_empty());
    }

    #[test]
    fn test_parse_plain_prose_returns_empty() {
        let calls = parse_tool_decisions("I think we should look at calendar");
        assert!(calls.is_empty());
    }

    #[test]
    fn test_parse_never_panics_on_garbage() {
        for input in [
            "",
            "CALL_TOOLS:",
            "CALL_TOOLS: not json at all",
            "CALL_TOOLS: [{broken",
            "```\nCALL_TOOLS: [}{\n```",
            "EXECUTE:",
            "PARAMETERS: {\"orphan\": true}",
            "[[[[",
            "{\"name\": \"not-an-array\"}",
        ] {
            let calls = parse_tool_decisions(input);
            assert!(calls.is_empty(), "expected no calls for {:?}", input);
        }
    }

    #[test]
    fn test_parse_skips_items_without_name() {
        let response =
            r#"CALL_TOOLS: [{"parameters": {}}, {"name": "get_events", "parameters": {}}]"#;
        let calls = parse_tool_decisions(response);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_name, "get_events");
    }

    #[test]
    fn test_requests_more_tools() {
        assert!(requests_more_tools("We need more tools to answer this."));
        assert!(requests_more_tools("An additional tool call is required."));
        assert!(!requests_more_tools("The information at hand is enough."));
    }

    // ==================== parse_progress_verdict ====================

    #[test]
    fn test_verdict_markers() {
        assert_eq!(
            parse_progress_verdict("CONTINUE: still missing the attendee list"),
            ProgressVerdict::Continue
        );
        assert_eq!(
            parse_progress_verdict("COMPLETE: all events retrieved"),
            ProgressVerdict::Complete
        );
    }

    #[test]
    fn test_verdict_continue_marker_wins_over_keywords() {
        // Marker beats keyword fallback
        assert_eq!(
            parse_progress_verdict("CONTINUE: although data was successfully retrieved"),
            ProgressVerdict::Continue
        );
    }

    #[test]
    fn test_verdict_keyword_fallback() {
        assert_eq!(
            parse_progress_verdict("The data is insufficient to answer."),
            ProgressVerdict::Continue
        );
        assert_eq!(
            parse_progress_verdict("Sufficient data retrieved for the answer."),
            ProgressVerdict::Complete
        );
    }

    #[test]
    fn test_verdict_ambiguous_defaults_to_complete() {
        assert_eq!(parse_progress_verdict(""), ProgressVerdict::Complete);
        assert_eq!(
            parse_progress_verdict("Hmm, hard to say."),
            ProgressVerdict::Complete
        );
        // Conflicting signals also resolve to complete
        assert_eq!(
            parse_progress_verdict("We need more, but sufficient data retrieved overall."),
            ProgressVerdict::Complete
        );
    }

    // ==================== parse_format_verdict ====================

    #[test]
    fn test_format_verdict() {
        assert_eq!(
            parse_format_verdict("FORMAT_ACCEPTABLE — reads well"),
            FormatVerdict::Acceptable
        );
        assert_eq!(
            parse_format_verdict("FORMAT_NEEDS_REFINEMENT\n- use a bullet list"),
            FormatVerdict::NeedsRefinement
        );
        assert_eq!(
            parse_format_verdict("no markers at all"),
            FormatVerdict::NeedsRefinement
        );
    }

    #[test]
    fn test_extract_change_requests() {
        let response = "FORMAT_NEEDS_REFINEMENT\n- use a bullet list\n* keep times in 24h format\n1. lead with the event count\nsome prose";
        let changes = extract_change_requests(response);
        assert_eq!(
            changes,
            vec![
                "use a bullet list",
                "keep times in 24h format",
                "lead with the event count"
            ]
        );
    }

    #[test]
    fn test_extract_change_requests_empty() {
        assert!(extract_change_requests("FORMAT_ACCEPTABLE").is_empty());
    }

    // ==================== helpers ====================

    #[test]
    fn test_extract_balanced_object() {
        assert_eq!(
            extract_balanced_object(r#" {"a": {"b": 1}} trailing"#),
            Some(r#"{"a": {"b": 1}}"#)
        );
        assert_eq!(
            extract_balanced_object(r#"{"s": "has } brace"}"#),
            Some(r#"{"s": "has } brace"}"#)
        );
        assert_eq!(extract_balanced_object("no braces"), None);
        assert_eq!(extract_balanced_object("{never closed"), None);
    }

    #[test]
    fn test_fenced_blocks() {
        let text = "before\n```json\ninside\n```\nafter\n```\nsecond\n```";
        let blocks = fenced_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].trim(), "inside");
        assert_eq!(blocks[1].trim(), "second");
    }
}
