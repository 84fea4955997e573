//! Tool domain value objects — the uniform execution result envelope.
//!
//! Every tool execution, whatever the provider, produces a [`ToolOutcome`].
//! Failures are data, not errors: the orchestration loop records them in
//! the trace and the synthesis phase reports them to the user. A registry
//! adapter should only panic/throw for genuinely unexpected conditions.

use serde::{Deserialize, Serialize};

/// Result of a tool execution.
///
/// Invariant: `success == false` implies at least one of `error` or
/// `message` is populated, so failed executions always carry a
/// diagnostic the synthesis phase can surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// Whether the execution was successful
    pub success: bool,
    /// Structured payload (for successful execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Error description (for failed execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-readable note accompanying either outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ToolOutcome {
    /// Create a successful outcome carrying a data payload
    pub fn success(data: impl Into<serde_json::Value>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
            message: None,
        }
    }

    /// Create a successful outcome with a message and no payload
    pub fn success_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.into()),
        }
    }

    /// Create a failed outcome
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Render this outcome for trace and prompt display.
    pub fn describe(&self) -> String {
        if self.success {
            let payload = self
                .data
                .as_ref()
                .map(|d| serde_json::to_string(d).unwrap_or_default())
                .unwrap_or_default();
            match (&self.message, payload.is_empty()) {
                (Some(msg), true) => msg.clone(),
                (Some(msg), false) => format!("{} — {}", msg, payload),
                (None, false) => payload,
                (None, true) => "ok".to_string(),
            }
        } else {
            let error = self.error.as_deref().unwrap_or("unknown error");
            match &self.message {
                Some(msg) => format!("error: {} ({})", error, msg),
                None => format!("error: {}", error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_success() {
        let outcome = ToolOutcome::success(json!([{"id": "1", "summary": "Standup"}]));
        assert!(outcome.is_success());
        assert!(outcome.error.is_none());
        assert!(outcome.describe().contains("Standup"));
    }

    #[test]
    fn test_outcome_failure_carries_diagnostic() {
        let outcome = ToolOutcome::failure("event not found");
        assert!(!outcome.is_success());
        assert!(outcome.error.is_some() || outcome.message.is_some());
        assert!(outcome.describe().contains("event not found"));
    }

    #[test]
    fn test_outcome_success_message() {
        let outcome = ToolOutcome::success_message("Event deleted");
        assert!(outcome.is_success());
        assert_eq!(outcome.describe(), "Event deleted");
    }

    #[test]
    fn test_outcome_failure_with_message() {
        let outcome = ToolOutcome::failure("invalid id").with_message("id must be numeric");
        let text = outcome.describe();
        assert!(text.contains("invalid id"));
        assert!(text.contains("id must be numeric"));
    }

    #[test]
    fn test_outcome_serde_skips_empty_fields() {
        let outcome = ToolOutcome::success_message("done");
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("error"));
        assert!(!json.contains("data"));
    }
}
