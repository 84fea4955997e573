//! Chat history entities and prompt formatting.
//!
//! The engine receives the prior conversation as a list of
//! [`ChatMessage`]s and embeds a bounded rendering of it into the
//! analysis and synthesis prompts. The window and per-message budget
//! below keep prompt growth bounded over long conversations.

use crate::core::string::truncate;
use serde::{Deserialize, Serialize};

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn display_name(&self) -> &str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Creation time in milliseconds since the epoch
    pub timestamp: u64,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: current_timestamp(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: current_timestamp(),
        }
    }
}

/// How many trailing messages of the conversation are rendered into prompts.
pub const HISTORY_WINDOW: usize = 10;

/// Per-message character budget when rendering history into prompts.
pub const MESSAGE_BUDGET: usize = 400;

/// Render the conversation history for inclusion in a prompt.
///
/// Only the last [`HISTORY_WINDOW`] messages are included, each truncated
/// to [`MESSAGE_BUDGET`] characters.
pub fn format_history(history: &[ChatMessage]) -> String {
    if history.is_empty() {
        return "(no prior conversation)".to_string();
    }

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    history[start..]
        .iter()
        .map(|m| {
            format!(
                "{}: {}",
                m.role.display_name(),
                truncate(&m.content, MESSAGE_BUDGET)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
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

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::user("show my events");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "show my events");
        assert!(msg.timestamp > 0);

        let reply = ChatMessage::assistant("You have 2 events today.");
        assert_eq!(reply.role, Role::Assistant);
    }

    #[test]
    fn test_format_history_empty() {
        assert_eq!(format_history(&[]), "(no prior conversation)");
    }

    #[test]
    fn test_format_history_roles() {
        let history = vec![
            ChatMessage::user("what's on my calendar?"),
            ChatMessage::assistant("You have a standup at 9am."),
        ];
        let rendered = format_history(&history);
        assert!(rendered.contains("User: what's on my calendar?"));
        assert!(rendered.contains("Assistant: You have a standup at 9am."));
    }

    #[test]
    fn test_format_history_window() {
        let history: Vec<ChatMessage> = (0..20)
            .map(|i| ChatMessage::user(format!("message {}", i)))
            .collect();
        let rendered = format_history(&history);
        // Only the last HISTORY_WINDOW messages survive
        assert!(!rendered.contains("message 9"));
        assert!(rendered.contains("message 10"));
        assert!(rendered.contains("message 19"));
    }

    #[test]
    fn test_format_history_truncates_long_messages() {
        let history = vec![ChatMessage::user("x".repeat(2000))];
        let rendered = format_history(&history);
        assert!(rendered.len() < 2000);
        assert!(rendered.ends_with("..."));
    }
}
