//! Type definitions for the orchestrate use case.

use crate::config::OrchestratorConfig;
use crate::ports::llm_gateway::GatewayError;
use kalendo_domain::{ChatMessage, ModelId};
use thiserror::Error;

/// Fixed user-facing answer when a run aborts on a fatal error.
///
/// Never replaced by raw exception text; the real error goes into
/// `OrchestrationResult::error` for the caller.
pub(crate) const FALLBACK_ANSWER: &str =
    "I'm sorry — something went wrong while working on your request. Please try again.";

/// Errors that can abort an orchestration run
#[derive(Error, Debug)]
pub enum OrchestrateError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl OrchestrateError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrchestrateError::Cancelled)
    }
}

/// Input for one orchestration run
#[derive(Debug, Clone)]
pub struct OrchestrateInput {
    /// The user's message
    pub user_message: String,
    /// Prior conversation, oldest first
    pub chat_history: Vec<ChatMessage>,
    /// Model driving this run
    pub model: ModelId,
    /// Run-scoped budgets and flags
    pub config: OrchestratorConfig,
}

impl OrchestrateInput {
    pub fn new(user_message: impl Into<String>, model: impl Into<ModelId>) -> Self {
        Self {
            user_message: user_message.into(),
            chat_history: Vec::new(),
            model: model.into(),
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.chat_history = history;
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }
}
