//! LLM Gateway port
//!
//! Defines the interface for the text-completion service driving the
//! orchestration loop. The gateway is treated as unreliable and
//! non-deterministic: it may be slow, and it may return nonsense — but
//! nonsense is the parser's problem, not the gateway's. A gateway
//! implementation throws only for transport-level failures.

use async_trait::async_trait;
use kalendo_domain::ModelId;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Sampling knobs for one completion request.
///
/// Producer-local concern: control-flow steps (analysis, decisions,
/// evaluations) run more deterministic, prose steps (synthesis,
/// refinement) more creative. Gateways that don't expose sampling may
/// ignore these.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    /// Low-temperature options for control-flow steps.
    pub fn focused() -> Self {
        Self {
            temperature: Some(0.2),
            max_tokens: None,
        }
    }

    /// Higher-temperature options for free-form prose steps.
    pub fn creative() -> Self {
        Self {
            temperature: Some(0.7),
            max_tokens: None,
        }
    }
}

/// A best-effort text completion
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer obtains completions.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Request a completion for `prompt` from `model`.
    ///
    /// Must return `Err` only for transport/service failures, never for
    /// malformed model output.
    async fn complete(
        &self,
        prompt: &str,
        model: &ModelId,
        options: &CompletionOptions,
    ) -> Result<Completion, GatewayError>;
}
