//! Application layer for kalendo
//!
//! This crate contains the orchestration engine (use case), port
//! definitions, and run-scoped configuration. It depends only on the
//! domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{KnowledgeConfig, OrchestratorConfig};
pub use ports::{
    llm_gateway::{Completion, CompletionOptions, GatewayError, LlmGateway},
    progress::{NoProgress, ProgressReporter},
    tool_registry::ToolRegistryPort,
};
pub use use_cases::orchestrate::{OrchestrateError, OrchestrateInput, Orchestrator};
