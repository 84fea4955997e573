//! Prompt templates for the orchestration engine.

pub mod orchestrator;

pub use orchestrator::OrchestratorPromptTemplate;
