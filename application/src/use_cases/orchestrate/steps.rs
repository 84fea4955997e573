//! Step producers for the orchestrate use case.
//!
//! Each producer builds one prompt, requests one completion, and (except
//! for format validation, which only records when it triggers a
//! refinement) appends one step to the trace. Gateway failures propagate
//! to the caller; malformed-but-present text is the parser's concern and
//! never raises here.

use super::Orchestrator;
use super::types::OrchestrateError;
use crate::ports::llm_gateway::{CompletionOptions, LlmGateway};
use crate::ports::tool_registry::ToolRegistryPort;
use kalendo_domain::{ModelId, OrchestratorPromptTemplate, RunTrace, StepKind};
use tracing::debug;

/// Pre-rendered blocks shared by every producer in one run.
pub(super) struct PromptBlocks {
    pub user_message: String,
    pub history: String,
    pub catalogue: String,
}

impl<G, R> Orchestrator<G, R>
where
    G: LlmGateway + 'static,
    R: ToolRegistryPort + 'static,
{
    /// Produce the initial analysis step: decompose the request, pick
    /// relevant tool categories, assess complexity.
    pub(super) async fn produce_analysis(
        &self,
        model: &ModelId,
        blocks: &PromptBlocks,
        trace: &mut RunTrace,
    ) -> Result<(), OrchestrateError> {
        let prompt = OrchestratorPromptTemplate::analysis(
            &blocks.user_message,
            &blocks.history,
            &blocks.catalogue,
            &self.knowledge.store_ids,
        );
        let completion = self
            .gateway
            .complete(&prompt, model, &CompletionOptions::focused())
            .await?;
        debug!("Analysis produced {} chars", completion.text.len());
        trace.record(
            StepKind::Analysis,
            completion.text,
            Some("request decomposition".to_string()),
        );
        Ok(())
    }

    /// Produce a tool decision step and return its raw text for parsing.
    pub(super) async fn produce_decision(
        &self,
        model: &ModelId,
        blocks: &PromptBlocks,
        remaining_tool_calls: usize,
        trace: &mut RunTrace,
    ) -> Result<String, OrchestrateError> {
        let prompt = OrchestratorPromptTemplate::tool_decision(
            &blocks.user_message,
            &trace.to_prompt_context(),
            &blocks.catalogue,
            remaining_tool_calls,
        );
        let completion = self
            .gateway
            .complete(&prompt, model, &CompletionOptions::focused())
            .await?;
        trace.record(
            StepKind::Evaluation,
            completion.text.clone(),
            Some("tool decision".to_string()),
        );
        Ok(completion.text)
    }

    /// Produce a progress evaluation step and return its raw text.
    pub(super) async fn produce_evaluation(
        &self,
        model: &ModelId,
        blocks: &PromptBlocks,
        trace: &mut RunTrace,
    ) -> Result<String, OrchestrateError> {
        let prompt = OrchestratorPromptTemplate::progress_evaluation(
            &blocks.user_message,
            &trace.to_prompt_context(),
        );
        let completion = self
            .gateway
            .complete(&prompt, model, &CompletionOptions::focused())
            .await?;
        trace.record(
            StepKind::Evaluation,
            completion.text.clone(),
            Some("progress check".to_string()),
        );
        Ok(completion.text)
    }

    /// Produce the synthesis step and return the drafted answer.
    pub(super) async fn produce_synthesis(
        &self,
        model: &ModelId,
        blocks: &PromptBlocks,
        trace: &mut RunTrace,
    ) -> Result<String, OrchestrateError> {
        let prompt = OrchestratorPromptTemplate::synthesis(
            &blocks.user_message,
            &blocks.history,
            &trace.tool_results_block(),
            &trace.to_prompt_context(),
        );
        let completion = self
            .gateway
            .complete(&prompt, model, &CompletionOptions::creative())
            .await?;
        trace.record(
            StepKind::Synthesis,
            completion.text.clone(),
            Some("final answer draft".to_string()),
        );
        Ok(completion.text)
    }

    /// Run a format validation over the current draft and return the raw
    /// verdict text. Recording is left to the caller: only validations
    /// that trigger a refinement land in the trace, so the accepted
    /// synthesis is always the trace's final step.
    pub(super) async fn produce_validation(
        &self,
        model: &ModelId,
        blocks: &PromptBlocks,
        draft: &str,
    ) -> Result<String, OrchestrateError> {
        let prompt = OrchestratorPromptTemplate::format_validation(&blocks.user_message, draft);
        let completion = self
            .gateway
            .complete(&prompt, model, &CompletionOptions::focused())
            .await?;
        Ok(completion.text)
    }

    /// Produce a refinement synthesis step rewriting `draft` per the
    /// validation feedback, and return the new draft.
    pub(super) async fn produce_refinement(
        &self,
        model: &ModelId,
        blocks: &PromptBlocks,
        draft: &str,
        feedback: &str,
        changes: &[String],
        trace: &mut RunTrace,
    ) -> Result<String, OrchestrateError> {
        let prompt = OrchestratorPromptTemplate::refinement(
            &blocks.user_message,
            draft,
            feedback,
            changes,
        );
        let completion = self
            .gateway
            .complete(&prompt, model, &CompletionOptions::creative())
            .await?;
        trace.record(
            StepKind::Synthesis,
            completion.text.clone(),
            Some("format refinement".to_string()),
        );
        Ok(completion.text)
    }
}
