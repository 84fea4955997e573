//! Orchestrate use case
//!
//! Drives the bounded iterative loop at the heart of the assistant:
//!
//! ```text
//! ANALYSIS ──> DECISION ⇄ EXECUTE_TOOLS ⇄ EVALUATE ──> SYNTHESIZE ──> VALIDATE ⇄ REFINE ──> DONE
//!                                                                                │
//!                                  FATAL_ERROR <────────── any uncaught error ───┘
//! ```
//!
//! | Phase | Step kind | Bounded by |
//! |-------|-----------|------------|
//! | Analysis | `analysis` | runs once |
//! | Tool decision | `evaluation` | `max_steps` |
//! | Tool execution | `tool_call` | `max_tool_calls` |
//! | Progress evaluation | `evaluation` | `max_steps` |
//! | Synthesis / refinement | `synthesis` | 3 attempts total |
//! | Format validation | `evaluation` | refinement cap |
//!
//! Both budgets are checked before each decision/execution cycle; the
//! synthesis tail is exempt from them but capped at three attempts.
//! Gateway failures abort the run with a fixed apology answer; tool
//! failures and malformed model output are absorbed into the trace.

mod steps;
mod types;

pub use types::{OrchestrateError, OrchestrateInput};

use crate::config::KnowledgeConfig;
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, ProgressReporter};
use crate::ports::tool_registry::ToolRegistryPort;
use crate::use_cases::shared::check_cancelled;
use kalendo_domain::{
    FormatVerdict, OrchestrationResult, ProgressVerdict, RunTrace, StepKind, ToolCategory,
    ToolExecution, extract_change_requests, format_history, is_scheduling_request,
    parse_format_verdict, parse_progress_verdict, parse_tool_decisions, requests_more_tools,
    truncate, OrchestratorPromptTemplate,
};
use std::sync::Arc;
use steps::PromptBlocks;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use types::FALLBACK_ANSWER;

/// Hard cap on synthesis attempts per run: one initial draft plus up to
/// two refinements.
pub const MAX_SYNTHESIS_ATTEMPTS: usize = 3;

/// The orchestration engine.
///
/// Holds read-only collaborators (gateway, registry, knowledge config)
/// and no per-run state, so one instance can serve concurrent runs.
pub struct Orchestrator<G: LlmGateway + 'static, R: ToolRegistryPort + 'static> {
    gateway: Arc<G>,
    registry: Arc<R>,
    knowledge: KnowledgeConfig,
    cancellation_token: Option<CancellationToken>,
}

impl<G, R> Clone for Orchestrator<G, R>
where
    G: LlmGateway + 'static,
    R: ToolRegistryPort + 'static,
{
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            registry: self.registry.clone(),
            knowledge: self.knowledge.clone(),
            cancellation_token: self.cancellation_token.clone(),
        }
    }
}

impl<G: LlmGateway + 'static, R: ToolRegistryPort + 'static> Orchestrator<G, R> {
    pub fn new(gateway: Arc<G>, registry: Arc<R>) -> Self {
        Self {
            gateway,
            registry,
            knowledge: KnowledgeConfig::default(),
            cancellation_token: None,
        }
    }

    /// Inject the knowledge-store configuration (read-only for the run).
    pub fn with_knowledge(mut self, knowledge: KnowledgeConfig) -> Self {
        self.knowledge = knowledge;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Run the engine without progress reporting
    pub async fn orchestrate(&self, input: OrchestrateInput) -> OrchestrationResult {
        self.orchestrate_with_progress(input, &NoProgress).await
    }

    /// Run the engine with progress callbacks.
    ///
    /// Always returns an [`OrchestrationResult`]: fatal errors surface
    /// as `success == false` with a fixed apology answer, never as a
    /// panic or a raw error to the caller.
    pub async fn orchestrate_with_progress(
        &self,
        input: OrchestrateInput,
        progress: &dyn ProgressReporter,
    ) -> OrchestrationResult {
        info!(
            "Starting orchestration for: {}",
            truncate(&input.user_message, 120)
        );
        let development_mode = input.config.development_mode;
        let mut trace = RunTrace::new();

        match self.run(&input, &mut trace, progress).await {
            Ok(answer) => {
                info!(
                    "Orchestration complete: {} steps, {} tool calls",
                    trace.step_count(),
                    trace.tool_call_count()
                );
                trace.into_result(true, answer, None, development_mode)
            }
            Err(e) => {
                warn!("Orchestration aborted: {}", e);
                progress.report("Something went wrong — stopping this run");
                trace.into_result(false, FALLBACK_ANSWER, Some(e.to_string()), development_mode)
            }
        }
    }

    async fn run(
        &self,
        input: &OrchestrateInput,
        trace: &mut RunTrace,
        progress: &dyn ProgressReporter,
    ) -> Result<String, OrchestrateError> {
        check_cancelled(&self.cancellation_token)?;

        let blocks = PromptBlocks {
            user_message: input.user_message.clone(),
            history: format_history(&input.chat_history),
            catalogue: OrchestratorPromptTemplate::tool_catalogue(&self.registry.catalogue()),
        };
        let model = &input.model;
        let config = &input.config;

        // ==================== Analysis ====================
        progress.report("Analyzing your request");
        self.produce_analysis(model, &blocks, trace).await?;

        // ==================== Decision / Execution / Evaluation loop ====================
        loop {
            check_cancelled(&self.cancellation_token)?;

            // Budgets are checked before each new cycle; the synthesis
            // tail below is exempt.
            if trace.step_count() >= config.max_steps {
                info!("Step budget reached ({}), moving to synthesis", config.max_steps);
                progress.report("Step budget reached — composing the answer");
                break;
            }
            if trace.tool_call_count() >= config.max_tool_calls {
                info!(
                    "Tool budget reached ({}), moving to synthesis",
                    config.max_tool_calls
                );
                progress.report("Tool budget reached — composing the answer");
                break;
            }

            progress.report("Deciding which tools to use");
            let remaining = config.max_tool_calls - trace.tool_call_count();
            let decision_text = self
                .produce_decision(model, &blocks, remaining, trace)
                .await?;
            let proposed = parse_tool_decisions(&decision_text);

            if proposed.is_empty() {
                if requests_more_tools(&decision_text) {
                    debug!("Decision proposed no parseable calls but asked for more tools");
                } else {
                    progress.report("No tools needed");
                    break;
                }
            }

            for invocation in &proposed {
                check_cancelled(&self.cancellation_token)?;
                if trace.tool_call_count() >= config.max_tool_calls {
                    warn!("Tool budget exhausted mid-batch, dropping remaining proposals");
                    progress.report("Tool budget reached — skipping remaining tool calls");
                    break;
                }

                progress.report(&format!("Running {}", invocation.tool_name));
                let started = current_timestamp();
                let outcome = self.registry.execute(invocation).await;
                let finished = current_timestamp();

                if outcome.is_success() {
                    progress.report(&format!("{} finished", invocation.tool_name));
                } else {
                    warn!(
                        "Tool {} failed: {}",
                        invocation.tool_name,
                        outcome.error.as_deref().unwrap_or("unknown")
                    );
                    progress.report(&format!("{} failed", invocation.tool_name));
                }
                trace.record_tool_execution(ToolExecution::new(
                    invocation, outcome, started, finished,
                ));
            }

            progress.report("Checking progress");
            let evaluation_text = self.produce_evaluation(model, &blocks, trace).await?;
            let mut verdict = parse_progress_verdict(&evaluation_text);

            // Scheduling-domain retry: a calendar-flavoured request that
            // evaluates complete without any calendar tool having been
            // attempted gets one more decision cycle. Once a calendar
            // tool was attempted (even if it failed), the verdict stands.
            if verdict == ProgressVerdict::Complete
                && is_scheduling_request(&input.user_message)
                && !self.calendar_tool_attempted(trace)
            {
                info!("Calendar request evaluated complete without calendar tools — retrying decision");
                progress.report("Taking another look at the calendar tools");
                verdict = ProgressVerdict::Continue;
            }

            if verdict == ProgressVerdict::Complete {
                break;
            }
        }

        // ==================== Synthesis / Validation / Refinement ====================
        progress.report("Composing the answer");
        let mut answer = self.produce_synthesis(model, &blocks, trace).await?;

        loop {
            if trace.synthesis_count() >= MAX_SYNTHESIS_ATTEMPTS {
                info!("Synthesis attempt cap reached, accepting current draft");
                break;
            }
            check_cancelled(&self.cancellation_token)?;

            progress.report("Checking answer format");
            let validation_text = self.produce_validation(model, &blocks, &answer).await?;
            if parse_format_verdict(&validation_text) == FormatVerdict::Acceptable {
                debug!("Answer format accepted");
                break;
            }

            let changes = extract_change_requests(&validation_text);
            trace.record(
                StepKind::Evaluation,
                validation_text.clone(),
                Some("format validation".to_string()),
            );
            progress.report("Refining the answer format");
            answer = self
                .produce_refinement(model, &blocks, &answer, &validation_text, &changes, trace)
                .await?;
        }

        Ok(answer)
    }

    /// Whether any calendar-category tool has been attempted this run.
    fn calendar_tool_attempted(&self, trace: &RunTrace) -> bool {
        trace.attempted_tools().any(|name| {
            self.registry
                .descriptor(name)
                .map(|d| d.category == ToolCategory::Calendar)
                .unwrap_or(false)
        })
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
