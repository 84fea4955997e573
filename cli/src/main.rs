//! CLI entrypoint for kalendo
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod args;
mod output;
mod progress;
mod repl;

use anyhow::{Result, bail};
use args::{Cli, OutputFormat};
use clap::Parser;
use kalendo_application::{OrchestrateInput, Orchestrator};
use kalendo_domain::ModelId;
use kalendo_infrastructure::{
    CalendarProvider, ConfigLoader, HttpLlmGateway, KnowledgeProvider, ToolRegistry,
};
use output::ConsoleFormatter;
use progress::{ConsoleProgress, SimpleProgress};
use repl::ChatRepl;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    // CLI flags override file configuration
    let model: ModelId = cli
        .model
        .clone()
        .unwrap_or_else(|| config.model.model.clone())
        .into();
    let mut run_config = config.orchestrator_config();
    if let Some(max_steps) = cli.max_steps {
        run_config = run_config.with_max_steps(max_steps);
    }
    if let Some(max_tool_calls) = cli.max_tool_calls {
        run_config = run_config.with_max_tool_calls(max_tool_calls);
    }
    if cli.trace || matches!(cli.output, OutputFormat::Full) {
        run_config = run_config.with_development_mode(true);
    }

    info!("Starting kalendo (model: {})", model);

    // === Dependency Injection ===
    let gateway = Arc::new(HttpLlmGateway::new(
        config.model.base_url.clone(),
        config.model.api_key.clone(),
    ));
    let registry = Arc::new(
        ToolRegistry::new()
            .register(CalendarProvider::new())
            .register(KnowledgeProvider::new(
                config.knowledge.store_ids.clone(),
                config.knowledge.documents.clone(),
            )),
    );
    let orchestrator = Orchestrator::new(gateway, registry.clone())
        .with_knowledge(config.knowledge_config());

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(orchestrator, registry, model, run_config)
            .with_progress(!cli.quiet && config.repl.show_progress)
            .with_history_file(config.repl.history_file.as_ref().map(PathBuf::from));

        repl.run().await?;
        return Ok(());
    }

    // Single message mode - message is required
    let Some(message) = cli.message else {
        bail!("A message is required. Use --chat for interactive mode.");
    };

    // Ctrl-C cancels the in-flight run instead of killing the process
    let token = CancellationToken::new();
    let orchestrator = orchestrator.with_cancellation(token.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let input = OrchestrateInput::new(message, model).with_config(run_config.clone());

    let result = if cli.quiet {
        orchestrator.orchestrate(input).await
    } else if cli.verbose > 0 {
        // Log lines and a spinner fight over the terminal; plain text
        // progress keeps verbose output readable
        orchestrator
            .orchestrate_with_progress(input, &SimpleProgress)
            .await
    } else {
        let progress = ConsoleProgress::new();
        let result = orchestrator.orchestrate_with_progress(input, &progress).await;
        progress.finish();
        result
    };

    let rendered = match cli.output {
        OutputFormat::Answer if run_config.development_mode => {
            ConsoleFormatter::format_full(&result)
        }
        OutputFormat::Answer => ConsoleFormatter::format_answer(&result),
        OutputFormat::Full => ConsoleFormatter::format_full(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };
    println!("{}", rendered);

    if !result.success {
        std::process::exit(1);
    }

    Ok(())
}
