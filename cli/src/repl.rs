//! Interactive chat REPL.
//!
//! Keeps the running conversation in memory and hands it to the engine
//! with every message, so follow-up questions can reference earlier
//! turns. Slash commands are handled locally and never reach the engine.

use crate::output::ConsoleFormatter;
use crate::progress::ConsoleProgress;
use anyhow::Result;
use kalendo_application::{
    LlmGateway, NoProgress, OrchestrateInput, Orchestrator, OrchestratorConfig, ToolRegistryPort,
};
use kalendo_domain::{ChatMessage, ModelId};
use reedline::{
    DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};
use std::path::PathBuf;
use std::sync::Arc;

/// How many history entries the line editor keeps.
const LINE_HISTORY_CAPACITY: usize = 200;

/// Interactive chat REPL
pub struct ChatRepl<G: LlmGateway + 'static, R: ToolRegistryPort + 'static> {
    orchestrator: Orchestrator<G, R>,
    registry: Arc<R>,
    model: ModelId,
    run_config: OrchestratorConfig,
    show_progress: bool,
    history_file: Option<PathBuf>,
    conversation: Vec<ChatMessage>,
}

impl<G: LlmGateway + 'static, R: ToolRegistryPort + 'static> ChatRepl<G, R> {
    pub fn new(
        orchestrator: Orchestrator<G, R>,
        registry: Arc<R>,
        model: ModelId,
        run_config: OrchestratorConfig,
    ) -> Self {
        Self {
            orchestrator,
            registry,
            model,
            run_config,
            show_progress: true,
            history_file: None,
            conversation: Vec::new(),
        }
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Set the line-editor history file
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> Result<()> {
        let mut editor = Reedline::create();

        let history_path = self.history_path();
        if let Some(path) = &history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(history) = FileBackedHistory::with_file(LINE_HISTORY_CAPACITY, path.clone())
            {
                editor = editor.with_history(Box::new(history));
            }
        }

        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("kalendo".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt) {
                Ok(Signal::Success(line)) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    self.process_message(line).await;
                }
                Ok(Signal::CtrlC) => {
                    println!("^C");
                    continue;
                }
                Ok(Signal::CtrlD) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    fn history_path(&self) -> Option<PathBuf> {
        self.history_file.clone().or_else(|| {
            dirs::data_dir().map(|p| p.join("kalendo").join("history.txt"))
        })
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            Kalendo - Chat Mode              │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model: {}", self.model);
        println!();
        println!("Commands:");
        println!("  /help     - Show this help");
        println!("  /tools    - Show available tools");
        println!("  /clear    - Forget the conversation so far");
        println!("  /trace    - Toggle full trace output");
        println!("  /quit     - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                true
            }
            "/help" | "/h" | "/?" => {
                println!();
                println!("Commands:");
                println!("  /help, /h, /?    - Show this help");
                println!("  /tools           - Show available tools");
                println!("  /clear           - Forget the conversation so far");
                println!("  /trace           - Toggle full trace output");
                println!("  /quit, /exit, /q - Exit chat");
                println!();
                false
            }
            "/tools" => {
                println!();
                for (category, tools) in self.registry.catalogue() {
                    println!("{}:", category);
                    for tool in tools {
                        println!("  {} - {}", tool.name, tool.description);
                    }
                }
                println!();
                false
            }
            "/clear" => {
                self.conversation.clear();
                println!("Conversation cleared.");
                false
            }
            "/trace" => {
                let enabled = !self.run_config.development_mode;
                self.run_config = self.run_config.clone().with_development_mode(enabled);
                println!("Trace output {}", if enabled { "on" } else { "off" });
                false
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn process_message(&mut self, message: &str) {
        println!();

        let input = OrchestrateInput::new(message, self.model.clone())
            .with_history(self.conversation.clone())
            .with_config(self.run_config.clone());

        let result = if self.show_progress {
            let progress = ConsoleProgress::new();
            let result = self
                .orchestrator
                .orchestrate_with_progress(input, &progress)
                .await;
            progress.finish();
            result
        } else {
            self.orchestrator
                .orchestrate_with_progress(input, &NoProgress)
                .await
        };

        let output = if self.run_config.development_mode {
            ConsoleFormatter::format_full(&result)
        } else {
            ConsoleFormatter::format_answer(&result)
        };
        println!("{}", output);

        self.conversation.push(ChatMessage::user(message));
        self.conversation
            .push(ChatMessage::assistant(result.final_answer));
    }
}
