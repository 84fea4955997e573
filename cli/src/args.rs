//! CLI argument definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for orchestration results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Only the final answer
    Answer,
    /// Full formatted output with the step trace and tool calls
    Full,
    /// JSON output
    Json,
}

/// CLI arguments for kalendo
#[derive(Parser, Debug)]
#[command(name = "kalendo")]
#[command(author, version, about = "Calendar assistant - converse with your calendar in natural language")]
#[command(long_about = r#"
Kalendo answers calendar questions and performs calendar actions through
an LLM-driven tool-orchestration loop: it analyzes your request, decides
which tools to run, executes them, evaluates progress, and synthesizes a
final answer.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./kalendo.toml      Project-level config
3. ~/.config/kalendo/config.toml   Global config

Example:
  kalendo "what's on my calendar this week?"
  kalendo --model gpt-4o-mini "create a standup tomorrow at 9am"
  kalendo --chat --trace
"#)]
pub struct Cli {
    /// The message to send to the assistant (not required in chat mode)
    pub message: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Model to drive the orchestration loop (overrides config)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Maximum steps in the main loop (overrides config)
    #[arg(long, value_name = "N")]
    pub max_steps: Option<usize>,

    /// Maximum tool executions per run (overrides config)
    #[arg(long, value_name = "N")]
    pub max_tool_calls: Option<usize>,

    /// Return and print the full step trace (development mode)
    #[arg(short, long)]
    pub trace: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "answer")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
