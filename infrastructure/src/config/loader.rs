//! Configuration loader with multi-source merging

use crate::tools::KnowledgeDocument;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use kalendo_application::{KnowledgeConfig, OrchestratorConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] figment::Error),
}

/// Model/gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// Bearer token, if the endpoint needs one
    pub api_key: Option<String>,
    /// Model identifier sent with every completion request
    pub model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: None,
            model: "llama3.2".to_string(),
        }
    }
}

/// Run budgets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Hard ceiling on steps in the main loop
    pub max_steps: usize,
    /// Hard ceiling on tool executions per run
    pub max_tool_calls: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let defaults = OrchestratorConfig::default();
        Self {
            max_steps: defaults.max_steps,
            max_tool_calls: defaults.max_tool_calls,
        }
    }
}

/// Knowledge-base configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeFileConfig {
    /// Identifiers of the available knowledge stores
    pub store_ids: Vec<String>,
    /// Inline documents served by the knowledge provider
    pub documents: Vec<KnowledgeDocument>,
}

/// REPL-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// Return the full step trace instead of synthesis-only
    pub development_mode: bool,
    /// Show progress indicators
    pub show_progress: bool,
    /// Path to history file
    pub history_file: Option<String>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            development_mode: false,
            show_progress: true,
            history_file: None,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model/gateway settings
    pub model: ModelConfig,
    /// Run budgets
    pub limits: LimitsConfig,
    /// Knowledge-base settings
    pub knowledge: KnowledgeFileConfig,
    /// REPL settings
    pub repl: ReplConfig,
}

impl FileConfig {
    /// Run-scoped budgets as the engine expects them.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::default()
            .with_max_steps(self.limits.max_steps)
            .with_max_tool_calls(self.limits.max_tool_calls)
            .with_development_mode(self.repl.development_mode)
    }

    /// Knowledge-store identifiers for constructor injection into the
    /// engine and the knowledge provider.
    pub fn knowledge_config(&self) -> KnowledgeConfig {
        KnowledgeConfig::new(self.knowledge.store_ids.clone())
    }
}

/// Configuration loader that merges multiple sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./kalendo.toml` or `./.kalendo.toml`
    /// 3. Global: `~/.config/kalendo/config.toml` (platform equivalent)
    /// 4. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        // Explicit config path (highest priority)
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment.extract()?)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path.
    ///
    /// Returned even if the file doesn't exist yet, so users know where
    /// to create it.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("kalendo").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        ["kalendo.toml", ".kalendo.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./kalendo.toml or ./.kalendo.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}
