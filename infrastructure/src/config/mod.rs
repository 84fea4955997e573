//! File configuration with multi-source merging.
//!
//! Everything is defaulted, so a missing config file is never an error.
//! Sources merge lowest-to-highest priority: built-in defaults, the
//! global config under the platform config directory, a project-level
//! `kalendo.toml`, and finally an explicit `--config` path.

mod loader;

pub use loader::{
    ConfigError, ConfigLoader, FileConfig, KnowledgeFileConfig, LimitsConfig, ModelConfig,
    ReplConfig,
};
