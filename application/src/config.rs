//! Run-scoped configuration for the orchestration engine.

/// Budgets and flags for one orchestration run.
///
/// Immutable for the duration of a run. The budgets exist to guarantee
/// termination: the engine has no wall-clock timeout of its own, so
/// callers wanting one should wrap `orchestrate` in an external
/// deadline.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Hard ceiling on steps recorded in the main loop (the
    /// synthesis/validation tail is exempt but bounded separately).
    pub max_steps: usize,
    /// Hard ceiling on tool executions across the run.
    pub max_tool_calls: usize,
    /// Return the full step trace instead of synthesis-only.
    pub development_mode: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            max_tool_calls: 5,
            development_mode: false,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_max_tool_calls(mut self, max_tool_calls: usize) -> Self {
        self.max_tool_calls = max_tool_calls;
        self
    }

    pub fn with_development_mode(mut self, enabled: bool) -> Self {
        self.development_mode = enabled;
        self
    }
}

/// Knowledge-store configuration, injected at construction time.
///
/// The store identifiers are read-only for the engine: they are
/// surfaced in the analysis prompt so the model knows what can be
/// consulted, and handed to the knowledge tool provider. The engine
/// never reads them from ambient filesystem state.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeConfig {
    /// Identifiers of the available knowledge stores
    pub store_ids: Vec<String>,
}

impl KnowledgeConfig {
    pub fn new(store_ids: Vec<String>) -> Self {
        Self { store_ids }
    }

    pub fn is_empty(&self) -> bool {
        self.store_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budgets() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.max_tool_calls, 5);
        assert!(!config.development_mode);
    }

    #[test]
    fn test_builders() {
        let config = OrchestratorConfig::default()
            .with_max_steps(3)
            .with_max_tool_calls(1)
            .with_development_mode(true);
        assert_eq!(config.max_steps, 3);
        assert_eq!(config.max_tool_calls, 1);
        assert!(config.development_mode);
    }
}
