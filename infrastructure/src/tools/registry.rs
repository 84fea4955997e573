//! Tool Registry
//!
//! Aggregates multiple [`ToolProvider`]s behind the application layer's
//! [`ToolRegistryPort`]. Tools are merged at registration time with
//! first-wins conflict resolution, and every invocation is validated
//! against the target tool's declared parameters before it reaches the
//! provider.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kalendo_application::ports::tool_registry::ToolRegistryPort;
use kalendo_domain::{ToolCategory, ToolDescriptor, ToolInvocation, ToolOutcome};

use super::ToolProvider;

/// Tool registry that aggregates multiple providers
pub struct ToolRegistry {
    providers: Vec<Arc<dyn ToolProvider>>,
    /// Tool name -> index into `providers`
    routing: HashMap<String, usize>,
    /// Merged descriptors by tool name
    descriptors: HashMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            routing: HashMap::new(),
            descriptors: HashMap::new(),
        }
    }

    /// Register a tool provider. Tools already claimed by an earlier
    /// provider are skipped.
    pub fn register<P: ToolProvider + 'static>(self, provider: P) -> Self {
        self.register_arc(Arc::new(provider))
    }

    /// Register a tool provider (Arc version)
    pub fn register_arc(mut self, provider: Arc<dyn ToolProvider>) -> Self {
        let index = self.providers.len();
        for descriptor in provider.descriptors() {
            if self.routing.contains_key(&descriptor.name) {
                tracing::warn!(
                    tool = %descriptor.name,
                    provider = provider.id(),
                    "Tool already registered by an earlier provider, skipping"
                );
                continue;
            }
            tracing::debug!(tool = %descriptor.name, provider = provider.id(), "Registered tool");
            self.routing.insert(descriptor.name.clone(), index);
            self.descriptors.insert(descriptor.name.clone(), descriptor);
        }
        self.providers.push(provider);
        self
    }

    /// Number of registered tools
    pub fn tool_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Check the invocation against the tool's declared parameters.
    fn validate(&self, descriptor: &ToolDescriptor, invocation: &ToolInvocation) -> Result<(), String> {
        for required in descriptor.required_parameters() {
            match invocation.arguments.get(required) {
                None | Some(serde_json::Value::Null) => {
                    return Err(format!(
                        "Missing required parameter '{}' for tool '{}'",
                        required, descriptor.name
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolRegistryPort for ToolRegistry {
    fn categories(&self) -> Vec<ToolCategory> {
        let mut categories: Vec<ToolCategory> =
            self.descriptors.values().map(|d| d.category).collect();
        categories.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        categories.dedup();
        categories
    }

    fn tools_in_category(&self, category: ToolCategory) -> Vec<ToolDescriptor> {
        let mut tools: Vec<ToolDescriptor> = self
            .descriptors
            .values()
            .filter(|d| d.category == category)
            .cloned()
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    fn descriptor(&self, name: &str) -> Option<ToolDescriptor> {
        self.descriptors.get(name).cloned()
    }

    async fn execute(&self, invocation: &ToolInvocation) -> ToolOutcome {
        let Some(descriptor) = self.descriptors.get(&invocation.tool_name) else {
            return ToolOutcome::failure(format!("Unknown tool: {}", invocation.tool_name));
        };

        if let Err(message) = self.validate(descriptor, invocation) {
            return ToolOutcome::failure(message);
        }

        match self.routing.get(&invocation.tool_name) {
            Some(&index) => self.providers[index].execute(invocation).await,
            None => ToolOutcome::failure(format!("No provider for tool: {}", invocation.tool_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{CalendarProvider, KnowledgeProvider};

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .register(CalendarProvider::new())
            .register(KnowledgeProvider::new(vec![], vec![]))
    }

    #[tokio::test]
    async fn test_registry_aggregates_providers() {
        let registry = registry();
        assert!(registry.has_tool("get_events"));
        assert!(registry.has_tool("create_event"));
        assert!(registry.has_tool("search_knowledge"));

        let categories = registry.categories();
        assert!(categories.contains(&ToolCategory::Calendar));
        assert!(categories.contains(&ToolCategory::Knowledge));
    }

    #[tokio::test]
    async fn test_registry_unknown_tool() {
        let registry = registry();
        let outcome = registry.execute(&ToolInvocation::new("send_pigeon")).await;
        assert!(!outcome.is_success());
        assert!(outcome.error.as_deref().unwrap().contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_registry_validates_required_parameters() {
        let registry = registry();
        // create_event requires summary and start
        let outcome = registry.execute(&ToolInvocation::new("create_event")).await;
        assert!(!outcome.is_success());
        assert!(
            outcome
                .error
                .as_deref()
                .unwrap()
                .contains("Missing required parameter")
        );
    }

    #[tokio::test]
    async fn test_registry_null_counts_as_missing() {
        let registry = registry();
        let invocation = ToolInvocation::new("create_event")
            .with_arg("summary", serde_json::Value::Null)
            .with_arg("start", "2025-06-02T09:00");
        let outcome = registry.execute(&invocation).await;
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_registry_routes_to_provider() {
        let registry = registry();
        let outcome = registry.execute(&ToolInvocation::new("get_events")).await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_first_provider_wins_on_conflict() {
        let registry = ToolRegistry::new()
            .register(CalendarProvider::new())
            .register(CalendarProvider::new());
        // Second provider's duplicates were skipped, not doubled
        assert_eq!(
            registry.tools_in_category(ToolCategory::Calendar).len(),
            CalendarProvider::new().descriptors().len()
        );
    }

    #[test]
    fn test_catalogue_grouping() {
        let registry = registry();
        let catalogue = registry.catalogue();
        assert_eq!(catalogue.len(), registry.categories().len());
        for (category, tools) in &catalogue {
            assert!(tools.iter().all(|t| t.category == *category));
            assert!(!tools.is_empty());
        }
    }
}
