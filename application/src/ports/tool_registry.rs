//! Tool Registry port
//!
//! Defines how the engine discovers and executes tools. The registry
//! owns parameter validation and provider routing; the engine only sees
//! descriptors, invocations, and the uniform outcome envelope.

use async_trait::async_trait;
use kalendo_domain::{ToolCategory, ToolDescriptor, ToolInvocation, ToolOutcome};

/// Port for tool discovery and execution
///
/// Normal failures (unknown tool, invalid parameters, tool-level
/// errors) are reported via `ToolOutcome { success: false, .. }`;
/// implementations panic only for genuinely unexpected conditions.
#[async_trait]
pub trait ToolRegistryPort: Send + Sync {
    /// Categories with at least one registered tool
    fn categories(&self) -> Vec<ToolCategory>;

    /// Tools registered under a category
    fn tools_in_category(&self, category: ToolCategory) -> Vec<ToolDescriptor>;

    /// Descriptor for a tool by name
    fn descriptor(&self, name: &str) -> Option<ToolDescriptor>;

    /// Check if a tool is registered
    fn has_tool(&self, name: &str) -> bool {
        self.descriptor(name).is_some()
    }

    /// The full catalogue, grouped by category
    fn catalogue(&self) -> Vec<(ToolCategory, Vec<ToolDescriptor>)> {
        self.categories()
            .into_iter()
            .map(|c| (c, self.tools_in_category(c)))
            .collect()
    }

    /// Execute a tool invocation
    async fn execute(&self, invocation: &ToolInvocation) -> ToolOutcome;
}
