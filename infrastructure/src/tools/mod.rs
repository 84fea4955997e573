//! Tool providers and the registry that aggregates them.
//!
//! The [`ToolRegistry`] implements the application layer's
//! [`ToolRegistryPort`] by routing invocations to registered
//! [`ToolProvider`]s. Registration is first-wins on name conflicts, and
//! required-parameter validation happens here, in front of every
//! provider, so the engine and the providers can both assume validated
//! input.

mod calendar;
mod knowledge;
mod registry;

pub use calendar::{CalendarEvent, CalendarProvider};
pub use knowledge::{KnowledgeDocument, KnowledgeProvider};
pub use registry::ToolRegistry;

use async_trait::async_trait;
use kalendo_domain::{ToolDescriptor, ToolInvocation, ToolOutcome};

/// A source of tools.
///
/// Providers advertise descriptors and execute invocations addressed to
/// them. Execution failures are reported via the outcome envelope, not
/// panics.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Stable identifier for logging and routing
    fn id(&self) -> &str;

    /// Tools this provider offers
    fn descriptors(&self) -> Vec<ToolDescriptor>;

    /// Execute an invocation addressed to one of this provider's tools
    async fn execute(&self, invocation: &ToolInvocation) -> ToolOutcome;
}
