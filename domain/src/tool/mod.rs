//! Tool domain types.
//!
//! The engine never executes tools itself; it only speaks in terms of
//! the types here: descriptors advertised by the registry, invocations
//! proposed by the model, and the uniform result envelope every
//! execution returns.

pub mod entities;
pub mod value_objects;

pub use entities::{ToolCategory, ToolDescriptor, ToolInvocation, ToolParameter};
pub use value_objects::ToolOutcome;
