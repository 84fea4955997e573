//! Use cases for the application layer.

pub mod orchestrate;
pub(crate) mod shared;
