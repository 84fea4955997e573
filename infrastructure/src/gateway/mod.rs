//! LLM gateway adapters.

mod http;

pub use http::HttpLlmGateway;
