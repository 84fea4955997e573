//! Model identifier value object.

use serde::{Deserialize, Serialize};

/// Identifier of the language model a run is driven by.
///
/// The engine treats model ids as opaque strings; the gateway adapter is
/// responsible for knowing what they mean.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for ModelId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id() {
        let id = ModelId::new("gpt-4o-mini");
        assert_eq!(id.as_str(), "gpt-4o-mini");
        assert_eq!(id.to_string(), "gpt-4o-mini");

        let from: ModelId = "llama3.2".into();
        assert_eq!(from.as_str(), "llama3.2");
    }
}
