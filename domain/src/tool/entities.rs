//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Category a tool belongs to.
///
/// Categories group tools in the catalogue shown to the model and drive
/// the scheduling-domain retry heuristic (a calendar-flavoured request
/// that completed without ever touching a `Calendar` tool gets one more
/// decision cycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    Calendar,
    Email,
    File,
    Web,
    Knowledge,
}

impl ToolCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ToolCategory::Calendar => "calendar",
            ToolCategory::Email => "email",
            ToolCategory::File => "file",
            ToolCategory::Web => "web",
            ToolCategory::Knowledge => "knowledge",
        }
    }
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Parameter type hint (e.g., "string", "number")
    pub param_type: String,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// Description of a tool as advertised by the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique name of the tool (e.g., "get_events")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Category this tool belongs to
    pub category: ToolCategory,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: ToolCategory,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Compact one-line parameter summary for the tool catalogue.
    pub fn parameter_hint(&self) -> String {
        if self.parameters.is_empty() {
            return "none".to_string();
        }
        self.parameters
            .iter()
            .map(|p| {
                if p.required {
                    format!("{} ({}, required)", p.name, p.param_type)
                } else {
                    format!("{} ({})", p.name, p.param_type)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Names of all required parameters.
    pub fn required_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }
}

/// A call to a tool with arguments, as proposed by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool (shape is tool-specific)
    pub arguments: HashMap<String, serde_json::Value>,
    /// Optional reasoning for why this tool is being called
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl ToolInvocation {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
            reasoning: None,
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument or return an error message
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    /// Get an optional i64 argument
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.arguments.get(key).and_then(|v| v.as_i64())
    }

    /// Render arguments as compact JSON for trace and prompt display.
    pub fn arguments_json(&self) -> String {
        serde_json::to_string(&self.arguments).unwrap_or_else(|_| "{}".to_string())
    }
}
