// Conversion of externally described tools into MCP tool specifications

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::model::{McpTool, McpToolSpecification};

/// A tool as reported by an MCP server or SDK; any field may be missing
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalTool {
    pub name: Option<String>,
    pub description: Option<String>,
    pub input_schema: Option<Value>,
}

impl ExternalTool {
    pub fn new(name: &str, input_schema: Value) -> Self {
        Self {
            name: Some(name.to_string()),
            description: None,
            input_schema: Some(input_schema),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MissingName,
    MissingSchema,
    SchemaNotObject,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            SkipReason::MissingName => "tool has no name",
            SkipReason::MissingSchema => "tool has no input schema",
            SkipReason::SchemaNotObject => "input schema is not a JSON object",
        };
        f.write_str(reason)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkippedTool {
    /// Position in the input sequence
    pub index: usize,
    pub name: Option<String>,
    pub reason: SkipReason,
}

/// Result of [`filter_valid_tools`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolFilterOutcome {
    pub valid: Vec<McpTool>,
    pub skipped: Vec<SkippedTool>,
}

impl ToolFilterOutcome {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// One warning per skipped tool
    pub fn log_skipped(&self) {
        for skipped in &self.skipped {
            warn!(
                "Skipping tool #{} ({}): {}",
                skipped.index,
                skipped.name.as_deref().unwrap_or("<unnamed>"),
                skipped.reason
            );
        }
    }

    pub fn into_specification(self) -> McpToolSpecification {
        McpToolSpecification::from_tools(self.valid)
    }
}

/// Keep tools that have a name and an object input schema, in input order
pub fn filter_valid_tools(tools: impl IntoIterator<Item = ExternalTool>) -> ToolFilterOutcome {
    let mut outcome = ToolFilterOutcome::default();

    for (index, tool) in tools.into_iter().enumerate() {
        let Some(name) = tool.name.filter(|n| !n.trim().is_empty()) else {
            outcome.skipped.push(SkippedTool {
                index,
                name: None,
                reason: SkipReason::MissingName,
            });
            continue;
        };

        let reason = match tool.input_schema {
            Some(Value::Object(input_schema)) => {
                outcome.valid.push(McpTool {
                    name,
                    description: tool.description,
                    input_schema,
                });
                continue;
            }
            None | Some(Value::Null) => SkipReason::MissingSchema,
            Some(_) => SkipReason::SchemaNotObject,
        };
        outcome.skipped.push(SkippedTool {
            index,
            name: Some(name),
            reason,
        });
    }

    outcome
}
