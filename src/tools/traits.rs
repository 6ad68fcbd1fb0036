//! Tool trait definition.

use crate::tools::schema::ParameterSchema;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Definition of a tool exposed to the inference model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A named, schema-described capability the model may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (used in function calls).
    fn name(&self) -> &str;

    /// Description the model reads to decide when to call this tool.
    fn description(&self) -> &str;

    /// Declared parameters.
    fn parameters(&self) -> ParameterSchema;

    /// Execute with arguments already validated against `parameters()`.
    async fn execute(&self, args: Map<String, Value>) -> Result<Value>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters().to_json_schema(),
        }
    }
}
