//! Name → tool table, registered once at startup and shared read-only.

use crate::tools::traits::{Tool, ToolDefinition};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tool '{0}' is already registered")]
    DuplicateName(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for tool '{tool}': {reason}")]
    SchemaViolation { tool: String, reason: String },
}

/// Ordered registry of tools; lookups are by name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<(), RegistryError> {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, RegistryError> {
        self.index
            .get(name)
            .map(|&i| self.tools[i].clone())
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    /// Resolve `name` and check `args` against its schema.
    pub fn validate(
        &self,
        name: &str,
        args: &Value,
    ) -> Result<(Arc<dyn Tool>, Map<String, Value>), RegistryError> {
        let tool = self.resolve(name)?;
        let args = tool
            .parameters()
            .validate(args)
            .map_err(|reason| RegistryError::SchemaViolation {
                tool: name.to_string(),
                reason,
            })?;
        Ok((tool, args))
    }

    /// Definitions in registration order, as bound to the model.
    pub fn describe_all(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
