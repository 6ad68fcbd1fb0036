pub mod arithmetic;
pub mod login;
pub mod query;
pub mod registry;
pub mod schema;
pub mod traits;

pub use registry::{RegistryError, ToolRegistry};
pub use schema::{ParamType, ParameterSchema, ParameterSpec};
pub use traits::{Tool, ToolDefinition};

use crate::remote::RemoteClient;

/// Backend endpoints used by the remote-backed tools.
#[derive(Debug, Clone)]
pub struct BackendEndpoints {
    pub query_api: String,
    pub login_api: String,
}

// ---------------------------------------------------------------------------
// Built-in tool set
// ---------------------------------------------------------------------------

/// Registry with the arithmetic helpers only.
pub fn arithmetic_registry() -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(arithmetic::Multiply)?;
    registry.register(arithmetic::Add)?;
    registry.register(arithmetic::Subtract)?;
    Ok(registry)
}

/// Registry with every built-in tool, in the order they are offered to the model.
pub fn builtin_registry(
    remote: &RemoteClient,
    endpoints: &BackendEndpoints,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = arithmetic_registry()?;
    registry.register(query::QueryTool::new(remote.clone(), &endpoints.query_api))?;
    registry.register(login::LoginTool::new(remote.clone(), &endpoints.login_api))?;
    Ok(registry)
}
