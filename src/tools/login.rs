//! Login tool backed by the authentication service.
//!
//! Backend failures never escape as errors; they become a textual result the
//! model can relay to the user.

use crate::remote::RemoteClient;
use crate::tools::schema::{ParamType, ParameterSchema};
use crate::tools::traits::Tool;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    name: &'a str,
    age: i64,
}

pub struct LoginTool {
    remote: RemoteClient,
    endpoint: String,
}

impl LoginTool {
    pub fn new(remote: RemoteClient, endpoint: &str) -> Self {
        Self {
            remote,
            endpoint: endpoint.to_string(),
        }
    }

    async fn login(&self, name: &str, age: i64) -> String {
        match self
            .remote
            .call(&self.endpoint, &LoginRequest { name, age })
            .await
        {
            Ok(body) => match body.get("message") {
                Some(Value::String(msg)) => msg.clone(),
                Some(other) => other.to_string(),
                None => "Login failed: response has no 'message' field".into(),
            },
            Err(e) => {
                warn!("Login call failed: {}", e);
                format!("Login failed: {}", e)
            }
        }
    }
}

#[async_trait]
impl Tool for LoginTool {
    fn name(&self) -> &str {
        "login_tool"
    }

    fn description(&self) -> &str {
        "Log a user in. Use this tool when the user wants to log in and provides their name and age."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .required("name", ParamType::String, "Name of the user logging in")
            .required("age", ParamType::Integer, "Age of the user in years")
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<Value> {
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Missing 'name' argument"))?;
        let age = args
            .get("age")
            .and_then(Value::as_i64)
            .ok_or_else(|| anyhow!("Missing 'age' argument"))?;

        Ok(Value::String(self.login(name, age).await))
    }
}
