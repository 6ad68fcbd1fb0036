//! Retrieval-augmented query tool backed by the RAG service.

use crate::remote::{RemoteClient, RemoteError};
use crate::tools::schema::{ParamType, ParameterSchema};
use crate::tools::traits::Tool;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

pub struct QueryTool {
    remote: RemoteClient,
    endpoint: String,
}

impl QueryTool {
    pub fn new(remote: RemoteClient, endpoint: &str) -> Self {
        Self {
            remote,
            endpoint: endpoint.to_string(),
        }
    }

    /// Ask the knowledge base; the `answer` field is returned as-is.
    pub async fn ask(&self, query: &str) -> Result<Value, RemoteError> {
        let mut body = self
            .remote
            .call(&self.endpoint, &QueryRequest { query })
            .await?;

        body.get_mut("answer")
            .map(Value::take)
            .ok_or_else(|| RemoteError::Decode {
                endpoint: self.endpoint.clone(),
                reason: "response has no 'answer' field".into(),
            })
    }
}

#[async_trait]
impl Tool for QueryTool {
    fn name(&self) -> &str {
        "query_tool"
    }

    fn description(&self) -> &str {
        "Use this tool when the user asks questions related to 'lomma', 'lomaa', 'lomaa it', \
         'lomaa it solutions', or any general information queries. This tool searches the RAG \
         system to provide relevant answers based on the stored knowledge base."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().required("query", ParamType::String, "The question to look up")
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<Value> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Missing 'query' argument"))?;

        Ok(self.ask(query).await?)
    }
}
