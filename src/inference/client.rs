//! Model inference over an OpenAI-compatible chat completions API.
//!
//! Defaults to Gemini's OpenAI-compatible endpoint; any provider speaking the
//! same wire format works.

use crate::inference::ChatModel;
use crate::tools::ToolDefinition;
use crate::types::*;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inference client holding the provider credentials and HTTP pool.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    http: reqwest::Client,
}

// -- OpenAI-compatible request/response types --------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<MessagePayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolPayload<'a>>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ToolPayload<'a> {
    r#type: &'a str,
    function: FunctionPayload<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionPayload<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ToolCallPayload {
    #[serde(default)]
    id: String,
    function: FunctionCallPayload,
}

#[derive(Debug, Deserialize)]
struct FunctionCallPayload {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCallPayload>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

/// Decode a function-call argument string.
///
/// An empty string means "no arguments". Anything that is not JSON is kept
/// as a string so schema validation can report it.
fn parse_arguments(raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

fn into_inference_response(body: ChatResponse) -> InferenceResponse {
    let message = body
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .unwrap_or_default();

    let tool_calls = message
        .tool_calls
        .into_iter()
        .map(|tc| ToolCall {
            id: tc.id,
            arguments: parse_arguments(&tc.function.arguments),
            name: tc.function.name,
        })
        .collect();

    let usage = body
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    InferenceResponse {
        content: message.content,
        tool_calls,
        usage,
    }
}

impl InferenceClient {
    /// Create a new inference client.
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature: 0.0,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for InferenceClient {
    async fn invoke(&self, prompt: &str, tools: &[ToolDefinition]) -> Result<InferenceResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let tool_payloads: Option<Vec<ToolPayload>> = if tools.is_empty() {
            None
        } else {
            Some(
                tools
                    .iter()
                    .map(|t| ToolPayload {
                        r#type: "function",
                        function: FunctionPayload {
                            name: &t.name,
                            description: &t.description,
                            parameters: &t.parameters,
                        },
                    })
                    .collect(),
            )
        };

        let request = ChatRequest {
            model: &self.model,
            messages: vec![MessagePayload {
                role: "user",
                content: prompt,
            }],
            tools: tool_payloads,
            temperature: self.temperature,
        };

        debug!("Inference request to model: {}", self.model);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Inference request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Inference failed ({}): {}", status, body);
        }

        let body: ChatResponse = resp
            .json()
            .await
            .context("Failed to parse inference response")?;

        let response = into_inference_response(body);
        debug!(
            "Inference returned {} tool call(s), {} total tokens",
            response.tool_calls.len(),
            response.usage.total_tokens
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(v: serde_json::Value) -> InferenceResponse {
        into_inference_response(serde_json::from_value(v).unwrap())
    }

    #[test]
    fn tool_calls_are_decoded() {
        let resp = decode(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [
                        {"id": "c1", "type": "function",
                         "function": {"name": "add", "arguments": "{\"a\":2,\"b\":5}"}},
                        {"id": "c2", "type": "function",
                         "function": {"name": "multiply", "arguments": ""}}
                    ]
                }
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
        }));

        assert_eq!(resp.tool_calls.len(), 2);
        assert_eq!(resp.tool_calls[0].name, "add");
        assert_eq!(resp.tool_calls[0].arguments, json!({"a": 2, "b": 5}));
        assert_eq!(resp.tool_calls[1].arguments, serde_json::Value::Null);
        assert_eq!(resp.usage.total_tokens, 13);
    }

    #[test]
    fn malformed_arguments_survive_as_string() {
        assert_eq!(parse_arguments("a=2"), json!("a=2"));
    }

    #[test]
    fn text_answer_and_empty_choices() {
        let resp = decode(json!({"choices": [{"message": {"content": "Hi there"}}]}));
        assert_eq!(resp.content.as_deref(), Some("Hi there"));
        assert!(resp.tool_calls.is_empty());

        let empty = decode(json!({"choices": []}));
        assert!(empty.content.is_none());
        assert!(empty.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn posts_openai_shaped_request() {
        use axum::http::HeaderMap;
        use axum::routing::post;
        use axum::{Json, Router};

        let router = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({
                    "choices": [{"message": {"content": format!(
                        "{}|{}|{}|{}",
                        auth,
                        body["model"].as_str().unwrap_or_default(),
                        body["messages"][0]["content"].as_str().unwrap_or_default(),
                        body["tools"][0]["function"]["name"].as_str().unwrap_or_default(),
                    )}}]
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = InferenceClient::new(&format!("http://{}/v1/", addr), "secret", "m-1");
        let tools = crate::tools::arithmetic_registry().unwrap().describe_all();
        let resp = client.invoke("add 1 and 2", &tools).await.unwrap();
        assert_eq!(
            resp.content.as_deref(),
            Some("Bearer secret|m-1|add 1 and 2|multiply")
        );
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        use axum::http::StatusCode;
        use axum::routing::post;
        use axum::Router;

        let router = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = InferenceClient::new(&format!("http://{}", addr), "k", "m");
        let err = client.invoke("hi", &[]).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
