//! Shared types used across the toolrunner runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Dispatch loop state machine
// ---------------------------------------------------------------------------

/// States a single run transitions through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    /// Waiting on the model for the next turn.
    AwaitingModel,
    /// The model asked for tools; executing them.
    ToolsPending,
    /// Final answer produced (or bounds hit).
    Done,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingModel => write!(f, "awaiting_model"),
            Self::ToolsPending => write!(f, "tools_pending"),
            Self::Done => write!(f, "done"),
        }
    }
}

// ---------------------------------------------------------------------------
// Inference types
// ---------------------------------------------------------------------------

/// A tool call request from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            arguments,
        }
    }
}

/// One model turn: either tool calls or a final content string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
}

impl InferenceResponse {
    /// A turn that answers directly.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// A turn that requests the given tool calls.
    pub fn calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }
}

/// Token usage from an inference call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ---------------------------------------------------------------------------
// Run output
// ---------------------------------------------------------------------------

/// Why a run stopped before the model produced a final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exhaustion {
    MaxRounds,
    Deadline,
}

/// Response envelope returned for every completed run.
///
/// `type` is always `"tool_call"`, whether or not any tool fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    #[serde(rename = "type")]
    pub kind: String,
    pub tools_used: Vec<String>,
    pub answer: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhausted: Option<Exhaustion>,
}

impl RunOutput {
    pub const KIND: &'static str = "tool_call";

    pub fn new(tools_used: Vec<String>, answer: Option<serde_json::Value>) -> Self {
        Self {
            kind: Self::KIND.into(),
            tools_used,
            answer,
            exhausted: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_shape() {
        let out = RunOutput::new(vec!["add".into()], Some(json!(7)));
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v, json!({"type": "tool_call", "tools_used": ["add"], "answer": 7}));
    }

    #[test]
    fn exhausted_is_reported() {
        let mut out = RunOutput::new(vec![], None);
        out.exhausted = Some(Exhaustion::MaxRounds);
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["exhausted"], "max_rounds");
        assert_eq!(v["answer"], serde_json::Value::Null);
    }
}
