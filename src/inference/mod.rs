pub mod client;
pub mod scripted;

pub use client::InferenceClient;
pub use scripted::ScriptedModel;

use crate::tools::ToolDefinition;
use crate::types::InferenceResponse;
use anyhow::Result;
use async_trait::async_trait;

/// A chat model that can be offered tools.
///
/// The dispatch loop only talks to this trait, so a scripted model can stand
/// in for the hosted one.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one prompt with the bound tool set and return the model's turn.
    async fn invoke(&self, prompt: &str, tools: &[ToolDefinition]) -> Result<InferenceResponse>;
}
