//! Canned model turns, for offline runs and tests.

use crate::inference::ChatModel;
use crate::tools::ToolDefinition;
use crate::types::InferenceResponse;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays a fixed sequence of turns and records every prompt it receives.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    turns: Mutex<VecDeque<InferenceResponse>>,
    repeat_last: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(turns: impl IntoIterator<Item = InferenceResponse>) -> Self {
        Self {
            turns: Mutex::new(turns.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Answer every invocation with the same turn.
    pub fn repeating(turn: InferenceResponse) -> Self {
        Self {
            turns: Mutex::new(VecDeque::from([turn])),
            repeat_last: true,
            ..Default::default()
        }
    }

    /// Prompts received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn invocations(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn invoke(&self, prompt: &str, _tools: &[ToolDefinition]) -> Result<InferenceResponse> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let mut turns = match self.turns.lock() {
            Ok(turns) => turns,
            Err(_) => bail!("Scripted model state poisoned"),
        };
        let next = if self.repeat_last && turns.len() == 1 {
            turns.front().cloned()
        } else {
            turns.pop_front()
        };
        match next {
            Some(turn) => Ok(turn),
            None => bail!("Scripted model has no turns left"),
        }
    }
}
