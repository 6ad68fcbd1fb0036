//! Tool-calling dispatch loop: Invoke → Execute → Append.
//!
//! Each run:
//! 1. Seeds the history with the user's request
//! 2. Calls the model with the rendered history and the bound tool set
//! 3. Executes any requested tools in order, appending each result
//! 4. Repeats until the model answers without tool calls, or the round or
//!    time budget runs out

use crate::agent::history::History;
use crate::inference::ChatModel;
use crate::tools::{RegistryError, ToolRegistry};
use crate::types::*;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Model invocation failed: {0:#}")]
    Model(anyhow::Error),
}

/// Bounds that guarantee a run terminates.
#[derive(Debug, Clone, Copy)]
pub struct LoopLimits {
    /// Maximum model invocations per run.
    pub max_rounds: u32,
    /// Wall-clock budget for the whole run.
    pub deadline: Duration,
}

impl Default for LoopLimits {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            deadline: Duration::from_secs(120),
        }
    }
}

/// Runs user requests against a model and a tool registry.
#[derive(Clone)]
pub struct ToolRunner {
    model: Arc<dyn ChatModel>,
    registry: Arc<ToolRegistry>,
    limits: LoopLimits,
}

impl ToolRunner {
    pub fn new(model: Arc<dyn ChatModel>, registry: Arc<ToolRegistry>, limits: LoopLimits) -> Self {
        Self {
            model,
            registry,
            limits,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn limits(&self) -> LoopLimits {
        self.limits
    }

    /// Drive one request to a final answer.
    pub async fn run(&self, user_input: &str) -> Result<RunOutput, DispatchError> {
        let run_id = ulid::Ulid::new();
        let started = Instant::now();
        let tool_defs = self.registry.describe_all();

        info!("[{}] Run started ({} tools bound)", run_id, tool_defs.len());

        let mut history = History::new(user_input);
        let mut tools_used: Vec<String> = Vec::new();
        let mut final_result: Option<Value> = None;
        let mut pending: Vec<ToolCall> = Vec::new();
        let mut state = LoopState::AwaitingModel;
        let mut rounds: u32 = 0;

        loop {
            match state {
                LoopState::AwaitingModel => {
                    if rounds >= self.limits.max_rounds {
                        return Ok(self.exhausted(run_id, Exhaustion::MaxRounds, tools_used, final_result));
                    }
                    let Some(remaining) = self.remaining(started) else {
                        return Ok(self.exhausted(run_id, Exhaustion::Deadline, tools_used, final_result));
                    };
                    rounds += 1;

                    let prompt = history.render();
                    let invocation = self.model.invoke(&prompt, &tool_defs);
                    let response = match tokio::time::timeout(remaining, invocation).await {
                        Ok(result) => result.map_err(DispatchError::Model)?,
                        Err(_) => {
                            return Ok(self.exhausted(run_id, Exhaustion::Deadline, tools_used, final_result));
                        }
                    };

                    debug!(
                        "[{}] Round {}: {} tool call(s), content: {:?}",
                        run_id,
                        rounds,
                        response.tool_calls.len(),
                        response.content
                    );

                    if response.tool_calls.is_empty() {
                        if let Some(content) = response.content.filter(|c| !c.is_empty()) {
                            final_result = Some(Value::String(content));
                        }
                        state = LoopState::Done;
                    } else {
                        pending = response.tool_calls;
                        state = LoopState::ToolsPending;
                    }
                }

                LoopState::ToolsPending => {
                    for call in pending.drain(..) {
                        let (tool, args) = self.registry.validate(&call.name, &call.arguments)?;

                        let Some(remaining) = self.remaining(started) else {
                            return Ok(self.exhausted(run_id, Exhaustion::Deadline, tools_used, final_result));
                        };

                        info!("[{}] Tool: {}({})", run_id, call.name, call.arguments);
                        tools_used.push(call.name.clone());

                        let execution = match tokio::time::timeout(remaining, tool.execute(args)).await {
                            Ok(execution) => execution,
                            Err(_) => {
                                warn!("[{}] Tool {} ran past the deadline", run_id, call.name);
                                return Ok(self.exhausted(run_id, Exhaustion::Deadline, tools_used, final_result));
                            }
                        };
                        match execution {
                            Ok(result) => {
                                history.push_tool_result(&call.name, &result);
                                final_result = Some(result);
                            }
                            Err(e) => {
                                warn!("[{}] Tool {} failed: {:#}", run_id, call.name, e);
                                history.push_tool_error(&call.name, &format!("{:#}", e));
                            }
                        }
                    }
                    state = LoopState::AwaitingModel;
                }

                LoopState::Done => break,
            }
        }

        info!(
            "[{}] Run finished after {} round(s), tools used: {:?}",
            run_id, rounds, tools_used
        );
        Ok(RunOutput::new(tools_used, final_result))
    }

    /// Time left before the run deadline, `None` once it has passed.
    fn remaining(&self, started: Instant) -> Option<Duration> {
        self.limits
            .deadline
            .checked_sub(started.elapsed())
            .filter(|d| !d.is_zero())
    }

    fn exhausted(
        &self,
        run_id: ulid::Ulid,
        reason: Exhaustion,
        tools_used: Vec<String>,
        final_result: Option<Value>,
    ) -> RunOutput {
        warn!(
            "[{}] Run exhausted ({:?}) after tools {:?}",
            run_id, reason, tools_used
        );
        let mut output = RunOutput::new(tools_used, final_result);
        output.exhausted = Some(reason);
        output
    }
}
