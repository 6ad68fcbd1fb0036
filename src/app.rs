//! Process-wide services, built once at startup and handed to request handlers.

use crate::agent::{LoopLimits, ToolRunner};
use crate::config::ToolRunnerConfig;
use crate::inference::{ChatModel, InferenceClient};
use crate::remote::RemoteClient;
use crate::tools::{self, BackendEndpoints};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ToolRunnerConfig>,
    pub runner: ToolRunner,
}

impl AppContext {
    /// Wire the hosted model, the backend client and the built-in tools.
    pub fn from_config(config: ToolRunnerConfig) -> Result<Self> {
        let model = InferenceClient::new(&config.inference_base_url, &config.api_key, &config.model)
            .with_temperature(config.temperature);
        Self::with_model(config, Arc::new(model))
    }

    /// Same wiring with a caller-supplied model.
    pub fn with_model(config: ToolRunnerConfig, model: Arc<dyn ChatModel>) -> Result<Self> {
        let remote = RemoteClient::new(config.remote_timeout())
            .context("Failed to build backend HTTP client")?
            .with_retries(config.remote_max_retries, Duration::from_millis(500));

        let endpoints = BackendEndpoints {
            query_api: config.query_api.clone(),
            login_api: config.login_api.clone(),
        };
        let registry =
            tools::builtin_registry(&remote, &endpoints).context("Failed to register tools")?;

        info!(
            "Registered {} tools: {}",
            registry.len(),
            registry.names().join(", ")
        );

        let limits = LoopLimits {
            max_rounds: config.max_rounds,
            deadline: config.deadline(),
        };
        let runner = ToolRunner::new(model, Arc::new(registry), limits);

        Ok(Self {
            config: Arc::new(config),
            runner,
        })
    }
}
