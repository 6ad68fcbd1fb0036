//! Configuration schema for toolrunner.toml.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment variables checked (in order) for the model API key.
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "TOOLRUNNER_API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing model API credentials: set one of {}", API_KEY_VARS.join(", "))]
    MissingCredentials,

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolRunnerConfig {
    /// Chat model identifier.
    pub model: String,

    /// Base URL of the OpenAI-compatible inference API.
    pub inference_base_url: String,

    /// Model provider API key.
    pub api_key: String,

    /// Sampling temperature sent with every request.
    pub temperature: f64,

    /// Retrieval (RAG) backend endpoint used by `query_tool`.
    pub query_api: String,

    /// Authentication backend endpoint used by `login_tool`.
    pub login_api: String,

    /// Address the HTTP service binds to.
    pub bind_addr: String,

    /// Timeout for each outbound backend call.
    pub remote_timeout_secs: u64,

    /// Retries for transport failures and 5xx responses.
    pub remote_max_retries: u32,

    /// Maximum model invocations per run.
    pub max_rounds: u32,

    /// Wall-clock budget for a whole run.
    pub deadline_secs: u64,

    /// Log level (debug, info, warn, error).
    pub log_level: String,
}

impl Default for ToolRunnerConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            inference_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".into(),
            api_key: String::new(),
            temperature: 0.0,
            query_api: "http://localhost:8000/query".into(),
            login_api: "http://localhost:8000/login".into(),
            bind_addr: "127.0.0.1:8080".into(),
            remote_timeout_secs: 30,
            remote_max_retries: 0,
            max_rounds: 10,
            deadline_secs: 120,
            log_level: "info".into(),
        }
    }
}

impl ToolRunnerConfig {
    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary lookup (used by tests).
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = API_KEY_VARS.iter().find_map(|k| non_empty(*k)) {
            self.api_key = key;
        }
        if let Some(model) = non_empty("TOOLRUNNER_MODEL") {
            self.model = model;
        }
        if let Some(url) = non_empty("TOOLRUNNER_QUERY_API") {
            self.query_api = url;
        }
        if let Some(url) = non_empty("TOOLRUNNER_LOGIN_API") {
            self.login_api = url;
        }
        if let Some(addr) = non_empty("TOOLRUNNER_BIND") {
            self.bind_addr = addr;
        }
    }

    /// Fail fast on settings the service cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::InvalidValue(
                "max_rounds".into(),
                "must be at least 1".into(),
            ));
        }
        if self.remote_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "remote_timeout_secs".into(),
                "must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}
