//! Outbound JSON-over-HTTP client for auxiliary backends (retrieval, login).

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure modes of a backend call. Each is surfaced, never swallowed.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Network error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Invalid JSON from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl RemoteError {
    /// Transport failures and server-side errors may succeed on a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode { .. } => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Shared backend client. Cheap to clone; the connection pool is shared.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    max_retries: u32,
    retry_backoff: Duration,
}

impl RemoteClient {
    /// Default per-call timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client with the given per-call timeout.
    pub fn new(timeout: Duration) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RemoteError::Transport {
                endpoint: "<client builder>".into(),
                source,
            })?;
        Ok(Self {
            http,
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        })
    }

    /// Retry retryable failures up to `max_retries` extra times.
    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    /// POST `payload` as JSON to `endpoint` and return the parsed JSON body.
    pub async fn call<P>(&self, endpoint: &str, payload: &P) -> Result<serde_json::Value, RemoteError>
    where
        P: Serialize + ?Sized,
    {
        let mut attempt = 0;
        loop {
            match self.call_once(endpoint, payload).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!("Backend call failed (attempt {}/{}): {}", attempt, self.max_retries + 1, e);
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn call_once<P>(&self, endpoint: &str, payload: &P) -> Result<serde_json::Value, RemoteError>
    where
        P: Serialize + ?Sized,
    {
        debug!("Backend POST {}", endpoint);

        let resp = self
            .http
            .post(endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(|source| RemoteError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client() -> RemoteClient {
        RemoteClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn returns_parsed_json() {
        let base = spawn(Router::new().route(
            "/query",
            post(|Json(body): Json<Value>| async move { Json(json!({"answer": body["query"]})) }),
        ))
        .await;

        let out = client()
            .call(&format!("{}/query", base), &json!({"query": "hello"}))
            .await
            .unwrap();
        assert_eq!(out, json!({"answer": "hello"}));
    }

    #[tokio::test]
    async fn non_success_status_is_status_error() {
        let base = spawn(Router::new().route(
            "/query",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        ))
        .await;

        let err = client()
            .call(&format!("{}/query", base), &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() {
        let base = spawn(Router::new().route("/query", post(|| async { "not json" }))).await;

        let err = client()
            .call(&format!("{}/query", base), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Decode { .. }));
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client()
            .call(&format!("http://{}/query", addr), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Transport { .. }));
    }

    #[tokio::test]
    async fn retries_server_errors_only_up_to_limit() {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        let base = spawn(Router::new().route(
            "/flaky",
            post(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})))
                    } else {
                        (StatusCode::OK, Json(json!({"ok": true})))
                    }
                }
            }),
        ))
        .await;

        let out = client()
            .with_retries(2, Duration::from_millis(1))
            .call(&format!("{}/flaky", base), &json!({}))
            .await
            .unwrap();
        assert_eq!(out, json!({"ok": true}));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        let base = spawn(Router::new().route(
            "/bad",
            post(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { StatusCode::BAD_REQUEST }
            }),
        ))
        .await;

        let err = client()
            .with_retries(3, Duration::from_millis(1))
            .call(&format!("{}/bad", base), &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
