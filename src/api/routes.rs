use crate::api::error::ApiError;
use crate::app::AppContext;
use crate::types::RunOutput;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, warn};

/// Pull a non-blank `query` string out of the request body.
fn extract_query(payload: &Value) -> Option<&str> {
    payload
        .get("query")
        .and_then(Value::as_str)
        .filter(|q| !q.trim().is_empty())
}

pub(super) async fn run_tool(
    State(ctx): State<AppContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RunOutput>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("Rejected /tool request: {}", rejection.body_text());
        ApiError::bad_request(rejection.body_text())
    })?;

    let Some(query) = extract_query(&payload) else {
        warn!("Rejected /tool request without query");
        return Err(ApiError::missing_query());
    };

    match ctx.runner.run(query).await {
        Ok(output) => Ok(Json(output)),
        Err(e) => {
            error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}

pub(super) async fn health(State(ctx): State<AppContext>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": ctx.config.model,
        "tools": ctx.runner.registry().names(),
    }))
}
