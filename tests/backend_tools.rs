//! Remote-backed tools against a local stand-in backend.

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use std::time::Duration;
use toolrunner::remote::RemoteClient;
use toolrunner::tools::login::LoginTool;
use toolrunner::tools::query::QueryTool;
use toolrunner::tools::Tool;

async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn backend() -> Router {
    Router::new()
        .route(
            "/query",
            post(|Json(body): Json<Value>| async move {
                match body["query"].as_str() {
                    Some("structured") => Json(json!({"answer": {"items": [1, 2, 3]}})),
                    Some("no answer") => Json(json!({"result": "x"})),
                    Some(q) => Json(json!({"answer": format!("Answer to: {}", q)})),
                    None => Json(json!({})),
                }
            }),
        )
        .route(
            "/login",
            post(|Json(body): Json<Value>| async move {
                let name = body["name"].as_str().unwrap_or_default().to_string();
                let age = body["age"].as_i64().unwrap_or_default();
                if age < 18 {
                    (StatusCode::FORBIDDEN, Json(json!({"detail": "too young"})))
                } else {
                    (
                        StatusCode::OK,
                        Json(json!({"message": format!("Welcome {} ({})", name, age)})),
                    )
                }
            }),
        )
}

fn remote() -> RemoteClient {
    RemoteClient::new(Duration::from_secs(5)).unwrap()
}

fn args(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap()
}

#[tokio::test]
async fn query_tool_returns_answer_verbatim() {
    let base = spawn_backend(backend()).await;
    let tool = QueryTool::new(remote(), &format!("{}/query", base));

    let out = tool
        .execute(args(json!({"query": "what is lomaa it"})))
        .await
        .unwrap();
    assert_eq!(out, json!("Answer to: what is lomaa it"));

    let out = tool.execute(args(json!({"query": "structured"}))).await.unwrap();
    assert_eq!(out, json!({"items": [1, 2, 3]}));
}

#[tokio::test]
async fn query_tool_without_answer_field_fails() {
    let base = spawn_backend(backend()).await;
    let tool = QueryTool::new(remote(), &format!("{}/query", base));

    let err = tool
        .execute(args(json!({"query": "no answer"})))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("'answer'"));
}

#[tokio::test]
async fn login_tool_returns_message() {
    let base = spawn_backend(backend()).await;
    let tool = LoginTool::new(remote(), &format!("{}/login", base));

    let out = tool
        .execute(args(json!({"name": "Ada", "age": 36})))
        .await
        .unwrap();
    assert_eq!(out, json!("Welcome Ada (36)"));
}

#[tokio::test]
async fn login_tool_turns_failures_into_text() {
    let base = spawn_backend(backend()).await;
    let tool = LoginTool::new(remote(), &format!("{}/login", base));

    let out = tool
        .execute(args(json!({"name": "Kid", "age": 9})))
        .await
        .unwrap();
    let text = out.as_str().unwrap();
    assert!(text.starts_with("Login failed:"));
    assert!(text.contains("403"));
}

#[tokio::test]
async fn login_tool_schema_requires_name_and_age() {
    let tool = LoginTool::new(remote(), "http://127.0.0.1:9/login");
    let schema = tool.parameters();
    assert!(schema.validate(&json!({"name": "Ada"})).is_err());
    assert!(schema.validate(&json!({"age": 3})).is_err());
    assert!(schema.validate(&json!({"name": "Ada", "age": 3})).is_ok());
}
