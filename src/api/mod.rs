//! HTTP service boundary exposing the dispatch loop.
//!
//! - `POST /tool` with `{"query": "..."}` runs one request through the loop
//! - `GET /health` reports liveness and the bound tool names

pub mod error;
mod routes;

pub use error::{ApiError, ErrorBody, MISSING_QUERY};

use crate::app::AppContext;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the service router.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/tool", post(routes::run_tool))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Serve on `listener` until `cancel` fires.
pub async fn serve(ctx: AppContext, listener: TcpListener, cancel: CancellationToken) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}
