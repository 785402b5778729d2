//! HTTP server facade for biblioteca with Axum, error handling, and OpenAPI.

use std::future::Future;

use anyhow::Context;
use axum::{extract::State, routing::get, Router};

use biblioteca_db::SharedStore;
use biblioteca_kernel::{settings::ServerSettings, ModuleRegistry};

pub mod body;
pub mod error;
pub mod extract;
pub mod router;

use error::AppError;
use router::RouterBuilder;

/// Serve `app` until `shutdown` resolves
pub async fn start_server<F>(app: Router, server: &ServerSettings, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = server.bind_address();
    tracing::info!("starting HTTP server on {}", address);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {address}"))?;

    tracing::info!("HTTP server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with every module's routes merged at the root
pub fn build_router(registry: &ModuleRegistry, store: SharedStore) -> Router {
    let health = Router::new()
        .route("/healthz", get(health_check))
        .with_state(store);

    RouterBuilder::new()
        .merge_module(health, None)
        .with_modules(registry)
        .with_openapi()
        .with_tracing()
        .with_cors()
        .with_request_id()
        .build()
}

/// Health check endpoint; fails when the store does not answer
async fn health_check(State(store): State<SharedStore>) -> Result<&'static str, AppError> {
    store.ping().await?;
    Ok("ok")
}
