//! HTTP and WebSocket surface of the orchestrator.

mod errors;
mod handlers;
mod ws;

pub use errors::{ApiError, ErrorBody};

use crate::error::Result;
use crate::orchestrator::Orchestrator;
use axum::extract::Request;
use axum::middleware::{from_fn, Next};
use axum::response::Response;
use axum::routing::{get, patch, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator>,
}

impl ApiState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route(
            "/api/services",
            get(handlers::list_services).post(handlers::create_service),
        )
        .route(
            "/api/services/:id",
            get(handlers::get_service).delete(handlers::delete_service),
        )
        .route("/api/services/:id/enable", patch(handlers::set_service_enabled))
        .route("/api/containers/:id/start", post(handlers::start_container))
        .route("/api/containers/:id/stop", post(handlers::stop_container))
        .route("/api/containers/:id/restart", post(handlers::restart_container))
        .route("/api/containers/:id/status", get(handlers::container_status))
        .route("/api/containers/:id/logs", get(handlers::container_logs))
        .route("/api/containers/:id/stats", get(handlers::container_stats))
        .route("/api/containers/:id/health", get(handlers::container_health))
        .route(
            "/api/layouts",
            get(handlers::list_layouts).post(handlers::create_layout),
        )
        .route("/api/ws", get(ws::events_socket))
        .layer(from_fn(log_request))
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    debug!("{} {} -> {}", method, path, response.status());
    response
}

/// Serve the API on `addr` until the orchestrator shuts down.
pub async fn serve(orchestrator: Arc<Orchestrator>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    let shutdown = orchestrator.shutdown_token();
    axum::serve(listener, build_router(ApiState::new(orchestrator)))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}
