//! Axum handlers for the control-plane API.

use super::errors::ApiError;
use super::ApiState;
use crate::catalog::{NewService, ServiceDefinition};
use crate::healthcheck::HealthReport;
use crate::orchestrator::{ResolvedStatus, ServiceDetail, DEFAULT_LOG_TAIL};
use crate::runtime::ContainerStats;
use crate::state::{Layout, NewLayout};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct EnableQuery {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub tail: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: String,
}

pub async fn healthz() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

pub async fn list_services(State(state): State<ApiState>) -> ApiResult<Vec<ServiceDetail>> {
    Ok(Json(state.orchestrator.list_services().await?))
}

pub async fn create_service(
    State(state): State<ApiState>,
    Json(new): Json<NewService>,
) -> ApiResult<ServiceDefinition> {
    Ok(Json(state.orchestrator.create_service(new).await?))
}

pub async fn get_service(
    State(state): State<ApiState>,
    Path(service_id): Path<String>,
) -> ApiResult<ServiceDetail> {
    Ok(Json(state.orchestrator.service_detail(&service_id).await?))
}

pub async fn delete_service(
    State(state): State<ApiState>,
    Path(service_id): Path<String>,
) -> ApiResult<Value> {
    state.orchestrator.delete_service(&service_id).await?;
    Ok(Json(json!({"success": true})))
}

pub async fn set_service_enabled(
    State(state): State<ApiState>,
    Path(service_id): Path<String>,
    Query(query): Query<EnableQuery>,
) -> ApiResult<Value> {
    state
        .orchestrator
        .set_service_enabled(&service_id, query.enabled)
        .await?;
    Ok(Json(json!({
        "success": true,
        "service_id": service_id,
        "enabled": query.enabled,
    })))
}

pub async fn start_container(
    State(state): State<ApiState>,
    Path(service_id): Path<String>,
) -> ApiResult<Value> {
    let handle = state.orchestrator.start_container(&service_id).await?;
    Ok(Json(json!({"success": true, "container_id": handle.id})))
}

pub async fn stop_container(
    State(state): State<ApiState>,
    Path(service_id): Path<String>,
) -> ApiResult<Value> {
    state.orchestrator.stop_container(&service_id).await?;
    Ok(Json(json!({"success": true})))
}

pub async fn restart_container(
    State(state): State<ApiState>,
    Path(service_id): Path<String>,
) -> ApiResult<Value> {
    let handle = state.orchestrator.restart_container(&service_id).await?;
    Ok(Json(json!({"success": true, "container_id": handle.id})))
}

pub async fn container_status(
    State(state): State<ApiState>,
    Path(service_id): Path<String>,
) -> ApiResult<ResolvedStatus> {
    Ok(Json(state.orchestrator.resolved_status(&service_id).await?))
}

pub async fn container_logs(
    State(state): State<ApiState>,
    Path(service_id): Path<String>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<LogsResponse> {
    let tail = query.tail.unwrap_or(DEFAULT_LOG_TAIL);
    let logs = state.orchestrator.logs(&service_id, tail).await?;
    Ok(Json(LogsResponse { logs }))
}

pub async fn container_stats(
    State(state): State<ApiState>,
    Path(service_id): Path<String>,
) -> Json<ContainerStats> {
    Json(state.orchestrator.stats(&service_id).await)
}

pub async fn container_health(
    State(state): State<ApiState>,
    Path(service_id): Path<String>,
) -> ApiResult<HealthReport> {
    Ok(Json(state.orchestrator.check_health(&service_id).await?))
}

pub async fn list_layouts(State(state): State<ApiState>) -> ApiResult<Vec<Layout>> {
    Ok(Json(state.orchestrator.list_layouts().await?))
}

pub async fn create_layout(
    State(state): State<ApiState>,
    Json(new): Json<NewLayout>,
) -> ApiResult<Layout> {
    Ok(Json(state.orchestrator.create_layout(new).await?))
}
