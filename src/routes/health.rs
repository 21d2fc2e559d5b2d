// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Liveness, readiness, metrics and API description routes.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::domain::{HealthResponse, ReadinessResponse};
use crate::error::AppError;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service banner", body = serde_json::Value)
    ),
    operation_id = "index"
)]
pub async fn index() -> Json<Value> {
    Json(json!({
        "msg": "Petra backend (health endpoints available at /health and /ready)"
    }))
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    ),
    operation_id = "health_check"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    state.metrics.record_health_check();

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime: state.uptime.seconds(),
        version: state.config.server.version.clone(),
    })
}

/// Readiness check
///
/// Always ready in `local` mode; otherwise the database file and the index
/// directory must both exist.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Service is not ready", body = ReadinessResponse)
    ),
    operation_id = "readiness_check"
)]
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    state.metrics.record_ready_check();

    let readiness = state.readiness.check();
    let status = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(readiness.report))
}

/// Prometheus metrics endpoint
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "health",
    responses(
        (status = 200, description = "Metrics in the Prometheus text format", body = String)
    ),
    operation_id = "metrics"
)]
pub async fn metrics_endpoint(State(state): State<AppState>) -> Result<Response, AppError> {
    let (content_type, body) = state
        .metrics
        .encode()
        .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(super::create_openapi())
}
