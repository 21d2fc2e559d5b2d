// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::domain::ModelInfo;
use crate::error::AppError;
use crate::AppState;

/// List local model files
#[utoipa::path(
    get,
    path = "/api/v1/models",
    tag = "model",
    responses(
        (status = 200, description = "Model files, sorted by name", body = Vec<ModelInfo>),
        (status = 401, description = "Not authenticated")
    ),
    operation_id = "list_models",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelInfo>>, AppError> {
    Ok(Json(state.catalog.list().await?))
}

/// Describe one model file
#[utoipa::path(
    get,
    path = "/api/v1/models/{name}",
    tag = "model",
    params(
        ("name" = String, Path, description = "Model file name")
    ),
    responses(
        (status = 200, description = "Model file details", body = ModelInfo),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Name escapes the model directory"),
        (status = 404, description = "Model not found")
    ),
    operation_id = "get_model",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_model(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ModelInfo>, AppError> {
    Ok(Json(state.catalog.get(&name).await?))
}
