// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::State, Extension, Json};

use crate::auth::middleware::AuthContext;
use crate::auth::types::{AuthResponse, LoginRequest, UserView};
use crate::error::AppError;
use crate::AppState;

/// Exchanges a username and password for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = AuthResponse),
        (status = 401, description = "Incorrect username or password"),
        (status = 422, description = "Username or password missing")
    ),
    operation_id = "login"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let auth = state.auth.clone();

    // Argon2 verification is CPU bound.
    let response = tokio::task::spawn_blocking(move || {
        auth.login(&request.username, &request.password)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Login task failed: {}", e)))??;

    Ok(Json(response))
}

/// Returns the user behind the presented token.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserView),
        (status = 401, description = "Not authenticated")
    ),
    operation_id = "get_current_user",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me_handler(Extension(context): Extension<AuthContext>) -> Json<UserView> {
    Json(context.user.view())
}
