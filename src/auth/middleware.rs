// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::Claims;
use crate::auth::types::User;
use crate::error::{AppError, AuthError};
use crate::AppState;

/// Identity attached to requests that passed [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    pub claims: Claims,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
        None => None,
    };

    let (user, claims) = state.auth.authenticate(header).map_err(|e| {
        tracing::debug!(error = %e, path = %request.uri().path(), "Rejected request");
        e
    })?;

    request.extensions_mut().insert(AuthContext { user, claims });
    Ok(next.run(request).await)
}
