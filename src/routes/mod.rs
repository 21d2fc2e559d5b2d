// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! HTTP routes
//!
//! Route definitions, the OpenAPI document and the cross-cutting layers.

pub(crate) mod embedding;
pub(crate) mod health;
pub(crate) mod models;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{set_header::SetResponseHeaderLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::AppState;

/// Default request timeout (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Petra API",
        description = "Deterministic text embeddings with bearer-token authentication",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        health::index,
        health::health_check,
        health::readiness_check,
        health::metrics_endpoint,
        crate::auth::handlers::login_handler,
        crate::auth::handlers::me_handler,
        embedding::embed_handler,
        embedding::batch_embed_handler,
        embedding::chunk_embed_handler,
        models::list_models,
        models::get_model,
    ),
    components(
        schemas(
            crate::auth::LoginRequest,
            crate::auth::AuthResponse,
            crate::auth::UserView,
            crate::domain::EmbedRequest,
            crate::domain::EmbedResponse,
            crate::domain::BatchEmbedRequest,
            crate::domain::BatchEmbedResponse,
            crate::domain::ChunkEmbedRequest,
            crate::domain::ChunkEmbedResponse,
            crate::domain::HealthResponse,
            crate::domain::ReadinessResponse,
            crate::domain::ModelInfo,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health checks"),
        (name = "auth", description = "Authentication"),
        (name = "embedding", description = "Embeddings"),
        (name = "model", description = "Local model catalog")
    )
)]
pub(crate) struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub(crate) fn create_openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Records request count and latency when metrics are enabled.
///
/// Routed requests are labelled with their route template so that path
/// parameters do not explode label cardinality.
async fn track_metrics(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.config.monitoring.metrics_enabled {
        return next.run(request).await;
    }

    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let timer = state.metrics.start_http_request_timer(&method, &path);
    let response = next.run(request).await;
    timer.observe_duration();

    state
        .metrics
        .record_http_request(&method, &path, response.status().as_u16());
    response
}

/// Create the application router
///
/// `/auth/me` and the model catalog require a bearer token; everything else
/// is public.
pub fn create_router(app_state: AppState) -> Router {
    let timeout = app_state
        .config
        .server
        .timeout
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

    let public_routes = Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics_endpoint))
        .route("/api-docs/openapi.json", get(health::openapi_json))
        .route("/auth/login", post(crate::auth::login_handler))
        .route("/embeddings", post(embedding::embed_handler))
        .route("/embeddings/batch", post(embedding::batch_embed_handler))
        .route("/embeddings/chunk", post(embedding::chunk_embed_handler));

    let protected_routes = Router::new()
        .route("/auth/me", get(crate::auth::me_handler))
        .route("/api/v1/models", get(models::list_models))
        .route("/api/v1/models/:name", get(models::get_model))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            crate::auth::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            track_metrics,
        ))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .with_state(app_state)
}
