// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use crate::auth::{AuthService, BootstrapOutcome, UserStore};
use crate::catalog::ModelCatalog;
use crate::config::AppConfig;
use crate::embedding::EmbeddingEngine;
use crate::error::AppError;
use crate::metrics::PrometheusCollector;
use crate::monitor::{ReadinessProbe, Uptime};
use crate::text::TextChunker;

/// Everything a request handler can reach, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<EmbeddingEngine>,
    pub default_chunker: TextChunker,
    pub auth: AuthService,
    pub catalog: Arc<ModelCatalog>,
    pub readiness: Arc<ReadinessProbe>,
    pub metrics: PrometheusCollector,
    pub uptime: Uptime,
}

impl AppState {
    /// Builds the state, opening the user directory named in `config`.
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let store = match config.auth.users_file.as_deref() {
            Some(path) if !path.is_empty() => UserStore::open(path)?,
            _ => {
                tracing::warn!("No users file configured, users are kept in memory only");
                UserStore::in_memory()
            }
        };
        Self::with_user_store(config, Arc::new(store))
    }

    pub fn with_user_store(config: AppConfig, store: Arc<UserStore>) -> Result<Self, AppError> {
        let engine = EmbeddingEngine::new(config.embedding.dim, config.embedding.max_input_chars)
            .map_err(|e| AppError::Configuration(e.to_string()))?
            .with_max_batch_size(config.embedding.max_batch_size);

        let default_chunker = TextChunker::new(
            config.embedding.default_chunk_size,
            config.embedding.default_overlap,
        )
        .map_err(|e| AppError::Configuration(e.to_string()))?;

        let auth = AuthService::from_config(&config.auth, &config.signing_secret(), store)?;

        let metrics = PrometheusCollector::new()
            .map_err(|e| AppError::Internal(format!("Failed to register metrics: {}", e)))?;

        Ok(Self {
            engine: Arc::new(engine),
            default_chunker,
            auth,
            catalog: Arc::new(ModelCatalog::new(&config.catalog.model_dir)),
            readiness: Arc::new(ReadinessProbe::new(&config.readiness)),
            metrics,
            uptime: Uptime::start(),
            config: Arc::new(config),
        })
    }

    /// Creates the configured administrator when the directory is empty.
    pub fn bootstrap_admin(&self) -> Result<BootstrapOutcome, AppError> {
        self.auth.store().initialize_default_admin(
            &self.config.auth.admin_username,
            self.config.auth.admin_password.as_deref(),
        )
    }

    /// Like [`Self::bootstrap_admin`], but a failure is logged and the
    /// server keeps running without an administrator.
    pub fn try_bootstrap_admin(&self) -> Option<BootstrapOutcome> {
        match self.bootstrap_admin() {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!(error = %e, "Admin bootstrap failed");
                None
            }
        }
    }
}
