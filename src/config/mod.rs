// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod app;

pub use app::{
    AppConfig, AuthConfig, CatalogConfig, ConfigError, ConfigLoader, EmbeddingConfig,
    MonitoringConfig, ReadinessConfig, ServerConfig,
};
