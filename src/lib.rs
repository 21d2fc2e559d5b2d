// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod embedding;
pub mod error;
pub mod metrics;
pub mod monitor;
pub mod routes;
pub mod state;
pub mod text;

pub use crate::config::{AppConfig, ConfigLoader};
pub use domain::{EmbedRequest, EmbedResponse, ModelInfo};
pub use embedding::{EmbeddingEngine, EmbeddingError};
pub use error::{AppError, AuthError};
pub use routes::create_router;
pub use state::AppState;
pub use text::{chunk_text, TextChunker};
