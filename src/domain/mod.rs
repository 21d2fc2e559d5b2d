// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// `input` stays untyped so that a non-string payload reaches the engine
/// and is reported as an invalid input type.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EmbedRequest {
    #[serde(default)]
    #[schema(value_type = String)]
    pub input: Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmbedResponse {
    pub embedding: Vec<f32>,
    pub dimension: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchEmbedRequest {
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub inputs: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchEmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
    pub dimension: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChunkEmbedRequest {
    #[serde(default)]
    #[schema(value_type = String)]
    pub input: Value,
    pub chunk_size: Option<i64>,
    pub overlap: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChunkEmbedResponse {
    pub chunks: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Seconds since the service started.
    pub uptime: f64,
    pub version: String,
}

/// Readiness report. In `local` mode nothing is probed, so the checks are
/// `null` and the paths are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub mode: String,
    pub db_ok: Option<bool>,
    pub indexes_ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_dir: Option<String>,
}

/// A file in the model directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModelInfo {
    pub name: String,
    pub size: u64,
    /// Last modification, seconds since the Unix epoch.
    pub modified: f64,
}
