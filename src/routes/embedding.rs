// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::State, Json};
use serde_json::Value;

use crate::domain::{
    BatchEmbedRequest, BatchEmbedResponse, ChunkEmbedRequest, ChunkEmbedResponse, EmbedRequest,
    EmbedResponse,
};
use crate::embedding::EmbeddingError;
use crate::error::AppError;
use crate::text::TextChunker;
use crate::AppState;

/// Single text embedding
#[utoipa::path(
    post,
    path = "/embeddings",
    tag = "embedding",
    request_body = EmbedRequest,
    responses(
        (status = 200, description = "Embedding computed", body = EmbedResponse),
        (status = 400, description = "Input is not a string or is too large")
    ),
    operation_id = "embed_text"
)]
pub async fn embed_handler(
    State(state): State<AppState>,
    Json(req): Json<EmbedRequest>,
) -> Result<Json<EmbedResponse>, AppError> {
    let _inference = state.metrics.inference_guard();
    let embedding = state.engine.encode_value(&req.input)?;

    Ok(Json(EmbedResponse {
        dimension: embedding.len(),
        embedding,
    }))
}

/// Batch text embedding
///
/// Embeddings come back in input order. One bad input fails the whole batch.
#[utoipa::path(
    post,
    path = "/embeddings/batch",
    tag = "embedding",
    request_body = BatchEmbedRequest,
    responses(
        (status = 200, description = "Embeddings computed", body = BatchEmbedResponse),
        (status = 400, description = "Batch too large or an input is invalid")
    ),
    operation_id = "embed_batch"
)]
pub async fn batch_embed_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchEmbedRequest>,
) -> Result<Json<BatchEmbedResponse>, AppError> {
    let _inference = state.metrics.inference_guard();
    let embeddings = state.engine.encode_batch_values(&req.inputs)?;

    tracing::debug!(count = embeddings.len(), "Batch embedded");
    Ok(Json(BatchEmbedResponse {
        embeddings,
        dimension: state.engine.dimension(),
    }))
}

/// Chunk a text and embed every chunk
#[utoipa::path(
    post,
    path = "/embeddings/chunk",
    tag = "embedding",
    request_body = ChunkEmbedRequest,
    responses(
        (status = 200, description = "Chunks and their embeddings", body = ChunkEmbedResponse),
        (status = 400, description = "Invalid chunk parameters or input")
    ),
    operation_id = "embed_chunks"
)]
pub async fn chunk_embed_handler(
    State(state): State<AppState>,
    Json(req): Json<ChunkEmbedRequest>,
) -> Result<Json<ChunkEmbedResponse>, AppError> {
    let Value::String(text) = &req.input else {
        return Err(EmbeddingError::InvalidInputType.into());
    };

    let chunker = match (req.chunk_size, req.overlap) {
        (None, None) => state.default_chunker,
        (chunk_size, overlap) => TextChunker::new(
            chunk_size.unwrap_or(state.default_chunker.chunk_size() as i64),
            overlap.unwrap_or(state.default_chunker.overlap() as i64),
        )?,
    };

    let _inference = state.metrics.inference_guard();
    let (chunks, embeddings) = state.engine.embed_chunks(&chunker, text)?;

    Ok(Json(ChunkEmbedResponse { chunks, embeddings }))
}
