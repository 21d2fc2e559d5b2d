// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Deterministic hash-based embedder.
//!
//! Each vector is derived from the 64-byte BLAKE2b digest of the UTF-8 input:
//! the digest is split into `dim` equal slices and the first four bytes of
//! each slice are mapped into `[-1.0, 1.0)`. No model, no state, no cache.

use blake2::{Blake2b512, Digest};
use serde_json::Value;
use thiserror::Error;

use crate::text::TextChunker;

pub const DEFAULT_DIMENSION: usize = 8;
pub const DEFAULT_MAX_INPUT_CHARS: usize = 20_000;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

const DIGEST_LEN: usize = 64;
const MAX_DIMENSION: usize = DIGEST_LEN;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingError {
    #[error("text must be a string")]
    InvalidInputType,

    #[error("input too large: {len} characters (maximum {max})")]
    InputTooLarge { len: usize, max: usize },

    #[error("batch too large: {len} inputs (maximum {max})")]
    BatchTooLarge { len: usize, max: usize },

    #[error("embedding dimension must be between 1 and 64, got {0}")]
    InvalidDimension(usize),
}

#[derive(Debug, Clone)]
pub struct EmbeddingEngine {
    dim: usize,
    max_input_chars: usize,
    max_batch_size: usize,
}

impl EmbeddingEngine {
    pub fn new(dim: usize, max_input_chars: usize) -> Result<Self, EmbeddingError> {
        if dim == 0 || dim > MAX_DIMENSION {
            return Err(EmbeddingError::InvalidDimension(dim));
        }

        Ok(Self {
            dim,
            max_input_chars,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        })
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.check_length(text)?;

        let digest = Blake2b512::digest(text.as_bytes());
        let step = DIGEST_LEN / self.dim;

        let embedding = (0..self.dim)
            .map(|i| {
                let start = i * step;
                let end = (start + 4).min(DIGEST_LEN);
                let value = digest[start..end]
                    .iter()
                    .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
                ((value % 10_000) as f64 / 5000.0 - 1.0) as f32
            })
            .collect();

        Ok(embedding)
    }

    /// Encodes an untyped payload; anything but a JSON string is rejected.
    pub fn encode_value(&self, input: &Value) -> Result<Vec<f32>, EmbeddingError> {
        match input {
            Value::String(text) => self.encode(text),
            _ => Err(EmbeddingError::InvalidInputType),
        }
    }

    /// Encodes every input in order. The first failure aborts the batch.
    pub fn encode_batch<S: AsRef<str>>(
        &self,
        inputs: &[S],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if inputs.len() > self.max_batch_size {
            return Err(EmbeddingError::BatchTooLarge {
                len: inputs.len(),
                max: self.max_batch_size,
            });
        }

        inputs.iter().map(|text| self.encode(text.as_ref())).collect()
    }

    pub fn encode_batch_values(
        &self,
        inputs: &[Value],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if inputs.len() > self.max_batch_size {
            return Err(EmbeddingError::BatchTooLarge {
                len: inputs.len(),
                max: self.max_batch_size,
            });
        }

        inputs.iter().map(|input| self.encode_value(input)).collect()
    }

    /// Chunks `text` and encodes each chunk, keeping chunk order.
    pub fn embed_chunks(
        &self,
        chunker: &TextChunker,
        text: &str,
    ) -> Result<(Vec<String>, Vec<Vec<f32>>), EmbeddingError> {
        self.check_length(text)?;
        let chunks = chunker.chunk(text);
        let embeddings = chunks
            .iter()
            .map(|chunk| self.encode(chunk))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((chunks, embeddings))
    }

    fn check_length(&self, text: &str) -> Result<(), EmbeddingError> {
        let len = text.chars().count();
        if len > self.max_input_chars {
            return Err(EmbeddingError::InputTooLarge {
                len,
                max: self.max_input_chars,
            });
        }
        Ok(())
    }
}

impl Default for EmbeddingEngine {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIMENSION,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}
