// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

pub const DEFAULT_CHUNK_SIZE: i64 = 512;
pub const DEFAULT_OVERLAP: i64 = 0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    #[error("invalid chunk parameter: {0}")]
    InvalidParameter(String),
}

/// Sliding character window over a string.
///
/// Windows hold up to `chunk_size` characters and consecutive windows share
/// `overlap` characters, so stripping the overlap from every chunk after the
/// first reconstructs the source exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: i64, overlap: i64) -> Result<Self, ChunkError> {
        if chunk_size <= 0 {
            return Err(ChunkError::InvalidParameter(
                "chunk_size must be > 0".to_string(),
            ));
        }
        if overlap < 0 {
            return Err(ChunkError::InvalidParameter(
                "overlap must be >= 0".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(ChunkError::InvalidParameter(
                "overlap must be less than chunk_size".to_string(),
            ));
        }

        Ok(Self {
            chunk_size: chunk_size as usize,
            overlap: overlap as usize,
        })
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every character boundary, end included.
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;
        let step = self.chunk_size - self.overlap;

        let mut chunks = Vec::with_capacity(char_count / step + 1);
        let mut start = 0;

        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            chunks.push(text[boundaries[start]..boundaries[end]].to_string());

            if end == char_count {
                break;
            }
            start += step;
        }

        chunks
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE as usize,
            overlap: DEFAULT_OVERLAP as usize,
        }
    }
}

pub fn chunk_text(text: &str, chunk_size: i64, overlap: i64) -> Result<Vec<String>, ChunkError> {
    Ok(TextChunker::new(chunk_size, overlap)?.chunk(text))
}
