// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod chunker;

pub use chunker::{chunk_text, ChunkError, TextChunker, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
