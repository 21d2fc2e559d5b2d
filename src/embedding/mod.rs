// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod engine;

pub use engine::{
    EmbeddingEngine, EmbeddingError, DEFAULT_DIMENSION, DEFAULT_MAX_BATCH_SIZE,
    DEFAULT_MAX_INPUT_CHARS,
};
