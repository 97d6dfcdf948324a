// ============================================================
// Layer 3 — Embedding Matrix
// ============================================================
// Pretrained word vectors, one row per vocabulary index.
// Row i is the initial embedding of token index i.

use anyhow::{ensure, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    vocab_size: usize,
    dim: usize,
    /// Row-major, vocab_size * dim values
    values: Vec<f32>,
}

impl EmbeddingMatrix {
    pub fn new(vocab_size: usize, dim: usize, values: Vec<f32>) -> Result<Self> {
        ensure!(vocab_size > 0 && dim > 0, "embedding matrix must be non-empty, got {vocab_size}x{dim}");
        ensure!(
            values.len() == vocab_size * dim,
            "embedding matrix {vocab_size}x{dim} needs {} values, got {}",
            vocab_size * dim,
            values.len()
        );
        Ok(Self { vocab_size, dim, values })
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        (index < self.vocab_size).then(|| &self.values[index * self.dim..(index + 1) * self.dim])
    }
}
