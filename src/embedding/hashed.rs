//! Deterministic hash-based embedder.

use super::{DEFAULT_DIMENSIONS, Embedder};
use crate::{Error, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Embedder producing deterministic pseudo-embeddings from word hashes.
///
/// Useful for tests and for running the engine without a real provider.
/// Identical texts map to identical vectors, so exact-text queries still
/// rank their own context first, but hash-based vectors do NOT capture
/// semantic similarity between different texts.
pub struct HashedEmbedder {
    /// Embedding dimensions.
    dimensions: usize,
}

impl HashedEmbedder {
    /// Default embedding dimensions.
    pub const DEFAULT_DIMENSIONS: usize = DEFAULT_DIMENSIONS;

    /// Creates a new hashed embedder with default dimensions.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dimensions: Self::DEFAULT_DIMENSIONS,
        }
    }

    /// Creates a new embedder with custom dimensions.
    #[must_use]
    pub const fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Generates a normalized pseudo-embedding from text.
    fn pseudo_embed(&self, text: &str) -> Vec<f32> {
        // Bound computation on pathological inputs.
        const MAX_WORDS: usize = 1000;
        let mut embedding = vec![0.0f32; self.dimensions];

        for (i, word) in text.split_whitespace().take(MAX_WORDS).enumerate() {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            let hash = hasher.finish();
            Self::distribute_hash(&mut embedding, hash, i, self.dimensions);
        }

        Self::normalize_embedding(&mut embedding);
        embedding
    }

    /// Distributes a hash value across embedding dimensions.
    #[allow(clippy::cast_precision_loss)]
    #[allow(clippy::cast_possible_truncation)]
    fn distribute_hash(embedding: &mut [f32], hash: u64, word_idx: usize, dimensions: usize) {
        for j in 0..8 {
            let idx = ((hash >> (j * 8)) as usize + word_idx) % dimensions;
            let value = ((hash >> (j * 4)) & 0xFF) as f32 / 255.0 - 0.5;
            embedding[idx] += value;
        }
    }

    /// Normalizes an embedding vector in-place.
    fn normalize_embedding(embedding: &mut [f32]) {
        let norm_sq: f32 = embedding.iter().map(|x| x * x).sum();
        if norm_sq <= 0.0 {
            return;
        }
        let inv_norm = norm_sq.sqrt().recip();
        for v in embedding.iter_mut() {
            *v *= inv_norm;
        }
    }
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashedEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(Error::InvalidInput("Cannot embed empty text".to_string()));
        }

        Ok(self.pseudo_embed(text))
    }
}
