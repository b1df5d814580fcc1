//! In-memory vector index with exact cosine search.

use serde::{Deserialize, Serialize};

use crate::document::{Chunk, ScoredChunk};
use crate::error::{Error, Result};

/// One indexed chunk with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub(crate) struct IndexEntry {
    pub(crate) chunk: Chunk,
    pub(crate) vector: Vec<f32>,
}

/// An insertion-ordered vector index over document chunks.
///
/// Search is exact brute-force cosine similarity over every entry. Equal
/// scores are broken by insertion order, so the same corpus indexed in the
/// same order always retrieves identically.
///
/// The index records the name of the embedding model it was built with;
/// scores are only comparable between vectors from one model.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimensions: usize,
    model: String,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Create an empty index for vectors of the given dimensionality.
    pub fn new(dimensions: usize, model: impl Into<String>) -> Self {
        Self { dimensions, model: model.into(), entries: Vec::new() }
    }

    pub(crate) fn from_parts(dimensions: usize, model: String, entries: Vec<IndexEntry>) -> Self {
        Self { dimensions, model, entries }
    }

    pub(crate) fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no chunks are indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality of the indexed vectors.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Name of the embedding model the index was built with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Append a chunk with its embedding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the vector's length does
    /// not match the index dimensionality.
    pub fn insert(&mut self, chunk: Chunk, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::InvalidConfiguration(format!(
                "vector has {} dimensions, index expects {}",
                vector.len(),
                self.dimensions
            )));
        }
        self.entries.push(IndexEntry { chunk, vector });
        Ok(())
    }

    /// Search for the `top_k` chunks most similar to `query_vector`.
    ///
    /// Results come back in descending score order; equal scores keep
    /// insertion order. Entries scoring below `min_score` are dropped.
    /// Searching an empty index yields an empty `Vec`.
    pub fn search(&self, query_vector: &[f32], top_k: usize, min_score: f32) -> Vec<ScoredChunk> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, cosine_similarity(&entry.vector, query_vector)))
            .filter(|(_, score)| *score >= min_score)
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0))
        });
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(position, score)| ScoredChunk {
                chunk: self.entries[position].chunk.clone(),
                score,
            })
            .collect()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if the lengths differ or either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
