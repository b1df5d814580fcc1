//! Embedding provider seam and the deterministic offline default.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that turns text into fixed-dimension embedding vectors.
///
/// Implementations wrap embedding backends behind a unified async
/// interface. The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
/// backends with native batching should override it.
///
/// Failures are reported as [`Error::EmbeddingFailure`](crate::Error::EmbeddingFailure)
/// naming the provider.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Name of the underlying embedding model.
    fn model(&self) -> &str;
}

/// Default dimensionality of [`HashEmbedder`] vectors.
pub const HASH_EMBEDDER_DIMENSIONS: usize = 384;

/// A deterministic, model-free embedding provider.
///
/// Tokenizes on non-alphanumeric boundaries, hashes each lowercased token
/// into a bucket with a sign, and L2-normalizes the result. Texts sharing
/// words land near each other, identical texts embed identically, and no
/// network or model files are involved. Useful as an offline default and
/// in tests; it carries no semantic signal beyond word overlap.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dimensions: HASH_EMBEDDER_DIMENSIONS }
    }
}

impl HashEmbedder {
    /// Create a hash embedder with the default dimensionality.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hash embedder with a custom dimensionality (minimum 1).
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1) }
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dimensions];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let token = token.to_lowercase();
            let hash = token
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
            let bucket = (hash % self.dimensions as u64) as usize;
            // Signed buckets keep unrelated token collisions from drifting
            // all-positive.
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        "hashed-bow"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_texts_embed_identically() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed("chest pain and shortness of breath").await.unwrap();
        let b = embedder.embed("chest pain and shortness of breath").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), embedder.dimensions());
    }

    #[tokio::test]
    async fn embeddings_are_unit_length() {
        let embedder = HashEmbedder::with_dimensions(32);
        let v = embedder.embed("some document text").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn word_overlap_scores_higher_than_none() {
        let embedder = HashEmbedder::new();
        let doc = embedder.embed("heart disease symptoms include chest pain").await.unwrap();
        let related = embedder.embed("symptoms of heart disease").await.unwrap();
        let unrelated = embedder.embed("gardening tips for tomatoes").await.unwrap();

        let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
        assert!(dot(&doc, &related) > dot(&doc, &unrelated));
    }

    #[tokio::test]
    async fn empty_text_embeds_to_zero_vector() {
        let embedder = HashEmbedder::with_dimensions(16);
        let v = embedder.embed("").await.unwrap();
        assert_eq!(v, vec![0.0; 16]);
    }

    #[tokio::test]
    async fn batch_matches_single_embeds() {
        let embedder = HashEmbedder::new();
        let batch = embedder.embed_batch(&["one text", "another text"]).await.unwrap();
        assert_eq!(batch[0], embedder.embed("one text").await.unwrap());
        assert_eq!(batch[1], embedder.embed("another text").await.unwrap());
    }
}
