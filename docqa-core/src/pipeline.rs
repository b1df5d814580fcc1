//! The end-to-end question-answering pipeline.
//!
//! Ties the pieces together: load documents, normalize and chunk them,
//! embed the chunks into a [`VectorIndex`], then answer queries by
//! embedding them and formatting the nearest chunks.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::chunker::WindowChunker;
use crate::config::QaConfig;
use crate::document::{Answer, Document, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::formatter::AnswerFormatter;
use crate::index::VectorIndex;
use crate::loader;
use crate::normalize::Normalizer;

/// Chunks per embedding request when building an index.
const EMBED_BATCH_SIZE: usize = 64;

/// Document question answering over a vector index.
///
/// Built with [`QaPipeline::builder`]; the only required piece is an
/// embedding provider. Everything else defaults from [`QaConfig`].
pub struct QaPipeline {
    config: QaConfig,
    normalizer: Normalizer,
    chunker: WindowChunker,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    formatter: AnswerFormatter,
}

impl QaPipeline {
    /// Start building a pipeline.
    pub fn builder() -> QaPipelineBuilder {
        QaPipelineBuilder::default()
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Normalize, chunk, and embed documents into a fresh index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmbeddingFailure`] if any embedding request fails;
    /// no partial index is returned.
    pub async fn build_index(&self, documents: &[Document]) -> Result<VectorIndex> {
        let mut index = VectorIndex::new(
            self.embedding_provider.dimensions(),
            self.embedding_provider.model(),
        );

        let mut chunks = Vec::new();
        for document in documents {
            let cleaned = Document::new(
                document.source.clone(),
                document.pages.iter().map(|page| self.normalizer.normalize(page)).collect(),
            );
            let document_chunks = self.chunker.chunk(&cleaned);
            debug!(
                source = %document.source,
                chunks = document_chunks.len(),
                "chunked document"
            );
            chunks.extend(document_chunks);
        }

        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<&str> = batch.iter().map(|chunk| chunk.text.as_str()).collect();
            let vectors = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
                error!(error = %e, "embedding failed while building index");
                e
            })?;
            if vectors.len() != batch.len() {
                return Err(Error::EmbeddingFailure {
                    provider: self.embedding_provider.model().to_string(),
                    message: format!(
                        "expected {} vectors for a batch, got {}",
                        batch.len(),
                        vectors.len()
                    ),
                });
            }
            for (chunk, vector) in batch.iter().zip(vectors) {
                index.insert(chunk.clone(), vector)?;
            }
        }

        info!(documents = documents.len(), chunks = index.len(), "built index");
        Ok(index)
    }

    /// Open the index at `index_path`, or build it from `corpus_dir` and
    /// save it there.
    ///
    /// Opening an index built with a different embedding model logs a
    /// warning; scores against such an index are meaningless.
    ///
    /// # Errors
    ///
    /// Propagates loader, embedding, and storage errors. A build failure
    /// leaves nothing at `index_path`.
    pub async fn ensure_index(
        &self,
        corpus_dir: impl AsRef<Path>,
        index_path: impl AsRef<Path>,
    ) -> Result<VectorIndex> {
        let index_path = index_path.as_ref();
        if VectorIndex::exists(index_path) {
            let index = VectorIndex::open(index_path)?;
            if index.model() != self.embedding_provider.model() {
                warn!(
                    index_model = index.model(),
                    provider_model = self.embedding_provider.model(),
                    "index was built with a different embedding model"
                );
            }
            return Ok(index);
        }

        let documents = loader::load_corpus(corpus_dir)?;
        let index = self.build_index(&documents).await?;
        index.save(index_path)?;
        Ok(index)
    }

    /// Embed a query and return the `top_k` most similar chunks.
    ///
    /// An empty result means nothing scored above `min_score`; that is a
    /// valid outcome, not an error.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyQuery`] when the query is empty after trimming.
    /// - [`Error::EmbeddingFailure`] when the provider fails.
    pub async fn retrieve(&self, query: &str, index: &VectorIndex) -> Result<Vec<ScoredChunk>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }
        let vector = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed for query");
            e
        })?;
        let results = index.search(&vector, self.config.top_k, self.config.min_score);
        debug!(results = results.len(), "retrieved chunks");
        Ok(results)
    }

    /// Answer a query: retrieve, then format into numbered points.
    ///
    /// # Errors
    ///
    /// Same as [`QaPipeline::retrieve`].
    pub async fn answer(&self, query: &str, index: &VectorIndex) -> Result<Answer> {
        let retrieved = self.retrieve(query, index).await?;
        Ok(self.formatter.format(&retrieved))
    }
}

/// Builder for [`QaPipeline`].
#[derive(Default)]
pub struct QaPipelineBuilder {
    config: Option<QaConfig>,
    normalizer: Option<Normalizer>,
    chunker: Option<WindowChunker>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    formatter: Option<AnswerFormatter>,
}

impl QaPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: QaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a specific normalizer instead of the default rule set.
    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Use a specific chunker instead of one derived from the config.
    pub fn chunker(mut self, chunker: WindowChunker) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider. Required.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Use a specific formatter instead of one derived from the config.
    pub fn formatter(mut self, formatter: AnswerFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when no embedding provider
    /// was set or the chunk geometry in the config is invalid.
    pub fn build(self) -> Result<QaPipeline> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self.embedding_provider.ok_or_else(|| {
            Error::InvalidConfiguration("embedding_provider is required".to_string())
        })?;
        let normalizer = self.normalizer.unwrap_or_default();
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => WindowChunker::new(config.chunk_size, config.chunk_overlap)?,
        };
        let formatter = self.formatter.unwrap_or_else(|| {
            AnswerFormatter::new(config.max_points).with_normalizer(normalizer.clone())
        });
        Ok(QaPipeline { config, normalizer, chunker, embedding_provider, formatter })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;

    fn pipeline() -> QaPipeline {
        QaPipeline::builder()
            .embedding_provider(Arc::new(HashEmbedder::default()))
            .build()
            .unwrap()
    }

    #[test]
    fn builder_requires_an_embedding_provider() {
        let result = QaPipeline::builder().build();
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn builder_rejects_bad_chunk_geometry() {
        let config = QaConfig { chunk_size: 100, chunk_overlap: 100, ..QaConfig::default() };
        let result = QaPipeline::builder()
            .config(config)
            .embedding_provider(Arc::new(HashEmbedder::default()))
            .build();
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[tokio::test]
    async fn build_index_covers_every_document() {
        let documents = vec![
            Document::from_text("a.txt", "The aorta carries oxygenated blood from the heart."),
            Document::from_text("b.txt", "Capillaries exchange nutrients with nearby tissue."),
        ];
        let pipeline = pipeline();
        let index = pipeline.build_index(&documents).await.unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.dimensions(), HashEmbedder::default().dimensions());
        assert_eq!(index.model(), "hashed-bow");
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_embedding() {
        let pipeline = pipeline();
        let index = VectorIndex::new(pipeline.embedding_provider.dimensions(), "hashed-bow");

        assert!(matches!(pipeline.retrieve("   ", &index).await, Err(Error::EmptyQuery)));
        assert!(matches!(pipeline.answer("", &index).await, Err(Error::EmptyQuery)));
    }

    #[tokio::test]
    async fn retrieval_from_an_empty_index_is_empty_not_an_error() {
        let pipeline = pipeline();
        let index = VectorIndex::new(pipeline.embedding_provider.dimensions(), "hashed-bow");

        let results = pipeline.retrieve("anything at all", &index).await.unwrap();
        assert!(results.is_empty());

        let answer = pipeline.answer("anything at all", &index).await.unwrap();
        assert!(answer.is_empty());
    }
}
