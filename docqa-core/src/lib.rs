//! # docqa-core
//!
//! Document question answering over a local vector index.
//!
//! The pipeline loads PDF, text, and Markdown files, strips boilerplate
//! with an ordered set of cleanup rules, splits the text into overlapping
//! chunks that remember their page, and embeds each chunk into a
//! [`VectorIndex`]. Queries are embedded the same way and answered with
//! the nearest chunks, formatted as a numbered list of points with source
//! citations.
//!
//! The index persists to a directory and is rebuilt only when absent, so
//! repeated runs over an unchanged corpus are cheap.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use docqa_core::{HashEmbedder, QaPipeline};
//!
//! # async fn run() -> docqa_core::Result<()> {
//! let pipeline = QaPipeline::builder()
//!     .embedding_provider(Arc::new(HashEmbedder::default()))
//!     .build()?;
//!
//! let index = pipeline.ensure_index("./docs", "./index").await?;
//! let answer = pipeline.answer("symptoms of heart disease", &index).await?;
//! for point in &answer.points {
//!     println!("{}. {} ({}, page {})", point.ordinal, point.text, point.source, point.page);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Embeddings come from an [`EmbeddingProvider`]. [`HashEmbedder`] works
//! offline with no model; the `openai` feature adds a provider for the
//! OpenAI embeddings API.

pub mod chunker;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod formatter;
pub mod index;
pub mod loader;
pub mod normalize;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
mod storage;

pub use chunker::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, WindowChunker};
pub use config::{QaConfig, QaConfigBuilder};
pub use document::{Answer, AnswerPoint, Chunk, Document, ScoredChunk};
pub use embedding::{EmbeddingProvider, HashEmbedder};
pub use error::{Error, Result};
pub use formatter::AnswerFormatter;
pub use index::VectorIndex;
pub use loader::{discover, load_corpus, load_document};
pub use normalize::{Normalizer, RuleKind};
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
pub use pipeline::{QaPipeline, QaPipelineBuilder};
