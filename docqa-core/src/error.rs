//! Error types for the `docqa-core` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in document question-answering operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration validation error.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// No persisted index exists at the given path.
    #[error("Index not found at {}", path.display())]
    IndexNotFound {
        /// The directory that was expected to hold the index.
        path: PathBuf,
    },

    /// A source document could not be read or its text extracted.
    #[error("Unreadable document {}: {message}", path.display())]
    UnreadableDocument {
        /// The document that failed to load.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding failure ({provider}): {message}")]
    EmbeddingFailure {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The query was empty or contained only whitespace.
    #[error("Query must not be empty")]
    EmptyQuery,

    /// An error occurred while persisting or opening an index.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// A convenience result type for document question-answering operations.
pub type Result<T> = std::result::Result<T, Error>;
