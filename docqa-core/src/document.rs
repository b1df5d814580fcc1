//! Data types for documents, chunks, and answers.

use serde::{Deserialize, Serialize};

/// A source document as a sequence of page texts.
///
/// Page numbers are 1-based positions in `pages`. Plain-text sources are
/// represented as a single page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Where the document came from, typically a file path.
    pub source: String,
    /// Page texts in reading order.
    pub pages: Vec<String>,
}

impl Document {
    /// Create a document from per-page texts.
    pub fn new(source: impl Into<String>, pages: Vec<String>) -> Self {
        Self { source: source.into(), pages }
    }

    /// Create a single-page document from one block of text.
    pub fn from_text(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source: source.into(), pages: vec![text.into()] }
    }

    /// True when every page is empty.
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|page| page.is_empty())
    }
}

/// A segment of a [`Document`] produced by chunking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The chunk text.
    pub text: String,
    /// The source of the parent [`Document`].
    pub source: String,
    /// The 1-based page on which this chunk starts.
    pub page: u32,
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}

/// One numbered point in a formatted answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerPoint {
    /// 1-based position of the point within the answer.
    pub ordinal: usize,
    /// The point text.
    pub text: String,
    /// Source of the chunk this point was extracted from.
    pub source: String,
    /// 1-based page that chunk starts on.
    pub page: u32,
}

/// A formatted answer: an ordered list of deduplicated points.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// The answer points, with ordinals `1..=len`.
    pub points: Vec<AnswerPoint>,
}

impl Answer {
    /// True when no points survived retrieval and formatting.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
