//! Overlapping fixed-size chunking with page attribution.

use crate::document::{Chunk, Document};
use crate::error::{Error, Result};

/// Default maximum chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Splits documents into fixed-size character windows with overlap.
///
/// Pages are joined with a newline and walked as one sequence of chars, so
/// no chunk boundary can split a multi-byte character. A window end that
/// falls mid-word snaps back to the nearest whitespace within a bounded
/// lookback; a single token longer than the lookback is cut hard rather
/// than stalling the walk. Each chunk records the 1-based page its first
/// non-whitespace character came from.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_core::WindowChunker;
///
/// let chunker = WindowChunker::new(1000, 200)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct WindowChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for WindowChunker {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, chunk_overlap: DEFAULT_CHUNK_OVERLAP }
    }
}

impl WindowChunker {
    /// Create a chunker with the given window size and overlap, in characters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfiguration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::InvalidConfiguration(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Split a document into overlapping chunks.
    ///
    /// Returns an empty `Vec` when the document has no text. Text shorter
    /// than the chunk size yields exactly one chunk.
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let (chars, page_starts) = flatten_pages(&document.pages);
        let total = chars.len();
        if total == 0 {
            return Vec::new();
        }

        let lookback = snap_lookback(self.chunk_size);
        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < total {
            let hard_end = (start + self.chunk_size).min(total);
            let end = snap_end(&chars, start, hard_end, lookback);

            // Windows of pure whitespace produce nothing.
            if let Some(first) = (start..end).find(|&i| !chars[i].is_whitespace()) {
                let text: String = chars[start..end].iter().collect();
                chunks.push(Chunk {
                    text: text.trim().to_string(),
                    source: document.source.clone(),
                    page: page_at(&page_starts, first),
                });
            }

            if end == total {
                break;
            }
            // The start must strictly advance even when the snapped end
            // lands inside the overlap region.
            start = end.saturating_sub(self.chunk_overlap).max(start + 1);
        }

        chunks
    }
}

/// Lookback distance for whitespace snapping. Beyond this a hard cut is
/// taken, so one long token cannot shrink every following chunk.
fn snap_lookback(chunk_size: usize) -> usize {
    (chunk_size / 5).clamp(1, 80)
}

/// Snap a window end back to just after the nearest whitespace within
/// `lookback` chars. Ends at the text end or already next to whitespace
/// stand as they are.
fn snap_end(chars: &[char], start: usize, hard_end: usize, lookback: usize) -> usize {
    if hard_end == chars.len() {
        return hard_end;
    }
    if chars[hard_end].is_whitespace() || chars[hard_end - 1].is_whitespace() {
        return hard_end;
    }
    let floor = hard_end.saturating_sub(lookback).max(start + 1);
    (floor..hard_end)
        .rev()
        .find(|&i| chars[i].is_whitespace())
        .map(|i| i + 1)
        .unwrap_or(hard_end)
}

/// Join pages with a newline, returning the flattened chars and the char
/// offset at which each page starts.
fn flatten_pages(pages: &[String]) -> (Vec<char>, Vec<usize>) {
    let mut chars = Vec::new();
    let mut starts = Vec::with_capacity(pages.len());
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            chars.push('\n');
        }
        starts.push(chars.len());
        chars.extend(page.chars());
    }
    (chars, starts)
}

/// 1-based page number containing the char at `offset`.
fn page_at(page_starts: &[usize], offset: usize) -> u32 {
    page_starts.partition_point(|&s| s <= offset).max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(pages: &[&str]) -> Document {
        Document::new("test.pdf", pages.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(WindowChunker::new(0, 0), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(WindowChunker::new(100, 100), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(WindowChunker::new(100, 150), Err(Error::InvalidConfiguration(_))));
        assert!(WindowChunker::new(100, 0).is_ok());
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let chunker = WindowChunker::default();
        assert!(chunker.chunk(&doc(&[])).is_empty());
        assert!(chunker.chunk(&doc(&["", ""])).is_empty());
    }

    #[test]
    fn short_text_yields_one_chunk() {
        let chunker = WindowChunker::default();
        let chunks = chunker.chunk(&doc(&["a short page of text"]));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "a short page of text");
        assert_eq!(chunks[0].source, "test.pdf");
        assert_eq!(chunks[0].page, 1);
    }

    #[test]
    fn chunks_never_exceed_chunk_size() {
        let chunker = WindowChunker::new(50, 10).expect("valid chunker");
        let text = "word ".repeat(100);
        for chunk in chunker.chunk(&doc(&[&text])) {
            assert!(chunk.text.chars().count() <= 50, "oversized chunk: {:?}", chunk.text);
        }
    }

    #[test]
    fn windows_break_between_words() {
        let chunker = WindowChunker::new(12, 0).expect("valid chunker");
        let chunks = chunker.chunk(&doc(&["alpha beta gamma delta"]));
        for chunk in &chunks {
            for word in chunk.text.split_whitespace() {
                assert!(
                    ["alpha", "beta", "gamma", "delta"].contains(&word),
                    "split a word: {word:?}",
                );
            }
        }
    }

    #[test]
    fn long_tokens_are_cut_rather_than_stalling() {
        let chunker = WindowChunker::new(10, 2).expect("valid chunker");
        let chunks = chunker.chunk(&doc(&["abcdefghijklmnopqrstuvwxyz"]));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 10);
        }
    }

    #[test]
    fn consecutive_chunks_overlap_by_at_most_the_overlap() {
        let chunker = WindowChunker::new(40, 15).expect("valid chunker");
        let text = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod tempor";
        let chunks = chunker.chunk(&doc(&[text]));
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let a: Vec<char> = pair[0].text.chars().collect();
            let b: Vec<char> = pair[1].text.chars().collect();
            let max_shared = (0..=a.len().min(b.len()))
                .rev()
                .find(|&n| a[a.len() - n..] == b[..n])
                .unwrap_or(0);
            assert!(max_shared <= 15, "chunks share {max_shared} chars");
        }
    }

    #[test]
    fn multibyte_text_is_never_split_mid_char() {
        let chunker = WindowChunker::new(8, 2).expect("valid chunker");
        let chunks = chunker.chunk(&doc(&["héllo wörld ünïcode tèxt"]));
        assert!(!chunks.is_empty());
        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert!(joined.contains('é') || joined.contains('ö'));
    }

    #[test]
    fn chunks_record_their_starting_page() {
        let chunker = WindowChunker::new(30, 5).expect("valid chunker");
        let chunks = chunker.chunk(&doc(&[
            "first page text sits here",
            "second page text sits here",
            "third page text sits here",
        ]));
        assert_eq!(chunks.first().map(|c| c.page), Some(1));
        assert_eq!(chunks.last().map(|c| c.page), Some(3));
        for pair in chunks.windows(2) {
            assert!(pair[0].page <= pair[1].page);
        }
    }

    #[test]
    fn whitespace_only_pages_yield_no_chunks() {
        let chunker = WindowChunker::new(10, 2).expect("valid chunker");
        assert!(chunker.chunk(&doc(&["   ", "\t\n "])).is_empty());
    }
}
