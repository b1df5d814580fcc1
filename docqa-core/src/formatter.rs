//! Turning retrieved chunks into a numbered list of answer points.

use std::collections::HashSet;

use regex::Regex;

use crate::document::{Answer, AnswerPoint, ScoredChunk};
use crate::normalize::Normalizer;

/// Default cap on points per answer.
pub const DEFAULT_MAX_POINTS: usize = 5;
/// Candidates shorter than this many characters are dropped as fragments.
pub const DEFAULT_MIN_POINT_CHARS: usize = 30;
/// Points longer than this many characters are truncated with an ellipsis.
pub const DEFAULT_MAX_POINT_CHARS: usize = 350;

/// Formats retrieval results into deduplicated, numbered answer points.
///
/// Chunks are processed in rank order. Each chunk's text is normalized,
/// split into candidate points, and filtered; surviving points keep the
/// source and page of the chunk they came from.
#[derive(Debug, Clone)]
pub struct AnswerFormatter {
    normalizer: Normalizer,
    max_points: usize,
    min_point_chars: usize,
    max_point_chars: usize,
    list_marker: Regex,
}

impl Default for AnswerFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POINTS)
    }
}

impl AnswerFormatter {
    /// Create a formatter that emits at most `max_points` points.
    pub fn new(max_points: usize) -> Self {
        Self {
            normalizer: Normalizer::new(),
            max_points,
            min_point_chars: DEFAULT_MIN_POINT_CHARS,
            max_point_chars: DEFAULT_MAX_POINT_CHARS,
            list_marker: Regex::new(r"(?:^|\s)\d{1,2}\.\s+")
                .expect("built-in list marker pattern compiles"),
        }
    }

    /// Use a specific normalizer for cleaning chunk text.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Set the minimum candidate length in characters.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_point_chars = min_chars;
        self
    }

    /// Set the maximum point length in characters before truncation.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_point_chars = max_chars;
        self
    }

    /// Build an [`Answer`] from retrieved chunks, best-ranked first.
    pub fn format(&self, chunks: &[ScoredChunk]) -> Answer {
        let mut seen = HashSet::new();
        let mut points: Vec<AnswerPoint> = Vec::new();
        'chunks: for scored in chunks {
            if points.len() >= self.max_points {
                break;
            }
            let cleaned = self.normalizer.normalize(&scored.chunk.text);
            for candidate in self.split_candidates(&cleaned) {
                let candidate = strip_leading_marker(candidate.trim());
                if candidate.chars().count() < self.min_point_chars {
                    continue;
                }
                if !seen.insert(candidate.to_lowercase()) {
                    continue;
                }
                points.push(AnswerPoint {
                    ordinal: points.len() + 1,
                    text: truncate_chars(candidate, self.max_point_chars),
                    source: scored.chunk.source.clone(),
                    page: scored.chunk.page,
                });
                if points.len() >= self.max_points {
                    break 'chunks;
                }
            }
        }
        Answer { points }
    }

    /// Split cleaned text into candidate points.
    ///
    /// Numbered-list splitting is used only when it yields at least two
    /// segments; a lone "1." is treated as ordinary prose.
    fn split_candidates<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let numbered = self.split_numbered(text);
        if numbered.len() >= 2 { numbered } else { split_sentences(text) }
    }

    fn split_numbered<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut segments = Vec::new();
        let mut cursor = 0;
        for marker in self.list_marker.find_iter(text) {
            if marker.start() > cursor {
                segments.push(&text[cursor..marker.start()]);
            }
            cursor = marker.end();
        }
        if cursor < text.len() {
            segments.push(&text[cursor..]);
        }
        segments.retain(|segment| !segment.trim().is_empty());
        segments
    }
}

/// Split at `.`, `!`, or `?` when followed by whitespace or end of text.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?')
            && chars.peek().is_none_or(|&(_, next)| next.is_whitespace())
        {
            let end = i + c.len_utf8();
            sentences.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Drop a leading "N. " list marker. A chunk with a single marker falls
/// back to sentence splitting, which would otherwise keep the marker and
/// double up the numbering in rendered answers.
fn strip_leading_marker(text: &str) -> &str {
    let digits = text.len() - text.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if (1..=2).contains(&digits) {
        if let Some(rest) = text[digits..].strip_prefix('.') {
            let trimmed = rest.trim_start();
            if !trimmed.is_empty() && trimmed.len() < rest.len() {
                return trimmed;
            }
        }
    }
    text
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.truncate(truncated.trim_end().len());
    truncated.push('…');
    truncated
}
