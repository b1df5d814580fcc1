//! Configuration for the question-answering pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration parameters for the question-answering pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of top results to retrieve for each query.
    pub top_k: usize,
    /// Minimum similarity score for retrieved chunks (results below this are dropped).
    pub min_score: f32,
    /// Maximum number of points in a formatted answer.
    pub max_points: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200, top_k: 3, min_score: 0.0, max_points: 5 }
    }
}

impl QaConfig {
    /// Create a new builder for constructing a [`QaConfig`].
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`QaConfig`].
#[derive(Debug, Clone, Default)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results to retrieve for each query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity score for retrieved chunks.
    pub fn min_score(mut self, score: f32) -> Self {
        self.config.min_score = score;
        self
    }

    /// Set the maximum number of points in a formatted answer.
    pub fn max_points(mut self, points: usize) -> Self {
        self.config.max_points = points;
        self
    }

    /// Build the [`QaConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `max_points == 0`
    pub fn build(self) -> Result<QaConfig> {
        if self.config.chunk_size == 0 {
            return Err(Error::InvalidConfiguration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(Error::InvalidConfiguration(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(Error::InvalidConfiguration("top_k must be greater than zero".to_string()));
        }
        if self.config.max_points == 0 {
            return Err(Error::InvalidConfiguration(
                "max_points must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        let config = QaConfig::builder().build().expect("default config is valid");
        assert_eq!(config, QaConfig::default());
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let result = QaConfig::builder().chunk_size(0).build();
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        let result = QaConfig::builder().chunk_size(100).chunk_overlap(100).build();
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));

        let result = QaConfig::builder().chunk_size(100).chunk_overlap(250).build();
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn accepts_custom_values() {
        let config = QaConfig::builder()
            .chunk_size(500)
            .chunk_overlap(50)
            .top_k(10)
            .min_score(0.25)
            .max_points(3)
            .build()
            .expect("valid config");
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.min_score, 0.25);
        assert_eq!(config.max_points, 3);
    }
}
