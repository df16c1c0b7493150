//! Configuration for the retriever.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chunking::DEFAULT_MAX_WORDS;
use crate::error::{RagError, Result};

/// Configuration parameters for the [`Retriever`](crate::Retriever).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrieverConfig {
    /// Maximum chunk size in words.
    pub max_words: usize,
    /// Number of passages returned when the caller does not choose one.
    pub top_k: usize,
    /// Minimum similarity score for results. `None` keeps every match.
    pub min_score: Option<f32>,
    /// Number of chunk texts sent to the embedder per batch during ingest.
    pub embed_batch_size: usize,
    /// Maximum number of embedding batches in flight during ingest.
    pub embed_concurrency: usize,
    /// Upper bound on a single embedder call.
    pub embed_timeout: Duration,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
            top_k: 3,
            min_score: None,
            embed_batch_size: 16,
            embed_concurrency: 4,
            embed_timeout: Duration::from_secs(30),
        }
    }
}

impl RetrieverConfig {
    /// Create a new builder for constructing a [`RetrieverConfig`].
    pub fn builder() -> RetrieverConfigBuilder {
        RetrieverConfigBuilder::default()
    }

    /// Check that all parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `max_words`, `top_k`, `embed_batch_size` or `embed_concurrency` is zero
    /// - `embed_timeout` is zero
    /// - `min_score` is outside `[-1, 1]`
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("max_words", self.max_words),
            ("top_k", self.top_k),
            ("embed_batch_size", self.embed_batch_size),
            ("embed_concurrency", self.embed_concurrency),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(RagError::ConfigError(format!("{field} must be greater than zero")));
            }
        }
        if self.embed_timeout.is_zero() {
            return Err(RagError::ConfigError("embed_timeout must be non-zero".to_string()));
        }
        if let Some(min_score) = self.min_score {
            if !(-1.0..=1.0).contains(&min_score) {
                return Err(RagError::ConfigError(format!(
                    "min_score ({min_score}) must be within [-1, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RetrieverConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrieverConfigBuilder {
    config: RetrieverConfig,
}

impl RetrieverConfigBuilder {
    /// Set the maximum chunk size in words.
    pub fn max_words(mut self, max_words: usize) -> Self {
        self.config.max_words = max_words;
        self
    }

    /// Set the default number of passages to return.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Drop results scoring below `min_score`.
    pub fn min_score(mut self, min_score: f32) -> Self {
        self.config.min_score = Some(min_score);
        self
    }

    /// Set how many chunk texts are embedded per request.
    pub fn embed_batch_size(mut self, size: usize) -> Self {
        self.config.embed_batch_size = size;
        self
    }

    /// Set how many embedding requests may run at once during ingest.
    pub fn embed_concurrency(mut self, limit: usize) -> Self {
        self.config.embed_concurrency = limit;
        self
    }

    /// Set the timeout applied to every embedder call.
    pub fn embed_timeout(mut self, timeout: Duration) -> Self {
        self.config.embed_timeout = timeout;
        self
    }

    /// Build the [`RetrieverConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RetrieverConfig::validate`].
    pub fn build(self) -> Result<RetrieverConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
