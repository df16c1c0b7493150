//! Error types for the `scholar-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval operations.
///
/// Validation variants ([`InvalidArgument`](RagError::InvalidArgument),
/// [`DimensionMismatch`](RagError::DimensionMismatch),
/// [`DuplicateId`](RagError::DuplicateId)) signal a contract violation by the
/// caller. [`EmbeddingUnavailable`](RagError::EmbeddingUnavailable) is an
/// environmental condition; the crate never retries it internally.
#[derive(Debug, Error)]
pub enum RagError {
    /// A caller passed a value outside an operation's contract.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A vector's length disagrees with the collection's dimensionality.
    #[error("Dimension mismatch: collection expects {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimensionality established by the collection.
        expected: usize,
        /// The length of the offending vector.
        actual: usize,
    },

    /// A chunk with this id is already stored in the collection.
    #[error("Duplicate chunk id: {0}")]
    DuplicateId(String),

    /// The embedding backend failed, timed out, or returned a malformed response.
    #[error("Embedding unavailable ({provider}): {message}")]
    EmbeddingUnavailable {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A query was answered against a collection with no entries.
    #[error("Index is empty")]
    EmptyIndex,

    /// A query matched nothing that passed the score filter.
    #[error("No relevant content found")]
    NoRelevantContent,

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The answer-generation collaborator failed.
    #[error("Answer generation error ({generator}): {message}")]
    AnswerGeneration {
        /// The generator that produced the error.
        generator: String,
        /// A description of the failure.
        message: String,
    },
}

impl RagError {
    /// Build an [`EmbeddingUnavailable`](RagError::EmbeddingUnavailable) error.
    pub fn embedding(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable { provider: provider.into(), message: message.into() }
    }

    /// Whether the failure is environmental and the caller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::EmbeddingUnavailable { .. } | Self::AnswerGeneration { .. })
    }
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
