//! Vector index trait for storing and searching chunk embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A single collection of chunk embeddings with similarity search.
///
/// Implementations own the collection exclusively and enforce its invariants:
/// chunk ids are unique and every stored vector has the same length.
/// Concurrent callers must never observe a partially inserted entry.
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rag::{Chunk, InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new("study_docs");
/// index.insert(Chunk::new("d1", 0, "alpha beta"), vec![1.0, 0.0]).await?;
/// let results = index.search(&[1.0, 0.0], 5).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert a chunk with its embedding.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidArgument`](crate::RagError::InvalidArgument) for an
    ///   empty vector or one with non-finite components
    /// - [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch) if the
    ///   vector length differs from the collection's dimensionality
    /// - [`RagError::DuplicateId`](crate::RagError::DuplicateId) if the chunk id
    ///   is already stored
    ///
    /// The collection is unchanged when an error is returned.
    async fn insert(&self, chunk: Chunk, embedding: Vec<f32>) -> Result<()>;

    /// Return the `top_k` entries most similar to `embedding`.
    ///
    /// Results are ordered by descending cosine similarity, ties broken by
    /// insertion order. An empty collection yields an empty `Vec`.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// Number of stored entries.
    async fn len(&self) -> usize;

    /// Whether the collection has no entries.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// The dimensionality fixed by the first insert, if any.
    async fn dimensions(&self) -> Option<usize>;
}
