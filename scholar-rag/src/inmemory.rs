//! In-memory vector index using exact cosine similarity.
//!
//! This module provides [`InMemoryVectorIndex`], an append-only collection
//! protected by a `tokio::sync::RwLock`. Inserts take the write lock, so the
//! id and dimension checks and the append happen atomically; searches take the
//! read lock and scan a consistent snapshot.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// A stored chunk and its unit-normalized embedding.
#[derive(Debug, Clone)]
struct Entry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

#[derive(Debug, Default)]
struct Collection {
    /// Entries in insertion order; the position is the tie-break key.
    entries: Vec<Entry>,
    /// Chunk id → position in `entries`.
    ids: HashMap<String, usize>,
    dimensions: Option<usize>,
}

/// An in-memory vector index performing an exhaustive O(n·d) scan per query.
///
/// Embeddings are L2-normalized on insert and the query is normalized at
/// search time, so the score is the cosine similarity. Zero-magnitude vectors
/// are stored as-is and score 0.0 against everything.
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rag::{Chunk, InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new("study_docs");
/// index.insert(Chunk::new("d1", 0, "alpha beta"), vec![0.6, 0.8]).await?;
/// let hits = index.search(&[0.0, 1.0], 3).await?;
/// ```
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    name: String,
    collection: RwLock<Collection>,
}

impl InMemoryVectorIndex {
    /// Create an empty index whose dimensionality is fixed by the first insert.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), collection: RwLock::new(Collection::default()) }
    }

    /// Create an empty index that only accepts vectors of `dimensions` length.
    pub fn with_dimensions(name: impl Into<String>, dimensions: usize) -> Self {
        let collection = Collection { dimensions: Some(dimensions), ..Collection::default() };
        Self { name: name.into(), collection: RwLock::new(collection) }
    }

    /// The collection name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a stored chunk by id.
    pub async fn get(&self, chunk_id: &str) -> Option<Chunk> {
        let collection = self.collection.read().await;
        collection.ids.get(chunk_id).map(|&pos| collection.entries[pos].chunk.clone())
    }

    /// All stored chunks of one document, ordered by ordinal.
    pub async fn document_chunks(&self, document_id: &str) -> Vec<Chunk> {
        let collection = self.collection.read().await;
        let mut chunks: Vec<Chunk> = collection
            .entries
            .iter()
            .filter(|entry| entry.chunk.document_id == document_id)
            .map(|entry| entry.chunk.clone())
            .collect();
        chunks.sort_by_key(|chunk| chunk.ordinal);
        chunks
    }
}

impl Default for InMemoryVectorIndex {
    fn default() -> Self {
        Self::new("default")
    }
}

/// Accumulated in `f64`; squares of any finite `f32` stay in range there.
fn l2_norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| f64::from(x).powi(2)).sum::<f64>().sqrt()
}

/// Scale `v` to unit length. Zero vectors are returned unchanged.
fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = l2_norm(&v);
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x = (f64::from(*x) / norm) as f32);
    }
    v
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Descending score, then ascending insertion position.
///
/// Scores are finite because stored and query vectors are, so `partial_cmp`
/// is total here; `-0.0` and `0.0` tie.
fn rank(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0))
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn insert(&self, chunk: Chunk, embedding: Vec<f32>) -> Result<()> {
        if embedding.is_empty() {
            return Err(RagError::InvalidArgument(format!(
                "embedding for chunk '{}' is empty",
                chunk.id
            )));
        }
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(RagError::InvalidArgument(format!(
                "embedding for chunk '{}' has non-finite components",
                chunk.id
            )));
        }

        let mut collection = self.collection.write().await;
        if let Some(expected) = collection.dimensions {
            if embedding.len() != expected {
                return Err(RagError::DimensionMismatch { expected, actual: embedding.len() });
            }
        }
        if collection.ids.contains_key(&chunk.id) {
            return Err(RagError::DuplicateId(chunk.id));
        }

        collection.dimensions = Some(embedding.len());
        let position = collection.entries.len();
        collection.ids.insert(chunk.id.clone(), position);
        collection.entries.push(Entry { chunk, embedding: normalize(embedding) });
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let collection = self.collection.read().await;
        if top_k == 0 || collection.entries.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(expected) = collection.dimensions {
            if embedding.len() != expected {
                return Err(RagError::DimensionMismatch { expected, actual: embedding.len() });
            }
        }

        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(RagError::InvalidArgument(
                "query embedding has non-finite components".to_string(),
            ));
        }

        let query = normalize(embedding.to_vec());
        let mut scored: Vec<(usize, f32)> = collection
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, dot(&entry.embedding, &query)))
            .collect();

        if top_k < scored.len() {
            scored.select_nth_unstable_by(top_k - 1, rank);
            scored.truncate(top_k);
        }
        scored.sort_unstable_by(rank);

        Ok(scored
            .into_iter()
            .map(|(position, score)| SearchResult {
                chunk: collection.entries[position].chunk.clone(),
                score,
            })
            .collect())
    }

    async fn len(&self) -> usize {
        self.collection.read().await.entries.len()
    }

    async fn dimensions(&self) -> Option<usize> {
        self.collection.read().await.dimensions
    }
}
