//! Retrieval orchestrator.
//!
//! The [`Retriever`] coordinates ingestion (chunk → embed → insert) and
//! querying (embed → search → filter) by composing an [`EmbeddingProvider`],
//! a [`VectorIndex`] and a [`Chunker`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scholar_rag::{HashingEmbeddingProvider, InMemoryVectorIndex, Retriever, RetrievedContext};
//!
//! let retriever = Retriever::builder()
//!     .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
//!     .index(Arc::new(InMemoryVectorIndex::new("study_docs")))
//!     .build()?;
//!
//! retriever.ingest("notes.txt", &text).await?;
//! match retriever.answer_context("What is osmosis?", 3).await? {
//!     RetrievedContext::Found(context) => println!("{}", context.text),
//!     RetrievedContext::NoRelevantContent(reason) => println!("{reason}"),
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::chunking::{Chunker, WordWindowChunker};
use crate::config::RetrieverConfig;
use crate::document::{Chunk, Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// Separator placed between passages when building a context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// The stages a query moves through.
///
/// A query runs `Embedding → Searching → Filtering → Done`; a failure in any
/// stage moves it to `Failed` and the error is returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStage {
    Embedding,
    Searching,
    Filtering,
    Done,
    Failed,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Embedding => "embedding",
            Self::Searching => "searching",
            Self::Filtering => "filtering",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of ingesting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// The ingested document's id.
    pub document_id: String,
    /// Number of chunks added to the index.
    pub chunks_inserted: usize,
    /// True when the document carried no indexable content.
    pub skipped: bool,
}

impl IngestReport {
    fn skipped(document_id: &str) -> Self {
        Self { document_id: document_id.to_string(), chunks_inserted: 0, skipped: true }
    }
}

/// Why a query produced no context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoContentReason {
    /// Nothing has been ingested yet.
    EmptyIndex,
    /// The index has entries but none survived search and filtering.
    NoMatches,
}

impl fmt::Display for NoContentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyIndex => f.write_str("no documents have been ingested"),
            Self::NoMatches => f.write_str("no passage matched the question"),
        }
    }
}

/// Passages retrieved for a question and the context block built from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Context {
    /// Passage texts in ranked order, joined by [`CONTEXT_SEPARATOR`].
    pub text: String,
    /// The ranked passages.
    pub passages: Vec<SearchResult>,
}

/// The result of [`Retriever::answer_context`].
///
/// `NoRelevantContent` is a normal outcome, distinct from a system error.
/// Answer generation must not run on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RetrievedContext {
    Found(Context),
    NoRelevantContent(NoContentReason),
}

impl RetrievedContext {
    /// Whether any passage was retrieved.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Unwrap the context, turning the no-content signal into an error.
    ///
    /// # Errors
    ///
    /// [`RagError::EmptyIndex`] or [`RagError::NoRelevantContent`].
    pub fn into_found(self) -> Result<Context> {
        match self {
            Self::Found(context) => Ok(context),
            Self::NoRelevantContent(NoContentReason::EmptyIndex) => Err(RagError::EmptyIndex),
            Self::NoRelevantContent(NoContentReason::NoMatches) => {
                Err(RagError::NoRelevantContent)
            }
        }
    }
}

/// The retrieval orchestrator.
///
/// Construct one via [`Retriever::builder()`]. Construction never touches the
/// network; validate credentials and connectivity beforehand with
/// [`startup`](crate::startup).
pub struct Retriever {
    config: RetrieverConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chunker: Arc<dyn Chunker>,
}

impl Retriever {
    /// Create a new [`RetrieverBuilder`].
    pub fn builder() -> RetrieverBuilder {
        RetrieverBuilder::default()
    }

    /// Return a reference to the retriever configuration.
    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Return a reference to the vector index.
    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Ingest a document: chunk → embed → insert.
    ///
    /// Empty text and the [`UNSUPPORTED_CONTENT`](crate::UNSUPPORTED_CONTENT)
    /// sentinel are skipped without error. Chunks are embedded in batches of
    /// `embed_batch_size`, with up to `embed_concurrency` batches in flight,
    /// and inserted in ordinal order.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidArgument`] if `document_id` is blank
    /// - [`RagError::EmbeddingUnavailable`] if the embedder fails or times out;
    ///   chunks inserted before the failure remain in the index
    /// - [`RagError::DuplicateId`] / [`RagError::DimensionMismatch`] from the index
    pub async fn ingest(&self, document_id: &str, text: &str) -> Result<IngestReport> {
        self.ingest_document(&Document::new(document_id, text)).await
    }

    /// Ingest a [`Document`]. See [`ingest`](Retriever::ingest).
    pub async fn ingest_document(&self, document: &Document) -> Result<IngestReport> {
        if document.id.trim().is_empty() {
            return Err(RagError::InvalidArgument("document id must not be blank".to_string()));
        }
        if document.is_unavailable() {
            info!(document.id = %document.id, "skipped document without indexable content");
            return Ok(IngestReport::skipped(&document.id));
        }

        let chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "ingested document (empty)");
            return Ok(IngestReport::skipped(&document.id));
        }

        let mut embedded = stream::iter(chunks.chunks(self.config.embed_batch_size))
            .map(|batch| async move { (batch, self.embed_chunks(batch).await) })
            .buffered(self.config.embed_concurrency);

        let mut inserted = 0;
        while let Some((batch, result)) = embedded.next().await {
            let embeddings = result.map_err(|e| {
                warn!(
                    document.id = %document.id,
                    inserted,
                    total = chunks.len(),
                    error = %e,
                    "embedding failed during ingestion, keeping chunks already inserted"
                );
                e
            })?;

            for (chunk, embedding) in batch.iter().zip(embeddings) {
                self.index.insert(chunk.clone(), embedding).await.map_err(|e| {
                    error!(
                        document.id = %document.id,
                        chunk.id = %chunk.id,
                        error = %e,
                        "insert failed"
                    );
                    e
                })?;
                inserted += 1;
            }
        }

        info!(document.id = %document.id, chunk_count = inserted, "ingested document");
        Ok(IngestReport {
            document_id: document.id.clone(),
            chunks_inserted: inserted,
            skipped: false,
        })
    }

    /// Ingest several documents in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error; documents before it stay ingested.
    pub async fn ingest_batch(&self, documents: &[Document]) -> Result<Vec<IngestReport>> {
        let mut reports = Vec::with_capacity(documents.len());
        for document in documents {
            reports.push(self.ingest_document(document).await?);
        }
        Ok(reports)
    }

    /// Query the index: embed → search → filter by `min_score`.
    ///
    /// Returns at most `top_k` results ordered by descending score.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidArgument`] for a blank question or `top_k == 0`
    /// - [`RagError::EmbeddingUnavailable`] if the question cannot be embedded
    /// - [`RagError::DimensionMismatch`] if the embedder disagrees with the index
    pub async fn search(&self, question: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if question.trim().is_empty() {
            return Err(RagError::InvalidArgument("question must not be blank".to_string()));
        }
        if top_k == 0 {
            return Err(RagError::InvalidArgument("top_k must be greater than zero".to_string()));
        }

        debug!(stage = %QueryStage::Embedding, "query stage");
        let query_embedding = self
            .with_timeout(self.embedding_provider.embed(question))
            .await
            .map_err(|e| failed(QueryStage::Embedding, e))?;

        debug!(stage = %QueryStage::Searching, top_k, "query stage");
        let results = self
            .index
            .search(&query_embedding, top_k)
            .await
            .map_err(|e| failed(QueryStage::Searching, e))?;

        debug!(stage = %QueryStage::Filtering, candidates = results.len(), "query stage");
        let filtered: Vec<SearchResult> = match self.config.min_score {
            Some(threshold) => results.into_iter().filter(|r| r.score >= threshold).collect(),
            None => results,
        };

        info!(stage = %QueryStage::Done, result_count = filtered.len(), "query completed");
        Ok(filtered)
    }

    /// Retrieve the `top_k` passages for `question` and join them into a context block.
    ///
    /// Returns [`RetrievedContext::NoRelevantContent`] instead of an empty
    /// context when nothing is retrieved.
    ///
    /// # Errors
    ///
    /// Same as [`search`](Retriever::search).
    pub async fn answer_context(&self, question: &str, top_k: usize) -> Result<RetrievedContext> {
        let passages = self.search(question, top_k).await?;
        if passages.is_empty() {
            let reason = if self.index.is_empty().await {
                NoContentReason::EmptyIndex
            } else {
                NoContentReason::NoMatches
            };
            info!(%reason, "no relevant content for query");
            return Ok(RetrievedContext::NoRelevantContent(reason));
        }

        let text = passages.iter().map(|p| p.text()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR);
        Ok(RetrievedContext::Found(Context { text, passages }))
    }

    async fn embed_chunks(&self, batch: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.with_timeout(self.embedding_provider.embed_batch(&texts)).await?;
        if embeddings.len() != texts.len() {
            return Err(RagError::embedding(
                self.embedding_provider.name(),
                format!("returned {} embeddings for {} inputs", embeddings.len(), texts.len()),
            ));
        }
        Ok(embeddings)
    }

    async fn with_timeout<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        let timeout = self.config.embed_timeout;
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RagError::embedding(
                self.embedding_provider.name(),
                format!("no response within {timeout:?}"),
            )),
        }
    }
}

fn failed(stage: QueryStage, err: RagError) -> RagError {
    error!(%stage, next = %QueryStage::Failed, error = %err, "query failed");
    err
}

/// Builder for constructing a [`Retriever`].
///
/// `embedding_provider` and `index` are required. The configuration defaults
/// to [`RetrieverConfig::default()`] and the chunker to a
/// [`WordWindowChunker`] sized by `config.max_words`.
///
/// # Example
///
/// ```rust,ignore
/// let retriever = Retriever::builder()
///     .config(RetrieverConfig::builder().max_words(200).build()?)
///     .embedding_provider(Arc::new(embedder))
///     .index(Arc::new(InMemoryVectorIndex::new("docs")))
///     .chunker(Arc::new(my_sentence_chunker))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RetrieverBuilder {
    config: Option<RetrieverConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RetrieverBuilder {
    /// Set the retriever configuration.
    pub fn config(mut self, config: RetrieverConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector index that owns the collection.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Replace the default word-window chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`Retriever`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or the
    /// configuration is invalid.
    pub fn build(self) -> Result<Retriever> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let index =
            self.index.ok_or_else(|| RagError::ConfigError("index is required".to_string()))?;
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(WordWindowChunker::new(config.max_words)?),
        };

        Ok(Retriever { config, embedding_provider, index, chunker })
    }
}
