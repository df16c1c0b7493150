//! # scholar-rag
//!
//! Retrieval engine for a study-assistant question-answering pipeline.
//!
//! Documents are split into word windows by a [`Chunker`], embedded through an
//! [`EmbeddingProvider`], and stored in a [`VectorIndex`]. A [`Retriever`]
//! ties these together: it ingests documents and, given a question, returns
//! the most similar passages as a context block, or an explicit
//! [`RetrievedContext::NoRelevantContent`] signal when nothing matches.
//!
//! ## Features
//!
//! - `openai` — [`openai::OpenAIEmbeddingProvider`] backed by the OpenAI
//!   embeddings API
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scholar_rag::{HashingEmbeddingProvider, InMemoryVectorIndex, Retriever, RetrieverConfig};
//!
//! let retriever = Retriever::builder()
//!     .config(RetrieverConfig::builder().max_words(200).top_k(3).build()?)
//!     .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
//!     .index(Arc::new(InMemoryVectorIndex::new("study_docs")))
//!     .build()?;
//!
//! retriever.ingest("biology.txt", "Cells divide by mitosis ...").await?;
//! let context = retriever.answer_context("How do cells divide?", 3).await?;
//! ```

pub mod answer;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod retriever;
pub mod startup;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod openai;

pub use answer::{Answer, AnswerGenerator, NO_RELEVANT_INFORMATION, answer, build_prompt};
pub use chunking::{Chunker, DEFAULT_MAX_WORDS, WordWindowChunker, chunk_words};
pub use config::{RetrieverConfig, RetrieverConfigBuilder};
pub use document::{Chunk, Document, SearchResult, UNSUPPORTED_CONTENT, chunk_id};
pub use embedding::{EmbeddingProvider, HashingEmbeddingProvider};
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorIndex;
pub use retriever::{
    CONTEXT_SEPARATOR, Context, IngestReport, NoContentReason, QueryStage, RetrievedContext,
    Retriever, RetrieverBuilder,
};
pub use vectorstore::VectorIndex;
