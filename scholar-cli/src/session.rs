//! A retrieval session: one embedder, one in-memory collection, many documents.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, bail};
use scholar_rag::startup::probe_embedder;
use scholar_rag::{
    EmbeddingProvider, HashingEmbeddingProvider, InMemoryVectorIndex, IngestReport,
    NO_RELEVANT_INFORMATION, RetrievedContext, Retriever, VectorIndex,
};
use tracing::info;

use crate::cli::{EmbedderKind, RetrievalArgs};
use crate::source::read_document;

/// Name of the collection every session writes to.
pub const COLLECTION: &str = "study_docs";

/// Build the embedding provider selected on the command line.
pub fn build_embedder(args: &RetrievalArgs) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    match args.embedder {
        EmbedderKind::Hashing => Ok(Arc::new(HashingEmbeddingProvider::new(
            args.dimensions.unwrap_or(HashingEmbeddingProvider::DEFAULT_DIMENSIONS),
        ))),
        EmbedderKind::Openai => openai_embedder(args),
    }
}

#[cfg(feature = "openai")]
fn openai_embedder(args: &RetrievalArgs) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    use scholar_rag::openai::OpenAIEmbeddingProvider;

    let mut provider = OpenAIEmbeddingProvider::from_env()?
        .with_timeout(std::time::Duration::from_secs(args.embed_timeout_secs))?;
    if let Some(model) = &args.model {
        provider = provider.with_model(model);
    }
    if let Some(dimensions) = args.dimensions {
        provider = provider.with_dimensions(dimensions);
    }
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "openai"))]
fn openai_embedder(_args: &RetrievalArgs) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    bail!("this build of scholar has no OpenAI support; rebuild with `--features openai`")
}

/// An open retrieval session.
pub struct Session {
    retriever: Retriever,
    index: Arc<InMemoryVectorIndex>,
    seen_ids: HashSet<String>,
}

impl Session {
    /// Validate the embedder, then create an empty session.
    ///
    /// This is the only step that talks to the embedding backend before any
    /// document is ingested.
    pub async fn start(args: &RetrievalArgs) -> anyhow::Result<Self> {
        let config = args.config()?;
        let embedder = build_embedder(args)?;
        let dimensions = probe_embedder(embedder.as_ref(), config.embed_timeout)
            .await
            .context("embedding backend failed its startup check")?;

        let index = Arc::new(InMemoryVectorIndex::with_dimensions(COLLECTION, dimensions));
        let retriever = Retriever::builder()
            .config(config)
            .embedding_provider(embedder)
            .index(index.clone())
            .build()?;

        Ok(Self::new(retriever, index))
    }

    /// Wrap a retriever that writes to `index`.
    pub fn new(retriever: Retriever, index: Arc<InMemoryVectorIndex>) -> Self {
        Self { retriever, index, seen_ids: HashSet::new() }
    }

    /// Number of chunks stored so far.
    pub async fn chunk_count(&self) -> usize {
        self.index.len().await
    }

    /// Read and ingest every path, adding to what is already indexed.
    ///
    /// # Errors
    ///
    /// Fails if a file cannot be read, if two files share a file name, or if
    /// ingestion fails. Documents ingested before the failure stay indexed. A
    /// document whose ingestion stored nothing may be added again.
    pub async fn ingest_paths(&mut self, paths: &[PathBuf]) -> anyhow::Result<Vec<IngestReport>> {
        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            let document = read_document(path)?;
            if self.seen_ids.contains(&document.id) {
                bail!("a document named '{}' was already ingested", document.id);
            }
            match self.retriever.ingest_document(&document).await {
                Ok(report) => {
                    self.seen_ids.insert(document.id);
                    reports.push(report);
                }
                Err(e) => {
                    if !self.index.document_chunks(&document.id).await.is_empty() {
                        self.seen_ids.insert(document.id);
                    }
                    return Err(e).with_context(|| format!("failed to ingest {}", path.display()));
                }
            }
        }
        info!(
            collection = COLLECTION,
            documents = reports.len(),
            chunks = self.index.len().await,
            "documents ingested"
        );
        Ok(reports)
    }

    /// Retrieve context for `question` using the configured `top_k`.
    pub async fn ask(&self, question: &str) -> anyhow::Result<RetrievedContext> {
        let top_k = self.retriever.config().top_k;
        Ok(self.retriever.answer_context(question, top_k).await?)
    }
}

/// Format a retrieval result for the terminal.
pub fn render_context(context: &RetrievedContext) -> String {
    match context {
        RetrievedContext::NoRelevantContent(reason) => {
            format!("{NO_RELEVANT_INFORMATION}\n({reason})")
        }
        RetrievedContext::Found(found) => {
            let mut out = String::new();
            for (rank, passage) in found.passages.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{}. [score={:.4}] {} | {}",
                    rank + 1,
                    passage.score,
                    passage.chunk_id(),
                    preview(passage.text(), 160)
                );
            }
            out
        }
    }
}

/// Summarize ingest reports, one line per document.
pub fn render_reports(reports: &[IngestReport]) -> String {
    reports
        .iter()
        .map(|r| {
            if r.skipped {
                format!("  {} → skipped (no readable text)", r.document_id)
            } else {
                format!("  {} → {} chunk(s)", r.document_id, r.chunks_inserted)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
