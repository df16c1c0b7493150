//! End-to-end tests for ingestion and querying through the retriever.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use scholar_rag::{
    Answer, AnswerGenerator, Document, EmbeddingProvider, HashingEmbeddingProvider,
    InMemoryVectorIndex, NoContentReason, RagError, RetrievedContext, Retriever, RetrieverConfig,
    UNSUPPORTED_CONTENT, VectorIndex, answer,
};

/// Returns fixed vectors for known texts and the zero vector otherwise.
struct LookupEmbedder {
    vectors: HashMap<&'static str, Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for LookupEmbedder {
    async fn embed(&self, text: &str) -> scholar_rag::Result<Vec<f32>> {
        Ok(self.vectors.get(text).cloned().unwrap_or_else(|| vec![0.0; 3]))
    }

    fn dimensions(&self) -> usize {
        3
    }
}

/// Fails for one poisoned chunk text, delegating everything else.
struct PoisonedEmbedder {
    poison: &'static str,
    inner: HashingEmbeddingProvider,
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for PoisonedEmbedder {
    async fn embed(&self, text: &str) -> scholar_rag::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text == self.poison {
            return Err(RagError::embedding("poisoned", "rate limited"));
        }
        self.inner.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

/// Never answers within any reasonable timeout.
struct StalledEmbedder;

#[async_trait]
impl EmbeddingProvider for StalledEmbedder {
    async fn embed(&self, _text: &str) -> scholar_rag::Result<Vec<f32>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(vec![1.0])
    }

    fn dimensions(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "stalled"
    }
}

/// Returns one vector fewer than requested.
struct ShortBatchEmbedder;

#[async_trait]
impl EmbeddingProvider for ShortBatchEmbedder {
    async fn embed(&self, _text: &str) -> scholar_rag::Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }

    async fn embed_batch(&self, texts: &[&str]) -> scholar_rag::Result<Vec<Vec<f32>>> {
        Ok(vec![vec![1.0, 0.0]; texts.len().saturating_sub(1)])
    }

    fn dimensions(&self) -> usize {
        2
    }
}

/// Counts calls and echoes the context.
#[derive(Default)]
struct RecordingGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl AnswerGenerator for RecordingGenerator {
    async fn generate(&self, question: &str, context: &str) -> scholar_rag::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{question} -> {context}"))
    }
}

fn build(
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<InMemoryVectorIndex>,
    config: RetrieverConfig,
) -> Retriever {
    Retriever::builder().config(config).embedding_provider(embedder).index(index).build().unwrap()
}

fn lookup() -> Arc<LookupEmbedder> {
    Arc::new(LookupEmbedder {
        vectors: HashMap::from([
            ("alpha beta", vec![1.0, 0.0, 0.0]),
            ("gamma delta", vec![0.0, 1.0, 0.0]),
            ("which letters come later?", vec![0.1, 0.9, 0.0]),
            ("something unrelated", vec![0.0, 0.0, 1.0]),
        ]),
    })
}

#[tokio::test]
async fn ingests_and_retrieves_the_reference_document() {
    let index = Arc::new(InMemoryVectorIndex::new("study_docs"));
    let config = RetrieverConfig::builder().max_words(2).build().unwrap();
    let retriever = build(lookup(), Arc::clone(&index), config);

    let report = retriever.ingest("d1", "alpha beta gamma delta").await.unwrap();
    assert_eq!(report.chunks_inserted, 2);
    assert!(!report.skipped);
    assert_eq!(index.get("d1_0").await.unwrap().text, "alpha beta");
    assert_eq!(index.get("d1_1").await.unwrap().text, "gamma delta");

    let results = retriever.search("which letters come later?", 1).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk_id(), "d1_1");
    assert_eq!(results[0].text(), "gamma delta");
    assert!(results[0].score > 0.99);
}

#[tokio::test]
async fn unsupported_content_is_a_no_op() {
    let index = Arc::new(InMemoryVectorIndex::new("study_docs"));
    let retriever = build(lookup(), Arc::clone(&index), RetrieverConfig::default());

    let report = retriever.ingest("d2", UNSUPPORTED_CONTENT).await.unwrap();
    assert!(report.skipped);
    assert_eq!(report.chunks_inserted, 0);

    let report = retriever.ingest("d3", "   \n ").await.unwrap();
    assert!(report.skipped);
    assert!(index.is_empty().await);
}

#[tokio::test]
async fn empty_index_signals_no_relevant_content() {
    let index = Arc::new(InMemoryVectorIndex::new("study_docs"));
    let retriever = build(lookup(), index, RetrieverConfig::default());

    assert!(retriever.search("alpha beta", 3).await.unwrap().is_empty());
    let context = retriever.answer_context("alpha beta", 3).await.unwrap();
    assert_eq!(context, RetrievedContext::NoRelevantContent(NoContentReason::EmptyIndex));
}

#[tokio::test]
async fn filtered_out_matches_signal_no_matches() {
    let index = Arc::new(InMemoryVectorIndex::new("study_docs"));
    let config = RetrieverConfig::builder().max_words(2).min_score(0.5).build().unwrap();
    let retriever = build(lookup(), index, config);
    retriever.ingest("d1", "alpha beta gamma delta").await.unwrap();

    let context = retriever.answer_context("something unrelated", 2).await.unwrap();
    assert_eq!(context, RetrievedContext::NoRelevantContent(NoContentReason::NoMatches));
}

#[tokio::test]
async fn documents_accumulate_instead_of_replacing() {
    let index = Arc::new(InMemoryVectorIndex::new("study_docs"));
    let config = RetrieverConfig::builder().max_words(5).build().unwrap();
    let embedder = Arc::new(HashingEmbeddingProvider::new(256));
    let retriever = build(embedder, Arc::clone(&index), config);

    let docs = [
        Document::new("bio", "mitochondria produce energy in cells"),
        Document::new("hist", "the treaty ended the long war"),
    ];
    let reports = retriever.ingest_batch(&docs).await.unwrap();
    assert_eq!(reports.iter().map(|r| r.chunks_inserted).sum::<usize>(), 3);
    assert_eq!(index.len().await, 3);

    let hits = retriever.search("mitochondria energy", 1).await.unwrap();
    assert_eq!(hits[0].chunk.document_id, "bio");
    let hits = retriever.search("treaty war", 1).await.unwrap();
    assert_eq!(hits[0].chunk.document_id, "hist");
}

#[tokio::test]
async fn reingesting_a_document_id_is_a_duplicate() {
    let index = Arc::new(InMemoryVectorIndex::new("study_docs"));
    let retriever = build(lookup(), Arc::clone(&index), RetrieverConfig::default());
    retriever.ingest("d1", "alpha beta").await.unwrap();

    let err = retriever.ingest("d1", "gamma delta").await.unwrap_err();
    assert!(matches!(err, RagError::DuplicateId(id) if id == "d1_0"));
    assert_eq!(index.len().await, 1);
}

async fn partial_failure_keeps_earlier_chunks(concurrency: usize) {
    let index = Arc::new(InMemoryVectorIndex::new("study_docs"));
    let config = RetrieverConfig::builder()
        .max_words(1)
        .embed_batch_size(1)
        .embed_concurrency(concurrency)
        .build()
        .unwrap();
    let embedder = Arc::new(PoisonedEmbedder {
        poison: "POISON",
        inner: HashingEmbeddingProvider::new(32),
        calls: AtomicUsize::new(0),
    });
    let retriever = build(embedder, Arc::clone(&index), config);

    let err = retriever.ingest("notes", "a b c POISON d e").await.unwrap_err();
    assert!(matches!(err, RagError::EmbeddingUnavailable { .. }));
    assert!(err.is_transient());

    let kept: Vec<String> =
        index.document_chunks("notes").await.into_iter().map(|c| c.text).collect();
    assert_eq!(kept, vec!["a", "b", "c"]);
    assert!(index.get("notes_4").await.is_none());
}

#[tokio::test]
async fn partial_failure_keeps_earlier_chunks_sequential() {
    partial_failure_keeps_earlier_chunks(1).await;
}

#[tokio::test]
async fn partial_failure_keeps_earlier_chunks_concurrent() {
    partial_failure_keeps_earlier_chunks(3).await;
}

#[tokio::test]
async fn batches_are_sized_by_config() {
    let index = Arc::new(InMemoryVectorIndex::new("study_docs"));
    let config = RetrieverConfig::builder().max_words(1).embed_batch_size(4).build().unwrap();
    let embedder = Arc::new(PoisonedEmbedder {
        poison: "never",
        inner: HashingEmbeddingProvider::new(16),
        calls: AtomicUsize::new(0),
    });
    let retriever = build(embedder.clone(), Arc::clone(&index), config);

    let text = "one two three four five six seven eight nine";
    let report = retriever.ingest("doc", text).await.unwrap();
    assert_eq!(report.chunks_inserted, 9);
    // default embed_batch delegates per text
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 9);
    let ordinals: Vec<usize> =
        index.document_chunks("doc").await.into_iter().map(|c| c.ordinal).collect();
    assert_eq!(ordinals, (0..9).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn stalled_embedder_times_out_as_unavailable() {
    let index = Arc::new(InMemoryVectorIndex::new("study_docs"));
    let config =
        RetrieverConfig::builder().embed_timeout(Duration::from_secs(5)).build().unwrap();
    let retriever = build(Arc::new(StalledEmbedder), Arc::clone(&index), config);

    let err = retriever.ingest("d1", "some text").await.unwrap_err();
    assert!(matches!(
        err,
        RagError::EmbeddingUnavailable { ref provider, .. } if provider == "stalled"
    ));

    let err = retriever.search("question", 1).await.unwrap_err();
    assert!(matches!(err, RagError::EmbeddingUnavailable { .. }));
    assert!(index.is_empty().await);
}

#[tokio::test]
async fn short_batch_is_unavailable_not_truncated() {
    let index = Arc::new(InMemoryVectorIndex::new("study_docs"));
    let config = RetrieverConfig::builder().max_words(1).build().unwrap();
    let retriever = build(Arc::new(ShortBatchEmbedder), Arc::clone(&index), config);

    let err = retriever.ingest("d1", "x y z").await.unwrap_err();
    assert!(matches!(err, RagError::EmbeddingUnavailable { .. }));
    assert!(index.is_empty().await);
}

#[tokio::test]
async fn answer_skips_generator_without_context() {
    let index = Arc::new(InMemoryVectorIndex::new("study_docs"));
    let retriever = build(lookup(), index, RetrieverConfig::default());
    let generator = RecordingGenerator::default();

    let result = answer(&retriever, &generator, "alpha beta", 3).await.unwrap();
    assert_eq!(result, Answer::NoRelevantContent { reason: NoContentReason::EmptyIndex });
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn answer_passes_ranked_context_to_generator() {
    let index = Arc::new(InMemoryVectorIndex::new("study_docs"));
    let config = RetrieverConfig::builder().max_words(2).build().unwrap();
    let retriever = build(lookup(), index, config);
    retriever.ingest("d1", "alpha beta gamma delta").await.unwrap();
    let generator = RecordingGenerator::default();

    let result = answer(&retriever, &generator, "which letters come later?", 2).await.unwrap();
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    match result {
        Answer::Generated { text, passages } => {
            assert_eq!(text, "which letters come later? -> gamma delta\n\nalpha beta");
            assert_eq!(passages.len(), 2);
        }
        other => panic!("expected generated answer, got {other:?}"),
    }
}
