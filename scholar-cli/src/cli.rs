//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use scholar_rag::RetrieverConfig;

use crate::telemetry::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "scholar")]
#[command(about = "Ask questions about your study notes")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest documents and print the passages retrieved for one question
    Ask {
        #[command(flatten)]
        retrieval: RetrievalArgs,

        /// Question to ask
        #[arg(short, long)]
        question: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ingest documents, then ask questions interactively
    Chat {
        #[command(flatten)]
        retrieval: RetrievalArgs,
    },
}

/// Which embedding backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum EmbedderKind {
    /// Offline feature-hashing embedder
    #[default]
    Hashing,
    /// OpenAI embeddings API (requires the `openai` feature and OPENAI_API_KEY)
    Openai,
}

#[derive(Debug, Clone, Args)]
pub struct RetrievalArgs {
    /// Documents to ingest (plain-text formats; others are skipped)
    #[arg(short, long = "doc", required = true, num_args = 1..)]
    pub docs: Vec<PathBuf>,

    /// Embedding backend
    #[arg(long, value_enum, default_value_t = EmbedderKind::Hashing, env = "SCHOLAR_EMBEDDER")]
    pub embedder: EmbedderKind,

    /// Embedding model (OpenAI only)
    #[arg(long, env = "SCHOLAR_EMBEDDING_MODEL")]
    pub model: Option<String>,

    /// Embedding dimensions (hash buckets, or OpenAI output truncation)
    #[arg(long, env = "SCHOLAR_DIMENSIONS")]
    pub dimensions: Option<usize>,

    /// Maximum words per chunk
    #[arg(long, default_value_t = scholar_rag::DEFAULT_MAX_WORDS, env = "SCHOLAR_MAX_WORDS")]
    pub max_words: usize,

    /// Number of passages to retrieve
    #[arg(short = 'k', long, default_value_t = 3, env = "SCHOLAR_TOP_K")]
    pub top_k: usize,

    /// Drop passages scoring below this cosine similarity
    #[arg(long, env = "SCHOLAR_MIN_SCORE")]
    pub min_score: Option<f32>,

    /// Chunk texts per embedding request
    #[arg(long, default_value_t = 16, env = "SCHOLAR_EMBED_BATCH_SIZE")]
    pub embed_batch_size: usize,

    /// Embedding requests in flight during ingest
    #[arg(long, default_value_t = 4, env = "SCHOLAR_EMBED_CONCURRENCY")]
    pub embed_concurrency: usize,

    /// Seconds before an embedding request is abandoned
    #[arg(long, default_value_t = 30, env = "SCHOLAR_EMBED_TIMEOUT_SECS")]
    pub embed_timeout_secs: u64,
}

impl RetrievalArgs {
    /// Build and validate the retriever configuration.
    pub fn config(&self) -> scholar_rag::Result<RetrieverConfig> {
        let mut builder = RetrieverConfig::builder()
            .max_words(self.max_words)
            .top_k(self.top_k)
            .embed_batch_size(self.embed_batch_size)
            .embed_concurrency(self.embed_concurrency)
            .embed_timeout(Duration::from_secs(self.embed_timeout_secs));
        if let Some(min_score) = self.min_score {
            builder = builder.min_score(min_score);
        }
        builder.build()
    }
}
