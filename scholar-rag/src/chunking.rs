//! Document chunking.
//!
//! This module provides the [`Chunker`] trait, the [`chunk_words`] windowing
//! function, and [`WordWindowChunker`], which applies that function to a
//! [`Document`] and assigns chunk ids.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// Number of words per chunk used when no other size is configured.
pub const DEFAULT_MAX_WORDS: usize = 1000;

/// A strategy for splitting documents into chunks.
///
/// Downstream components only see [`Chunk`]s, so a sentence- or
/// paragraph-aware splitter can replace [`WordWindowChunker`] without changes
/// elsewhere. Implementations must be deterministic.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks ordered by ordinal.
    ///
    /// Returns an empty `Vec` if the document has no text to index.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Split `text` on whitespace and regroup the tokens into windows of at most
/// `max_words` tokens, each rejoined with single spaces.
///
/// The last window may be shorter. Empty or whitespace-only text yields an
/// empty `Vec`.
///
/// # Errors
///
/// Returns [`RagError::InvalidArgument`] if `max_words` is zero.
///
/// # Example
///
/// ```rust
/// use scholar_rag::chunk_words;
///
/// let chunks = chunk_words("alpha beta gamma delta", 2).unwrap();
/// assert_eq!(chunks, vec!["alpha beta", "gamma delta"]);
/// ```
pub fn chunk_words(text: &str, max_words: usize) -> Result<Vec<String>> {
    if max_words == 0 {
        return Err(RagError::InvalidArgument("max_words must be at least 1".to_string()));
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    Ok(words.chunks(max_words).map(|window| window.join(" ")).collect())
}

/// Splits text into fixed-size windows of whitespace-separated words.
///
/// Chunk IDs are generated as `{document_id}_{ordinal}`.
///
/// # Example
///
/// ```rust
/// use scholar_rag::{Chunker, Document, WordWindowChunker};
///
/// let chunker = WordWindowChunker::new(2).unwrap();
/// let chunks = chunker.chunk(&Document::new("d1", "alpha beta gamma"));
/// assert_eq!(chunks[1].id, "d1_1");
/// assert_eq!(chunks[1].text, "gamma");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordWindowChunker {
    max_words: usize,
}

impl WordWindowChunker {
    /// Create a new `WordWindowChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] if `max_words` is zero.
    pub fn new(max_words: usize) -> Result<Self> {
        if max_words == 0 {
            return Err(RagError::InvalidArgument("max_words must be at least 1".to_string()));
        }
        Ok(Self { max_words })
    }

    /// The maximum number of words per chunk.
    pub fn max_words(&self) -> usize {
        self.max_words
    }
}

impl Default for WordWindowChunker {
    fn default() -> Self {
        Self { max_words: DEFAULT_MAX_WORDS }
    }
}

impl Chunker for WordWindowChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let words: Vec<&str> = document.text.split_whitespace().collect();
        words
            .chunks(self.max_words)
            .enumerate()
            .map(|(ordinal, window)| Chunk::new(&document.id, ordinal, window.join(" ")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_window_is_rejected() {
        assert!(matches!(chunk_words("a b", 0), Err(RagError::InvalidArgument(_))));
        assert!(matches!(WordWindowChunker::new(0), Err(RagError::InvalidArgument(_))));
    }

    #[test]
    fn blank_text_yields_no_chunks() {
        assert!(chunk_words("", 3).unwrap().is_empty());
        assert!(chunk_words("  \n\t ", 3).unwrap().is_empty());
    }

    #[test]
    fn collapses_runs_of_whitespace() {
        let chunks = chunk_words("one\n\ntwo   three\tfour five", 2).unwrap();
        assert_eq!(chunks, vec!["one two", "three four", "five"]);
    }

    #[test]
    fn window_larger_than_text_yields_single_chunk() {
        assert_eq!(chunk_words("a b c", 1000).unwrap(), vec!["a b c"]);
    }

    #[test]
    fn chunker_assigns_sequential_ids() {
        let chunker = WordWindowChunker::new(2).unwrap();
        let chunks = chunker.chunk(&Document::new("d1", "alpha beta gamma delta"));
        let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["d1_0", "d1_1"]);
        assert_eq!(chunks[0].text, "alpha beta");
        assert_eq!(chunks[1].text, "gamma delta");
        assert_eq!(chunks[1].ordinal, 1);
    }

    #[test]
    fn default_window_matches_constant() {
        assert_eq!(WordWindowChunker::default().max_words(), DEFAULT_MAX_WORDS);
    }
}
