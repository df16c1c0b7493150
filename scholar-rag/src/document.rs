//! Data types for documents, chunks, and search results.

use serde::{Deserialize, Serialize};

/// Text that a text source produces when it cannot decode a file.
///
/// [`Retriever::ingest`](crate::Retriever::ingest) treats this value as
/// "content unavailable" and skips the document without error.
pub const UNSUPPORTED_CONTENT: &str = "Unsupported file type";

/// A source document: a caller-supplied id and its raw text.
///
/// Documents are not retained after ingestion; only their chunks persist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The text content of the document.
    pub text: String,
}

impl Document {
    /// Create a document from an id and its text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }

    /// Whether the text carries nothing to index.
    ///
    /// True for empty or whitespace-only text and for [`UNSUPPORTED_CONTENT`].
    pub fn is_unavailable(&self) -> bool {
        self.text.trim().is_empty() || self.text == UNSUPPORTED_CONTENT
    }
}

/// A contiguous slice of a [`Document`], the unit of retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Unique identifier within a collection, `{document_id}_{ordinal}`.
    pub id: String,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Position of this chunk within its document, starting at zero.
    pub ordinal: usize,
    /// The literal text of the chunk.
    pub text: String,
}

impl Chunk {
    /// Create a chunk, deriving its id from the document id and ordinal.
    pub fn new(document_id: &str, ordinal: usize, text: impl Into<String>) -> Self {
        Self {
            id: chunk_id(document_id, ordinal),
            document_id: document_id.to_string(),
            ordinal,
            text: text.into(),
        }
    }
}

/// Derive the id of the `ordinal`-th chunk of a document.
pub fn chunk_id(document_id: &str, ordinal: usize) -> String {
    format!("{document_id}_{ordinal}")
}

/// A retrieved [`Chunk`] paired with its cosine similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score in `[-1, 1]` (higher is more relevant).
    pub score: f32,
}

impl SearchResult {
    /// The id of the retrieved chunk.
    pub fn chunk_id(&self) -> &str {
        &self.chunk.id
    }

    /// The text of the retrieved chunk.
    pub fn text(&self) -> &str {
        &self.chunk.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_ids_combine_document_and_ordinal() {
        let chunk = Chunk::new("d1", 3, "gamma");
        assert_eq!(chunk.id, "d1_3");
        assert_eq!(chunk.document_id, "d1");
        assert_eq!(chunk.ordinal, 3);
    }

    #[test]
    fn sentinel_and_blank_text_are_unavailable() {
        assert!(Document::new("a", "").is_unavailable());
        assert!(Document::new("a", " \n\t").is_unavailable());
        assert!(Document::new("a", UNSUPPORTED_CONTENT).is_unavailable());
        assert!(!Document::new("a", "Unsupported file types are listed below").is_unavailable());
    }
}
