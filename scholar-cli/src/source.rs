//! Plain-text document source.
//!
//! Reads files into [`Document`]s for ingestion. Only plain-text formats are
//! decoded; anything else, including files that are not valid UTF-8, becomes
//! a document carrying [`UNSUPPORTED_CONTENT`], which the retriever skips.

use std::path::Path;

use anyhow::Context as _;
use scholar_rag::{Document, UNSUPPORTED_CONTENT};
use tracing::warn;

/// File extensions read as UTF-8 text (compared case-insensitively).
pub const PLAIN_TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "rst", "csv", "log"];

/// The document id for a path: its file name.
pub fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_plain_text(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| {
        PLAIN_TEXT_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext))
    })
}

/// Read `path` into a [`Document`] keyed by [`document_id`].
///
/// # Errors
///
/// Fails only if the file cannot be read at all.
pub fn read_document(path: &Path) -> anyhow::Result<Document> {
    let id = document_id(path);
    if !is_plain_text(path) {
        warn!(path = %path.display(), "unsupported file type, skipping content");
        return Ok(Document::new(id, UNSUPPORTED_CONTENT));
    }

    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(Document::new(id, text)),
        Err(_) => {
            warn!(path = %path.display(), "file is not valid UTF-8, skipping content");
            Ok(Document::new(id, UNSUPPORTED_CONTENT))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_plain_text_files() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("Biology.MD");
        fs::write(&path, "# Cells\nCells divide.").unwrap();

        let document = read_document(&path).unwrap();
        assert_eq!(document.id, "Biology.MD");
        assert_eq!(document.text, "# Cells\nCells divide.");
    }

    #[test]
    fn other_formats_become_the_sentinel() {
        let temp = tempfile::tempdir().unwrap();
        let pdf = temp.path().join("slides.pdf");
        fs::write(&pdf, b"%PDF-1.7").unwrap();
        assert_eq!(read_document(&pdf).unwrap().text, UNSUPPORTED_CONTENT);

        let binary = temp.path().join("dump.txt");
        fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();
        assert!(read_document(&binary).unwrap().is_unavailable());
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        assert!(read_document(&temp.path().join("absent.txt")).is_err());
    }
}
