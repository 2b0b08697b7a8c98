use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use facture_core::RawTable;

/// One page as exposed by the parsing collaborator: zero-or-more detected
/// table grids plus the page's plain text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tables: Vec<RawTable>,
}

/// An opened document: its pages, in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed page dump: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("PDF parse error: {0}")]
    Pdf(String),
}

/// Abstraction over the document-parsing collaborator. Implementations open
/// one file and expose its pages; the handle does not outlive the call.
pub trait DocumentReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<Document, ReadError>;

    /// File extension (lowercase, without dot) this backend expects.
    fn extension(&self) -> &str;
}

// ── JSON page-dump backend (always available) ─────────────────────────────────

/// Reads the table detector's JSON page dump — the canonical interchange
/// format between the detection collaborator and this pipeline, and the
/// format the test fixtures use.
#[derive(Debug, Default)]
pub struct JsonReader;

impl DocumentReader for JsonReader {
    fn read(&self, path: &Path) -> Result<Document, ReadError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn extension(&self) -> &str {
        "json"
    }
}

// ── PDF backend (optional, gated behind the `pdf` feature) ────────────────────

#[cfg(feature = "pdf")]
pub mod pdf_backend {
    use super::{Document, DocumentReader, Page, ReadError};
    use std::path::Path;

    /// Text-only PDF backend. No geometric table detection is performed, so
    /// every page carries an empty table list and flows through the
    /// unstructured-text fallback.
    #[derive(Debug, Default)]
    pub struct PdfReader;

    impl DocumentReader for PdfReader {
        fn read(&self, path: &Path) -> Result<Document, ReadError> {
            let bytes = std::fs::read(path)?;
            let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
                .map_err(|e| ReadError::Pdf(e.to_string()))?;
            Ok(Document {
                pages: pages
                    .into_iter()
                    .map(|text| Page { text, tables: Vec::new() })
                    .collect(),
            })
        }

        fn extension(&self) -> &str {
            "pdf"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn json_reader_parses_page_dump() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"pages":[{{"text":"Invoice ID: 7","tables":[[["Item","Qty"],["Widget A","2"]]]}}]}}"#
        )
        .unwrap();

        let doc = JsonReader.read(file.path()).unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].tables[0][1][0], "Widget A");
        assert_eq!(doc.pages[0].text, "Invoice ID: 7");
    }

    #[test]
    fn json_reader_defaults_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"pages":[{{}}]}}"#).unwrap();

        let doc = JsonReader.read(file.path()).unwrap();
        assert!(doc.pages[0].text.is_empty());
        assert!(doc.pages[0].tables.is_empty());
    }

    #[test]
    fn corrupt_dump_is_a_malformed_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "%PDF-1.4 this is not json").unwrap();

        let err = JsonReader.read(file.path()).unwrap_err();
        assert!(matches!(err, ReadError::Malformed(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = JsonReader.read(Path::new("/nonexistent/doc.json")).unwrap_err();
        assert!(matches!(err, ReadError::Io(_)));
    }
}
