pub mod fallback;
pub mod normalize;
pub mod reader;
pub mod table;
pub mod vendor;
pub mod walker;

pub use fallback::extract_fragments;
pub use normalize::normalize_cell;
pub use reader::{Document, DocumentReader, JsonReader, Page, ReadError};
pub use table::clean_table;
pub use vendor::{VendorClassifier, VendorSignature, UNKNOWN_VENDOR};
pub use walker::{walk_document, WalkOutcome};

#[cfg(feature = "pdf")]
pub use reader::pdf_backend::PdfReader;
