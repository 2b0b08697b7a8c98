pub mod batch;
pub mod export;

pub use batch::{BatchError, BatchProcessor, DocumentError};
pub use export::{export_csv, ExportError};
