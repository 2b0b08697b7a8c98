use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use facture_core::{RowRecord, RunStats};
use facture_extract::reader::{DocumentReader, ReadError};
use facture_extract::vendor::VendorClassifier;
use facture_extract::walker::walk_document;
use facture_storage::{insert_batch, DbPool, StorageError};

use crate::export::{export_csv, ExportError};

/// Fatal setup failures. Everything that can go wrong for a single document
/// is handled inside the run loop instead (logged and counted, never raised).
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("input directory {0} is not readable: {1}")]
    InputDir(PathBuf, #[source] std::io::Error),
    #[error("cannot create output directory {0}: {1}")]
    OutputDir(PathBuf, #[source] std::io::Error),
}

/// Per-document failure, attributed at the run loop boundary.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Drives a run: enumerate input documents, walk each one, export a CSV
/// artifact per document, persist its rows in one batch, and keep the run
/// counters. Documents are processed strictly sequentially; one document's
/// walk, export, and persistence complete before the next begins.
pub struct BatchProcessor<R: DocumentReader> {
    reader: R,
    classifier: VendorClassifier,
    pool: DbPool,
    stats: RunStats,
}

impl<R: DocumentReader> BatchProcessor<R> {
    pub fn new(reader: R, classifier: VendorClassifier, pool: DbPool) -> Self {
        Self { reader, classifier, pool, stats: RunStats::default() }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Process every matching document in `input_dir` (non-recursive).
    /// Always completes with a logged summary; only setup failures return
    /// an error.
    pub async fn run(&mut self, input_dir: &Path, output_dir: &Path) -> Result<RunStats, BatchError> {
        self.stats.reset();

        fs::create_dir_all(output_dir).map_err(|e| {
            tracing::error!(dir = %output_dir.display(), %e, "cannot create output directory");
            BatchError::OutputDir(output_dir.to_path_buf(), e)
        })?;

        let entries = fs::read_dir(input_dir).map_err(|e| {
            tracing::error!(dir = %input_dir.display(), %e, "input directory is not readable");
            BatchError::InputDir(input_dir.to_path_buf(), e)
        })?;

        let mut documents: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(self.reader.extension()))
            })
            .collect();
        documents.sort();

        for path in documents {
            match self.process_document(&path, output_dir).await {
                Ok(records) => {
                    self.stats.documents_processed += 1;
                    tracing::info!(document = %path.display(), records, "processed document");
                }
                Err(err) => {
                    self.stats.errors += 1;
                    tracing::warn!(document = %path.display(), %err, "document failed, continuing");
                }
            }
        }

        tracing::info!("run summary: {}", self.stats);
        Ok(self.stats)
    }

    async fn process_document(
        &mut self,
        path: &Path,
        output_dir: &Path,
    ) -> Result<usize, DocumentError> {
        let document = self.reader.read(path)?;
        let outcome = walk_document(&document, &self.classifier);
        self.stats.tables_extracted += outcome.tables_extracted;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        export_csv(&outcome.records, &output_dir.join(format!("{stem}.csv")))?;

        let rows: Vec<RowRecord> = outcome
            .records
            .iter()
            .filter_map(|record| record.as_row().cloned())
            .collect();
        insert_batch(&self.pool, &rows).await?;

        Ok(outcome.records.len())
    }
}
