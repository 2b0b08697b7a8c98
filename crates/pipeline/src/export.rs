use std::path::Path;

use thiserror::Error;

use facture_core::{Fragment, PageRecord};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write one flat CSV artifact for a document's records: one row per record,
/// one column per distinct field name in first-encountered order across all
/// records. Fragments surface as `{type, value}` mappings, their values
/// joined with `"; "`. Serialization failures propagate — rows are never
/// silently dropped.
pub fn export_csv(records: &[PageRecord], path: &Path) -> Result<(), ExportError> {
    let mappings: Vec<Vec<(String, String)>> = records.iter().map(flatten).collect();

    // Union of field names, first-encountered order.
    let mut columns: Vec<&str> = Vec::new();
    for mapping in &mappings {
        for (name, _) in mapping {
            if !columns.contains(&name.as_str()) {
                columns.push(name);
            }
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    if columns.is_empty() {
        // Nothing to lay out; the artifact still exists, just empty.
        writer.flush()?;
        return Ok(());
    }
    writer.write_record(&columns)?;

    for mapping in &mappings {
        let row: Vec<&str> = columns
            .iter()
            .map(|col| {
                mapping
                    .iter()
                    .find(|(name, _)| name == col)
                    .map(|(_, value)| value.as_str())
                    .unwrap_or("")
            })
            .collect();
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn flatten(record: &PageRecord) -> Vec<(String, String)> {
    match record {
        PageRecord::Row(row) => row
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        PageRecord::Fragment(Fragment { kind, values }) => vec![
            ("type".to_string(), kind.to_string()),
            ("value".to_string(), values.join("; ")),
        ],
    }
}
