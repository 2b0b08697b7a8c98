use facture_core::{CellValue, RawTable, RowRecord};

use crate::normalize::normalize_cell;

/// Clean one detected table into field-name → typed-value records.
///
/// Policy notes, all deliberate:
/// - header names are not deduplicated; a repeated name overwrites the
///   earlier field when zipped;
/// - short rows are padded with empty cells to header width; long rows keep
///   their trailing cells unmapped (pad-only, nothing truncated or raised);
/// - merged-cell reconstruction runs strictly after normalization so a
///   propagated value keeps its coerced type. A blank cell first takes its
///   left neighbor in the same row (horizontally-merged cell); a cell still
///   blank after that — the leading columns of a row — forward-fills from
///   the previous data row (vertically-merged cell). The first data row has
///   no prior row and keeps its blanks.
pub fn clean_table(table: &RawTable) -> Vec<RowRecord> {
    // Spacer rows introduced by the detector carry no content at all.
    let mut rows: Vec<&Vec<String>> = table
        .iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    if rows.is_empty() {
        return Vec::new();
    }

    let header: Vec<String> = rows.remove(0).iter().map(|h| h.trim().to_string()).collect();

    let mut records = Vec::with_capacity(rows.len());
    let mut prev: Option<Vec<CellValue>> = None;

    for row in rows {
        let mut cells: Vec<CellValue> = row.iter().map(|c| normalize_cell(c)).collect();
        while cells.len() < header.len() {
            cells.push(CellValue::Empty);
        }
        propagate_left(&mut cells);
        forward_fill(&mut cells, prev.as_deref());

        records.push(header.iter().cloned().zip(cells.iter().cloned()).collect::<RowRecord>());
        prev = Some(cells);
    }

    records
}

/// Fill each blank cell (past the first column) from its left neighbor,
/// modeling a horizontally-merged source cell. Idempotent on dense rows.
fn propagate_left(cells: &mut [CellValue]) {
    for i in 1..cells.len() {
        if cells[i].is_empty() {
            cells[i] = cells[i - 1].clone();
        }
    }
}

/// Fill cells still blank after left-propagation from the same column of
/// the previous data row, modeling a vertically-merged source cell.
fn forward_fill(cells: &mut [CellValue], prev: Option<&[CellValue]>) {
    let Some(prev) = prev else { return };
    for (cell, above) in cells.iter_mut().zip(prev) {
        if cell.is_empty() {
            *cell = above.clone();
        }
    }
}
