//! CSV ingestion implementation.

use crate::error::ReconcileResult;
use crate::types::{CellValue, Sheet};

/// Load CSV bytes as a single sheet.
///
/// Every row is read (including the first, which becomes the header row). Non-empty fields are
/// text cells; empty fields are [`CellValue::Empty`]. Rows may have differing lengths.
///
/// Blank lines before the first record are kept as absent rows, so a file that starts with a
/// blank line has no header. Blank lines after that are skipped by the reader.
pub fn load_csv_sheet(bytes: &[u8]) -> ReconcileResult<Sheet> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if rows.is_empty() {
            let leading_blank = record.position().map_or(0, |p| p.line().saturating_sub(1));
            rows.extend((0..leading_blank).map(|_| Vec::new()));
        }
        rows.push(record.iter().map(text_cell).collect());
    }
    Ok(Sheet::new(rows))
}

fn text_cell(field: &str) -> CellValue {
    if field.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(field.to_string())
    }
}
