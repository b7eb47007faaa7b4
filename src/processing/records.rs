//! Data rows → [`Record`]s.

use crate::types::{CellValue, ColumnMapping, ExpectedFieldSet, Record};

use super::normalize::normalize_cell;

/// Records built from a sheet, plus how many present rows were dropped as blank.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuiltRecords {
    /// Records in row order.
    pub records: Vec<Record>,
    /// Present rows whose mapped cells were all empty.
    pub blank_rows: usize,
}

/// Build one record per non-blank data row.
///
/// Field names use the reference spelling when a header matches an expected field
/// (case-insensitively), otherwise the trimmed header text. Empty values are omitted; when
/// two columns resolve to the same field, a later non-empty value wins.
pub fn build_records(rows: &[Vec<CellValue>], mapping: &ColumnMapping, expected: &ExpectedFieldSet) -> BuiltRecords {
    let field_names: Vec<(usize, &str)> = mapping
        .columns()
        .map(|c| (c.index, expected.resolve(&c.name).unwrap_or(c.name.as_str())))
        .collect();

    let mut out = BuiltRecords::default();
    for row in rows {
        if row.is_empty() {
            continue;
        }
        match build_record(row, &field_names) {
            Some(record) => out.records.push(record),
            None => out.blank_rows += 1,
        }
    }
    out
}

fn build_record(row: &[CellValue], field_names: &[(usize, &str)]) -> Option<Record> {
    let mut record = Record::new();
    for &(index, field) in field_names {
        let value = row.get(index).map(normalize_cell).unwrap_or_default();
        if !value.is_empty() {
            record.insert(field, value);
        }
    }
    (!record.is_empty()).then_some(record)
}
