//! Workbook ingestion implementation (calamine).

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{ReconcileError, ReconcileResult};
use crate::types::{CellValue, FormulaResult, Sheet};

/// Load the first sheet of a workbook (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) from bytes.
///
/// Behavior:
/// - Only the first sheet is read; other sheets are ignored
/// - Cells are placed at their absolute positions, so a missing first row stays missing
/// - Cells that hold a formula are tagged [`CellValue::Formula`] with their cached result
/// - Date/time formatted numbers become [`CellValue::Temporal`]
///
/// The workbook is dropped before returning, on success and failure alike.
pub fn load_workbook_sheet(bytes: &[u8]) -> ReconcileResult<Sheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ReconcileError::NoSheets)?;
    let values = workbook.worksheet_range(&first)?;
    // Formula text is only used to tag cells; an unreadable formula table means "no formulas".
    let formulas = workbook.worksheet_formula(&first).ok();

    Ok(sheet_from_ranges(&values, formulas.as_ref()))
}

fn sheet_from_ranges(values: &Range<Data>, formulas: Option<&Range<String>>) -> Sheet {
    let Some((start_row, start_col)) = values.start() else {
        return Sheet::default();
    };

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for (row_offset, row) in values.rows().enumerate() {
        let abs_row = start_row + row_offset as u32;
        let mut cells: Vec<CellValue> = vec![CellValue::Empty; start_col as usize];
        for (col_offset, data) in row.iter().enumerate() {
            let abs_col = start_col + col_offset as u32;
            let is_formula = formulas
                .and_then(|f| f.get_value((abs_row, abs_col)))
                .is_some_and(|f| !f.is_empty());
            cells.push(convert_cell(data, is_formula));
        }
        rows.push(cells);
    }
    Sheet::new(rows)
}

fn convert_cell(data: &Data, is_formula: bool) -> CellValue {
    if is_formula {
        return CellValue::Formula(formula_result(data));
    }

    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::DateTime(dt) if dt.is_duration() => CellValue::Number(dt.as_f64()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::Temporal)
            .unwrap_or_else(|| CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::Temporal)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Unsupported,
    }
}

fn formula_result(data: &Data) -> FormulaResult {
    match data {
        Data::Empty => FormulaResult::Empty,
        Data::Int(i) => FormulaResult::Number(*i as f64),
        Data::Float(f) => FormulaResult::Number(*f),
        Data::DateTime(dt) => FormulaResult::Number(dt.as_f64()),
        Data::Bool(b) => FormulaResult::Boolean(*b),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => FormulaResult::Text(s.clone()),
        Data::Error(e) => FormulaResult::Error(e.to_string()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    s.parse::<NaiveDateTime>().ok().or_else(|| {
        s.parse::<NaiveDate>()
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}
