//! Spreadsheet format selection and loading.
//!
//! Most callers never name a format: [`SpreadsheetFormat::detect`] sniffs the bytes, so a
//! workbook uploaded without a filename still loads correctly.

use std::path::Path;

use crate::error::ReconcileResult;
use crate::types::Sheet;

use super::{csv, excel};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE2_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Supported spreadsheet inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Workbook formats read through calamine (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).
    Workbook,
    /// Comma-separated values, treated as one sheet of text cells.
    Csv,
}

impl SpreadsheetFormat {
    /// Parse a spreadsheet format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Workbook),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Infer a format from a path's extension, if it has a recognized one.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }

    /// Sniff the format from leading bytes: ZIP or OLE2 containers are workbooks, anything else
    /// is CSV.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE2_MAGIC) {
            Self::Workbook
        } else {
            Self::Csv
        }
    }
}

/// Load spreadsheet bytes in the given format.
pub fn load_sheet(bytes: &[u8], format: SpreadsheetFormat) -> ReconcileResult<Sheet> {
    match format {
        SpreadsheetFormat::Workbook => excel::load_workbook_sheet(bytes),
        SpreadsheetFormat::Csv => csv::load_csv_sheet(bytes),
    }
}
