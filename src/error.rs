use thiserror::Error;

/// Convenience result type for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Error type returned by reconciliation functions.
///
/// Every variant is fatal for the call that produced it: no partial output is cached or returned.
/// Faults inside individual cells (bad formulas, unreadable dates) never show up here; they are
/// degraded to best-effort text by [`crate::processing::normalize`].
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The spreadsheet bytes could not be opened as a workbook.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The spreadsheet bytes could not be read as CSV.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The reference document is not valid JSON, or does not fit the fixed record shape.
    #[error("reference document error: {0}")]
    Json(#[from] serde_json::Error),

    /// The workbook contains no sheets at all.
    #[error("workbook has no sheets")]
    NoSheets,

    /// The reference document's target collection is missing, not an array, or empty.
    #[error("reference collection '{key}' {reason}")]
    EmptyReferenceCollection { key: String, reason: String },

    /// No qualifying collection was found, or its first element has no fields.
    #[error("schema inference failed: {message}")]
    SchemaInference { message: String },

    /// The spreadsheet has no header row, or no non-empty header cell.
    #[error("{message}")]
    EmptyHeader { message: String },

    /// Strict mode only: expected fields are absent from the spreadsheet headers.
    #[error(
        "column name mismatch detected: missing columns in spreadsheet: {}. \
         Please ensure all required columns are present in the spreadsheet.",
        .missing.join(", ")
    )]
    MissingColumns { missing: Vec<String> },
}
