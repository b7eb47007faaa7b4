//! `sheet-reconcile` reconciles a spreadsheet against a reference JSON document.
//!
//! Given the spreadsheet bytes and the reference document bytes, it:
//!
//! 1. infers which fields each record should carry from the reference document
//!    ([`processing::schema`]),
//! 2. maps the spreadsheet's header row onto those fields and validates it
//!    ([`processing::columns`]),
//! 3. converts every mapped cell into a canonical string ([`processing::normalize`]) and builds one
//!    record per non-blank row ([`processing::records`]),
//! 4. re-emits the reference document with its collection replaced by those records
//!    ([`processing::assemble`]).
//!
//! The primary entrypoints are [`execution::reconcile_bytes`] and the [`execution::Reconciler`]
//! engine, which also keeps the most recent output for later retrieval.
//!
//! ## Modes
//!
//! - [`execution::ReconcileMode::FixedShapeStrict`]: a known key (default `"stores"`) holds store
//!   records (`template`, `name`, `address`, `logo`, `email`); any expected column missing from the
//!   spreadsheet fails the call.
//! - [`execution::ReconcileMode::AutoDiscoveryLenient`] (default): the first top-level array of
//!   objects is the target; missing columns are reported as a warning and the call proceeds.
//!
//! Extra spreadsheet columns are carried into the records under both modes.
//!
//! ## Inputs
//!
//! **Spreadsheets** (format sniffed from the bytes, or forced via
//! [`execution::ReconcileOptions::spreadsheet_format`]):
//!
//! - workbooks: `.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods` (first sheet only)
//! - CSV
//!
//! The first row is always the header. Empty cells and absent cells normalize identically and
//! are omitted from records.
//!
//! ## Quick example
//!
//! ```rust
//! use sheet_reconcile::execution::{reconcile_bytes, ReconcileOptions};
//!
//! # fn main() -> Result<(), sheet_reconcile::ReconcileError> {
//! let reference = br#"{"version": 1, "customers": [{"name": "", "email": ""}]}"#;
//! let sheet = b"Name,Phone\nAcme,555\n,\n";
//!
//! let done = reconcile_bytes(sheet, reference, &ReconcileOptions::default())?;
//! assert_eq!(done.records, 1);
//! assert_eq!(done.blank_rows, 1);
//! assert_eq!(done.warning.unwrap().missing, vec!["email".to_string()]);
//! assert_eq!(
//!     String::from_utf8(done.bytes).unwrap(),
//!     r#"{"version":1,"customers":[{"name":"Acme","Phone":"555"}]}"#
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: loading spreadsheets and reference documents, plus observer hooks
//! - [`processing`]: the pure reconciliation core
//! - [`execution`]: entrypoints, options, and the result cache
//! - [`types`]: cell, record, and mapping types
//! - [`error`]: the error type shared across the crate

pub mod error;
pub mod execution;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use error::{ReconcileError, ReconcileResult};
pub use execution::{reconcile_bytes, reconcile_from_paths, ReconcileMode, ReconcileOptions, Reconciler};
