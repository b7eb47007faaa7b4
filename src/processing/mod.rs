//! The reconciliation core.
//!
//! Everything in here is pure and in-memory: it operates on a loaded [`crate::types::Sheet`] and
//! a parsed reference document, and never touches I/O.
//!
//! - [`normalize`]: one cell → canonical string
//! - [`schema`]: reference document → expected fields (fixed-shape or auto-discovery)
//! - [`columns`]: header row → column mapping, validated strictly or leniently
//! - [`records`]: data rows → records
//! - [`assemble`]: records → output document
//!
//! ## Example: build records from a sheet
//!
//! ```rust
//! use sheet_reconcile::processing::columns::{build_column_mapping, validate_columns, ColumnEnforcement};
//! use sheet_reconcile::processing::records::build_records;
//! use sheet_reconcile::processing::schema::infer_auto_discovery;
//! use sheet_reconcile::types::{CellValue, Sheet};
//!
//! let reference = serde_json::json!({"customers": [{"name": "x", "address": "y"}]});
//! let inferred = infer_auto_discovery(&reference).unwrap();
//!
//! let sheet = Sheet::new(vec![
//!     vec![CellValue::Text("Name".into()), CellValue::Text("Address".into())],
//!     vec![CellValue::Text("Acme".into()), CellValue::Text("123 Main St".into())],
//! ]);
//! let mapping = build_column_mapping(&sheet).unwrap();
//! assert!(validate_columns(&mapping, &inferred.fields, ColumnEnforcement::Strict).unwrap().is_none());
//!
//! let built = build_records(sheet.data_rows(), &mapping, &inferred.fields);
//! assert_eq!(built.records[0].get("address"), Some("123 Main St"));
//! ```

pub mod assemble;
pub mod columns;
pub mod normalize;
pub mod records;
pub mod schema;

pub use columns::ColumnEnforcement;
pub use normalize::normalize_cell;
pub use schema::InferredCollection;
