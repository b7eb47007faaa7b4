//! Turning raw input bytes into engine inputs.
//!
//! - [`unified`]: spreadsheet format detection and [`load_sheet`] dispatch
//! - [`excel`]: workbook bytes → first sheet
//! - [`csv`]: CSV bytes → one sheet
//! - [`json`]: reference document bytes → JSON tree
//! - [`observability`]: observer hooks for reconciliation outcomes

pub mod csv;
pub mod excel;
pub mod json;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, LogObserver, ReconcileContext, ReconcileObserver, ReconcileSeverity,
    ReconcileStats, StdErrObserver,
};
pub use unified::{load_sheet, SpreadsheetFormat};
