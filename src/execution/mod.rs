//! Reconciliation entry points.
//!
//! [`reconcile_bytes`] runs one complete reconciliation: parse the reference document, infer the
//! expected fields, load the spreadsheet, map and validate its header row, build records, and
//! splice them into the document. It is synchronous and never suspends.
//!
//! [`Reconciler`] wraps that with a [`ResultCache`] holding the most recent output, which is
//! what an upload/download transport needs.
//!
//! ## Example
//!
//! ```rust
//! use sheet_reconcile::execution::{ReconcileMode, ReconcileOptions, Reconciler};
//!
//! # fn main() -> Result<(), sheet_reconcile::ReconcileError> {
//! let reconciler = Reconciler::new(ReconcileOptions {
//!     mode: ReconcileMode::fixed_shape(),
//!     ..Default::default()
//! });
//!
//! // Nothing processed yet: an empty collection under the fixed-shape key.
//! assert_eq!(reconciler.latest().bytes, br#"{"stores":[]}"#.to_vec());
//!
//! let reference = br#"{"stores": [{"name": "old", "address": "old"}]}"#;
//! let sheet = b"name,address\nAcme,123 Main St\n";
//! let done = reconciler.reconcile(sheet, reference)?;
//! assert_eq!(done.records, 1);
//!
//! let latest = reconciler.latest();
//! assert_eq!(latest.filename(), "updated_stores.json");
//! assert_eq!(
//!     String::from_utf8(latest.bytes).unwrap(),
//!     r#"{"stores":[{"name":"Acme","address":"123 Main St"}]}"#
//! );
//! # Ok(())
//! # }
//! ```

pub mod cache;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use serde_json::Value as JsonValue;

use crate::error::ReconcileResult;
use crate::ingestion::json::parse_reference;
use crate::ingestion::observability::{
    ReconcileContext, ReconcileObserver, ReconcileSeverity, ReconcileStats,
};
use crate::ingestion::unified::{load_sheet, SpreadsheetFormat};
use crate::processing::assemble::{assemble_collection, assemble_fixed_shape, serialize_document};
use crate::processing::columns::{build_column_mapping, validate_columns, ColumnEnforcement};
use crate::processing::records::build_records;
use crate::processing::schema::{infer_auto_discovery, infer_fixed_shape};
use crate::types::MissingColumnsWarning;

pub use cache::{CachedOutput, ResultCache};

/// Default collection key of the fixed store shape.
pub const DEFAULT_FIXED_COLLECTION_KEY: &str = "stores";
/// Default key of the empty retrieval document under auto-discovery.
pub const DEFAULT_COLLECTION_KEY: &str = "data";

/// Which schema policy and column enforcement level to run with.
///
/// Policy and enforcement level always come as a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileMode {
    /// A known key holds store records; every expected column must be present.
    FixedShapeStrict {
        /// Top-level key of the store collection.
        collection_key: String,
    },
    /// The first top-level array of objects is the target; missing columns only warn.
    AutoDiscoveryLenient,
}

impl ReconcileMode {
    /// Fixed-shape mode under the default `"stores"` key.
    pub fn fixed_shape() -> Self {
        Self::FixedShapeStrict {
            collection_key: DEFAULT_FIXED_COLLECTION_KEY.to_string(),
        }
    }

    /// Column enforcement paired with this mode.
    pub fn enforcement(&self) -> ColumnEnforcement {
        match self {
            Self::FixedShapeStrict { .. } => ColumnEnforcement::Strict,
            Self::AutoDiscoveryLenient => ColumnEnforcement::Lenient,
        }
    }

    /// Short name used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FixedShapeStrict { .. } => "fixed-shape",
            Self::AutoDiscoveryLenient => "auto-discovery",
        }
    }
}

impl Default for ReconcileMode {
    fn default() -> Self {
        Self::AutoDiscoveryLenient
    }
}

/// Options controlling reconciliation.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ReconcileOptions {
    /// Schema policy + enforcement pairing.
    pub mode: ReconcileMode,
    /// If `None`, sniff the spreadsheet bytes.
    pub spreadsheet_format: Option<SpreadsheetFormat>,
    /// Pretty-print the output document.
    pub pretty: bool,
    /// Key of the empty retrieval document under auto-discovery.
    pub default_collection_key: String,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ReconcileObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ReconcileSeverity,
}

impl ReconcileOptions {
    /// Collection key used for the empty retrieval document.
    pub fn empty_collection_key(&self) -> &str {
        match &self.mode {
            ReconcileMode::FixedShapeStrict { collection_key } => collection_key.as_str(),
            ReconcileMode::AutoDiscoveryLenient => self.default_collection_key.as_str(),
        }
    }
}

impl fmt::Debug for ReconcileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconcileOptions")
            .field("mode", &self.mode)
            .field("spreadsheet_format", &self.spreadsheet_format)
            .field("pretty", &self.pretty)
            .field("default_collection_key", &self.default_collection_key)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            mode: ReconcileMode::default(),
            spreadsheet_format: None,
            pretty: false,
            default_collection_key: DEFAULT_COLLECTION_KEY.to_string(),
            observer: None,
            alert_at_or_above: ReconcileSeverity::Critical,
        }
    }
}

/// Output of one successful reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// The reference document with its collection replaced.
    pub document: JsonValue,
    /// `document`, serialized.
    pub bytes: Vec<u8>,
    /// Top-level key of the replaced collection.
    pub collection_key: String,
    /// Number of records written.
    pub records: usize,
    /// Data rows dropped because every mapped cell was empty.
    pub blank_rows: usize,
    /// Lenient mode only: expected columns the spreadsheet lacked.
    pub warning: Option<MissingColumnsWarning>,
}

impl Reconciliation {
    /// The serialized document as a cacheable output.
    pub fn to_output(&self) -> CachedOutput {
        CachedOutput {
            bytes: self.bytes.clone(),
            collection_key: self.collection_key.clone(),
        }
    }
}

/// Reconcile spreadsheet bytes against reference document bytes.
///
/// When an observer is configured, this function reports:
///
/// - `on_warning` then `on_success` on success (the warning only when columns were missing)
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
pub fn reconcile_bytes(
    spreadsheet: &[u8],
    reference: &[u8],
    options: &ReconcileOptions,
) -> ReconcileResult<Reconciliation> {
    let format = options
        .spreadsheet_format
        .unwrap_or_else(|| SpreadsheetFormat::detect(spreadsheet));
    let ctx = ReconcileContext {
        mode: options.mode.label(),
        format,
        spreadsheet_path: None,
        reference_path: None,
    };
    run_and_report(spreadsheet, reference, format, options, &ctx)
}

/// Reconcile files on disk.
///
/// If `options.spreadsheet_format` is `None`, the format comes from the spreadsheet's extension,
/// falling back to sniffing its bytes.
pub fn reconcile_from_paths(
    spreadsheet_path: impl AsRef<Path>,
    reference_path: impl AsRef<Path>,
    options: &ReconcileOptions,
) -> ReconcileResult<Reconciliation> {
    let spreadsheet_path = spreadsheet_path.as_ref();
    let reference_path = reference_path.as_ref();

    let read = fs::read(spreadsheet_path).and_then(|s| fs::read(reference_path).map(|r| (s, r)));
    let format = options
        .spreadsheet_format
        .or_else(|| SpreadsheetFormat::from_path(spreadsheet_path));

    let (spreadsheet, reference) = match read {
        Ok(pair) => pair,
        Err(e) => {
            let ctx = ReconcileContext {
                mode: options.mode.label(),
                format: format.unwrap_or(SpreadsheetFormat::Workbook),
                spreadsheet_path: Some(spreadsheet_path.to_path_buf()),
                reference_path: Some(reference_path.to_path_buf()),
            };
            let result: ReconcileResult<Reconciliation> = Err(e.into());
            report(options, &ctx, &result);
            return result;
        }
    };

    let format = format.unwrap_or_else(|| SpreadsheetFormat::detect(&spreadsheet));
    let ctx = ReconcileContext {
        mode: options.mode.label(),
        format,
        spreadsheet_path: Some(spreadsheet_path.to_path_buf()),
        reference_path: Some(reference_path.to_path_buf()),
    };
    run_and_report(&spreadsheet, &reference, format, options, &ctx)
}

fn run_and_report(
    spreadsheet: &[u8],
    reference: &[u8],
    format: SpreadsheetFormat,
    options: &ReconcileOptions,
    ctx: &ReconcileContext,
) -> ReconcileResult<Reconciliation> {
    let result = run(spreadsheet, reference, format, options).map(|(done, columns)| {
        if let Some(obs) = options.observer.as_ref() {
            if let Some(w) = &done.warning {
                obs.on_warning(ctx, w);
            }
            obs.on_success(
                ctx,
                ReconcileStats {
                    records: done.records,
                    blank_rows: done.blank_rows,
                    columns,
                },
            );
        }
        done
    });
    if result.is_err() {
        report(options, ctx, &result);
    }
    result
}

fn report(options: &ReconcileOptions, ctx: &ReconcileContext, result: &ReconcileResult<Reconciliation>) {
    let (Some(obs), Err(e)) = (options.observer.as_ref(), result) else {
        return;
    };
    let sev = ReconcileSeverity::for_error(e);
    obs.on_failure(ctx, sev, e);
    if sev >= options.alert_at_or_above {
        obs.on_alert(ctx, sev, e);
    }
}

fn run(
    spreadsheet: &[u8],
    reference: &[u8],
    format: SpreadsheetFormat,
    options: &ReconcileOptions,
) -> ReconcileResult<(Reconciliation, usize)> {
    let document = parse_reference(reference)?;
    let inferred = match &options.mode {
        ReconcileMode::FixedShapeStrict { collection_key } => infer_fixed_shape(&document, collection_key)?,
        ReconcileMode::AutoDiscoveryLenient => infer_auto_discovery(&document)?,
    };
    debug!(
        "collection '{}' expects {} field(s): {:?}",
        inferred.key,
        inferred.fields.len(),
        inferred.fields.names().collect::<Vec<_>>()
    );

    let sheet = load_sheet(spreadsheet, format)?;
    let mapping = build_column_mapping(&sheet)?;
    let warning = validate_columns(&mapping, &inferred.fields, options.mode.enforcement())?;
    debug!("mapped {} column(s) from {} row(s)", mapping.len(), sheet.row_count());

    let built = build_records(sheet.data_rows(), &mapping, &inferred.fields);
    let records = built.records.len();
    let document = match &options.mode {
        ReconcileMode::FixedShapeStrict { .. } => assemble_fixed_shape(document, &inferred.key, built.records)?,
        ReconcileMode::AutoDiscoveryLenient => assemble_collection(document, &inferred.key, built.records)?,
    };
    let bytes = serialize_document(&document, options.pretty)?;

    let done = Reconciliation {
        document,
        bytes,
        collection_key: inferred.key,
        records,
        blank_rows: built.blank_rows,
        warning,
    };
    Ok((done, mapping.len()))
}

/// Reconciliation engine holding options and the most recent output.
///
/// Safe to share across threads; see [`ResultCache`] for the visibility guarantees of
/// [`Self::latest`].
#[derive(Debug)]
pub struct Reconciler {
    options: ReconcileOptions,
    cache: ResultCache,
}

impl Reconciler {
    /// Create an engine with an empty cache.
    pub fn new(options: ReconcileOptions) -> Self {
        let cache = ResultCache::new(options.empty_collection_key());
        Self { options, cache }
    }

    /// Options this engine runs with.
    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// The underlying result cache.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Reconcile and, on success only, cache the output.
    pub fn reconcile(&self, spreadsheet: &[u8], reference: &[u8]) -> ReconcileResult<Reconciliation> {
        let done = reconcile_bytes(spreadsheet, reference, &self.options)?;
        self.cache.store(done.to_output());
        Ok(done)
    }

    /// Reconcile files on disk and, on success only, cache the output.
    pub fn reconcile_from_paths(
        &self,
        spreadsheet_path: impl AsRef<Path>,
        reference_path: impl AsRef<Path>,
    ) -> ReconcileResult<Reconciliation> {
        let done = reconcile_from_paths(spreadsheet_path, reference_path, &self.options)?;
        self.cache.store(done.to_output());
        Ok(done)
    }

    /// Most recent output, or the empty-collection default.
    pub fn latest(&self) -> CachedOutput {
        self.cache.retrieve()
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileOptions::default())
    }
}

/// Convenience helper for callers that want an owned request object.
///
/// This can be useful if you want to enqueue reconciliation work in a job system.
#[derive(Clone)]
pub struct ReconcileRequest {
    /// Path to the spreadsheet.
    pub spreadsheet_path: PathBuf,
    /// Path to the reference document.
    pub reference_path: PathBuf,
    /// Options controlling reconciliation.
    pub options: ReconcileOptions,
}

impl fmt::Debug for ReconcileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconcileRequest")
            .field("spreadsheet_path", &self.spreadsheet_path)
            .field("reference_path", &self.reference_path)
            .field("options", &self.options)
            .finish()
    }
}

impl ReconcileRequest {
    /// Execute the request by calling [`reconcile_from_paths`].
    pub fn run(&self) -> ReconcileResult<Reconciliation> {
        reconcile_from_paths(&self.spreadsheet_path, &self.reference_path, &self.options)
    }
}
