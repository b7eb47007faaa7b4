use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ReconcileError;
use crate::types::MissingColumnsWarning;

use super::unified::SpreadsheetFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReconcileSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (reconciliation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

impl ReconcileSeverity {
    /// Severity of a failed reconciliation.
    pub fn for_error(e: &ReconcileError) -> Self {
        match e {
            ReconcileError::Io(_) => Self::Critical,
            ReconcileError::Excel(calamine::Error::Io(_)) => Self::Critical,
            ReconcileError::Csv(err) if matches!(err.kind(), ::csv::ErrorKind::Io(_)) => Self::Critical,
            _ => Self::Error,
        }
    }
}

/// Context about a reconciliation attempt.
#[derive(Debug, Clone)]
pub struct ReconcileContext {
    /// `"fixed-shape"` or `"auto-discovery"`.
    pub mode: &'static str,
    /// Format the spreadsheet was read as.
    pub format: SpreadsheetFormat,
    /// Spreadsheet path, when the input came from disk.
    pub spreadsheet_path: Option<PathBuf>,
    /// Reference document path, when the input came from disk.
    pub reference_path: Option<PathBuf>,
}

impl ReconcileContext {
    fn source(&self) -> String {
        match &self.spreadsheet_path {
            Some(p) => p.display().to_string(),
            None => "<bytes>".to_string(),
        }
    }
}

/// Stats reported on successful reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Number of records written into the output collection.
    pub records: usize,
    /// Data rows dropped because every mapped cell was empty.
    pub blank_rows: usize,
    /// Number of mapped header columns.
    pub columns: usize,
}

/// Observer interface for reconciliation outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ReconcileObserver: Send + Sync {
    /// Called when reconciliation succeeds.
    fn on_success(&self, _ctx: &ReconcileContext, _stats: ReconcileStats) {}

    /// Called (before `on_success`) when lenient mode proceeds without some expected columns.
    fn on_warning(&self, _ctx: &ReconcileContext, _warning: &MissingColumnsWarning) {}

    /// Called when reconciliation fails.
    fn on_failure(&self, _ctx: &ReconcileContext, _severity: ReconcileSeverity, _error: &ReconcileError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ReconcileContext, severity: ReconcileSeverity, error: &ReconcileError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ReconcileObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ReconcileObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ReconcileObserver for CompositeObserver {
    fn on_success(&self, ctx: &ReconcileContext, stats: ReconcileStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_warning(&self, ctx: &ReconcileContext, warning: &MissingColumnsWarning) {
        for o in &self.observers {
            o.on_warning(ctx, warning);
        }
    }

    fn on_failure(&self, ctx: &ReconcileContext, severity: ReconcileSeverity, error: &ReconcileError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ReconcileContext, severity: ReconcileSeverity, error: &ReconcileError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs reconciliation events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ReconcileObserver for StdErrObserver {
    fn on_success(&self, ctx: &ReconcileContext, stats: ReconcileStats) {
        eprintln!(
            "[reconcile][ok] mode={} format={:?} source={} records={} blank_rows={} columns={}",
            ctx.mode,
            ctx.format,
            ctx.source(),
            stats.records,
            stats.blank_rows,
            stats.columns
        );
    }

    fn on_warning(&self, ctx: &ReconcileContext, warning: &MissingColumnsWarning) {
        eprintln!(
            "[reconcile][Warning] mode={} source={} {}",
            ctx.mode,
            ctx.source(),
            warning
        );
    }

    fn on_failure(&self, ctx: &ReconcileContext, severity: ReconcileSeverity, error: &ReconcileError) {
        eprintln!(
            "[reconcile][{:?}] mode={} format={:?} source={} err={}",
            severity,
            ctx.mode,
            ctx.format,
            ctx.source(),
            error
        );
    }

    fn on_alert(&self, ctx: &ReconcileContext, severity: ReconcileSeverity, error: &ReconcileError) {
        eprintln!(
            "[ALERT][reconcile][{:?}] mode={} format={:?} source={} err={}",
            severity,
            ctx.mode,
            ctx.format,
            ctx.source(),
            error
        );
    }
}

/// Forwards reconciliation events to the [`log`] facade under the `sheet_reconcile` target.
#[derive(Debug, Default)]
pub struct LogObserver;

impl ReconcileObserver for LogObserver {
    fn on_success(&self, ctx: &ReconcileContext, stats: ReconcileStats) {
        log::info!(
            target: "sheet_reconcile",
            "reconciled {} record(s) from {} ({} mode, {:?}); {} blank row(s) dropped",
            stats.records,
            ctx.source(),
            ctx.mode,
            ctx.format,
            stats.blank_rows
        );
    }

    fn on_warning(&self, ctx: &ReconcileContext, warning: &MissingColumnsWarning) {
        log::warn!(target: "sheet_reconcile", "{}: {}", ctx.source(), warning);
    }

    fn on_failure(&self, ctx: &ReconcileContext, severity: ReconcileSeverity, error: &ReconcileError) {
        log::error!(
            target: "sheet_reconcile",
            "reconcile failed ({:?}) for {}: {}",
            severity,
            ctx.source(),
            error
        );
    }

    fn on_alert(&self, ctx: &ReconcileContext, severity: ReconcileSeverity, error: &ReconcileError) {
        log::error!(
            target: "sheet_reconcile",
            "ALERT ({:?}) reconcile failed for {}: {}",
            severity,
            ctx.source(),
            error
        );
    }
}

/// Appends reconciliation events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl ReconcileObserver for FileObserver {
    fn on_success(&self, ctx: &ReconcileContext, stats: ReconcileStats) {
        self.append_line(&format!(
            "{} ok mode={} format={:?} source={} records={} blank_rows={}",
            unix_ts(),
            ctx.mode,
            ctx.format,
            ctx.source(),
            stats.records,
            stats.blank_rows
        ));
    }

    fn on_warning(&self, ctx: &ReconcileContext, warning: &MissingColumnsWarning) {
        self.append_line(&format!(
            "{} warn mode={} source={} missing={}",
            unix_ts(),
            ctx.mode,
            ctx.source(),
            warning.missing.join(",")
        ));
    }

    fn on_failure(&self, ctx: &ReconcileContext, severity: ReconcileSeverity, error: &ReconcileError) {
        self.append_line(&format!(
            "{} fail severity={:?} mode={} format={:?} source={} err={}",
            unix_ts(),
            severity,
            ctx.mode,
            ctx.format,
            ctx.source(),
            error
        ));
    }

    fn on_alert(&self, ctx: &ReconcileContext, severity: ReconcileSeverity, error: &ReconcileError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} mode={} format={:?} source={} err={}",
            unix_ts(),
            severity,
            ctx.mode,
            ctx.format,
            ctx.source(),
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CapturingLogger {
        lines: Mutex<Vec<String>>,
    }

    impl log::Log for CapturingLogger {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.target() == "sheet_reconcile"
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                if let Ok(mut lines) = self.lines.lock() {
                    lines.push(format!("{} {}", record.level(), record.args()));
                }
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CapturingLogger = CapturingLogger {
        lines: Mutex::new(Vec::new()),
    };

    #[test]
    fn log_observer_alert_is_a_distinct_record() {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Trace);

        let ctx = ReconcileContext {
            mode: "fixed-shape",
            format: SpreadsheetFormat::Csv,
            spreadsheet_path: Some(PathBuf::from("alert-check.csv")),
            reference_path: None,
        };
        let err = ReconcileError::NoSheets;
        LogObserver.on_failure(&ctx, ReconcileSeverity::Critical, &err);
        LogObserver.on_alert(&ctx, ReconcileSeverity::Critical, &err);

        let lines = LOGGER.lines.lock().unwrap();
        let ours: Vec<&String> = lines.iter().filter(|l| l.contains("alert-check.csv")).collect();
        assert_eq!(ours.len(), 2);
        assert!(ours[0].starts_with("ERROR reconcile failed (Critical)"));
        assert!(ours[1].starts_with("ERROR ALERT (Critical)"));
    }
}
