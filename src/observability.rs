use std::error::Error as StdError;
use std::path::PathBuf;

use crate::error::{ImportError, ReadError};
use crate::ingestion::SourceFormat;
use crate::loading::{LoadReport, LoadState};

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the import failed).
    Error,
    /// Critical error (I/O, connection or other infrastructure failures).
    Critical,
}

/// Context about an import attempt.
#[derive(Debug, Clone)]
pub struct ImportContext {
    /// Source file.
    pub path: PathBuf,
    /// Destination table name as supplied by the caller.
    pub table: String,
    /// Format used for reading, once known.
    pub format: Option<SourceFormat>,
}

/// Shape of the decoded source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadStats {
    pub columns: usize,
    pub rows: usize,
}

/// Observer interface for import progress and outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ImportObserver: Send + Sync {
    /// Called once the source file has been decoded.
    fn on_read(&self, _ctx: &ImportContext, _stats: ReadStats) {}

    /// Called on every load state change.
    fn on_transition(&self, _ctx: &ImportContext, _from: LoadState, _to: LoadState) {}

    /// Called when the import committed.
    fn on_success(&self, _ctx: &ImportContext, _report: &LoadReport) {}

    /// Called when the import fails.
    fn on_failure(&self, _ctx: &ImportContext, _severity: ImportSeverity, _error: &ImportError) {}

    /// Called when an import failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Logs import events as structured `tracing` events.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ImportObserver for TracingObserver {
    fn on_read(&self, ctx: &ImportContext, stats: ReadStats) {
        tracing::info!(
            path = %ctx.path.display(),
            format = ?ctx.format,
            columns = stats.columns,
            rows = stats.rows,
            "file read successfully"
        );
    }

    fn on_transition(&self, ctx: &ImportContext, from: LoadState, to: LoadState) {
        tracing::debug!(table = %ctx.table, ?from, ?to, "load state changed");
    }

    fn on_success(&self, ctx: &ImportContext, report: &LoadReport) {
        tracing::info!(
            path = %ctx.path.display(),
            table = %report.table,
            columns = report.columns,
            rows = report.rows,
            "data successfully imported"
        );
    }

    fn on_failure(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        tracing::error!(
            ?severity,
            path = %ctx.path.display(),
            table = %ctx.table,
            error = %error,
            "import failed"
        );
    }

    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        tracing::error!(
            alert = true,
            ?severity,
            path = %ctx.path.display(),
            table = %ctx.table,
            error = %error,
            "import failed"
        );
    }
}

/// Severity of an import failure.
pub fn severity_for_error(e: &ImportError) -> ImportSeverity {
    match e {
        ImportError::Read { source, .. } => match source {
            ReadError::Io(_) => ImportSeverity::Critical,
            ReadError::Csv(err) => match err.kind() {
                csv::ErrorKind::Io(_) => ImportSeverity::Critical,
                _ => ImportSeverity::Error,
            },
            #[cfg(feature = "excel")]
            ReadError::Excel(calamine::Error::Io(_)) => ImportSeverity::Critical,
            #[cfg(feature = "excel")]
            ReadError::Excel(err) => {
                if error_chain_contains_io(err) {
                    ImportSeverity::Critical
                } else {
                    ImportSeverity::Error
                }
            }
            _ => ImportSeverity::Error,
        },
        ImportError::Connection { .. } | ImportError::Database(_) => ImportSeverity::Critical,
        ImportError::UnsupportedFormat { .. }
        | ImportError::MissingConfig { .. }
        | ImportError::InvalidConfig { .. }
        | ImportError::Schema { .. }
        | ImportError::Insert { .. } => ImportSeverity::Error,
    }
}

#[cfg_attr(not(feature = "excel"), allow(dead_code))]
fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}
