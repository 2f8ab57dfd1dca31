//! The import pipeline: read → stringify → derive schema → connect → load.
//!
//! The source is read and its format checked before any database interaction, so an unsupported
//! extension or unreadable file never touches the destination.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ConnectionConfig;
use crate::error::ImportResult;
use crate::ingestion::{DecoderRegistry, ReadOptions};
use crate::loading::{LoadReport, LoadState, Session, connect, load_table_with};
use crate::observability::{ImportContext, ImportObserver, ImportSeverity, ReadStats, severity_for_error};
use crate::schema::derive_for;
use crate::types::{TableSchema, TabularData};

/// One source file and its destination table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub path: PathBuf,
    pub table: String,
}

impl ImportRequest {
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            table: table.into(),
        }
    }
}

/// Options controlling the pipeline.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ImportOptions {
    /// Reading options (forced format, CSV delimiter).
    pub read: ReadOptions,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ImportObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ImportSeverity,
}

impl fmt::Debug for ImportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportOptions")
            .field("read", &self.read)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            read: ReadOptions::default(),
            observer: None,
            alert_at_or_above: ImportSeverity::Critical,
        }
    }
}

/// Run a full import: read `request.path`, open a session for `config`, replace
/// `request.table`.
///
/// When an observer is configured, this function reports:
///
/// - `on_read` once the file is decoded
/// - `on_transition` for every load state change, starting with `Idle → Connected`
/// - `on_success` on commit
/// - `on_failure` on any failure, with a computed severity
/// - `on_alert` on failure when the severity is >= `options.alert_at_or_above`
///
/// ```no_run
/// use sheet_loader::config::ConnectionConfig;
/// use sheet_loader::pipeline::{run_import, ImportOptions, ImportRequest};
///
/// # fn main() -> Result<(), sheet_loader::ImportError> {
/// let report = run_import(
///     &ImportRequest::new("staff.csv", "Personalplan_Import"),
///     &ConnectionConfig::duckdb("warehouse.duckdb"),
///     &ImportOptions::default(),
/// )?;
/// println!("rows={}", report.rows);
/// # Ok(())
/// # }
/// ```
pub fn run_import(
    request: &ImportRequest,
    config: &ConnectionConfig,
    options: &ImportOptions,
) -> ImportResult<LoadReport> {
    let mut ctx = context_for(request);
    let result = prepare(request, options, &mut ctx).and_then(|(data, schema)| {
        let mut session = connect(config)?;
        notify_transition(options, &ctx, LoadState::Idle, LoadState::Connected);
        load(&mut session, request, options, &ctx, &data, &schema)
    });
    report(options, &ctx, &result);
    result
}

/// Like [`run_import`], but loads through a session the caller already opened.
pub fn import_into_session(
    session: &mut Session,
    request: &ImportRequest,
    options: &ImportOptions,
) -> ImportResult<LoadReport> {
    let mut ctx = context_for(request);
    let result = prepare(request, options, &mut ctx)
        .and_then(|(data, schema)| load(session, request, options, &ctx, &data, &schema));
    report(options, &ctx, &result);
    result
}

/// Read, stringify and derive the schema. Never touches the database.
fn prepare(
    request: &ImportRequest,
    options: &ImportOptions,
    ctx: &mut ImportContext,
) -> ImportResult<(TabularData, TableSchema)> {
    let format = options.read.resolve_format(&request.path)?;
    ctx.format = Some(format);
    tracing::info!(path = %request.path.display(), ?format, "reading file");

    let data = DecoderRegistry::with_defaults(options.read.csv)
        .decode(&request.path, format)?
        .stringify();
    if let Some(obs) = options.observer.as_ref() {
        obs.on_read(
            ctx,
            ReadStats {
                columns: data.column_count(),
                rows: data.row_count(),
            },
        );
    }

    let schema = derive_for(&data);
    Ok((data, schema))
}

fn load(
    session: &mut Session,
    request: &ImportRequest,
    options: &ImportOptions,
    ctx: &ImportContext,
    data: &TabularData,
    schema: &TableSchema,
) -> ImportResult<LoadReport> {
    load_table_with(session, &request.table, schema, data, &mut |from, to| {
        notify_transition(options, ctx, from, to)
    })
}

fn context_for(request: &ImportRequest) -> ImportContext {
    ImportContext {
        path: request.path.clone(),
        table: request.table.clone(),
        format: None,
    }
}

fn notify_transition(options: &ImportOptions, ctx: &ImportContext, from: LoadState, to: LoadState) {
    if let Some(obs) = options.observer.as_ref() {
        obs.on_transition(ctx, from, to);
    }
}

fn report(options: &ImportOptions, ctx: &ImportContext, result: &ImportResult<LoadReport>) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(report) => obs.on_success(ctx, report),
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}
