//! `sheet-loader` imports one tabular file into one database table.
//!
//! The source is decoded into an in-memory [`types::TabularData`], every cell is coerced to
//! text, a positional [`types::TableSchema`] is derived, and the destination table is replaced
//! (drop + create + insert every row) inside a single transaction.
//!
//! ## What you can import
//!
//! **File formats (auto-detected by extension):**
//!
//! - **Delimited text**: `.csv`, `;`-delimited, UTF-8 with optional byte-order mark
//! - **Excel** (requires the Cargo feature `excel`, on by default): `.xlsx`, first worksheet,
//!   first row as header
//!
//! **Destination schema:** the first four columns are `VARCHAR(50)`, every later column is
//! `VARCHAR(9)`. Empty cells are stored as `NULL`; a cell longer than its column width fails the
//! load.
//!
//! **Destinations:** a local DuckDB file, or a PostgreSQL server attached through DuckDB's
//! `postgres` extension (see [`config::ConnectionConfig`]).
//!
//! ## Quick example
//!
//! ```no_run
//! use sheet_loader::config::ConnectionConfig;
//! use sheet_loader::pipeline::{run_import, ImportOptions, ImportRequest};
//!
//! # fn main() -> Result<(), sheet_loader::ImportError> {
//! let report = run_import(
//!     &ImportRequest::new("staff.xlsx", "Personalplan_Import"),
//!     &ConnectionConfig::duckdb("warehouse.duckdb"),
//!     &ImportOptions::default(),
//! )?;
//! println!("table={} rows={}", report.table, report.rows);
//! # Ok(())
//! # }
//! ```
//!
//! ## Step by step
//!
//! ```rust
//! use sheet_loader::loading::{load_table, Session};
//! use sheet_loader::schema::derive_for;
//! use sheet_loader::types::{TabularData, Value};
//!
//! # fn main() -> Result<(), sheet_loader::ImportError> {
//! let data = TabularData::new(
//!     vec!["id".into(), "name".into()],
//!     vec![vec![Value::Int64(1), Value::Utf8("Ann".into())]],
//! )
//! .stringify();
//! let schema = derive_for(&data);
//!
//! let mut session = Session::open_in_memory()?;
//! let report = load_table(&mut session, "staff", &schema, &data)?;
//! assert_eq!(report.rows, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: format detection, decoder registry and the CSV/Excel decoders
//! - [`types`]: tabular data and destination schema types
//! - [`schema`]: positional schema derivation
//! - [`loading`]: sessions, identifier quoting and the transactional loader
//! - [`pipeline`]: the end-to-end import
//! - [`config`]: connection parameters
//! - [`observability`]: observer hooks and error severities
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod ingestion;
pub mod loading;
pub mod observability;
pub mod pipeline;
pub mod schema;
pub mod types;

pub use error::{ImportError, ImportResult, ReadError, ReadResult};
