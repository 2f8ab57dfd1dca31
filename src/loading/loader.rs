//! Transactional table replacement.
//!
//! [`load_table`] runs one unit of work: `DROP TABLE IF EXISTS`, `CREATE TABLE`, one prepared
//! `INSERT` execution per row, then `COMMIT`. Any failure rolls the whole unit back, the drop
//! included, so a failed run leaves the previous table untouched.

use duckdb::{Transaction, params_from_iter};
use serde::Serialize;

use crate::config::Driver;
use crate::error::{ImportError, ImportResult};
use crate::types::{TableSchema, TabularData};

use super::identifier::{quote_identifier, quote_table_name};
use super::session::Session;

/// Per-run load state.
///
/// `Idle → Connected → TableReplaced → RowsInserted → Committed`; any failure moves a
/// non-terminal state to `RolledBack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing has happened yet.
    Idle,
    /// A session is open; no statement has run.
    Connected,
    /// The old table is dropped and the new one created (uncommitted).
    TableReplaced,
    /// Every row is inserted (uncommitted).
    RowsInserted,
    /// The unit of work is committed.
    Committed,
    /// The unit of work was undone.
    RolledBack,
}

impl LoadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Committed | LoadState::RolledBack)
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(self, next: LoadState) -> bool {
        use LoadState::*;
        matches!(
            (self, next),
            (Idle, Connected)
                | (Connected, TableReplaced)
                | (TableReplaced, RowsInserted)
                | (RowsInserted, Committed)
                | (Connected | TableReplaced | RowsInserted, RolledBack)
        )
    }
}

/// Outcome of a committed load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Destination table name as supplied by the caller.
    pub table: String,
    /// Number of columns created.
    pub columns: usize,
    /// Number of rows inserted.
    pub rows: usize,
    /// Always [`LoadState::Committed`] for a returned report.
    pub final_state: LoadState,
}

/// The three statements of a load, built (and identifier-checked) before anything runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadStatements {
    /// `DROP TABLE IF EXISTS`.
    pub drop: String,
    /// `CREATE TABLE` with one text column per schema column.
    pub create: String,
    /// Parameterized single-row `INSERT`.
    pub insert: String,
}

impl LoadStatements {
    /// Build the statements for `table` and `schema`, for a DuckDB destination.
    ///
    /// Fails with [`ImportError::Schema`] on an invalid table or column name or an empty schema.
    pub fn build(table: &str, schema: &TableSchema) -> ImportResult<Self> {
        Self::build_for(Driver::DuckDb, table, schema)
    }

    /// Build the statements for a `driver` destination.
    ///
    /// DuckDB ignores the declared `VARCHAR` width, so its columns also carry a
    /// `CHECK (length(col) <= width)` constraint. PostgreSQL enforces the width itself.
    pub fn build_for(driver: Driver, table: &str, schema: &TableSchema) -> ImportResult<Self> {
        let schema_err = |message: String| ImportError::Schema {
            table: table.to_string(),
            message,
        };

        if schema.is_empty() {
            return Err(schema_err("cannot create a table with no columns".to_string()));
        }

        let quoted_table = quote_table_name(table).map_err(|e| schema_err(e.to_string()))?;

        let mut column_defs = Vec::with_capacity(schema.len());
        let mut column_names = Vec::with_capacity(schema.len());
        for (idx, col) in schema.columns.iter().enumerate() {
            let quoted = quote_identifier(&col.name)
                .map_err(|e| schema_err(format!("column {}: {e}", idx + 1)))?;
            let mut def = format!("{quoted} {}", col.column_type.sql_type());
            if driver == Driver::DuckDb {
                def.push_str(&format!(
                    " CHECK (length({quoted}) <= {})",
                    col.column_type.width()
                ));
            }
            column_defs.push(def);
            column_names.push(quoted);
        }

        let placeholders = vec!["?"; schema.len()].join(", ");
        Ok(Self {
            drop: format!("DROP TABLE IF EXISTS {quoted_table}"),
            create: format!("CREATE TABLE {quoted_table} ({})", column_defs.join(", ")),
            insert: format!(
                "INSERT INTO {quoted_table} ({}) VALUES ({placeholders})",
                column_names.join(", ")
            ),
        })
    }
}

/// Tracks the state machine and forwards each transition.
struct LoadRun<'a> {
    state: LoadState,
    on_transition: &'a mut dyn FnMut(LoadState, LoadState),
}

impl<'a> LoadRun<'a> {
    fn new(on_transition: &'a mut dyn FnMut(LoadState, LoadState)) -> Self {
        Self {
            state: LoadState::Connected,
            on_transition,
        }
    }

    fn advance(&mut self, next: LoadState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal load transition {:?} -> {:?}",
            self.state,
            next
        );
        let prev = std::mem::replace(&mut self.state, next);
        (self.on_transition)(prev, next);
    }
}

/// Replace `table` with `schema` and insert every row of `data`, as one unit of work.
///
/// A rejected table or column name, or an empty schema, fails before any statement runs.
pub fn load_table(
    session: &mut Session,
    table: &str,
    schema: &TableSchema,
    data: &TabularData,
) -> ImportResult<LoadReport> {
    load_table_with(session, table, schema, data, &mut |_, _| {})
}

/// Like [`load_table`], calling `on_transition(from, to)` on every state change.
///
/// The session counts as `Connected` on entry.
pub fn load_table_with(
    session: &mut Session,
    table: &str,
    schema: &TableSchema,
    data: &TabularData,
    on_transition: &mut dyn FnMut(LoadState, LoadState),
) -> ImportResult<LoadReport> {
    let mut run = LoadRun::new(on_transition);
    let statements = match LoadStatements::build_for(session.driver(), table, schema) {
        Ok(statements) => statements,
        Err(e) => {
            run.advance(LoadState::RolledBack);
            return Err(e);
        }
    };

    let tx = match session.connection_mut().transaction() {
        Ok(tx) => tx,
        Err(e) => {
            run.advance(LoadState::RolledBack);
            return Err(e.into());
        }
    };
    match replace_and_insert(&tx, &statements, table, schema, data, &mut run) {
        Ok(rows) => {
            if let Err(e) = tx.commit() {
                tracing::error!(table, error = %e, "commit failed");
                run.advance(LoadState::RolledBack);
                return Err(e.into());
            }
            run.advance(LoadState::Committed);
            tracing::info!(table, rows, columns = schema.len(), "table load committed");
            Ok(LoadReport {
                table: table.to_string(),
                columns: schema.len(),
                rows,
                final_state: LoadState::Committed,
            })
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback() {
                tracing::error!(table, error = %rollback_err, "rollback failed");
            }
            run.advance(LoadState::RolledBack);
            tracing::warn!(table, error = %e, "table load rolled back");
            Err(e)
        }
    }
}

fn replace_and_insert(
    tx: &Transaction<'_>,
    statements: &LoadStatements,
    table: &str,
    schema: &TableSchema,
    data: &TabularData,
    run: &mut LoadRun<'_>,
) -> ImportResult<usize> {
    let schema_err = |e: duckdb::Error| ImportError::Schema {
        table: table.to_string(),
        message: e.to_string(),
    };

    tx.execute_batch(&statements.drop).map_err(schema_err)?;
    tx.execute_batch(&statements.create).map_err(schema_err)?;
    tracing::info!(table, columns = schema.len(), "table replaced");
    run.advance(LoadState::TableReplaced);

    let mut insert = tx.prepare(&statements.insert).map_err(schema_err)?;
    let expected = schema.len();
    for (idx, row) in data.rows.iter().enumerate() {
        let insert_err = |message: String| ImportError::Insert {
            table: table.to_string(),
            row: idx + 1,
            message,
        };
        if row.len() != expected {
            return Err(insert_err(format!(
                "row has {} cells, table has {expected} columns",
                row.len()
            )));
        }
        let cells: Vec<Option<String>> = row.iter().map(|v| v.to_text()).collect();
        if let Some((col, len, width)) = first_over_width(schema, &cells) {
            return Err(insert_err(format!(
                "column {col} value has {len} characters, width is {width}"
            )));
        }
        insert
            .execute(params_from_iter(cells.iter()))
            .map_err(|e| insert_err(e.to_string()))?;
    }
    let rows = data.row_count();
    tracing::debug!(table, rows, "rows inserted");
    run.advance(LoadState::RowsInserted);
    Ok(rows)
}

/// First cell longer than its column's width, as `(1-based column, length, width)`.
fn first_over_width(schema: &TableSchema, cells: &[Option<String>]) -> Option<(usize, usize, usize)> {
    schema
        .columns
        .iter()
        .zip(cells)
        .enumerate()
        .find_map(|(idx, (col, cell))| {
            let len = cell.as_deref()?.chars().count();
            let width = col.column_type.width();
            (len > width).then_some((idx + 1, len, width))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::derive_schema;

    #[test]
    fn statements_quote_every_identifier() {
        let schema = derive_schema(["id", "name", "dept", "role", "level"]);
        let st = LoadStatements::build("staff", &schema).unwrap();
        assert_eq!(st.drop, "DROP TABLE IF EXISTS \"staff\"");
        assert_eq!(
            st.create,
            "CREATE TABLE \"staff\" (\"id\" VARCHAR(50) CHECK (length(\"id\") <= 50), \"name\" VARCHAR(50) CHECK (length(\"name\") <= 50), \"dept\" VARCHAR(50) CHECK (length(\"dept\") <= 50), \"role\" VARCHAR(50) CHECK (length(\"role\") <= 50), \"level\" VARCHAR(9) CHECK (length(\"level\") <= 9))"
        );
        assert_eq!(
            st.insert,
            "INSERT INTO \"staff\" (\"id\", \"name\", \"dept\", \"role\", \"level\") VALUES (?, ?, ?, ?, ?)"
        );
    }

    #[test]
    fn postgres_statements_rely_on_declared_width() {
        let schema = derive_schema(["id", "level", "a", "b", "c"]);
        let st = LoadStatements::build_for(Driver::Postgres, "hr.staff", &schema).unwrap();
        assert!(st.create.starts_with("CREATE TABLE \"hr\".\"staff\" (\"id\" VARCHAR(50), "));
        assert!(st.create.ends_with("\"c\" VARCHAR(9))"));
        assert!(!st.create.contains("CHECK"));
    }

    #[test]
    fn over_width_cell_is_found_by_column() {
        let schema = derive_schema(["a", "b", "c", "d", "e"]);
        let fits = vec![Some("x".repeat(50)), None, None, None, Some("123456789".into())];
        assert_eq!(first_over_width(&schema, &fits), None);

        let wide = vec![None, None, None, None, Some("1234567890".into())];
        assert_eq!(first_over_width(&schema, &wide), Some((5, 10, 9)));

        // Characters, not bytes.
        let umlauts = vec![None, None, None, None, Some("ääääääääá".into())];
        assert_eq!(first_over_width(&schema, &umlauts), None);
    }

    #[test]
    fn statements_reject_empty_schema_and_bad_names() {
        let err = LoadStatements::build("t", &TableSchema::default()).unwrap_err();
        assert!(matches!(err, ImportError::Schema { .. }));

        let err = LoadStatements::build("", &derive_schema(["a"])).unwrap_err();
        assert!(err.to_string().contains("identifier is empty"));

        let err = LoadStatements::build("t", &derive_schema(["ok", "bad\ncol"])).unwrap_err();
        assert!(err.to_string().contains("column 2"));
    }

    #[test]
    fn transitions_follow_the_state_machine() {
        use LoadState::*;
        assert!(Idle.can_transition_to(Connected));
        assert!(RowsInserted.can_transition_to(Committed));
        assert!(TableReplaced.can_transition_to(RolledBack));
        assert!(!Idle.can_transition_to(RolledBack));
        assert!(!Committed.can_transition_to(RolledBack));
        assert!(!Connected.can_transition_to(RowsInserted));
        assert!(Committed.is_terminal() && RolledBack.is_terminal());
    }
}
