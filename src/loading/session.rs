//! Connection provider.
//!
//! A [`Session`] wraps one DuckDB connection. For the `postgres` driver the connection is an
//! in-memory DuckDB that attaches the server through the `postgres` extension and makes it the
//! default catalog, so every statement the loader issues lands on the server.

use std::error::Error as StdError;

use duckdb::Connection;

use crate::config::{ConnectionConfig, Driver};
use crate::error::{ImportError, ImportResult};

/// Catalog alias the attached server is mounted under.
pub const ATTACHED_CATALOG: &str = "import_target";

/// An open database session, owned by the caller and borrowed by the loader.
pub struct Session {
    conn: Connection,
    driver: Driver,
    target: String,
}

impl Session {
    /// Wrap an already-open DuckDB connection.
    pub fn from_connection(conn: Connection, target: impl Into<String>) -> Self {
        Self {
            conn,
            driver: Driver::DuckDb,
            target: target.into(),
        }
    }

    /// A fresh in-memory DuckDB session.
    pub fn open_in_memory() -> ImportResult<Self> {
        let conn = Connection::open_in_memory().map_err(connection_error)?;
        Ok(Self::from_connection(conn, ":memory:"))
    }

    pub fn driver(&self) -> Driver {
        self.driver
    }

    /// Description of what this session is connected to (no credentials).
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("driver", &self.driver)
            .field("target", &self.target)
            .finish()
    }
}

/// Open a session for `config`.
///
/// Fails with [`ImportError::Connection`] carrying the driver's message and every message in
/// its source chain.
pub fn connect(config: &ConnectionConfig) -> ImportResult<Session> {
    let target = config.describe();
    let conn = match config.driver {
        Driver::DuckDb if config.database == ":memory:" => Connection::open_in_memory(),
        Driver::DuckDb => Connection::open(&config.database),
        Driver::Postgres => attach_postgres(config),
    }
    .map_err(connection_error)?;

    tracing::info!(driver = %config.driver, target = %target, "database connection successful");
    Ok(Session {
        conn,
        driver: config.driver,
        target,
    })
}

fn attach_postgres(config: &ConnectionConfig) -> duckdb::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("INSTALL postgres; LOAD postgres;")?;

    let dsn = postgres_dsn(config);
    conn.execute_batch(&format!(
        "ATTACH '{}' AS {ATTACHED_CATALOG} (TYPE POSTGRES); USE {ATTACHED_CATALOG};",
        dsn.replace('\'', "''")
    ))?;
    Ok(conn)
}

/// libpq key/value connection string for `config`.
pub fn postgres_dsn(config: &ConnectionConfig) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(server) = &config.server {
        parts.push(format!("host={}", libpq_value(&server.host)));
        if let Some(port) = server.port {
            parts.push(format!("port={port}"));
        }
    }
    parts.push(format!("dbname={}", libpq_value(&config.database)));
    if let Some(user) = &config.username {
        parts.push(format!("user={}", libpq_value(user)));
    }
    if let Some(password) = &config.password {
        parts.push(format!("password={}", libpq_value(password)));
    }
    let sslmode = if config.encrypt { "require" } else { "disable" };
    parts.push(format!("sslmode={sslmode}"));
    parts.join(" ")
}

fn libpq_value(raw: &str) -> String {
    format!("'{}'", raw.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn connection_error(err: duckdb::Error) -> ImportError {
    ImportError::Connection {
        messages: error_messages(&err),
    }
}

/// The error's message followed by each distinct message in its source chain.
pub(crate) fn error_messages(e: &(dyn StdError + 'static)) -> Vec<String> {
    let mut messages: Vec<String> = Vec::new();
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        let msg = err.to_string();
        if !messages.contains(&msg) {
            messages.push(msg);
        }
        cur = err.source();
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerAddress;

    #[test]
    fn dsn_quotes_values_and_maps_encrypt_flag() {
        let cfg = ConnectionConfig {
            driver: Driver::Postgres,
            server: Some(ServerAddress {
                host: "localhost".into(),
                port: Some(5432),
            }),
            database: "staff".into(),
            username: Some("loader".into()),
            password: Some("it's secret".into()),
            encrypt: true,
        };
        assert_eq!(
            postgres_dsn(&cfg),
            "host='localhost' port=5432 dbname='staff' user='loader' password='it\\'s secret' sslmode=require"
        );
    }

    #[test]
    fn connects_to_in_memory_duckdb() {
        let session = connect(&ConnectionConfig::duckdb(":memory:")).unwrap();
        assert_eq!(session.driver(), Driver::DuckDb);
        assert_eq!(session.target(), "duckdb::memory:");
    }

    #[test]
    fn unreachable_database_file_is_a_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("db.duckdb");
        let err = connect(&ConnectionConfig::duckdb(path.to_string_lossy())).unwrap_err();
        match err {
            ImportError::Connection { messages } => assert!(!messages.is_empty()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
