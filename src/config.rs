//! Connection configuration.
//!
//! Raw parameters arrive as [`ConnectionSettings`] (every field optional, as read from CLI flags
//! or `DB_*` environment variables) and are resolved once into a validated [`ConnectionConfig`]
//! that is passed explicitly to [`crate::loading::connect`].

use std::fmt;
use std::str::FromStr;

use crate::error::{ImportError, ImportResult};

pub const ENV_DRIVER: &str = "DB_DRIVER";
pub const ENV_SERVER: &str = "DB_SERVER";
pub const ENV_DATABASE: &str = "DB_NAME";
pub const ENV_USERNAME: &str = "DB_USERNAME";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_ENCRYPT: &str = "DB_ENCRYPT";

/// Database backend used for the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// Local DuckDB database file (or `:memory:`).
    DuckDb,
    /// PostgreSQL server, reached through DuckDB's `postgres` extension.
    Postgres,
}

impl FromStr for Driver {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duckdb" => Ok(Self::DuckDb),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(ImportError::InvalidConfig {
                message: format!("{ENV_DRIVER}: unknown driver '{other}' (expected duckdb or postgres)"),
            }),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Driver::DuckDb => f.write_str("duckdb"),
            Driver::Postgres => f.write_str("postgres"),
        }
    }
}

/// Host and optional port of a database server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: Option<u16>,
}

impl FromStr for ServerAddress {
    type Err = ImportError;

    /// Accepts `host`, `host:port` and the `host,port` form used by SQL Server tooling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .split_once(',')
            .or_else(|| (s.matches(':').count() == 1).then(|| s.split_once(':')).flatten());

        let (host, port) = match split {
            Some((host, port)) => {
                let port = port.trim().parse::<u16>().map_err(|e| ImportError::InvalidConfig {
                    message: format!("{ENV_SERVER}: invalid port '{port}': {e}"),
                })?;
                (host.trim(), Some(port))
            }
            None => (s, None),
        };

        if host.is_empty() {
            return Err(ImportError::InvalidConfig {
                message: format!("{ENV_SERVER}: host is empty"),
            });
        }
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

/// Unvalidated connection parameters.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub driver: Option<String>,
    pub server: Option<String>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub encrypt: Option<String>,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("driver", &self.driver)
            .field("server", &self.server)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password_set", &self.password.is_some())
            .field("encrypt", &self.encrypt)
            .finish()
    }
}

impl ConnectionSettings {
    /// Validate the settings.
    ///
    /// `DB_DRIVER` and `DB_NAME` are always required. The `postgres` driver additionally
    /// requires server, username, password and encrypt flag. Every missing parameter is reported
    /// at once in [`ImportError::MissingConfig`]; blank values count as missing.
    pub fn resolve(&self) -> ImportResult<ConnectionConfig> {
        let driver = present(&self.driver);
        let database = present(&self.database);
        let server = present(&self.server);
        let username = present(&self.username);
        let password = present(&self.password);
        let encrypt = present(&self.encrypt);

        let driver = driver.map(Driver::from_str).transpose()?;

        let mut missing = Vec::new();
        if driver.is_none() {
            missing.push(ENV_DRIVER);
        }
        if database.is_none() {
            missing.push(ENV_DATABASE);
        }
        if driver == Some(Driver::Postgres) {
            for (name, value) in [
                (ENV_SERVER, server),
                (ENV_USERNAME, username),
                (ENV_PASSWORD, password),
                (ENV_ENCRYPT, encrypt),
            ] {
                if value.is_none() {
                    missing.push(name);
                }
            }
        }
        if !missing.is_empty() {
            return Err(ImportError::MissingConfig { missing });
        }

        let (Some(driver), Some(database)) = (driver, database) else {
            return Err(ImportError::MissingConfig {
                missing: vec![ENV_DRIVER, ENV_DATABASE],
            });
        };

        let server = server.map(ServerAddress::from_str).transpose()?;
        let encrypt = match encrypt {
            Some(raw) => parse_flag(raw).map_err(|message| ImportError::InvalidConfig {
                message: format!("{ENV_ENCRYPT}: {message} (raw='{raw}')"),
            })?,
            None => false,
        };

        Ok(ConnectionConfig {
            driver,
            server,
            database: database.to_string(),
            username: username.map(str::to_string),
            password: password.map(str::to_string),
            encrypt,
        })
    }
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a yes/no style flag.
pub fn parse_flag(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "mandatory" | "strict" => Ok(true),
        "false" | "f" | "0" | "no" | "n" | "optional" => Ok(false),
        _ => Err("expected flag (true/false/1/0/yes/no/mandatory/optional)".to_string()),
    }
}

/// Validated connection parameters, built once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub driver: Driver,
    /// Server address; `None` for the `duckdb` driver.
    pub server: Option<ServerAddress>,
    /// Database name (`postgres`) or database file path (`duckdb`, `:memory:` allowed).
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Require TLS to the server.
    pub encrypt: bool,
}

impl ConnectionConfig {
    /// Configuration for a local DuckDB database at `path`.
    pub fn duckdb(path: impl Into<String>) -> Self {
        Self {
            driver: Driver::DuckDb,
            server: None,
            database: path.into(),
            username: None,
            password: None,
            encrypt: false,
        }
    }

    /// Human-readable target, without credentials.
    pub fn describe(&self) -> String {
        match (&self.driver, &self.server) {
            (Driver::Postgres, Some(server)) => match server.port {
                Some(port) => format!("postgres://{}:{port}/{}", server.host, self.database),
                None => format!("postgres://{}/{}", server.host, self.database),
            },
            _ => format!("{}:{}", self.driver, self.database),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("driver", &self.driver)
            .field("server", &self.server)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password_set", &self.password.is_some())
            .field("encrypt", &self.encrypt)
            .finish()
    }
}
