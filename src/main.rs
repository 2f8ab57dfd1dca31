use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use sheet_loader::config::{
    ConnectionSettings, ENV_DATABASE, ENV_DRIVER, ENV_ENCRYPT, ENV_PASSWORD, ENV_SERVER, ENV_USERNAME,
};
use sheet_loader::ingestion::SourceFormat;
use sheet_loader::observability::TracingObserver;
use sheet_loader::pipeline::{ImportOptions, ImportRequest, run_import};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sheet-loader",
    version,
    about = "Import a .csv or .xlsx file into a database table, replacing any table of the same name",
    after_help = "Example: sheet-loader --file-path /path/to/file.xlsx --target-table TargetTableName --db-name MyDatabase"
)]
struct Cli {
    /// Path to the input file (.csv or .xlsx).
    #[arg(long = "file-path", alias = "file_path")]
    file_path: PathBuf,

    /// Destination table name (optionally `schema.table`).
    #[arg(long = "target-table", alias = "target_table")]
    target_table: String,

    /// Database driver: `duckdb` or `postgres`.
    #[arg(long = "db-driver", alias = "db_driver", env = ENV_DRIVER)]
    db_driver: Option<String>,

    /// Server address, `host`, `host:port` or `host,port` (postgres only).
    #[arg(long = "db-server", alias = "db_server", env = ENV_SERVER)]
    db_server: Option<String>,

    /// Database name (postgres) or database file path (duckdb).
    #[arg(long = "db-name", alias = "db_name", env = ENV_DATABASE)]
    db_name: Option<String>,

    /// Username for server authentication.
    #[arg(long = "db-username", alias = "db_username", env = ENV_USERNAME)]
    db_username: Option<String>,

    /// Password for server authentication.
    #[arg(long = "db-password", alias = "db_password", env = ENV_PASSWORD, hide_env_values = true)]
    db_password: Option<String>,

    /// Require an encrypted connection (yes/no).
    #[arg(long = "db-encrypt", alias = "db_encrypt", env = ENV_ENCRYPT)]
    db_encrypt: Option<String>,

    /// Print the load report as one JSON line on stdout.
    #[arg(long)]
    summary_json: bool,
}

impl Cli {
    fn settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            driver: self.db_driver.clone(),
            server: self.db_server.clone(),
            database: self.db_name.clone(),
            username: self.db_username.clone(),
            password: self.db_password.clone(),
            encrypt: self.db_encrypt.clone(),
        }
    }
}

fn main() -> ExitCode {
    // Must run before parsing so clap's `env` fallbacks see the .env values.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match &dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env file"),
    }

    let cli = Cli::parse();
    if run(&cli) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn run(cli: &Cli) -> bool {
    let config = match cli.settings().resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(
                error = %e,
                "database configuration rejected; provide values via CLI flags or .env"
            );
            return false;
        }
    };

    if let Err(e) = SourceFormat::from_path(&cli.file_path) {
        tracing::error!(error = %e, "file must be a .csv or .xlsx");
        return false;
    }

    let options = ImportOptions {
        observer: Some(Arc::new(TracingObserver)),
        ..Default::default()
    };
    let request = ImportRequest::new(&cli.file_path, &cli.target_table);

    // Failures are logged by the observer.
    let Ok(report) = run_import(&request, &config, &options) else {
        return false;
    };

    if cli.summary_json {
        match serde_json::to_string(&report) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize load report");
                return false;
            }
        }
    }
    true
}
