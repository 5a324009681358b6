//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `uoffer_core` linkage and database bootstrap from a shell.
//! - Print the public categories aggregate as JSON.
//!
//! Usage: `uoffer_cli [db_path]`. Without an argument the database path
//! comes from `UOFFER_CONFIG` / `UOFFER_DB_PATH`.

use std::process::ExitCode;
use uoffer_core::db::open_db;
use uoffer_core::{init_logging_from_config, CoreConfig, ServiceError, SqliteServices};

fn main() -> ExitCode {
    println!("uoffer_core ping={}", uoffer_core::ping());
    println!("uoffer_core version={}", uoffer_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let mut config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(path) = std::env::args_os().nth(1) {
        config.db_path = path.into();
    }
    init_logging_from_config(&config).map_err(|err| err.to_string())?;

    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let services =
        SqliteServices::try_new(&conn, config.word_projection).map_err(|err| err.to_string())?;

    match services.projections.categories_with_public_posts() {
        Ok(grouped) => {
            let json = serde_json::to_string_pretty(&grouped).map_err(|err| err.to_string())?;
            println!("{json}");
            Ok(())
        }
        Err(ServiceError::PostNotFound(None)) => {
            println!("{{}}");
            Ok(())
        }
        Err(err) => Err(format!("{:?}: {err}", err.kind())),
    }
}
