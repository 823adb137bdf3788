//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `invoicing_core` linkage and list the invoices of one store.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `invoicing_cli [data_dir]` (falls back to `INVOICING_DATA_DIR`).
//! Set `INVOICING_LOG_DIR` to an absolute path to capture core logs.

use invoicing_core::{
    default_log_level, init_logging, ConfigError, FileInvoiceRepository, InvoiceRepository,
    StoreConfig,
};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "INVOICING_LOG_DIR";

fn main() -> ExitCode {
    println!("invoicing_core version={}", invoicing_core::core_version());

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(data_dir_arg: Option<String>) -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        init_logging(default_log_level(), &PathBuf::from(log_dir))?;
    }

    let config = match data_dir_arg {
        Some(raw) => StoreConfig::new(&absolutize(&raw)?)?,
        None => match StoreConfig::from_env() {
            Ok(config) => config,
            // Nothing to inspect; the version line alone is the smoke check.
            Err(ConfigError::MissingEnv(_)) => return Ok(()),
            Err(err) => return Err(err.into()),
        },
    };

    let repo = FileInvoiceRepository::open(&config)?;
    let invoices = repo.get_all()?;
    info!("event=cli_list module=cli status=ok count={}", invoices.len());
    println!(
        "store data_dir={} invoices={}",
        config.data_dir().display(),
        invoices.len()
    );

    for invoice in &invoices {
        let status = match invoice.validate() {
            Ok(()) => "valid".to_string(),
            Err(err) => format!("invalid ({err})"),
        };
        println!(
            "{} date={} gross={} {}",
            invoice.id,
            invoice.date,
            format_minor_units(invoice.gross_total()),
            status
        );
    }

    Ok(())
}

fn absolutize(raw: &str) -> Result<String, Box<dyn Error>> {
    let path = PathBuf::from(raw.trim());
    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(path.to_string_lossy().into_owned())
}

fn format_minor_units(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
