//! Persistence core for the invoicing application.
//! Stores invoices in a record log plus an identifier log on disk.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod storage;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::invoice::{Company, Invoice, InvoiceEntry, InvoiceId, InvoiceValidationError, Vat};
pub use repo::invoice_repo::{
    FileInvoiceRepository, InvoiceRepository, RepoError, RepoResult, MAX_ID_ATTEMPTS,
};
pub use storage::{
    CodecError, FileLineStore, JsonCodec, LineStore, MemoryLineStore, RecordCodec, StorageError,
    StorageResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
