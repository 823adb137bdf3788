//! Invoice repository contract and its log-backed implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete over a record log and an identifier log.
//! - Keep identifiers unique across every stored invoice.
//!
//! # Invariants
//! - After each operation the identifier log and the record log hold the same
//!   set of ids, one entry each.
//! - `get_by_id` and `delete` fail with `NotFound` for unknown ids; `update`
//!   reports unknown ids as `Ok(None)` instead.
//! - Only `id` is interpreted; the rest of the invoice is opaque payload.
//! - Writes are not atomic across the two logs. A crash mid-operation can
//!   leave them disagreeing and nothing repairs that automatically.

use crate::config::StoreConfig;
use crate::model::invoice::{Invoice, InvoiceId};
use crate::storage::{
    CodecError, FileLineStore, JsonCodec, LineStore, MemoryLineStore, RecordCodec, StorageError,
};
use log::{debug, error, info};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Upper bound on id regenerations performed by a single `save`.
pub const MAX_ID_ATTEMPTS: usize = 64;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for invoice persistence and lookup.
#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    Codec(CodecError),
    NotFound(InvoiceId),
    /// The logs disagree or hold something other than expected.
    InvalidData(String),
    IdSpaceExhausted { attempts: usize },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "invoice not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted invoice data: {message}"),
            Self::IdSpaceExhausted { attempts } => write!(
                f,
                "could not find an unused invoice id after {attempts} attempts"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
            Self::IdSpaceExhausted { .. } => None,
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<CodecError> for RepoError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Repository interface for invoice CRUD operations.
pub trait InvoiceRepository {
    /// Stores `invoice`, replacing its id first if it is already taken.
    ///
    /// Returns the invoice as stored, carrying its final id.
    fn save(&mut self, invoice: Invoice) -> RepoResult<Invoice>;
    fn get_by_id(&self, id: InvoiceId) -> RepoResult<Invoice>;
    fn get_all(&self) -> RepoResult<Vec<Invoice>>;
    /// Replaces the stored invoice with the same id.
    ///
    /// Returns `Ok(None)` when no invoice with that id is stored.
    fn update(&mut self, invoice: &Invoice) -> RepoResult<Option<Invoice>>;
    fn delete(&mut self, id: InvoiceId) -> RepoResult<bool>;
    /// Checks identifier-log membership.
    fn contains(&self, id: InvoiceId) -> RepoResult<bool>;
}

type IdGenerator = Box<dyn FnMut() -> InvoiceId + Send>;

/// Invoice repository over two line logs.
///
/// Mutating calls take `&mut self`, so one instance is single-writer by
/// construction. Separate instances or processes sharing the same files are
/// not coordinated.
pub struct FileInvoiceRepository<S = FileLineStore, C = JsonCodec> {
    records: S,
    ids: S,
    codec: C,
    next_id: IdGenerator,
}

impl FileInvoiceRepository<FileLineStore, JsonCodec> {
    /// Opens (creating if needed) both logs at the configured locations.
    ///
    /// # Side effects
    /// - Creates `data_dir` and empty log files when missing.
    /// - Emits `store_open` logging events with duration and status.
    pub fn open(config: &StoreConfig) -> RepoResult<Self> {
        let started_at = Instant::now();
        info!(
            "event=store_open module=store status=start mode=file data_dir={}",
            config.data_dir().display()
        );

        let opened = FileLineStore::open(config.records_path()).and_then(|records| {
            FileLineStore::open(config.ids_path()).map(|ids| (records, ids))
        });

        match opened {
            Ok((records, ids)) => {
                info!(
                    "event=store_open module=store status=ok mode=file duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self::with_stores(records, ids, JsonCodec))
            }
            Err(err) => {
                error!(
                    "event=store_open module=store status=error mode=file duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

impl FileInvoiceRepository<MemoryLineStore, JsonCodec> {
    /// Same log semantics as [`FileInvoiceRepository::open`], kept in memory.
    pub fn open_in_memory() -> Self {
        debug!("event=store_open module=store status=ok mode=memory");
        Self::with_stores(MemoryLineStore::new(), MemoryLineStore::new(), JsonCodec)
    }
}

impl<S, C> FileInvoiceRepository<S, C>
where
    S: LineStore,
    C: RecordCodec<Invoice>,
{
    pub fn with_stores(records: S, ids: S, codec: C) -> Self {
        Self {
            records,
            ids,
            codec,
            next_id: Box::new(Uuid::new_v4),
        }
    }

    /// Replaces the source of fresh ids used on collision.
    pub fn with_id_generator(
        mut self,
        generator: impl FnMut() -> InvoiceId + Send + 'static,
    ) -> Self {
        self.next_id = Box::new(generator);
        self
    }

    fn stored_ids(&self) -> RepoResult<Vec<String>> {
        Ok(self.ids.read_all()?)
    }

    fn id_is_stored(&self, id: InvoiceId) -> RepoResult<bool> {
        let wanted = id.to_string();
        Ok(self.stored_ids()?.iter().any(|stored| *stored == wanted))
    }

    /// Regenerates `invoice.id` until it is unused; returns the retry count.
    fn assign_unique_id(&mut self, invoice: &mut Invoice) -> RepoResult<usize> {
        let used: HashSet<String> = self.stored_ids()?.into_iter().collect();

        let mut retries = 0;
        while used.contains(&invoice.id.to_string()) {
            if retries == MAX_ID_ATTEMPTS {
                return Err(RepoError::IdSpaceExhausted { attempts: retries });
            }
            invoice.id = (self.next_id)();
            retries += 1;
        }

        Ok(retries)
    }

    fn decode_all(&self) -> RepoResult<Vec<Invoice>> {
        let lines = self.records.read_all()?;
        let mut invoices = Vec::with_capacity(lines.len());
        for line in &lines {
            invoices.push(self.codec.decode(line)?);
        }
        Ok(invoices)
    }

    /// Truncates the record log and writes `invoices` back in order.
    ///
    /// Encoding happens before truncation so a codec failure leaves the log
    /// untouched.
    fn rewrite_records(&mut self, invoices: &[Invoice]) -> RepoResult<()> {
        let lines = invoices
            .iter()
            .map(|invoice| self.codec.encode(invoice))
            .collect::<Result<Vec<_>, _>>()?;

        self.records.erase_all()?;
        for line in &lines {
            self.records.append(line)?;
        }
        Ok(())
    }

    fn rewrite_ids(&mut self, ids: &[String]) -> RepoResult<()> {
        self.ids.erase_all()?;
        for id in ids {
            self.ids.append(id)?;
        }
        Ok(())
    }
}

impl<S, C> InvoiceRepository for FileInvoiceRepository<S, C>
where
    S: LineStore,
    C: RecordCodec<Invoice>,
{
    fn save(&mut self, mut invoice: Invoice) -> RepoResult<Invoice> {
        let started_at = Instant::now();
        let candidate = invoice.id;

        let retries = self.assign_unique_id(&mut invoice).inspect_err(|err| {
            error!(
                "event=invoice_save module=store status=error candidate_id={} error={}",
                candidate, err
            );
        })?;

        let line = self.codec.encode(&invoice)?;
        self.records.append(&line)?;
        self.ids.append(&invoice.id.to_string())?;

        info!(
            "event=invoice_save module=store status=ok id={} id_retries={} duration_ms={}",
            invoice.id,
            retries,
            started_at.elapsed().as_millis()
        );
        Ok(invoice)
    }

    fn get_by_id(&self, id: InvoiceId) -> RepoResult<Invoice> {
        if !self.id_is_stored(id)? {
            debug!("event=invoice_get module=store status=not_found id={id}");
            return Err(RepoError::NotFound(id));
        }

        self.decode_all()?
            .into_iter()
            .find(|invoice| invoice.id == id)
            .ok_or_else(|| {
                error!(
                    "event=invoice_get module=store status=error id={id} error_code=log_mismatch"
                );
                RepoError::InvalidData(format!(
                    "identifier log lists {id} but the record log has no such invoice"
                ))
            })
    }

    fn get_all(&self) -> RepoResult<Vec<Invoice>> {
        let invoices = self.decode_all()?;
        debug!(
            "event=invoice_list module=store status=ok count={}",
            invoices.len()
        );
        Ok(invoices)
    }

    fn update(&mut self, invoice: &Invoice) -> RepoResult<Option<Invoice>> {
        let started_at = Instant::now();
        if !self.id_is_stored(invoice.id)? {
            debug!(
                "event=invoice_update module=store status=absent id={}",
                invoice.id
            );
            return Ok(None);
        }

        let mut invoices = self.decode_all()?;
        invoices.retain(|stored| stored.id != invoice.id);
        invoices.push(invoice.clone());
        self.rewrite_records(&invoices)?;

        info!(
            "event=invoice_update module=store status=ok id={} count={} duration_ms={}",
            invoice.id,
            invoices.len(),
            started_at.elapsed().as_millis()
        );
        Ok(Some(invoice.clone()))
    }

    fn delete(&mut self, id: InvoiceId) -> RepoResult<bool> {
        let started_at = Instant::now();
        if !self.id_is_stored(id)? {
            debug!("event=invoice_delete module=store status=not_found id={id}");
            return Err(RepoError::NotFound(id));
        }

        let mut invoices = self.decode_all()?;
        invoices.retain(|stored| stored.id != id);
        self.rewrite_records(&invoices)?;

        let wanted = id.to_string();
        let mut ids = self.stored_ids()?;
        ids.retain(|stored| *stored != wanted);
        self.rewrite_ids(&ids)?;

        info!(
            "event=invoice_delete module=store status=ok id={} remaining={} duration_ms={}",
            id,
            invoices.len(),
            started_at.elapsed().as_millis()
        );
        Ok(true)
    }

    fn contains(&self, id: InvoiceId) -> RepoResult<bool> {
        self.id_is_stored(id)
    }
}
