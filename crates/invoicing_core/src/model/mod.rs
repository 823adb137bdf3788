//! Invoice domain model.
//!
//! # Responsibility
//! - Define the records persisted by the storage layer.
//!
//! # Invariants
//! - Every invoice is identified by a random 128-bit `InvoiceId`.

pub mod invoice;
