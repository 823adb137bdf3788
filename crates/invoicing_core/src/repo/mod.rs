//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented invoice access contracts.
//! - Isolate log layout and encoding details from callers.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   storage transport errors.
//! - Soft absence (`Ok(None)` from `update`) is never folded into `NotFound`.

pub mod invoice_repo;
