//! Line-oriented storage primitives used by file-based repositories.
//!
//! # Responsibility
//! - Append, read back, and truncate newline-delimited text logs.
//! - Convert records to and from one-line textual form.
//!
//! # Invariants
//! - One stored line is exactly one logical entry; lines never embed `\n`.
//! - Reads return lines in insertion order.
//! - Erasing truncates the log; the backing file itself is kept.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod codec;
mod line_store;

pub use codec::{CodecError, CodecResult, JsonCodec, RecordCodec};
pub use line_store::{FileLineStore, LineStore, MemoryLineStore};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A line handed to `append` contained a line break.
    EmbeddedNewline,
    InvalidUtf8 {
        path: PathBuf,
        line_number: usize,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::EmbeddedNewline => write!(f, "stored lines cannot contain line breaks"),
            Self::InvalidUtf8 { path, line_number } => write!(
                f,
                "line {line_number} of `{}` is not valid UTF-8",
                path.display()
            ),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::EmbeddedNewline => None,
            Self::InvalidUtf8 { .. } => None,
        }
    }
}
