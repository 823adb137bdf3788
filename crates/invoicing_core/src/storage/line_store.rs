//! Line store contract and its file/in-memory implementations.
//!
//! # Responsibility
//! - Own one newline-delimited text log per instance.
//! - Keep file handle details out of repository logic.
//!
//! # Invariants
//! - `append` writes exactly one line; embedded line breaks are rejected.
//! - `read_all` preserves insertion order and skips blank lines.
//! - `erase_all` truncates to empty and keeps the storage unit.

use super::{StorageError, StorageResult};
use log::{debug, error};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Append/read/erase access to one line-oriented log.
pub trait LineStore {
    fn append(&mut self, line: &str) -> StorageResult<()>;
    fn read_all(&self) -> StorageResult<Vec<String>>;
    fn erase_all(&mut self) -> StorageResult<()>;
}

/// File-backed line store holding an exclusive handle to its log.
#[derive(Debug)]
pub struct FileLineStore {
    path: PathBuf,
    file: File,
}

impl FileLineStore {
    /// Opens (creating if needed) the log at `path`.
    ///
    /// # Side effects
    /// - Creates missing parent directories and an empty log file.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        match open_log_file(&path) {
            Ok(file) => {
                debug!(
                    "event=line_store_open module=storage status=ok path={}",
                    path.display()
                );
                Ok(Self { path, file })
            }
            Err(err) => {
                error!(
                    "event=line_store_open module=storage status=error path={} error={}",
                    path.display(),
                    err
                );
                Err(err)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineStore for FileLineStore {
    fn append(&mut self, line: &str) -> StorageResult<()> {
        ensure_single_line(line)?;

        let mut buffer = String::with_capacity(line.len() + 1);
        buffer.push_str(line);
        buffer.push('\n');

        self.file
            .write_all(buffer.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|err| StorageError::io(&self.path, err))
    }

    fn read_all(&self) -> StorageResult<Vec<String>> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))
            .map_err(|err| StorageError::io(&self.path, err))?;

        let mut lines = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(err) if err.kind() == ErrorKind::InvalidData => {
                    return Err(StorageError::InvalidUtf8 {
                        path: self.path.clone(),
                        line_number: index + 1,
                    });
                }
                Err(err) => return Err(StorageError::io(&self.path, err)),
            };
            if line.trim().is_empty() {
                continue;
            }
            lines.push(line);
        }

        Ok(lines)
    }

    fn erase_all(&mut self) -> StorageResult<()> {
        self.file
            .set_len(0)
            .map_err(|err| StorageError::io(&self.path, err))
    }
}

/// Volatile line store used by in-memory repositories.
#[derive(Debug, Clone, Default)]
pub struct MemoryLineStore {
    lines: Vec<String>,
}

impl MemoryLineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineStore for MemoryLineStore {
    fn append(&mut self, line: &str) -> StorageResult<()> {
        ensure_single_line(line)?;
        self.lines.push(line.to_string());
        Ok(())
    }

    fn read_all(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .cloned()
            .collect())
    }

    fn erase_all(&mut self) -> StorageResult<()> {
        self.lines.clear();
        Ok(())
    }
}

fn open_log_file(path: &Path) -> StorageResult<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| StorageError::io(parent, err))?;
    }

    OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(|err| StorageError::io(path, err))
}

fn ensure_single_line(line: &str) -> StorageResult<()> {
    if line.contains(['\n', '\r']) {
        return Err(StorageError::EmbeddedNewline);
    }
    Ok(())
}
