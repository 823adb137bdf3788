//! Store location configuration.
//!
//! # Responsibility
//! - Resolve where the record log and identifier log live.
//! - Reject ambiguous locations before any file is touched.
//!
//! # Invariants
//! - `data_dir` is absolute.
//! - Log file names are bare names, non-empty and distinct.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_RECORDS_FILE: &str = "invoices.json";
pub const DEFAULT_IDS_FILE: &str = "ids.txt";
/// Environment variable read by [`StoreConfig::from_env`].
pub const DATA_DIR_ENV: &str = "INVOICING_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDataDir,
    RelativeDataDir(String),
    InvalidFileName(String),
    DuplicateFileName(String),
    MissingEnv(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDataDir => write!(f, "data_dir cannot be empty"),
            Self::RelativeDataDir(value) => {
                write!(f, "data_dir must be an absolute path, got `{value}`")
            }
            Self::InvalidFileName(value) => {
                write!(f, "log file name `{value}` must be a bare, non-empty file name")
            }
            Self::DuplicateFileName(value) => write!(
                f,
                "record log and identifier log cannot share the file name `{value}`"
            ),
            Self::MissingEnv(name) => write!(f, "environment variable `{name}` is not set"),
        }
    }
}

impl Error for ConfigError {}

/// Locations of the two logs backing a file-based repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    data_dir: PathBuf,
    records_file_name: String,
    ids_file_name: String,
}

impl StoreConfig {
    /// Builds a config rooted at `data_dir` with default log file names.
    ///
    /// # Errors
    /// - Returns an error when `data_dir` is empty or not absolute.
    pub fn new(data_dir: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            data_dir: normalize_data_dir(data_dir)?,
            records_file_name: DEFAULT_RECORDS_FILE.to_string(),
            ids_file_name: DEFAULT_IDS_FILE.to_string(),
        })
    }

    /// Reads the data directory from [`DATA_DIR_ENV`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let value =
            std::env::var(DATA_DIR_ENV).map_err(|_| ConfigError::MissingEnv(DATA_DIR_ENV))?;
        Self::new(&value)
    }

    /// Overrides both log file names.
    pub fn with_file_names(
        mut self,
        records_file_name: &str,
        ids_file_name: &str,
    ) -> Result<Self, ConfigError> {
        let records = normalize_file_name(records_file_name)?;
        let ids = normalize_file_name(ids_file_name)?;
        if records == ids {
            return Err(ConfigError::DuplicateFileName(records));
        }

        self.records_file_name = records;
        self.ids_file_name = ids;
        Ok(self)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(&self.records_file_name)
    }

    pub fn ids_path(&self) -> PathBuf {
        self.data_dir.join(&self.ids_file_name)
    }
}

fn normalize_data_dir(data_dir: &str) -> Result<PathBuf, ConfigError> {
    let trimmed = data_dir.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyDataDir);
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(ConfigError::RelativeDataDir(trimmed.to_string()));
    }
    Ok(path.to_path_buf())
}

fn normalize_file_name(name: &str) -> Result<String, ConfigError> {
    let trimmed = name.trim();
    let is_bare = !trimmed.is_empty()
        && trimmed != "."
        && trimmed != ".."
        && !trimmed.contains(['/', '\\']);
    if !is_bare {
        return Err(ConfigError::InvalidFileName(name.to_string()));
    }
    Ok(trimmed.to_string())
}
