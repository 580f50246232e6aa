//! Catalog lookup errors.

use std::io;
use std::path::PathBuf;

use aat_core::FormatError;
use thiserror::Error;

/// The table could not be located or its description could not be used.
///
/// Raised before any record is read.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("table {table} not found in {catalog}")]
    NotFound { table: String, catalog: PathBuf },

    #[error("malformed descriptor {path}: {detail}")]
    MalformedDescriptor { path: PathBuf, detail: String },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("item list {path}: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

impl ConfigurationError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        ConfigurationError::MalformedDescriptor {
            path: path.into(),
            detail: detail.into(),
        }
    }
}
