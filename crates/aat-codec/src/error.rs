//! Codec errors.

use std::io;

use aat_core::FormatError;
use thiserror::Error;

/// Errors raised while reading or writing an attribute table.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: FormatError,
    },

    #[error("table holds {found} records, layout declares {expected}")]
    RecordCount { expected: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;

impl CodecError {
    /// Attach a record index to a format error.
    pub(crate) fn at_record(self, index: usize) -> Self {
        match self {
            CodecError::Format(source) => CodecError::Record { index, source },
            other => other,
        }
    }
}
