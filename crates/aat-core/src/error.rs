//! Error types shared by the codec, catalog, and topology crates.

use thiserror::Error;

use crate::schema::FieldType;

/// The bytes on disk (or the schema describing them) do not match the
/// legacy table format.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("truncated {what}: expected {needed} byte(s)")]
    Truncated { what: String, needed: usize },

    #[error("item {field}: unrecognized type code {code}")]
    UnknownTypeTag { field: String, code: i16 },

    #[error("item {field}: date items are not supported")]
    UnsupportedDate { field: String },

    #[error("item {field}: width {width} is not valid for {kind} items")]
    UnsupportedWidth {
        field: String,
        kind: FieldType,
        width: usize,
    },

    #[error("item {field}: invalid byte 0x{byte:02x} at offset {offset} in integer text")]
    InvalidBcd {
        field: String,
        byte: u8,
        offset: usize,
    },

    #[error("item {field}: integer text {text:?} overflows")]
    BcdOverflow { field: String, text: String },

    #[error("item {field}: cannot parse {text:?} as a number")]
    InvalidNumeric { field: String, text: String },

    #[error("item {field}: {kind} item cannot hold a {found} value")]
    ValueMismatch {
        field: String,
        kind: FieldType,
        found: &'static str,
    },
}

/// A designated item could not be used by the topology engine.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("required item {name:?} is not present in this table")]
    RequiredFieldMissing { name: String },

    #[error("item {name:?} is a {kind} item; a numeric item is required")]
    NonNumericField { name: String, kind: FieldType },
}
