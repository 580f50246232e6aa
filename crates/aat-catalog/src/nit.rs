//! `info/arcNNNN.nit`: the item list of one table.
//!
//! A sequence of 144-byte item descriptors. The first seven describe the
//! default items; the width of the fifth (`LENGTH`) selects single or
//! double precision. The rest describe the user-defined items.
//!
//! ```text
//!   0..16   item name, space padded
//!  16..18   storage width, i16
//!  30..32   type code, i16 (1 D, 2 C, 3 I, 4 N, 5 B, 6 F)
//! ```

use std::path::Path;

use aat_core::{Field, FieldType, Precision, Schema, DEFAULT_ITEM_COUNT};

use crate::bytes::{be_i16, padded_text};
use crate::error::{ConfigurationError, Result};

/// Size of one item descriptor.
pub const ITEM_SIZE: usize = 144;

const NAME_LEN: usize = 16;
const LENGTH_ITEM: usize = 4;

/// One raw item descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDescriptor {
    pub name: String,
    pub width: i16,
    pub type_code: i16,
}

impl ItemDescriptor {
    pub fn new(name: impl Into<String>, width: i16, type_code: i16) -> Self {
        Self {
            name: name.into(),
            width,
            type_code,
        }
    }

    fn parse(bytes: &[u8], index: usize, path: &Path) -> Result<Self> {
        let unreadable =
            |what: &str| ConfigurationError::malformed(path, format!("item {index}: unreadable {what}"));
        let name = padded_text(bytes.get(..NAME_LEN).ok_or_else(|| unreadable("name"))?);
        let width = be_i16(bytes, 16).ok_or_else(|| unreadable("width"))?;
        let type_code = be_i16(bytes, 30).ok_or_else(|| unreadable("type"))?;
        Ok(Self {
            name,
            width,
            type_code,
        })
    }

    /// Encode as [`ITEM_SIZE`] bytes.
    pub fn to_bytes(&self) -> [u8; ITEM_SIZE] {
        let mut buf = [0u8; ITEM_SIZE];
        buf[..NAME_LEN].fill(b' ');
        for (d, s) in buf[..NAME_LEN].iter_mut().zip(self.name.bytes()) {
            *d = s;
        }
        buf[16..18].copy_from_slice(&self.width.to_be_bytes());
        buf[30..32].copy_from_slice(&self.type_code.to_be_bytes());
        buf
    }
}

/// The standard seven default items of an arc attribute table.
pub fn default_items(precision: Precision) -> Vec<ItemDescriptor> {
    let length_width = match precision {
        Precision::Single => 4,
        Precision::Double => 8,
    };
    vec![
        ItemDescriptor::new("FNODE#", 4, 5),
        ItemDescriptor::new("TNODE#", 4, 5),
        ItemDescriptor::new("LPOLY#", 4, 5),
        ItemDescriptor::new("RPOLY#", 4, 5),
        ItemDescriptor::new("LENGTH", length_width, 6),
        ItemDescriptor::new("COVER#", 4, 5),
        ItemDescriptor::new("COVER-ID", 4, 5),
    ]
}

/// Decode the schema and precision from an item list holding
/// `item_count` descriptors.
pub fn parse_item_list(data: &[u8], item_count: usize, path: &Path) -> Result<(Schema, Precision)> {
    if item_count < DEFAULT_ITEM_COUNT {
        return Err(ConfigurationError::malformed(
            path,
            format!("{item_count} items declared, at least {DEFAULT_ITEM_COUNT} required"),
        ));
    }
    let needed = item_count * ITEM_SIZE;
    if data.len() < needed {
        return Err(ConfigurationError::malformed(
            path,
            format!("{} bytes, {needed} needed for {item_count} items", data.len()),
        ));
    }

    let descriptors = data
        .chunks_exact(ITEM_SIZE)
        .take(item_count)
        .enumerate()
        .map(|(i, chunk)| ItemDescriptor::parse(chunk, i, path))
        .collect::<Result<Vec<_>>>()?;

    let precision = descriptors
        .get(LENGTH_ITEM)
        .map(|d| Precision::from_length_width(d.width))
        .unwrap_or_default();

    let mut fields = Vec::with_capacity(item_count - DEFAULT_ITEM_COUNT);
    for d in &descriptors[DEFAULT_ITEM_COUNT..] {
        let width = usize::try_from(d.width)
            .ok()
            .filter(|w| *w > 0)
            .ok_or_else(|| {
                ConfigurationError::malformed(path, format!("item {}: width {}", d.name, d.width))
            })?;
        let kind = FieldType::from_code(&d.name, d.type_code).map_err(|source| {
            ConfigurationError::Schema {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fields.push(Field::new(d.name.clone(), width, kind));
    }

    let schema = Schema::new(fields).map_err(|source| ConfigurationError::Schema {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((schema, precision))
}

/// Encode a full item list: the defaults followed by `extra`.
pub fn item_list_bytes(precision: Precision, extra: &[ItemDescriptor]) -> Vec<u8> {
    default_items(precision)
        .iter()
        .chain(extra)
        .flat_map(ItemDescriptor::to_bytes)
        .collect()
}
