//! `info/arc.dir`: the table directory of an INFO workspace.
//!
//! The file is a sequence of fixed 380-byte entries, one per table:
//!
//! ```text
//!   0..32   table name, space padded ("STREAMS.AAT")
//!  32..35   "ARC"
//!  35..39   table number ("0001"), names info/arc0001.nit and .dat
//!  39       blank
//!  40..42   item count, i16
//!  42..44   record length, i16
//!  44..62   reserved
//!  62..64   deleted flag, i16 (non-zero: entry is dead)
//!  64..68   record count, i32
//!  68..380  reserved
//! ```

use std::path::Path;

use tracing::debug;

use crate::bytes::{be_i16, be_i32, padded_text};
use crate::error::{ConfigurationError, Result};

/// Size of one directory entry.
pub const ENTRY_SIZE: usize = 380;

const NAME_LEN: usize = 32;

/// One live or deleted table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Table name, e.g. `STREAMS.AAT`.
    pub name: String,
    /// Four-character table number.
    pub number: String,
    /// Total items including the seven defaults.
    pub item_count: i16,
    pub record_length: i16,
    pub deleted: bool,
    pub record_count: i32,
}

impl DirEntry {
    /// Decode one entry from exactly [`ENTRY_SIZE`] bytes.
    pub fn parse(bytes: &[u8], path: &Path) -> Result<Self> {
        if bytes.len() < ENTRY_SIZE {
            return Err(ConfigurationError::malformed(
                path,
                format!("short entry ({} of {ENTRY_SIZE} bytes)", bytes.len()),
            ));
        }
        let field = |what: &str| ConfigurationError::malformed(path, format!("unreadable {what}"));

        let name = padded_text(&bytes[..NAME_LEN]);
        let number = padded_text(&bytes[35..39]);
        let item_count = be_i16(bytes, 40).ok_or_else(|| field("item count"))?;
        let record_length = be_i16(bytes, 42).ok_or_else(|| field("record length"))?;
        let deleted = be_i16(bytes, 62).ok_or_else(|| field("deleted flag"))? != 0;
        let record_count = be_i32(bytes, 64).ok_or_else(|| field("record count"))?;

        Ok(Self {
            name,
            number,
            item_count,
            record_length,
            deleted,
            record_count,
        })
    }

    /// Encode this entry as [`ENTRY_SIZE`] bytes.
    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut buf = [b' '; ENTRY_SIZE];
        put_text(&mut buf[..NAME_LEN], &self.name);
        buf[32..35].copy_from_slice(b"ARC");
        put_text(&mut buf[35..39], &self.number);
        buf[40..42].copy_from_slice(&self.item_count.to_be_bytes());
        buf[42..44].copy_from_slice(&self.record_length.to_be_bytes());
        buf[44..62].fill(0);
        buf[62..64].copy_from_slice(&i16::from(self.deleted).to_be_bytes());
        buf[64..68].copy_from_slice(&self.record_count.to_be_bytes());
        buf[68..].fill(0);
        buf
    }

    /// File name of this table's item list, relative to the info directory.
    pub fn item_file(&self) -> String {
        format!("arc{}.nit", self.number)
    }
}

fn put_text(dst: &mut [u8], text: &str) {
    for (d, s) in dst.iter_mut().zip(text.bytes()) {
        *d = s;
    }
}

/// Find the live entry named `table` (compared case-insensitively).
///
/// Entries are scanned in file order and deleted entries are skipped. A
/// trailing partial entry is ignored.
pub fn find_entry(data: &[u8], table: &str, path: &Path) -> Result<Option<DirEntry>> {
    for chunk in data.chunks_exact(ENTRY_SIZE) {
        let entry = DirEntry::parse(chunk, path)?;
        if !entry.name.eq_ignore_ascii_case(table) {
            continue;
        }
        if entry.deleted {
            debug!(table, number = %entry.number, "skipping deleted catalog entry");
            continue;
        }
        return Ok(Some(entry));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, number: &str, deleted: bool) -> DirEntry {
        DirEntry {
            name: name.into(),
            number: number.into(),
            item_count: 9,
            record_length: 40,
            deleted,
            record_count: 12,
        }
    }

    fn catalog(entries: &[DirEntry]) -> Vec<u8> {
        entries.iter().flat_map(|e| e.to_bytes()).collect()
    }

    #[test]
    fn entry_round_trip() {
        let e = entry("STREAMS.AAT", "0007", false);
        let bytes = e.to_bytes();
        assert_eq!(&bytes[32..35], b"ARC");
        let parsed = DirEntry::parse(&bytes, Path::new("arc.dir")).unwrap();
        assert_eq!(parsed, e);
        assert_eq!(parsed.item_file(), "arc0007.nit");
    }

    #[test]
    fn finds_live_entry_case_insensitively() {
        let data = catalog(&[
            entry("ROADS.AAT", "0001", false),
            entry("STREAMS.AAT", "0002", true),
            entry("STREAMS.AAT", "0003", false),
        ]);
        let found = find_entry(&data, "streams.aat", Path::new("arc.dir"))
            .unwrap()
            .unwrap();
        assert_eq!(found.number, "0003");
    }

    #[test]
    fn name_must_match_exactly() {
        let data = catalog(&[entry("STREAMS.AATX", "0001", false)]);
        assert!(find_entry(&data, "STREAMS.AAT", Path::new("arc.dir"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn missing_table() {
        let mut data = catalog(&[entry("ROADS.AAT", "0001", false)]);
        data.extend_from_slice(&[0u8; 17]);
        assert!(find_entry(&data, "STREAMS.AAT", Path::new("arc.dir"))
            .unwrap()
            .is_none());
    }
}
