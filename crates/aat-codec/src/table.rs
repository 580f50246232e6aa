//! Whole-table reading and writing.
//!
//! A table file is `record_count` encoded records back to back with no
//! header. Rewriting encodes every record in memory first and replaces the
//! file through a sibling temporary file, so an encoding failure or an
//! interrupted write never leaves a partially overwritten table. The
//! replacement keeps the permissions of the file it replaces, and a
//! symbolic link is written through rather than replaced.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use aat_core::{Network, TableLayout};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{CodecError, Result};
use crate::record::{decode_record, encode_record, encode_to_vec};

/// Decode exactly `layout.record_count` records from `reader`.
pub fn read_table<R: Read>(reader: &mut R, layout: &TableLayout) -> Result<Network> {
    let mut records = Vec::with_capacity(layout.record_count);
    for index in 0..layout.record_count {
        let record = decode_record(reader, &layout.schema, layout.precision)
            .map_err(|e| e.at_record(index))?;
        records.push(record);
    }
    Ok(Network::new(records))
}

/// Encode `network` into a byte buffer.
pub fn encode_table(network: &Network, layout: &TableLayout) -> Result<Vec<u8>> {
    if network.len() != layout.record_count {
        return Err(CodecError::RecordCount {
            expected: layout.record_count,
            found: network.len(),
        });
    }
    let mut buf = Vec::with_capacity(layout.table_len());
    for (index, record) in network.iter().enumerate() {
        let bytes = encode_to_vec(record, &layout.schema, layout.precision)
            .map_err(|source| CodecError::Record { index, source })?;
        buf.extend_from_slice(&bytes);
    }
    Ok(buf)
}

/// Encode `network` record by record into `writer`.
///
/// Unlike [`encode_table`] this streams, so a failing record leaves the
/// records before it already written.
pub fn write_table<W: Write>(writer: &mut W, network: &Network, layout: &TableLayout) -> Result<()> {
    if network.len() != layout.record_count {
        return Err(CodecError::RecordCount {
            expected: layout.record_count,
            found: network.len(),
        });
    }
    for (index, record) in network.iter().enumerate() {
        encode_record(writer, record, &layout.schema, layout.precision)
            .map_err(|e| e.at_record(index))?;
    }
    Ok(())
}

/// Load a table file.
pub fn load(path: &Path, layout: &TableLayout) -> Result<Network> {
    let file = File::open(path)?;
    let actual = file.metadata()?.len();
    let expected = layout.table_len() as u64;
    if actual > expected {
        warn!(
            path = %path.display(),
            actual,
            expected,
            "table file is longer than its declared record count; trailing bytes ignored"
        );
    }

    let mut reader = BufReader::new(file);
    let network = read_table(&mut reader, layout)?;
    info!(
        path = %path.display(),
        records = network.len(),
        record_len = layout.record_len(),
        "loaded attribute table"
    );
    Ok(network)
}

/// Replace the table file at `path` with the encoding of `network`.
pub fn rewrite(path: &Path, network: &Network, layout: &TableLayout) -> Result<()> {
    let buf = encode_table(network, layout)?;

    let target = resolve_target(path)?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&buf)?;
    match fs::metadata(&target) {
        Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    tmp.as_file().sync_all()?;
    debug!(tmp = %tmp.path().display(), bytes = buf.len(), "staged table rewrite");

    tmp.persist(&target).map_err(|e| CodecError::Io(e.error))?;
    info!(path = %path.display(), records = network.len(), "rewrote attribute table");
    Ok(())
}

/// The file a rewrite of `path` should replace: the end of any symlink
/// chain, or `path` itself when nothing exists there yet.
fn resolve_target(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(real) => Ok(real),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aat_core::{ArcRecord, Field, FieldType, FormatError, Precision, Schema, Value};

    fn layout(count: usize) -> TableLayout {
        let schema = Schema::new(vec![
            Field::new("LOCAL", 5, FieldType::BcdInteger),
            Field::new("MAXMSQ", 4, FieldType::BinaryInt),
        ])
        .unwrap();
        TableLayout::new(schema, Precision::Double, count)
    }

    fn network() -> Network {
        (0..3)
            .map(|i| {
                ArcRecord::new(i + 1, i, i + 1)
                    .with_value(0, Value::Int(i64::from(i) * 10))
                    .with_value(1, Value::Int(0))
            })
            .collect()
    }

    #[test]
    fn write_then_read() {
        let layout = layout(3);
        let net = network();
        let mut buf = Vec::new();
        write_table(&mut buf, &net, &layout).unwrap();
        assert_eq!(buf.len(), layout.table_len());

        let loaded = read_table(&mut buf.as_slice(), &layout).unwrap();
        assert_eq!(loaded, net);
    }

    #[test]
    fn short_table_reports_record() {
        let layout = layout(3);
        let mut buf = Vec::new();
        write_table(&mut buf, &network(), &layout).unwrap();
        buf.truncate(layout.record_len() * 2 + 5);

        let err = read_table(&mut buf.as_slice(), &layout).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Record {
                index: 2,
                source: FormatError::Truncated { .. }
            }
        ));
    }

    #[test]
    fn count_mismatch_rejected() {
        let err = encode_table(&network(), &layout(4)).unwrap_err();
        assert!(matches!(
            err,
            CodecError::RecordCount {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn rewrite_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aat.adf");
        let layout = layout(3);

        std::fs::write(&path, encode_table(&network(), &layout).unwrap()).unwrap();
        let mut net = load(&path, &layout).unwrap();
        assert_eq!(net.len(), 3);

        if let Some(rec) = net.get_mut(1) {
            rec.set_value(1, Value::Int(22500));
        }
        rewrite(&path, &net, &layout).unwrap();

        let reloaded = load(&path, &layout).unwrap();
        assert_eq!(reloaded, net);
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            layout.table_len() as u64
        );
    }

    #[test]
    fn failed_encode_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aat.adf");
        let layout = layout(3);
        let original = encode_table(&network(), &layout).unwrap();
        std::fs::write(&path, &original).unwrap();

        let mut net = network();
        if let Some(rec) = net.get_mut(2) {
            rec.set_value(0, Value::Float(1.0));
        }
        let err = rewrite(&path, &net, &layout).unwrap_err();
        assert!(matches!(err, CodecError::Record { index: 2, .. }));
        assert_eq!(std::fs::read(&path).unwrap(), original);
    }

    #[test]
    fn write_table_reports_failing_record() {
        let mut net = network();
        if let Some(rec) = net.get_mut(1) {
            rec.set_value(1, Value::Text("x".into()));
        }
        let layout = layout(3);
        let mut buf = Vec::new();
        let err = write_table(&mut buf, &net, &layout).unwrap_err();
        assert!(matches!(err, CodecError::Record { index: 1, .. }));
        assert_eq!(buf.len(), layout.record_len());
    }

    #[test]
    fn write_table_matches_encode_table() {
        let layout = layout(3);
        let mut buf = Vec::new();
        write_table(&mut buf, &network(), &layout).unwrap();
        assert_eq!(buf, encode_table(&network(), &layout).unwrap());
    }

    #[test]
    fn rewrite_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aat.adf");
        let layout = layout(3);
        rewrite(&path, &network(), &layout).unwrap();
        assert_eq!(load(&path, &layout).unwrap(), network());
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aat.adf");
        let layout = layout(3);
        std::fs::write(&path, encode_table(&network(), &layout).unwrap()).unwrap();
        for mode in [0o644, 0o664] {
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
            rewrite(&path, &network(), &layout).unwrap();
            let meta = std::fs::metadata(&path).unwrap();
            assert_eq!(meta.permissions().mode() & 0o777, mode);
        }
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_writes_through_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("aat.adf");
        let link = dir.path().join("aat.link");
        let layout = layout(3);
        std::fs::write(&real, encode_table(&network(), &layout).unwrap()).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let mut net = network();
        if let Some(rec) = net.get_mut(0) {
            rec.set_value(1, Value::Int(900));
        }
        rewrite(&link, &net, &layout).unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(load(&real, &layout).unwrap(), net);
    }
}
