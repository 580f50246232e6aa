//! Encoding and decoding of single records.
//!
//! All binary quantities are big-endian. The `length` precision is passed
//! explicitly on every call; there is no ambient format state.

use std::io::{self, Read, Write};

use aat_core::{ArcRecord, Field, FieldType, FormatError, Precision, Schema, Value};
use tracing::warn;

use crate::error::{CodecError, Result};
use crate::text;

/// Pad byte written after records whose item widths sum to an odd number.
pub const PAD_BYTE: u8 = 0;

/// Thin wrapper turning short reads into [`FormatError::Truncated`].
struct ItemReader<'r, R> {
    inner: &'r mut R,
}

impl<R: Read> ItemReader<'_, R> {
    fn bytes(&mut self, len: usize, what: &str) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.fill(&mut buf, what)?;
        Ok(buf)
    }

    fn array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill(&mut buf, what)?;
        Ok(buf)
    }

    fn fill(&mut self, buf: &mut [u8], what: &str) -> Result<()> {
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                CodecError::Format(FormatError::Truncated {
                    what: what.to_string(),
                    needed: buf.len(),
                })
            } else {
                CodecError::Io(e)
            }
        })
    }

    fn i16(&mut self, what: &str) -> Result<i16> {
        self.array(what).map(i16::from_be_bytes)
    }

    fn i32(&mut self, what: &str) -> Result<i32> {
        self.array(what).map(i32::from_be_bytes)
    }

    fn f32(&mut self, what: &str) -> Result<f32> {
        self.array(what).map(f32::from_be_bytes)
    }

    fn f64(&mut self, what: &str) -> Result<f64> {
        self.array(what).map(f64::from_be_bytes)
    }
}

/// Decode one record: the seven default items, every schema item in
/// declared order, then the pad byte if the item widths sum to an odd
/// number.
pub fn decode_record<R: Read>(
    reader: &mut R,
    schema: &Schema,
    precision: Precision,
) -> Result<ArcRecord> {
    let mut r = ItemReader { inner: reader };

    let from_node = r.i32("fnode")?;
    let to_node = r.i32("tnode")?;
    let left_polygon = r.i32("lpoly")?;
    let right_polygon = r.i32("rpoly")?;
    let length = match precision {
        Precision::Single => f64::from(r.f32("length")?),
        Precision::Double => r.f64("length")?,
    };
    let record_number = r.i32("record number")?;
    let id = r.i32("id")?;

    let mut record = ArcRecord {
        from_node,
        to_node,
        left_polygon,
        right_polygon,
        length,
        record_number,
        id,
        ..ArcRecord::default()
    };

    for (index, field) in schema.fields().iter().enumerate() {
        let value = decode_item(&mut r, field)?;
        record.extra.insert(index, value);
    }

    if schema.needs_pad() {
        r.array::<1>("pad byte")?;
    }

    Ok(record)
}

fn decode_item<R: Read>(r: &mut ItemReader<'_, R>, field: &Field) -> Result<Value> {
    let what = format!("item {}", field.name);
    let value = match field.kind {
        FieldType::Character => Value::Text(text::latin1_decode(&r.bytes(field.width, &what)?)),
        FieldType::BcdInteger => {
            let raw = r.bytes(field.width, &what)?;
            Value::Int(text::parse_bcd(&field.name, &raw)?)
        }
        FieldType::Numeric => {
            let raw = r.bytes(field.width, &what)?;
            Value::Float(text::parse_numeric(&field.name, &raw)?)
        }
        FieldType::BinaryInt => {
            if field.width == 4 {
                Value::Int(i64::from(r.i32(&what)?))
            } else {
                Value::Int(i64::from(r.i16(&what)?))
            }
        }
        FieldType::Float => {
            if field.width == 4 {
                Value::Float(f64::from(r.f32(&what)?))
            } else {
                Value::Float(r.f64(&what)?)
            }
        }
        FieldType::Date => {
            return Err(FormatError::UnsupportedDate {
                field: field.name.clone(),
            }
            .into())
        }
    };
    Ok(value)
}

/// Encode one record; the inverse of [`decode_record`].
///
/// Items missing from the record are written as the zero value of their
/// type.
pub fn encode_record<W: Write>(
    writer: &mut W,
    record: &ArcRecord,
    schema: &Schema,
    precision: Precision,
) -> Result<()> {
    let buf = encode_to_vec(record, schema, precision)?;
    writer.write_all(&buf)?;
    Ok(())
}

/// Encode one record into a fresh buffer of exactly `schema.record_len(precision)` bytes.
pub fn encode_to_vec(
    record: &ArcRecord,
    schema: &Schema,
    precision: Precision,
) -> std::result::Result<Vec<u8>, FormatError> {
    let mut buf = Vec::with_capacity(schema.record_len(precision));

    buf.extend_from_slice(&record.from_node.to_be_bytes());
    buf.extend_from_slice(&record.to_node.to_be_bytes());
    buf.extend_from_slice(&record.left_polygon.to_be_bytes());
    buf.extend_from_slice(&record.right_polygon.to_be_bytes());
    match precision {
        Precision::Single => buf.extend_from_slice(&(record.length as f32).to_be_bytes()),
        Precision::Double => buf.extend_from_slice(&record.length.to_be_bytes()),
    }
    buf.extend_from_slice(&record.record_number.to_be_bytes());
    buf.extend_from_slice(&record.id.to_be_bytes());

    for (index, field) in schema.fields().iter().enumerate() {
        let zero;
        let value = match record.value(index) {
            Some(v) => v,
            None => {
                zero = Value::zero(field.kind);
                &zero
            }
        };
        encode_item(&mut buf, field, value, record.id)?;
    }

    if schema.needs_pad() {
        buf.push(PAD_BYTE);
    }

    Ok(buf)
}

fn encode_item(
    buf: &mut Vec<u8>,
    field: &Field,
    value: &Value,
    arc_id: i32,
) -> std::result::Result<(), FormatError> {
    let mismatch = || FormatError::ValueMismatch {
        field: field.name.clone(),
        kind: field.kind,
        found: value.variant_name(),
    };

    match (field.kind, value) {
        (FieldType::Character, Value::Text(s)) => {
            buf.extend_from_slice(&text::latin1_encode(s, field.width));
        }
        (FieldType::BcdInteger, Value::Int(i)) => {
            push_justified(buf, field, &i.to_string(), arc_id);
        }
        (FieldType::Numeric, Value::Float(f)) => {
            push_justified(buf, field, &text::render_numeric(*f), arc_id);
        }
        (FieldType::BinaryInt, Value::Int(i)) => {
            let fits = if field.width == 4 {
                i32::try_from(*i).is_ok()
            } else {
                i16::try_from(*i).is_ok()
            };
            if !fits {
                warn!(
                    item = %field.name,
                    width = field.width,
                    value = *i,
                    arc = arc_id,
                    "value does not fit its binary item; only the low bits are stored"
                );
            }
            // Low bits are kept either way.
            if field.width == 4 {
                buf.extend_from_slice(&(*i as i32).to_be_bytes());
            } else {
                buf.extend_from_slice(&(*i as i16).to_be_bytes());
            }
        }
        (FieldType::Float, Value::Float(f)) => {
            if field.width == 4 {
                buf.extend_from_slice(&(*f as f32).to_be_bytes());
            } else {
                buf.extend_from_slice(&f.to_be_bytes());
            }
        }
        (FieldType::Date, _) => {
            return Err(FormatError::UnsupportedDate {
                field: field.name.clone(),
            })
        }
        _ => return Err(mismatch()),
    }
    Ok(())
}

fn push_justified(buf: &mut Vec<u8>, field: &Field, rendered: &str, arc_id: i32) {
    let (bytes, truncated) = text::right_justify(rendered, field.width);
    if truncated {
        warn!(
            item = %field.name,
            width = field.width,
            text = rendered,
            arc = arc_id,
            "value is wider than its item; stored text is truncated"
        );
    }
    buf.extend_from_slice(&bytes);
}
