//! Item list of an attribute table: field names, widths, and storage types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Storage type of an item, as coded in the INFO item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Code 1. Recognized so it can be rejected by name.
    Date,
    /// Code 2: space-padded text.
    Character,
    /// Code 3: right-justified ASCII integer.
    BcdInteger,
    /// Code 4: right-justified ASCII decimal.
    Numeric,
    /// Code 5: big-endian two's complement, 2 or 4 bytes.
    BinaryInt,
    /// Code 6: big-endian IEEE 754, 4 or 8 bytes.
    Float,
}

impl FieldType {
    /// Decode an INFO type code.
    pub fn from_code(field: &str, code: i16) -> Result<Self, FormatError> {
        match code {
            1 => Ok(FieldType::Date),
            2 => Ok(FieldType::Character),
            3 => Ok(FieldType::BcdInteger),
            4 => Ok(FieldType::Numeric),
            5 => Ok(FieldType::BinaryInt),
            6 => Ok(FieldType::Float),
            _ => Err(FormatError::UnknownTypeTag {
                field: field.to_string(),
                code,
            }),
        }
    }

    /// The INFO type code.
    pub fn code(self) -> i16 {
        match self {
            FieldType::Date => 1,
            FieldType::Character => 2,
            FieldType::BcdInteger => 3,
            FieldType::Numeric => 4,
            FieldType::BinaryInt => 5,
            FieldType::Float => 6,
        }
    }

    /// Whether values of this type are numbers.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            FieldType::BcdInteger | FieldType::Numeric | FieldType::BinaryInt | FieldType::Float
        )
    }

    /// Whether values of this type are held as integers.
    pub fn is_integer(self) -> bool {
        matches!(self, FieldType::BcdInteger | FieldType::BinaryInt)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Date => "date",
            FieldType::Character => "character",
            FieldType::BcdInteger => "integer",
            FieldType::Numeric => "numeric",
            FieldType::BinaryInt => "binary integer",
            FieldType::Float => "float",
        };
        f.write_str(name)
    }
}

/// Width of the `length` default item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Precision {
    /// 4-byte float.
    #[default]
    Single,
    /// 8-byte double.
    Double,
}

impl Precision {
    /// Precision implied by the stored width of the `length` item.
    pub fn from_length_width(width: i16) -> Self {
        if width == 8 {
            Precision::Double
        } else {
            Precision::Single
        }
    }

    /// Bytes used by the `length` item.
    pub fn length_width(self) -> usize {
        match self {
            Precision::Single => 4,
            Precision::Double => 8,
        }
    }
}

/// One user-defined item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Item name with trailing padding removed.
    pub name: String,
    /// Bytes occupied in every record.
    pub width: usize,
    /// Storage type.
    pub kind: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, width: usize, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            width,
            kind,
        }
    }

    /// Case-insensitive prefix match of `prefix` against this item's name.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.name
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }
}

/// Ordered item list of an attribute table.
///
/// Immutable once built; construction rejects item descriptions the codec
/// cannot encode at their declared width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

/// Bytes taken by the six 32-bit default items.
const DEFAULT_INT_BYTES: usize = 6 * 4;

impl Schema {
    /// Build a schema, validating every item.
    pub fn new(fields: Vec<Field>) -> Result<Self, FormatError> {
        for field in &fields {
            let width_ok = match field.kind {
                FieldType::Date => {
                    return Err(FormatError::UnsupportedDate {
                        field: field.name.clone(),
                    })
                }
                FieldType::BinaryInt => matches!(field.width, 2 | 4),
                FieldType::Float => matches!(field.width, 4 | 8),
                FieldType::Character | FieldType::BcdInteger | FieldType::Numeric => {
                    field.width > 0
                }
            };
            if !width_ok {
                return Err(FormatError::UnsupportedWidth {
                    field: field.name.clone(),
                    kind: field.kind,
                    width: field.width,
                });
            }
        }
        Ok(Self { fields })
    }

    /// Items in declared order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Item at `index`, if any.
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Number of user-defined items.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sum of the widths of all user-defined items.
    pub fn extra_width(&self) -> usize {
        self.fields.iter().map(|f| f.width).sum()
    }

    /// Records carry one trailing pad byte when the extra width is odd.
    pub fn needs_pad(&self) -> bool {
        self.extra_width() % 2 == 1
    }

    /// Total bytes in one encoded record at the given `length` precision.
    pub fn record_len(&self, precision: Precision) -> usize {
        DEFAULT_INT_BYTES
            + precision.length_width()
            + self.extra_width()
            + usize::from(self.needs_pad())
    }

    /// Index of the first item whose name starts with `prefix`, ignoring case.
    pub fn find_prefix(&self, prefix: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.matches_prefix(prefix))
    }
}

/// Everything needed to decode a table: item list, `length` precision, and
/// record count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    pub schema: Schema,
    pub precision: Precision,
    pub record_count: usize,
}

impl TableLayout {
    pub fn new(schema: Schema, precision: Precision, record_count: usize) -> Self {
        Self {
            schema,
            precision,
            record_count,
        }
    }

    /// Bytes per encoded record.
    pub fn record_len(&self) -> usize {
        self.schema.record_len(self.precision)
    }

    /// Bytes in the whole encoded table.
    pub fn table_len(&self) -> usize {
        self.record_len() * self.record_count
    }
}
