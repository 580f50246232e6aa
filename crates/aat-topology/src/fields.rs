//! The eight items the engine reads and writes.

use aat_core::{FieldError, FieldType, Schema};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Item name prefixes for the engine's input and outputs.
///
/// Matched case-insensitively against the start of the declared item
/// names; the first declared match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    /// Input: local contributing area in cells.
    pub local: String,
    /// Output: contributing area at the downstream end.
    pub maxmsq: String,
    /// Output: mean of upstream-end and downstream-end area.
    pub meanmsq: String,
    pub shreve: String,
    pub strahler: String,
    pub segorder: String,
    /// Output: id of the downstream arc.
    pub downarc: String,
    /// Output: id of the largest-area upstream arc.
    pub uparc: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            local: "local".into(),
            maxmsq: "maxmsq".into(),
            meanmsq: "meanmsq".into(),
            shreve: "shreve".into(),
            strahler: "strahler".into(),
            segorder: "segorder".into(),
            downarc: "downarc".into(),
            uparc: "uparc".into(),
        }
    }
}

/// Position and type of one located item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    pub kind: FieldType,
}

/// Schema positions of the eight designated items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    pub local: Slot,
    pub maxmsq: Slot,
    pub meanmsq: Slot,
    pub shreve: Slot,
    pub strahler: Slot,
    pub segorder: Slot,
    pub downarc: Slot,
    pub uparc: Slot,
}

impl FieldMap {
    /// Locate every designated item in `schema`.
    ///
    /// Fails on the first missing or non-numeric item, before anything is
    /// mutated.
    pub fn locate(schema: &Schema, names: &FieldNames) -> Result<Self, FieldError> {
        let find = |name: &str| -> Result<Slot, FieldError> {
            let index = schema
                .find_prefix(name)
                .ok_or_else(|| FieldError::RequiredFieldMissing {
                    name: name.to_string(),
                })?;
            let field = &schema.fields()[index];
            if !field.kind.is_numeric() {
                return Err(FieldError::NonNumericField {
                    name: field.name.clone(),
                    kind: field.kind,
                });
            }
            debug!(item = name, index, kind = %field.kind, "located item");
            Ok(Slot {
                index,
                kind: field.kind,
            })
        };

        Ok(Self {
            local: find(&names.local)?,
            maxmsq: find(&names.maxmsq)?,
            meanmsq: find(&names.meanmsq)?,
            shreve: find(&names.shreve)?,
            strahler: find(&names.strahler)?,
            segorder: find(&names.segorder)?,
            downarc: find(&names.downarc)?,
            uparc: find(&names.uparc)?,
        })
    }
}
