//! One decoded arc record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Node identifier stored in the from/to node items.
pub type NodeId = i32;

/// Cover id of an arc (the `id` default item).
pub type ArcId = i32;

/// Reference value meaning "no such arc" in `downarc`/`uparc`.
pub const NO_ARC: ArcId = -1;

/// Number of default items preceding the user-defined items.
pub const DEFAULT_ITEM_COUNT: usize = 7;

/// An arc: the seven default items plus user-defined item values keyed by
/// schema index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArcRecord {
    pub from_node: NodeId,
    pub to_node: NodeId,
    pub left_polygon: i32,
    pub right_polygon: i32,
    /// Stored as 4 or 8 bytes depending on the table precision.
    pub length: f64,
    /// The stored record-number item; not necessarily the table position.
    pub record_number: i32,
    pub id: ArcId,
    pub extra: BTreeMap<usize, Value>,
}

impl ArcRecord {
    /// A record with the given topology and no item values.
    pub fn new(id: ArcId, from_node: NodeId, to_node: NodeId) -> Self {
        Self {
            id,
            from_node,
            to_node,
            ..Self::default()
        }
    }

    /// Builder-style setter for an item value.
    pub fn with_value(mut self, field: usize, value: Value) -> Self {
        self.extra.insert(field, value);
        self
    }

    pub fn value(&self, field: usize) -> Option<&Value> {
        self.extra.get(&field)
    }

    pub fn set_value(&mut self, field: usize, value: Value) {
        self.extra.insert(field, value);
    }

    /// Numeric view of an item; `None` if absent or textual.
    pub fn number(&self, field: usize) -> Option<f64> {
        self.value(field).and_then(Value::as_f64)
    }
}
