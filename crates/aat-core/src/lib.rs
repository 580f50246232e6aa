//! Core data model for ARC/INFO arc attribute tables (AAT).
//!
//! An AAT stores one fixed-layout record per arc of a line coverage. Seven
//! default items (from/to node, left/right polygon, length, record number,
//! cover id) are followed by the user-defined items described by a
//! [`Schema`]. A [`Network`] is the decoded table held in memory; arc
//! adjacency is derived from node identifiers and never stored.

pub mod error;
pub mod network;
pub mod record;
pub mod schema;
pub mod value;

pub use error::{FieldError, FormatError};
pub use network::{AdjacencyIndex, Network};
pub use record::{ArcId, ArcRecord, NodeId, DEFAULT_ITEM_COUNT, NO_ARC};
pub use schema::{Field, FieldType, Precision, Schema, TableLayout};
pub use value::Value;
