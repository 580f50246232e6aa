//! Stream-network topology over an arc attribute table.
//!
//! Given the arcs of a drainage network and each arc's local contributing
//! cell count, derive for every arc the cumulative and mean contributing
//! area, its Shreve magnitude, Strahler order and segment order, and the
//! ids of its downstream and principal upstream arcs.
//!
//! [`FieldMap::locate`] finds the items to read and write before anything
//! is touched; [`compute`] runs the propagation; [`Metrics::apply`] writes
//! the result back.

pub mod engine;
pub mod fields;
mod report;

pub use engine::{compute, run, ArcMetrics, ArcState, Metrics, DEFAULT_CELL_AREA};
pub use fields::{FieldMap, FieldNames, Slot};
pub use report::{TopologyReport, TopologyWarning, SAMPLE_LEN};
