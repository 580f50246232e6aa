//! Outcome of one engine run.

use serde::Serialize;
use thiserror::Error;

/// The propagation stopped before every arc was resolved.
///
/// Non-fatal: the unresolved arcs keep tentative values and the table is
/// still written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{unresolved} of {total} arcs unresolved (cycle or dangling arcs); first unresolved ids: {sample:?}")]
pub struct TopologyWarning {
    pub unresolved: usize,
    pub total: usize,
    /// Ids of up to [`SAMPLE_LEN`] unresolved arcs, in table order.
    pub sample: Vec<i32>,
}

/// Number of arc ids quoted in a [`TopologyWarning`].
pub const SAMPLE_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TopologyReport {
    pub total: usize,
    pub sources: usize,
    /// Propagation rounds executed, the final unproductive one included.
    pub rounds: usize,
    pub resolved: usize,
    /// Table indices of arcs left unresolved.
    pub unresolved: Vec<usize>,
    /// Ids of the arcs at `unresolved`, same order.
    #[serde(skip)]
    pub(crate) unresolved_ids: Vec<i32>,
}

impl TopologyReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn warning(&self) -> Option<TopologyWarning> {
        if self.is_complete() {
            return None;
        }
        Some(TopologyWarning {
            unresolved: self.unresolved.len(),
            total: self.total,
            sample: self.unresolved_ids.iter().take(SAMPLE_LEN).copied().collect(),
        })
    }
}
