//! The decoded table and arc adjacency derived from node identifiers.
//!
//! Arc `i` is upstream of arc `j` when `to_node(i) == from_node(j)`. An arc
//! has at most one downstream arc (the first match in table order) but may
//! have any number of upstream arcs. Every query returns arcs in ascending
//! table order; the topology rules break ties on that order.

use std::collections::HashMap;

use crate::record::{ArcRecord, NodeId};

/// All records of one attribute table, in table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    records: Vec<ArcRecord>,
}

impl Network {
    pub fn new(records: Vec<ArcRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ArcRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ArcRecord> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ArcRecord> {
        self.records.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArcRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ArcRecord> {
        self.records.iter_mut()
    }

    /// Build the node-keyed adjacency index in one pass.
    pub fn adjacency(&self) -> AdjacencyIndex {
        AdjacencyIndex::build(&self.records)
    }
}

impl FromIterator<ArcRecord> for Network {
    fn from_iter<I: IntoIterator<Item = ArcRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Precomputed node → arcs index.
///
/// Lists are filled in ascending record order, so they reproduce the
/// encounter order of a full scan.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    ends: Vec<(NodeId, NodeId)>,
    /// Node -> arcs ending at it.
    incoming: HashMap<NodeId, Vec<usize>>,
    /// Node -> arcs starting at it.
    outgoing: HashMap<NodeId, Vec<usize>>,
}

impl AdjacencyIndex {
    pub fn build(records: &[ArcRecord]) -> Self {
        let mut index = Self {
            ends: Vec::with_capacity(records.len()),
            ..Self::default()
        };
        for (i, rec) in records.iter().enumerate() {
            index.ends.push((rec.from_node, rec.to_node));
            index.incoming.entry(rec.to_node).or_default().push(i);
            index.outgoing.entry(rec.from_node).or_default().push(i);
        }
        index
    }

    /// Number of arcs indexed.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Arcs whose end node is the start node of arc `index`.
    pub fn upstream(&self, index: usize) -> &[usize] {
        self.ends
            .get(index)
            .and_then(|(from, _)| self.incoming.get(from))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First arc whose start node is the end node of arc `index`.
    pub fn downstream(&self, index: usize) -> Option<usize> {
        let (_, to) = self.ends.get(index)?;
        self.outgoing.get(to).and_then(|arcs| arcs.first().copied())
    }

    /// Whether no arc flows into arc `index`.
    pub fn is_source(&self, index: usize) -> bool {
        self.upstream(index).is_empty()
    }
}
