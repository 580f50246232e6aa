//! Fixed-point propagation of contributing area and stream orders.
//!
//! Sources (arcs nothing flows into) seed the propagation. In round `r`,
//! every arc resolved in round `r - 1` offers its downstream arc; that arc
//! resolves once all arcs ending at its from-node are resolved. Rounds
//! stop when one resolves nothing or every arc is resolved.
//!
//! Merging at a confluence walks the upstream arcs in table order:
//!
//! ```text
//!   area      local + sum of upstream areas
//!   shreve    sum of upstream shreve
//!   strahler  seed with the first; +1 on equal, take the larger otherwise
//!   segorder  seed with first + 1; any upstream >= running value bumps it
//!   uparc     first arc with the strictly largest area
//! ```

use aat_core::{ArcId, Network, Value, NO_ARC};
use tracing::{debug, info, warn};

use crate::fields::{FieldMap, Slot};
use crate::report::TopologyReport;

/// Area of one local cell in square metres (150 m cells).
pub const DEFAULT_CELL_AREA: f64 = 22_500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcState {
    Pending,
    /// Nothing flows into the arc.
    Source,
    /// Waiting on upstream arcs; holds the last round that examined it.
    AwaitingUpstream(usize),
    /// Resolved in the given round. Sources resolve in round 0.
    Resolved(usize),
}

impl ArcState {
    pub fn is_resolved(self) -> bool {
        matches!(self, ArcState::Resolved(_))
    }
}

/// Derived values for one arc, areas still in cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcMetrics {
    pub id: ArcId,
    pub state: ArcState,
    pub local: f64,
    /// Contributing cells at the downstream end, `local` included.
    pub cumulative: f64,
    pub shreve: i64,
    pub strahler: i64,
    pub segment_order: i64,
    /// Table index of the downstream arc.
    pub downstream: Option<usize>,
    pub down_arc: ArcId,
    pub principal_upstream: ArcId,
}

impl ArcMetrics {
    fn new(id: ArcId, local: f64, downstream: Option<usize>, down_arc: ArcId) -> Self {
        Self {
            id,
            state: ArcState::Pending,
            local,
            cumulative: local,
            shreve: 0,
            strahler: 0,
            segment_order: 0,
            downstream,
            down_arc,
            principal_upstream: NO_ARC,
        }
    }

    /// Contributing area at the downstream end.
    pub fn max_area(&self, cell_area: f64) -> f64 {
        self.cumulative * cell_area
    }

    /// Mean of the upstream-end and downstream-end contributing areas.
    pub fn mean_area(&self, cell_area: f64) -> f64 {
        self.max_area(cell_area) - self.local * (cell_area / 2.0)
    }
}

/// Result of [`compute`], not yet written to any record.
#[derive(Debug, Clone)]
pub struct Metrics {
    arcs: Vec<ArcMetrics>,
    report: TopologyReport,
}

impl Metrics {
    /// Per-arc values, in table order.
    pub fn arcs(&self) -> &[ArcMetrics] {
        &self.arcs
    }

    pub fn report(&self) -> &TopologyReport {
        &self.report
    }

    pub fn into_report(self) -> TopologyReport {
        self.report
    }

    /// Write the derived items into `network`, scaling areas by `cell_area`.
    ///
    /// Every arc gets `maxmsq`, `meanmsq`, `shreve` and `downarc`. The
    /// `strahler`, `segorder` and `uparc` items of unresolved arcs keep
    /// their loaded values.
    pub fn apply(&self, network: &mut Network, fields: &FieldMap, cell_area: f64) {
        for (record, arc) in network.iter_mut().zip(&self.arcs) {
            let mut put = |slot: Slot, n: f64| {
                if let Some(value) = Value::from_number(slot.kind, n) {
                    record.set_value(slot.index, value);
                }
            };
            put(fields.maxmsq, arc.max_area(cell_area));
            put(fields.meanmsq, arc.mean_area(cell_area));
            put(fields.shreve, arc.shreve as f64);
            put(fields.downarc, f64::from(arc.down_arc));
            if arc.state.is_resolved() {
                put(fields.strahler, arc.strahler as f64);
                put(fields.segorder, arc.segment_order as f64);
                put(fields.uparc, f64::from(arc.principal_upstream));
            }
        }
    }
}

/// Run the propagation over `network` without touching it.
pub fn compute(network: &Network, fields: &FieldMap) -> Metrics {
    let adjacency = network.adjacency();
    let records = network.records();
    let total = records.len();

    let mut arcs: Vec<ArcMetrics> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let local = record.number(fields.local.index).unwrap_or(0.0);
            let downstream = adjacency.downstream(i);
            let down_arc = downstream.map_or(NO_ARC, |d| records[d].id);
            ArcMetrics::new(record.id, local, downstream, down_arc)
        })
        .collect();

    // Classification.
    for (i, arc) in arcs.iter_mut().enumerate() {
        arc.state = if adjacency.is_source(i) {
            ArcState::Source
        } else {
            ArcState::AwaitingUpstream(0)
        };
    }

    let mut sources = 0;
    for arc in arcs.iter_mut().filter(|a| a.state == ArcState::Source) {
        arc.shreve = 1;
        arc.strahler = 1;
        arc.segment_order = 1;
        arc.principal_upstream = NO_ARC;
        arc.state = ArcState::Resolved(0);
        sources += 1;
    }
    debug!(arcs = total, sources, "classified arcs");

    let mut resolved = sources;
    let mut rounds = 0;
    while resolved < total {
        rounds += 1;
        let mut newly = 0;
        for i in 0..total {
            if arcs[i].state != ArcState::Resolved(rounds - 1) {
                continue;
            }
            let Some(d) = arcs[i].downstream else {
                continue;
            };
            if arcs[d].state.is_resolved() {
                continue;
            }
            let upstream = adjacency.upstream(d);
            if upstream.iter().all(|&u| arcs[u].state.is_resolved()) {
                merge(&mut arcs, d, upstream, rounds);
                newly += 1;
            } else {
                arcs[d].state = ArcState::AwaitingUpstream(rounds);
            }
        }
        debug!(round = rounds, resolved = newly, "propagation round");
        if newly == 0 {
            break;
        }
        resolved += newly;
    }

    let (unresolved, unresolved_ids): (Vec<usize>, Vec<ArcId>) = arcs
        .iter()
        .enumerate()
        .filter(|(_, a)| !a.state.is_resolved())
        .map(|(i, a)| (i, a.id))
        .unzip();

    let report = TopologyReport {
        total,
        sources,
        rounds,
        resolved,
        unresolved,
        unresolved_ids,
    };
    info!(
        arcs = total,
        sources,
        rounds,
        resolved,
        "network topology computed"
    );
    if let Some(warning) = report.warning() {
        warn!(unresolved = warning.unresolved, "{warning}");
    }

    Metrics { arcs, report }
}

/// Resolve arc `d` from its fully resolved `upstream` arcs.
fn merge(arcs: &mut [ArcMetrics], d: usize, upstream: &[usize], round: usize) {
    let Some((&first, rest)) = upstream.split_first() else {
        return;
    };
    let seed = &arcs[first];
    let mut strahler = seed.strahler;
    let mut segment_order = seed.segment_order + 1;
    let mut principal = seed.id;
    let mut running_max = seed.cumulative;

    for &u in rest {
        let arc = &arcs[u];
        if arc.strahler == strahler {
            strahler += 1;
        } else if arc.strahler > strahler {
            strahler = arc.strahler;
        }
        if arc.segment_order >= segment_order {
            segment_order = arc.segment_order + 1;
        }
        if arc.cumulative > running_max {
            running_max = arc.cumulative;
            principal = arc.id;
        }
    }

    let cumulative = upstream
        .iter()
        .fold(arcs[d].local, |acc, &u| acc + arcs[u].cumulative);
    let shreve = upstream.iter().map(|&u| arcs[u].shreve).sum();

    let target = &mut arcs[d];
    target.cumulative = cumulative;
    target.shreve = shreve;
    target.strahler = strahler;
    target.segment_order = segment_order;
    target.principal_upstream = principal;
    target.state = ArcState::Resolved(round);
}

/// Compute and write the derived items in one step.
pub fn run(network: &mut Network, fields: &FieldMap, cell_area: f64) -> TopologyReport {
    let metrics = compute(network, fields);
    metrics.apply(network, fields, cell_area);
    metrics.into_report()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldNames;
    use aat_core::{ArcRecord, Field, FieldType, Schema};

    const A: f64 = 100.0;

    fn schema() -> Schema {
        let int = |name: &str| Field::new(name, 4, FieldType::BinaryInt);
        Schema::new(vec![
            int("LOCAL"),
            Field::new("MAXMSQ", 8, FieldType::Float),
            Field::new("MEANMSQ", 8, FieldType::Float),
            int("SHREVE"),
            int("STRAHLER"),
            int("SEGORDER"),
            int("DOWNARC"),
            int("UPARC"),
        ])
        .unwrap()
    }

    fn fields() -> FieldMap {
        FieldMap::locate(&schema(), &FieldNames::default()).unwrap()
    }

    fn arc(id: ArcId, from: i32, to: i32, local: i64) -> ArcRecord {
        ArcRecord::new(id, from, to).with_value(0, Value::Int(local))
    }

    fn run_all(arcs: Vec<ArcRecord>) -> (Network, TopologyReport) {
        let mut network = Network::new(arcs);
        let report = run(&mut network, &fields(), A);
        (network, report)
    }

    fn int(network: &Network, i: usize, slot: Slot) -> i64 {
        network.records()[i]
            .value(slot.index)
            .and_then(Value::as_i64)
            .unwrap()
    }

    fn float(network: &Network, i: usize, slot: Slot) -> f64 {
        network.records()[i].number(slot.index).unwrap()
    }

    #[test]
    fn equal_confluence_raises_strahler() {
        let f = fields();
        let (net, report) = run_all(vec![arc(1, 1, 3, 2), arc(2, 2, 3, 3), arc(3, 3, 4, 1)]);
        assert!(report.is_complete());
        assert_eq!(report.sources, 2);
        assert_eq!(report.rounds, 1);

        assert_eq!(int(&net, 2, f.strahler), 2);
        assert_eq!(int(&net, 2, f.shreve), 2);
        assert_eq!(int(&net, 2, f.segorder), 2);
        assert_eq!(float(&net, 2, f.maxmsq), 6.0 * A);
        assert_eq!(float(&net, 2, f.meanmsq), 6.0 * A - A / 2.0);
        // Arc 2 carries more area.
        assert_eq!(int(&net, 2, f.uparc), 2);

        assert_eq!(int(&net, 0, f.downarc), 3);
        assert_eq!(int(&net, 1, f.downarc), 3);
        assert_eq!(int(&net, 0, f.uparc), NO_ARC as i64);
        assert_eq!(float(&net, 0, f.meanmsq), 2.0 * A - 2.0 * A / 2.0);
    }

    #[test]
    fn unequal_confluence_takes_max() {
        let f = fields();
        // Arc 30 (strahler 1) precedes the order-2 join 10 at node 5.
        let (net, report) = run_all(vec![
            arc(30, 4, 5, 1),
            arc(10, 3, 5, 1),
            arc(11, 1, 3, 1),
            arc(12, 2, 3, 1),
            arc(40, 5, 6, 1),
        ]);
        assert!(report.is_complete());
        assert_eq!(int(&net, 1, f.strahler), 2);
        assert_eq!(int(&net, 4, f.strahler), 2);
        assert_eq!(int(&net, 4, f.shreve), 3);
        assert_eq!(int(&net, 4, f.segorder), 3);
        assert_eq!(int(&net, 4, f.uparc), 10);
        assert_eq!(float(&net, 4, f.maxmsq), 5.0 * A);
    }

    #[test]
    fn linear_chain() {
        let f = fields();
        let (net, report) = run_all(vec![arc(1, 1, 2, 1), arc(2, 2, 3, 1), arc(3, 3, 4, 1)]);
        assert_eq!(report.sources, 1);
        assert_eq!(report.rounds, 2);
        assert!(report.is_complete());

        assert_eq!(float(&net, 2, f.maxmsq), 3.0 * A);
        assert_eq!(float(&net, 1, f.maxmsq), 2.0 * A);
        for i in 0..3 {
            assert_eq!(int(&net, i, f.strahler), 1);
            assert_eq!(int(&net, i, f.segorder), i as i64 + 1);
            // Shreve sums upstream magnitudes, so a single chain stays at 1.
            assert_eq!(int(&net, i, f.shreve), 1);
        }
        assert_eq!(int(&net, 2, f.uparc), 2);
        assert_eq!(int(&net, 1, f.uparc), 1);
    }

    #[test]
    fn outlet_has_no_downstream() {
        let f = fields();
        let (net, _) = run_all(vec![arc(1, 1, 3, 1), arc(2, 2, 3, 1), arc(9, 3, 4, 1)]);
        assert_eq!(int(&net, 2, f.downarc), NO_ARC as i64);
        for i in 0..3 {
            assert_ne!(int(&net, i, f.uparc), 9);
        }
    }

    #[test]
    fn rerun_is_idempotent() {
        let (once, _) = run_all(vec![
            arc(1, 1, 3, 4),
            arc(2, 2, 3, 7),
            arc(3, 3, 5, 1),
            arc(4, 4, 5, 2),
            arc(5, 5, 6, 3),
        ]);
        let mut twice = once.clone();
        run(&mut twice, &fields(), A);
        assert_eq!(once, twice);
    }

    #[test]
    fn cycle_leaves_arcs_unresolved() {
        let f = fields();
        let loaded = |rec: ArcRecord| rec.with_value(4, Value::Int(9)).with_value(7, Value::Int(77));
        let arcs = vec![
            loaded(arc(1, 1, 2, 1)),
            loaded(arc(2, 2, 1, 1)),
            arc(3, 5, 6, 1),
            loaded(arc(4, 2, 7, 2)),
        ];
        let n = arcs.len();
        let (net, report) = run_all(arcs);

        assert!(report.rounds <= n);
        assert_eq!(report.resolved, 1);
        assert_eq!(report.unresolved, vec![0, 1, 3]);
        let warning = report.warning().unwrap();
        assert_eq!(warning.unresolved, 3);
        assert_eq!(warning.sample, vec![1, 2, 4]);

        assert_eq!(int(&net, 3, f.shreve), 0);
        assert_eq!(float(&net, 3, f.maxmsq), 2.0 * A);
        assert_eq!(int(&net, 3, f.strahler), 9);
        assert_eq!(int(&net, 3, f.uparc), 77);
        assert_eq!(int(&net, 0, f.downarc), 2);
    }

    #[test]
    fn area_tie_keeps_first_upstream() {
        let f = fields();
        let (net, _) = run_all(vec![arc(5, 1, 3, 2), arc(6, 2, 3, 2), arc(7, 3, 4, 0)]);
        assert_eq!(int(&net, 2, f.uparc), 5);
    }

    #[test]
    fn three_way_junction_uses_sequential_rule() {
        let f = fields();
        let (net, report) = run_all(vec![
            arc(1, 21, 20, 1),
            arc(2, 22, 20, 1),
            arc(3, 11, 20, 1),
            arc(4, 10, 11, 1),
            arc(5, 12, 11, 1),
            arc(6, 20, 30, 1),
        ]);
        assert!(report.is_complete());
        assert_eq!(report.rounds, 2);
        assert_eq!(int(&net, 2, f.strahler), 2);
        // Seed 1, equal 1 gives 2, then equal 2 gives 3.
        assert_eq!(int(&net, 5, f.strahler), 3);
        assert_eq!(int(&net, 5, f.segorder), 3);
        assert_eq!(int(&net, 5, f.shreve), 4);
    }

    #[test]
    fn compute_does_not_mutate() {
        let network = Network::new(vec![arc(1, 1, 2, 1), arc(2, 2, 3, 1)]);
        let before = network.clone();
        let metrics = compute(&network, &fields());
        assert_eq!(network, before);
        assert_eq!(metrics.arcs()[1].state, ArcState::Resolved(1));
        assert_eq!(metrics.arcs()[0].state, ArcState::Resolved(0));
    }

    #[test]
    fn empty_network() {
        let (_, report) = run_all(Vec::new());
        assert_eq!(report.rounds, 0);
        assert!(report.is_complete());
    }
}
