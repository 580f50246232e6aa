//! Resolve, load, compute, rewrite.

use std::fmt;
use std::path::PathBuf;

use aat_catalog::CatalogResolver;
use aat_topology::{FieldMap, FieldNames};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

/// What to run on which cover.
#[derive(Debug, Clone)]
pub struct Request {
    pub cover: String,
    pub cell_area: f64,
    pub fields: FieldNames,
    /// Compute and report without rewriting the table.
    pub dry_run: bool,
}

/// Outcome of one run, printed on stdout.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub cover: String,
    pub table: PathBuf,
    pub records: usize,
    pub sources: usize,
    pub rounds: usize,
    pub resolved: usize,
    /// Ids of arcs left unresolved.
    pub unresolved: Vec<i32>,
    pub cell_area: f64,
    pub written: bool,
}

/// Run the whole pipeline for one cover.
///
/// Every error aborts before the table is touched; a topology warning does
/// not.
pub fn execute(catalog: &dyn CatalogResolver, request: &Request) -> Result<RunSummary> {
    let table = catalog
        .resolve(&request.cover)
        .with_context(|| format!("resolving cover {}", request.cover))?;
    let path = &table.table_path;

    let fields = FieldMap::locate(&table.layout.schema, &request.fields)
        .with_context(|| format!("cover {}", request.cover))?;

    let mut network = aat_codec::load(path, &table.layout)
        .with_context(|| format!("reading {}", path.display()))?;

    let report = aat_topology::run(&mut network, &fields, request.cell_area);
    let unresolved = report
        .unresolved
        .iter()
        .filter_map(|&i| network.get(i).map(|r| r.id))
        .collect();

    if request.dry_run {
        info!(path = %path.display(), "dry run, table left unchanged");
    } else {
        aat_codec::rewrite(path, &network, &table.layout)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(RunSummary {
        cover: request.cover.clone(),
        table: path.clone(),
        records: network.len(),
        sources: report.sources,
        rounds: report.rounds,
        resolved: report.resolved,
        unresolved,
        cell_area: request.cell_area,
        written: !request.dry_run,
    })
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cover {} ({}):", self.cover, self.table.display())?;
        writeln!(f, "  Records:    {}", self.records)?;
        writeln!(f, "  Sources:    {}", self.sources)?;
        writeln!(f, "  Rounds:     {}", self.rounds)?;
        writeln!(f, "  Resolved:   {}", self.resolved)?;
        writeln!(f, "  Unresolved: {}", self.unresolved.len())?;
        writeln!(f, "  Cell area:  {} m2", self.cell_area)?;
        if self.written {
            write!(f, "  Table rewritten.")
        } else {
            write!(f, "  Dry run, table unchanged.")
        }
    }
}
