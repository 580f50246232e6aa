//! Table lookup for ARC/INFO workspaces.
//!
//! The pipeline asks a [`CatalogResolver`] once, before reading any record,
//! for the layout of a coverage's arc attribute table. [`InfoCatalog`]
//! answers from an INFO workspace on disk:
//!
//! ```text
//! <workspace>/
//!   info/arc.dir          table directory (see [`arcdir`])
//!   info/arcNNNN.nit      item list of table NNNN (see [`nit`])
//!   <cover>/aat.adf       the records themselves
//! ```
//!
//! [`MemoryCatalog`] serves layouts registered in code.

pub mod arcdir;
mod bytes;
mod error;
pub mod nit;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use aat_core::{TableLayout, DEFAULT_ITEM_COUNT};
use tracing::{debug, info};

pub use arcdir::DirEntry;
pub use error::{ConfigurationError, Result};
pub use nit::ItemDescriptor;

/// Everything the pipeline needs to load a coverage's attribute table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Coverage name as requested.
    pub cover: String,
    pub layout: TableLayout,
    /// Number of default items preceding the user items; always 7.
    pub default_item_count: usize,
    /// Location of the record file.
    pub table_path: PathBuf,
}

/// Source of table layouts.
pub trait CatalogResolver {
    /// Describe the arc attribute table of coverage `cover`.
    fn resolve(&self, cover: &str) -> Result<TableDescriptor>;
}

/// Resolver backed by an INFO workspace directory.
#[derive(Debug, Clone)]
pub struct InfoCatalog {
    workspace: PathBuf,
}

impl InfoCatalog {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn info_dir(&self) -> PathBuf {
        self.workspace.join("info")
    }

    pub fn arc_dir_path(&self) -> PathBuf {
        self.info_dir().join("arc.dir")
    }

    /// Record file of `cover`.
    pub fn table_path(&self, cover: &str) -> PathBuf {
        self.workspace.join(cover).join("aat.adf")
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| ConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl CatalogResolver for InfoCatalog {
    fn resolve(&self, cover: &str) -> Result<TableDescriptor> {
        let table = format!("{cover}.AAT").to_ascii_uppercase();
        let dir_path = self.arc_dir_path();
        let dir_data = read_file(&dir_path)?;

        let entry = arcdir::find_entry(&dir_data, &table, &dir_path)?.ok_or_else(|| {
            ConfigurationError::NotFound {
                table: table.clone(),
                catalog: dir_path.clone(),
            }
        })?;
        debug!(table = %table, number = %entry.number, items = entry.item_count, "catalog entry");

        let item_count = usize::try_from(entry.item_count).map_err(|_| {
            ConfigurationError::malformed(&dir_path, format!("item count {}", entry.item_count))
        })?;
        let record_count = usize::try_from(entry.record_count).map_err(|_| {
            ConfigurationError::malformed(&dir_path, format!("record count {}", entry.record_count))
        })?;

        let nit_path = self.info_dir().join(entry.item_file());
        let nit_data = read_file(&nit_path)?;
        let (schema, precision) = nit::parse_item_list(&nit_data, item_count, &nit_path)?;

        let layout = TableLayout::new(schema, precision, record_count);
        if usize::try_from(entry.record_length).ok() != Some(layout.record_len()) {
            debug!(
                declared = entry.record_length,
                computed = layout.record_len(),
                "catalog record length differs from item list"
            );
        }
        info!(
            table = %table,
            records = record_count,
            items = layout.schema.len(),
            precision = ?precision,
            "resolved table layout"
        );

        Ok(TableDescriptor {
            cover: cover.to_string(),
            layout,
            default_item_count: DEFAULT_ITEM_COUNT,
            table_path: self.table_path(cover),
        })
    }
}

/// Resolver over layouts registered in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tables: HashMap<String, TableDescriptor>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `cover` with its layout and record file.
    pub fn insert(&mut self, cover: &str, layout: TableLayout, table_path: impl Into<PathBuf>) {
        self.tables.insert(
            cover.to_ascii_uppercase(),
            TableDescriptor {
                cover: cover.to_string(),
                layout,
                default_item_count: DEFAULT_ITEM_COUNT,
                table_path: table_path.into(),
            },
        );
    }
}

impl CatalogResolver for MemoryCatalog {
    fn resolve(&self, cover: &str) -> Result<TableDescriptor> {
        self.tables
            .get(&cover.to_ascii_uppercase())
            .cloned()
            .ok_or_else(|| ConfigurationError::NotFound {
                table: format!("{cover}.AAT").to_ascii_uppercase(),
                catalog: PathBuf::from("<memory>"),
            })
    }
}
