//! `addaat.toml` configuration.

use std::path::{Path, PathBuf};

use aat_topology::{FieldNames, DEFAULT_CELL_AREA};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const FILE_NAME: &str = "addaat.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddaatConfig {
    pub network: NetworkConfig,
    /// Item name prefixes the engine reads and writes.
    pub fields: FieldNames,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Square metres represented by one local cell.
    pub cell_area: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            cell_area: DEFAULT_CELL_AREA,
        }
    }
}

impl AddaatConfig {
    /// Search upward from `start_dir` for `addaat.toml` and parse it,
    /// returning the file's path alongside.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(FILE_NAME);
            if candidate.is_file() {
                let config = Self::load(&candidate)?;
                return Ok(Some((config, candidate)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_cell_area(self.network.cell_area)
    }

    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("parsing addaat.toml")?;
        config.validate()?;
        Ok(config)
    }
}

/// A cell area must be a finite, positive number of square metres.
pub fn check_cell_area(cell_area: f64) -> Result<()> {
    if !cell_area.is_finite() || cell_area <= 0.0 {
        bail!("cell area must be a positive number of square metres, got {cell_area}");
    }
    Ok(())
}
