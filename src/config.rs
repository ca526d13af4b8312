//! Analyzer configuration.
//!
//! Everything has a default, so the config file is optional. A file only
//! needs the keys it wants to override:
//!
//! ```toml
//! top_reasons = 5
//!
//! [[production]]
//! line = "Can Line 3"
//! total = 54269
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fixed production volume of one consolidated line for the analysis window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCapacity {
    pub line: String,
    pub total: u64,
}

impl LineCapacity {
    pub fn new(line: impl Into<String>, total: u64) -> Self {
        Self {
            line: line.into(),
            total,
        }
    }
}

/// Production baselines in report order, one entry per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineCapacity>", into = "Vec<LineCapacity>")]
pub struct ProductionTotals(Vec<LineCapacity>);

impl From<Vec<LineCapacity>> for ProductionTotals {
    fn from(entries: Vec<LineCapacity>) -> Self {
        // Keep the first entry for a repeated line.
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(entries.len());
        for cap in entries {
            if seen.insert(cap.line.clone()) {
                kept.push(cap);
            } else {
                log::warn!("Ignoring duplicate production total for '{}'", cap.line);
            }
        }
        Self(kept)
    }
}

impl From<ProductionTotals> for Vec<LineCapacity> {
    fn from(totals: ProductionTotals) -> Self {
        totals.0
    }
}

impl ProductionTotals {
    pub fn iter(&self) -> impl Iterator<Item = &LineCapacity> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn sum(&self) -> u64 {
        self.0.iter().map(|c| c.total).sum()
    }
}

impl Default for ProductionTotals {
    fn default() -> Self {
        Self::from(vec![
            LineCapacity::new("Aquafina/Propel 1", 36720),
            LineCapacity::new("Aquafina/Propel 2", 34407),
            LineCapacity::new("Can Line 3", 54269),
            LineCapacity::new("Can Line 4", 70981),
            LineCapacity::new("Bottle Line 5", 62106),
            LineCapacity::new("Bottle Line 6", 53596),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub input: PathBuf,
    pub sku_master: PathBuf,
    pub out_dir: PathBuf,
    pub top_reasons: usize,
    pub top_products: usize,
    pub top_category_reasons: usize,
    pub production: ProductionTotals,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("rejected_units.csv"),
            sku_master: PathBuf::from("item_master.csv"),
            out_dir: PathBuf::from("."),
            top_reasons: 5,
            top_products: 20,
            top_category_reasons: 10,
            production: ProductionTotals::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents, path)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
