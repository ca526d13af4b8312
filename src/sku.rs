//! SKU number → product description lookup.

use std::collections::HashMap;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;

use crate::util::normalize_sku_token;

/// Anything that can turn a SKU token into a product description.
pub trait SkuResolver {
    fn resolve(&self, token: &str) -> Option<&str>;

    /// Description when mapped, otherwise the token itself.
    fn resolve_or_raw(&self, token: &str) -> String {
        self.resolve(token)
            .map(str::to_string)
            .unwrap_or_else(|| token.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct MasterRow {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Description")]
    description: Option<String>,
}

/// Item master loaded from a `Name,Description` CSV export.
#[derive(Debug, Clone, Default)]
pub struct SkuMaster {
    mapping: HashMap<String, String>,
}

impl SkuMaster {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mapping = pairs
            .into_iter()
            .map(|(k, v)| (normalize_sku_token(k.as_ref()), v.into()))
            .collect();
        Self { mapping }
    }

    pub fn load(path: &Path) -> Result<Self, csv::Error> {
        let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
        let mut mapping = HashMap::new();
        for result in rdr.deserialize::<MasterRow>() {
            let row = result?;
            let (Some(name), Some(description)) = (row.name, row.description) else {
                continue;
            };
            let description = description.trim();
            if description.is_empty() {
                continue;
            }
            mapping.insert(normalize_sku_token(&name), description.to_string());
        }
        Ok(Self { mapping })
    }

    /// Load the master, falling back to an empty one (raw SKU tokens pass
    /// through) when the file is missing or unreadable.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(master) => {
                log::info!("Available mappings: {} SKU numbers", master.len());
                master
            }
            Err(e) => {
                log::warn!("Could not load SKU master file {}: {}", path.display(), e);
                log::warn!("Continuing with original SKU numbers...");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl SkuResolver for SkuMaster {
    fn resolve(&self, token: &str) -> Option<&str> {
        self.mapping.get(token).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn resolves_or_falls_back_to_token() {
        let master = SkuMaster::from_pairs([("1001.0", "Aquafina 24pk"), ("2002", "Propel 12pk")]);
        assert_eq!(master.resolve("1001"), Some("Aquafina 24pk"));
        assert_eq!(master.resolve_or_raw("2002"), "Propel 12pk");
        assert_eq!(master.resolve_or_raw("9999"), "9999");
        assert_eq!(master.len(), 2);
    }

    #[test]
    fn loads_master_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Name,Description,Extra").unwrap();
        writeln!(file, "1001,Aquafina 24pk,x").unwrap();
        writeln!(file, "2002.0,  Propel 12pk ,y").unwrap();
        writeln!(file, "3003,,z").unwrap();
        file.flush().unwrap();

        let master = SkuMaster::load(file.path()).unwrap();
        assert_eq!(master.len(), 2);
        assert_eq!(master.resolve("2002"), Some("Propel 12pk"));
    }

    #[test]
    fn missing_master_is_empty_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let master = SkuMaster::load_or_empty(&dir.path().join("nope.csv"));
        assert!(master.is_empty());
        assert_eq!(master.resolve_or_raw("1001"), "1001");
    }
}
