use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Hard failures of the data loader. Nothing is committed when one occurs.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open rejection export '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(
        "missing expected columns: {}. Expected columns: Reject datetime, Source, Reject reason, Lpn, Sku, Log text",
        .0.join(", ")
    )]
    MissingColumns(Vec<String>),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown filter dimension '{0}' (expected periods, lines or skus)")]
pub struct UnknownDimension(pub String);
