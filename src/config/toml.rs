//! TOML defaults file parsing
//!
//! A defaults file carries the options that are tedious to repeat on every
//! invocation. Command line flags always take precedence over it.
//!
//! ```toml
//! policy = "overlap"
//! seed = 42
//! backend = "file"
//! error_policy = "continue"
//! progress_interval = 50000
//!
//! [partitions.hot]
//! compaction = "level"
//! compression = "LZ4"
//! ```

use super::workload::{BackendKind, ErrorPolicy, PartitionOptions};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional defaults loaded from a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileDefaults {
    /// `disjoint` or `overlap`; Zipfian runs ignore it
    pub policy: Option<String>,
    pub seed: Option<u64>,
    pub num_ops: Option<u64>,
    pub backend: Option<BackendKind>,
    pub error_policy: Option<ErrorPolicy>,
    pub latency: Option<bool>,
    pub verify: Option<bool>,
    pub json: Option<PathBuf>,
    pub key_prefix: Option<String>,
    pub filler: Option<char>,
    pub progress_interval: Option<u64>,
    #[serde(default)]
    pub partitions: PartitionDefaults,
}

/// Partition options used when the command line leaves them out
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartitionDefaults {
    pub default: Option<PartitionOptions>,
    pub hot: Option<PartitionOptions>,
}

/// Parse TOML defaults file
pub fn parse_toml_file(path: &Path) -> Result<FileDefaults> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML defaults from string
pub fn parse_toml_string(contents: &str) -> Result<FileDefaults> {
    let defaults: FileDefaults = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(defaults)
}
