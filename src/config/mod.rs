//! Configuration module
//!
//! Handles CLI argument parsing, TOML defaults files, and validation.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;
pub mod workload;

use crate::distribution::hotcold::HotRange;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use workload::*;

/// Configuration mistakes detected before any operation is issued
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported compaction style: {0} (expected level, universal, fifo or none)")]
    UnknownCompaction(String),

    #[error("unsupported compression type: {0} (expected none, Snappy, Zlib, BZip2, LZ4 or ZSTD)")]
    UnknownCompression(String),

    #[error("number of keys must be at least 1")]
    EmptyKeyspace,

    #[error("hot range [{start}, {end}] is not inside keyspace [0, {num_keys})")]
    InvalidHotRange { start: u64, end: u64, num_keys: u64 },

    #[error("hot ratio must be between 0 and 100, got {0}")]
    InvalidHotRatio(u8),

    #[error("zipf alpha must be a finite value >= 0, got {0}")]
    InvalidZipfAlpha(f64),

    #[error(
        "hot range [{start}, {end}] covers the whole keyspace of {num_keys} keys; \
         disjoint cold-key sampling needs at least one key outside it"
    )]
    NoColdKeys { start: u64, end: u64, num_keys: u64 },
}

/// Complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Database directory handed to the backend
    pub db_path: PathBuf,
    #[serde(default)]
    pub backend: BackendKind,
    pub workload: WorkloadConfig,
    #[serde(default)]
    pub partitions: PartitionsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Key generation and operation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    pub mode: OperationMode,
    #[serde(default)]
    pub policy: WorkloadPolicy,
    /// Keyspace size, keys are `[0, num_keys)`
    pub num_keys: u64,
    /// Operations to issue; defaults to `num_keys`
    pub num_ops: Option<u64>,
    #[serde(default)]
    pub hot_start: u64,
    #[serde(default)]
    pub hot_end: u64,
    /// Hot-access percentage (0-100)
    #[serde(default)]
    pub hot_ratio: u8,
    /// Value length in bytes for writes
    pub value_size: usize,
    /// Byte every written value is filled with
    #[serde(default = "default_filler")]
    pub filler: u8,
    /// Prepended to the decimal key index
    #[serde(default)]
    pub key_prefix: String,
}

fn default_filler() -> u8 {
    b'v'
}

impl WorkloadConfig {
    /// Operations the run will issue
    pub fn ops(&self) -> u64 {
        self.num_ops.unwrap_or(self.num_keys)
    }

    pub fn hot_range(&self) -> Result<HotRange, ConfigError> {
        HotRange::new(self.hot_start, self.hot_end, self.num_keys)
    }
}

/// Options for the two logical partitions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct PartitionsConfig {
    #[serde(default)]
    pub default: PartitionOptions,
    /// `None` when the run uses only the default partition
    #[serde(default)]
    pub hot: Option<PartitionOptions>,
}

/// Report and progress settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Also write the report as JSON here
    pub json: Option<PathBuf>,
    /// Record per-operation latency into a histogram
    #[serde(default)]
    pub latency: bool,
    /// Log progress every N operations (0 disables)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
}

fn default_progress_interval() -> u64 {
    100_000
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: None,
            latency: false,
            progress_interval: default_progress_interval(),
        }
    }
}

/// Run-time behavior
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    /// Seed for key generation; entropy when absent
    pub seed: Option<u64>,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    /// Run the placement verification pass after the workload
    #[serde(default)]
    pub verify: bool,
    /// Open the backend only if it already exists
    #[serde(default)]
    pub require_existing: bool,
    /// Wipe existing data before opening
    #[serde(default)]
    pub destroy_existing: bool,
}
