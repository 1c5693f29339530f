//! Workload configuration types

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which operation every step of the run issues
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    /// Put a filler value under each planned key
    Write,
    /// Get each planned key and count hits/misses
    Read,
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationMode::Write => write!(f, "write"),
            OperationMode::Read => write!(f, "read"),
        }
    }
}

/// Key generation and routing policy
///
/// `Disjoint` and `Overlap` yield different, independently testable hot-hit
/// signatures and are never merged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkloadPolicy {
    /// Gate first; hot keys from the range, cold keys rejected out of it.
    /// The gate alone picks the partition.
    Disjoint,
    /// Key uniform over the keyspace, gate flipped independently. Hot only
    /// when the key is in range and the gate fired.
    Overlap,
    /// Zipfian ranks; every operation goes to the default partition.
    Zipfian { alpha: f64 },
}

impl Default for WorkloadPolicy {
    fn default() -> Self {
        WorkloadPolicy::Disjoint
    }
}

impl fmt::Display for WorkloadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadPolicy::Disjoint => write!(f, "disjoint"),
            WorkloadPolicy::Overlap => write!(f, "overlap"),
            WorkloadPolicy::Zipfian { alpha } => write!(f, "zipfian(alpha={})", alpha),
        }
    }
}

/// What to do when a backend call fails with something other than "not found"
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Abort the run with the backend error
    #[default]
    Fatal,
    /// Log, count, and keep going
    Continue,
}

/// Backend implementation to open
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Volatile maps, nothing survives the process
    Memory,
    /// Partition snapshots under the database directory
    #[default]
    File,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "memory"),
            BackendKind::File => write!(f, "file"),
        }
    }
}

/// Compaction strategy requested for a partition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompactionStyle {
    #[default]
    Level,
    Universal,
    Fifo,
    None,
}

impl FromStr for CompactionStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "level" => Ok(CompactionStyle::Level),
            "universal" => Ok(CompactionStyle::Universal),
            "fifo" => Ok(CompactionStyle::Fifo),
            "none" => Ok(CompactionStyle::None),
            other => Err(ConfigError::UnknownCompaction(other.to_string())),
        }
    }
}

impl fmt::Display for CompactionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompactionStyle::Level => "level",
            CompactionStyle::Universal => "universal",
            CompactionStyle::Fifo => "fifo",
            CompactionStyle::None => "none",
        };
        f.write_str(name)
    }
}

/// Compression codec requested for a partition
///
/// Names are case-sensitive: `none`, `Snappy`, `Zlib`, `BZip2`, `LZ4`, `ZSTD`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CompressionType {
    #[default]
    #[serde(rename = "none")]
    None,
    Snappy,
    Zlib,
    BZip2,
    LZ4,
    ZSTD,
}

impl FromStr for CompressionType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(CompressionType::None),
            "Snappy" => Ok(CompressionType::Snappy),
            "Zlib" => Ok(CompressionType::Zlib),
            "BZip2" => Ok(CompressionType::BZip2),
            "LZ4" => Ok(CompressionType::LZ4),
            "ZSTD" => Ok(CompressionType::ZSTD),
            other => Err(ConfigError::UnknownCompression(other.to_string())),
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompressionType::None => "none",
            CompressionType::Snappy => "Snappy",
            CompressionType::Zlib => "Zlib",
            CompressionType::BZip2 => "BZip2",
            CompressionType::LZ4 => "LZ4",
            CompressionType::ZSTD => "ZSTD",
        };
        f.write_str(name)
    }
}

/// Per-partition storage options handed to the backend at open time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PartitionOptions {
    #[serde(default)]
    pub compaction: CompactionStyle,
    #[serde(default)]
    pub compression: CompressionType,
}

impl PartitionOptions {
    /// Parse from the strategy names used on the command line
    pub fn parse(compaction: &str, compression: Option<&str>) -> Result<Self, ConfigError> {
        Ok(Self {
            compaction: compaction.parse()?,
            compression: match compression {
                Some(name) => name.parse()?,
                None => CompressionType::default(),
            },
        })
    }
}

impl fmt::Display for PartitionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "compaction={} compression={}", self.compaction, self.compression)
    }
}
