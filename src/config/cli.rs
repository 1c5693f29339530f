//! CLI argument parsing using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// kvskew - skewed workload generator for key-value storage engines
#[derive(Parser, Debug)]
#[command(name = "kvskew")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write hot/cold routed keys, then count where they landed
    Write(HotColdArgs),
    /// Read hot/cold routed keys from an existing database
    Read(HotColdArgs),
    /// Write Zipfian keys into a fresh single-partition database
    Zipf(ZipfArgs),
}

/// Positional arguments shared by the hot/cold workloads
#[derive(Args, Debug)]
pub struct HotColdArgs {
    /// Database directory
    #[arg(value_name = "DB_PATH")]
    pub db_path: PathBuf,

    /// Total number of keys in the keyspace
    #[arg(value_name = "NUM_KEYS")]
    pub num_keys: u64,

    /// First key of the hot range (inclusive)
    #[arg(value_name = "HOT_START")]
    pub hot_start: u64,

    /// Last key of the hot range (inclusive)
    #[arg(value_name = "HOT_END")]
    pub hot_end: u64,

    /// Value size in bytes (e.g., 100, 4k)
    #[arg(value_name = "VALUE_SIZE")]
    pub value_size: String,

    /// Hot access percentage (0-100)
    #[arg(value_name = "HOT_RATIO")]
    pub hot_ratio: u8,

    /// Compaction for the default partition: level, universal, fifo, none
    #[arg(value_name = "DEFAULT_COMPACTION")]
    pub default_compaction: String,

    /// Compaction for the hot partition: level, universal, fifo, none
    #[arg(value_name = "HOT_COMPACTION")]
    pub hot_compaction: String,

    /// Compression for the default partition: none, Snappy, Zlib, BZip2, LZ4, ZSTD
    #[arg(value_name = "DEFAULT_COMPRESSION", requires = "hot_compression")]
    pub default_compression: Option<String>,

    /// Compression for the hot partition
    #[arg(value_name = "HOT_COMPRESSION")]
    pub hot_compression: Option<String>,

    /// Key generation policy
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    #[command(flatten)]
    pub flags: RunFlags,
}

/// Positional arguments for the Zipfian workload
#[derive(Args, Debug)]
pub struct ZipfArgs {
    /// Database directory (existing contents are destroyed)
    #[arg(value_name = "DB_PATH")]
    pub db_path: PathBuf,

    /// Number of writes, also the number of Zipf ranks
    #[arg(value_name = "NUM_KEYS")]
    pub num_keys: u64,

    /// Value size in bytes (e.g., 100, 4k)
    #[arg(value_name = "VALUE_SIZE")]
    pub value_size: String,

    /// Zipf skew parameter (>= 0)
    #[arg(value_name = "ALPHA")]
    pub alpha: f64,

    #[command(flatten)]
    pub flags: RunFlags,
}

/// Options shared by every workload
#[derive(Args, Debug, Default)]
pub struct RunFlags {
    /// TOML file with defaults for these options
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for key generation (random when omitted; zipf always uses its fixed seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of operations (defaults to NUM_KEYS)
    #[arg(long)]
    pub ops: Option<u64>,

    /// Storage backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Behavior on backend errors other than "not found"
    #[arg(long, value_enum)]
    pub on_error: Option<ErrorPolicyArg>,

    /// Record per-operation latency percentiles
    #[arg(long)]
    pub latency: bool,

    /// Run the placement verification pass after a read workload too
    #[arg(long)]
    pub verify: bool,

    /// Write the report as JSON to this file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Prefix prepended to every decimal key
    #[arg(long)]
    pub key_prefix: Option<String>,

    /// ASCII character values are filled with
    #[arg(long)]
    pub filler: Option<char>,

    /// Log progress every N operations (0 disables)
    #[arg(long)]
    pub progress_interval: Option<u64>,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose logging
    #[arg(long, env = "KVSKEW_DEBUG")]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Hot keys from the range, cold keys rejected out of it
    Disjoint,
    /// Keys from the whole keyspace, hot only when in range and gated
    Overlap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Memory,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ErrorPolicyArg {
    Fatal,
    Continue,
}

impl Cli {
    /// Flags of whichever subcommand was given
    pub fn flags(&self) -> &RunFlags {
        match &self.command {
            Command::Write(args) | Command::Read(args) => &args.flags,
            Command::Zipf(args) => &args.flags,
        }
    }
}
