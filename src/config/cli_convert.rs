//! CLI to Config conversion utilities

use super::cli::{BackendArg, Command, ErrorPolicyArg, HotColdArgs, PolicyArg, RunFlags, ZipfArgs};
use super::toml::FileDefaults;
use super::workload::*;
use super::*;
use crate::distribution::zipf::ZIPF_SEED;
use anyhow::{bail, Context, Result};

/// Parse a size string (e.g., "100", "4k", "1M") to bytes
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("k") || s.ends_with("kb") {
        (s.trim_end_matches("kb").trim_end_matches("k"), 1024u64)
    } else if s.ends_with("m") || s.ends_with("mb") {
        (s.trim_end_matches("mb").trim_end_matches("m"), 1024 * 1024)
    } else if s.ends_with("g") || s.ends_with("gb") {
        (s.trim_end_matches("gb").trim_end_matches("g"), 1024 * 1024 * 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str.parse()
        .with_context(|| format!("Invalid size format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Size overflows: {}", s))
}

pub fn convert_policy(policy: PolicyArg) -> WorkloadPolicy {
    match policy {
        PolicyArg::Disjoint => WorkloadPolicy::Disjoint,
        PolicyArg::Overlap => WorkloadPolicy::Overlap,
    }
}

pub fn convert_backend(backend: BackendArg) -> BackendKind {
    match backend {
        BackendArg::Memory => BackendKind::Memory,
        BackendArg::File => BackendKind::File,
    }
}

pub fn convert_error_policy(policy: ErrorPolicyArg) -> ErrorPolicy {
    match policy {
        ErrorPolicyArg::Fatal => ErrorPolicy::Fatal,
        ErrorPolicyArg::Continue => ErrorPolicy::Continue,
    }
}

/// Policy name as written in a defaults file
pub fn parse_policy_name(name: &str) -> Result<WorkloadPolicy> {
    match name {
        "disjoint" => Ok(WorkloadPolicy::Disjoint),
        "overlap" => Ok(WorkloadPolicy::Overlap),
        other => bail!("Unknown policy '{}' (expected disjoint or overlap)", other),
    }
}

fn filler_byte(c: char) -> Result<u8> {
    if !c.is_ascii() {
        bail!("Filler must be an ASCII character, got '{}'", c);
    }
    Ok(c as u8)
}

/// Build the run configuration for a parsed command
///
/// Flags on the command line win over `defaults`; anything neither sets falls
/// back to the built-in defaults of the chosen workload.
pub fn build_run_config(command: &Command, defaults: &FileDefaults) -> Result<RunConfig> {
    let config = match command {
        Command::Write(args) => build_hot_cold(args, OperationMode::Write, defaults)?,
        Command::Read(args) => build_hot_cold(args, OperationMode::Read, defaults)?,
        Command::Zipf(args) => build_zipf(args, defaults)?,
    };
    Ok(config)
}

fn build_hot_cold(args: &HotColdArgs, mode: OperationMode, defaults: &FileDefaults) -> Result<RunConfig> {
    let value_size = parse_size(&args.value_size).context("Invalid value size")?;

    let policy = match (args.policy, defaults.policy.as_deref()) {
        (Some(policy), _) => convert_policy(policy),
        (None, Some(name)) => parse_policy_name(name)?,
        (None, None) => WorkloadPolicy::Disjoint,
    };

    let default_partition = partition_options(
        &args.default_compaction,
        args.default_compression.as_deref(),
        defaults.partitions.default,
    )?;
    let hot_partition = partition_options(
        &args.hot_compaction,
        args.hot_compression.as_deref(),
        defaults.partitions.hot,
    )?;

    let flags = &args.flags;
    let workload = WorkloadConfig {
        mode,
        policy,
        num_keys: args.num_keys,
        num_ops: flags.ops.or(defaults.num_ops),
        hot_start: args.hot_start,
        hot_end: args.hot_end,
        hot_ratio: args.hot_ratio,
        value_size: value_size as usize,
        filler: resolve_filler(flags, defaults, b'v')?,
        key_prefix: resolve_prefix(flags, defaults, ""),
    };

    let runtime = RuntimeConfig {
        seed: flags.seed.or(defaults.seed),
        error_policy: resolve_error_policy(flags, defaults),
        // Writes are always audited; reads only on request
        verify: mode == OperationMode::Write || flags.verify || defaults.verify.unwrap_or(false),
        require_existing: mode == OperationMode::Read,
        destroy_existing: false,
    };

    Ok(RunConfig {
        db_path: args.db_path.clone(),
        backend: resolve_backend(flags, defaults),
        workload,
        partitions: PartitionsConfig {
            default: default_partition,
            hot: Some(hot_partition),
        },
        output: resolve_output(flags, defaults),
        runtime,
    })
}

fn build_zipf(args: &ZipfArgs, defaults: &FileDefaults) -> Result<RunConfig> {
    let value_size = parse_size(&args.value_size).context("Invalid value size")?;
    let flags = &args.flags;

    // The sampler is always seeded with ZIPF_SEED; a file-level seed is meant
    // for the hot/cold workloads and is not applied here.
    if let Some(seed) = flags.seed {
        bail!(
            "--seed {} has no effect on zipf runs; they always use seed {}",
            seed,
            ZIPF_SEED
        );
    }

    let workload = WorkloadConfig {
        mode: OperationMode::Write,
        policy: WorkloadPolicy::Zipfian { alpha: args.alpha },
        num_keys: args.num_keys,
        num_ops: flags.ops.or(defaults.num_ops),
        hot_start: 0,
        hot_end: 0,
        hot_ratio: 0,
        value_size: value_size as usize,
        filler: resolve_filler(flags, defaults, b'Z')?,
        key_prefix: resolve_prefix(flags, defaults, "key_"),
    };

    let default_partition = defaults.partitions.default.unwrap_or(PartitionOptions {
        compaction: CompactionStyle::Universal,
        compression: CompressionType::None,
    });

    let runtime = RuntimeConfig {
        seed: Some(ZIPF_SEED),
        error_policy: resolve_error_policy(flags, defaults),
        verify: flags.verify || defaults.verify.unwrap_or(false),
        require_existing: false,
        destroy_existing: true,
    };

    Ok(RunConfig {
        db_path: args.db_path.clone(),
        backend: resolve_backend(flags, defaults),
        workload,
        partitions: PartitionsConfig {
            default: default_partition,
            hot: None,
        },
        output: resolve_output(flags, defaults),
        runtime,
    })
}

fn partition_options(
    compaction: &str,
    compression: Option<&str>,
    fallback: Option<PartitionOptions>,
) -> Result<PartitionOptions, ConfigError> {
    let mut options = PartitionOptions::parse(compaction, compression)?;
    if compression.is_none() {
        if let Some(fallback) = fallback {
            options.compression = fallback.compression;
        }
    }
    Ok(options)
}

fn resolve_filler(flags: &RunFlags, defaults: &FileDefaults, fallback: u8) -> Result<u8> {
    match flags.filler.or(defaults.filler) {
        Some(c) => filler_byte(c),
        None => Ok(fallback),
    }
}

fn resolve_prefix(flags: &RunFlags, defaults: &FileDefaults, fallback: &str) -> String {
    flags
        .key_prefix
        .clone()
        .or_else(|| defaults.key_prefix.clone())
        .unwrap_or_else(|| fallback.to_string())
}

fn resolve_backend(flags: &RunFlags, defaults: &FileDefaults) -> BackendKind {
    flags
        .backend
        .map(convert_backend)
        .or(defaults.backend)
        .unwrap_or_default()
}

fn resolve_error_policy(flags: &RunFlags, defaults: &FileDefaults) -> ErrorPolicy {
    flags
        .on_error
        .map(convert_error_policy)
        .or(defaults.error_policy)
        .unwrap_or_default()
}

fn resolve_output(flags: &RunFlags, defaults: &FileDefaults) -> OutputConfig {
    OutputConfig {
        json: flags.json.clone().or_else(|| defaults.json.clone()),
        latency: flags.latency || defaults.latency.unwrap_or(false),
        progress_interval: flags
            .progress_interval
            .or(defaults.progress_interval)
            .unwrap_or(100_000),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::Cli;
    use clap::Parser;

    fn command(args: &[&str]) -> Command {
        let mut argv = vec!["kvskew"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("100").unwrap(), 100);
        assert_eq!(parse_size("4k").unwrap(), 4096);
        assert_eq!(parse_size("1M").unwrap(), 1024 * 1024);
        assert!(parse_size("lots").is_err());
    }

    #[test]
    fn test_write_config_defaults() {
        let cmd = command(&["write", "./db", "1000", "0", "100", "64", "70", "universal", "level"]);
        let config = build_run_config(&cmd, &FileDefaults::default()).unwrap();

        assert_eq!(config.workload.mode, OperationMode::Write);
        assert_eq!(config.workload.policy, WorkloadPolicy::Disjoint);
        assert_eq!(config.workload.ops(), 1000);
        assert_eq!(config.workload.filler, b'v');
        assert_eq!(config.partitions.default.compaction, CompactionStyle::Universal);
        assert_eq!(config.partitions.hot.unwrap().compaction, CompactionStyle::Level);
        assert!(config.runtime.verify);
        assert!(!config.runtime.require_existing);
        assert_eq!(config.backend, BackendKind::File);
    }

    #[test]
    fn test_read_config_requires_existing() {
        let cmd = command(&[
            "read", "./db", "1000", "0", "100", "64", "70", "level", "level", "Snappy", "ZSTD",
        ]);
        let config = build_run_config(&cmd, &FileDefaults::default()).unwrap();

        assert_eq!(config.workload.mode, OperationMode::Read);
        assert!(config.runtime.require_existing);
        assert!(!config.runtime.verify);
        assert_eq!(config.partitions.default.compression, CompressionType::Snappy);
        assert_eq!(config.partitions.hot.unwrap().compression, CompressionType::ZSTD);
    }

    #[test]
    fn test_unknown_compaction_is_config_error() {
        let cmd = command(&["write", "./db", "1000", "0", "100", "64", "70", "tiered", "level"]);
        let err = build_run_config(&cmd, &FileDefaults::default()).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_cli_overrides_file_defaults() {
        let defaults = FileDefaults {
            policy: Some("overlap".to_string()),
            seed: Some(1),
            backend: Some(BackendKind::Memory),
            ..Default::default()
        };

        let cmd = command(&["write", "./db", "1000", "0", "100", "64", "70", "level", "level"]);
        let config = build_run_config(&cmd, &defaults).unwrap();
        assert_eq!(config.workload.policy, WorkloadPolicy::Overlap);
        assert_eq!(config.runtime.seed, Some(1));
        assert_eq!(config.backend, BackendKind::Memory);

        let cmd = command(&[
            "write", "./db", "1000", "0", "100", "64", "70", "level", "level",
            "--policy", "disjoint", "--seed", "5", "--backend", "file",
        ]);
        let config = build_run_config(&cmd, &defaults).unwrap();
        assert_eq!(config.workload.policy, WorkloadPolicy::Disjoint);
        assert_eq!(config.runtime.seed, Some(5));
        assert_eq!(config.backend, BackendKind::File);
    }

    #[test]
    fn test_file_compression_fallback() {
        let mut defaults = FileDefaults::default();
        defaults.partitions.hot = Some(PartitionOptions {
            compaction: CompactionStyle::Fifo,
            compression: CompressionType::LZ4,
        });

        let cmd = command(&["write", "./db", "1000", "0", "100", "64", "70", "level", "level"]);
        let config = build_run_config(&cmd, &defaults).unwrap();
        let hot = config.partitions.hot.unwrap();
        // Positional compaction wins, compression comes from the file
        assert_eq!(hot.compaction, CompactionStyle::Level);
        assert_eq!(hot.compression, CompressionType::LZ4);
    }

    #[test]
    fn test_zipf_config() {
        let cmd = command(&["zipf", "./zdb", "5000", "1k", "1.1"]);
        let config = build_run_config(&cmd, &FileDefaults::default()).unwrap();

        assert_eq!(config.workload.policy, WorkloadPolicy::Zipfian { alpha: 1.1 });
        assert_eq!(config.workload.value_size, 1024);
        assert_eq!(config.workload.filler, b'Z');
        assert_eq!(config.workload.key_prefix, "key_");
        assert_eq!(config.partitions.default.compaction, CompactionStyle::Universal);
        assert!(config.partitions.hot.is_none());
        assert!(config.runtime.destroy_existing);
        assert_eq!(config.runtime.seed, Some(ZIPF_SEED));
    }

    #[test]
    fn test_zipf_rejects_explicit_seed() {
        let cmd = command(&["zipf", "./zdb", "2000", "8", "1.0", "--seed", "5"]);
        let err = build_run_config(&cmd, &FileDefaults::default()).unwrap_err();
        assert!(err.to_string().contains("--seed 5"));
    }

    #[test]
    fn test_zipf_records_fixed_seed_over_file_seed() {
        let defaults = FileDefaults {
            seed: Some(6),
            ..Default::default()
        };
        let cmd = command(&["zipf", "./zdb", "2000", "8", "1.0"]);
        let config = build_run_config(&cmd, &defaults).unwrap();
        assert_eq!(config.runtime.seed, Some(ZIPF_SEED));
    }

    #[test]
    fn test_non_ascii_filler_rejected() {
        let cmd = command(&[
            "write", "./db", "10", "0", "1", "8", "50", "level", "level", "--filler", "é",
        ]);
        assert!(build_run_config(&cmd, &FileDefaults::default()).is_err());
    }
}
