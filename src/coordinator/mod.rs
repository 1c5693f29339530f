//! Coordinator module
//!
//! Orchestrates one benchmark run: validate, open the backend, execute the
//! workload, run the verification pass, close, and assemble the report.

use crate::config::validator::validate_config;
use crate::config::workload::OperationMode;
use crate::config::RunConfig;
use crate::engine::{open_backend, KvBackend, OpenOptions, Partition};
use crate::stats::aggregator::{verify_placement, PlacementCounts, RunReport};
use crate::worker::{RunOptions, WorkloadRunner};
use crate::workload::{AccessPlanner, KeyCodec};
use crate::Result;
use anyhow::Context;
use std::time::Instant;
use tracing::{debug, info};

/// Backend open options a configuration asks for
pub fn open_options(config: &RunConfig) -> OpenOptions {
    let mut partitions = vec![(Partition::Default, config.partitions.default)];
    if let Some(hot) = config.partitions.hot {
        partitions.push((Partition::Hot, hot));
    }

    OpenOptions {
        create_if_missing: !config.runtime.require_existing,
        destroy_existing: config.runtime.destroy_existing,
        partitions,
    }
}

/// Validate `config`, open its backend, and run it
pub fn run(config: &RunConfig) -> Result<RunReport> {
    validate_config(config).context("Configuration validation failed")?;

    let options = open_options(config);
    let mut backend = open_backend(config.backend, &config.db_path, &options)
        .with_context(|| format!("Failed to open {} backend", config.backend))?;

    let report = execute(config, backend.as_mut())?;

    backend.close().context("Failed to close backend")?;
    Ok(report)
}

/// Run `config` against an already opened backend
///
/// The backend is left open; closing it is the caller's job.
pub fn run_with_backend(config: &RunConfig, backend: &mut dyn KvBackend) -> Result<RunReport> {
    validate_config(config).context("Configuration validation failed")?;
    execute(config, backend)
}

/// Run an already validated `config`
fn execute(config: &RunConfig, backend: &mut dyn KvBackend) -> Result<RunReport> {
    let started_at = chrono::Local::now().to_rfc3339();
    let mut planner = AccessPlanner::from_config(&config.workload, config.runtime.seed)
        .context("Failed to build access planner")?;

    debug!(?config, "run configuration");

    let runner = WorkloadRunner::new(RunOptions::from_config(config));
    let stats = runner.run(backend, &mut planner)?;

    info!(
        elapsed_secs = stats.elapsed_secs(),
        hot = stats.hot_count(),
        default = stats.default_count(),
        "workload complete"
    );

    let verification = if config.runtime.verify {
        let verify_start = Instant::now();
        let codec = KeyCodec::new(config.workload.key_prefix.clone());
        let counts: PlacementCounts = verify_placement(&*backend, config.workload.num_keys, &codec)
            .context("Verification pass failed")?;
        info!(
            hot = counts.hot,
            default = counts.default,
            elapsed_ms = verify_start.elapsed().as_millis() as u64,
            "verification pass complete"
        );
        Some(counts)
    } else {
        None
    };

    if config.workload.mode == OperationMode::Read && stats.ops() > 0 && stats.hot_count() + stats.default_count() == 0 {
        info!("no reads found their key; was the database written with the same keyspace?");
    }

    Ok(RunReport::build(
        config,
        &stats,
        verification,
        backend.statistics(),
        started_at,
    ))
}
