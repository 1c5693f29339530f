//! Workload runner
//!
//! Drives the planned operation stream against a backend. Each iteration plans
//! one operation, encodes the key, and issues exactly one put or get on the
//! partition the planner routed it to. A single wall-clock measurement spans
//! the whole loop.
//!
//! # Errors
//!
//! "Not found" on a read is a counted outcome. Any other backend failure
//! follows the configured `ErrorPolicy`: `Fatal` ends the run with the error,
//! `Continue` logs it, counts it against the partition, and moves on. There
//! are no retries.

use crate::config::workload::{ErrorPolicy, OperationMode};
use crate::config::RunConfig;
use crate::engine::{GetOutcome, KvBackend};
use crate::stats::histogram::LatencyHistogram;
use crate::stats::RunStats;
use crate::workload::{AccessPlanner, KeyCodec};
use crate::Result;
use anyhow::Context;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Knobs of the operation loop
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: OperationMode,
    pub num_ops: u64,
    pub value_size: usize,
    pub filler: u8,
    pub codec: KeyCodec,
    pub error_policy: ErrorPolicy,
    /// Log progress every N operations (0 disables)
    pub progress_interval: u64,
    /// Time every backend call individually
    pub latency: bool,
}

impl RunOptions {
    pub fn from_config(config: &RunConfig) -> Self {
        let workload = &config.workload;
        Self {
            mode: workload.mode,
            num_ops: workload.ops(),
            value_size: workload.value_size,
            filler: workload.filler,
            codec: KeyCodec::new(workload.key_prefix.clone()),
            error_policy: config.runtime.error_policy,
            progress_interval: config.output.progress_interval,
            latency: config.output.latency,
        }
    }
}

/// Executes one workload against one backend
#[derive(Debug, Clone)]
pub struct WorkloadRunner {
    options: RunOptions,
}

impl WorkloadRunner {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Issue `num_ops` planned operations and return the live counters
    pub fn run(&self, backend: &mut dyn KvBackend, planner: &mut AccessPlanner) -> Result<RunStats> {
        let opts = &self.options;

        let mut stats = RunStats::new(opts.mode);
        if opts.latency {
            let histogram = LatencyHistogram::new().context("Failed to create latency histogram")?;
            stats = stats.with_latency(histogram);
        }

        let value = vec![opts.filler; opts.value_size];
        let mut key = String::new();

        info!(
            mode = %opts.mode,
            policy = %planner.policy(),
            ops = opts.num_ops,
            backend = backend.name(),
            "starting workload"
        );

        let start = Instant::now();

        for done in 1..=opts.num_ops {
            let op = planner.next_op();
            opts.codec.encode_into(op.key, &mut key);

            let issued = stats.tracks_latency().then(Instant::now);
            let outcome = match opts.mode {
                OperationMode::Write => backend.put(op.partition, &key, &value).map(|()| None),
                OperationMode::Read => backend
                    .get(op.partition, &key)
                    .map(|got| Some(matches!(got, GetOutcome::Found(_)))),
            };
            if let Some(issued) = issued {
                stats.record_latency(issued.elapsed());
            }

            match outcome {
                Ok(None) => stats.record_write(op.partition),
                Ok(Some(found)) => stats.record_read(op.partition, found),
                Err(e) => match opts.error_policy {
                    ErrorPolicy::Fatal => {
                        return Err(anyhow::Error::new(e).context(format!(
                            "{} of key '{}' in partition '{}' failed at operation {}",
                            opts.mode, key, op.partition, done
                        )));
                    }
                    ErrorPolicy::Continue => {
                        warn!(key = %key, partition = %op.partition, error = %e, "backend call failed, continuing");
                        stats.record_error(op.partition);
                    }
                },
            }

            if opts.progress_interval > 0 && done % opts.progress_interval == 0 {
                info!(done, total = opts.num_ops, "progress");
            }
        }

        stats.set_elapsed(start.elapsed());

        debug!(
            hot = stats.hot_count(),
            default = stats.default_count(),
            errors = stats.errors(),
            elapsed_secs = stats.elapsed_secs(),
            "workload finished"
        );

        Ok(stats)
    }
}
