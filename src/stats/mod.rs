//! Statistics collection
//!
//! `RunStats` holds the live counters of one run: operations routed to each
//! partition, read hits and misses, tolerated errors, and the wall-clock time
//! spanning the whole operation loop. Runs are single-threaded, so the
//! counters are plain integers updated inline.
//!
//! The `aggregator` submodule adds the post-run verification pass and folds
//! everything into a `RunReport`.
//!
//! # Example
//!
//! ```
//! use kvskew::config::workload::OperationMode;
//! use kvskew::engine::Partition;
//! use kvskew::stats::RunStats;
//!
//! let mut stats = RunStats::new(OperationMode::Read);
//! stats.record_read(Partition::Hot, true);
//! stats.record_read(Partition::Default, false);
//!
//! assert_eq!(stats.hot_count(), 1);
//! assert_eq!(stats.default_count(), 0);
//! assert_eq!(stats.ops(), 2);
//! ```

pub mod aggregator;
pub mod histogram;

use crate::config::workload::OperationMode;
use crate::engine::Partition;
use histogram::LatencyHistogram;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters for one partition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionTally {
    /// Operations routed here
    pub ops: u64,
    /// Reads that found the key
    pub found: u64,
    /// Reads that did not
    pub not_found: u64,
    /// Failed backend calls
    pub errors: u64,
}

/// Live counters of one run
#[derive(Debug, Clone)]
pub struct RunStats {
    mode: OperationMode,
    hot: PartitionTally,
    default: PartitionTally,
    elapsed: Duration,
    latency: Option<LatencyHistogram>,
}

impl RunStats {
    pub fn new(mode: OperationMode) -> Self {
        Self {
            mode,
            hot: PartitionTally::default(),
            default: PartitionTally::default(),
            elapsed: Duration::ZERO,
            latency: None,
        }
    }

    /// Also keep a per-operation latency histogram
    pub fn with_latency(mut self, histogram: LatencyHistogram) -> Self {
        self.latency = Some(histogram);
        self
    }

    pub fn mode(&self) -> OperationMode {
        self.mode
    }

    fn tally_mut(&mut self, partition: Partition) -> &mut PartitionTally {
        match partition {
            Partition::Hot => &mut self.hot,
            Partition::Default => &mut self.default,
        }
    }

    pub fn tally(&self, partition: Partition) -> &PartitionTally {
        match partition {
            Partition::Hot => &self.hot,
            Partition::Default => &self.default,
        }
    }

    #[inline]
    pub fn record_write(&mut self, partition: Partition) {
        self.tally_mut(partition).ops += 1;
    }

    #[inline]
    pub fn record_read(&mut self, partition: Partition, found: bool) {
        let tally = self.tally_mut(partition);
        tally.ops += 1;
        if found {
            tally.found += 1;
        } else {
            tally.not_found += 1;
        }
    }

    #[inline]
    pub fn record_error(&mut self, partition: Partition) {
        let tally = self.tally_mut(partition);
        tally.ops += 1;
        tally.errors += 1;
    }

    #[inline]
    pub fn record_latency(&mut self, latency: Duration) {
        if let Some(hist) = self.latency.as_mut() {
            hist.record(latency);
        }
    }

    pub fn tracks_latency(&self) -> bool {
        self.latency.is_some()
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    /// Hot-partition count: writes routed there, or reads found there
    pub fn hot_count(&self) -> u64 {
        self.count(Partition::Hot)
    }

    /// Default-partition count: writes routed there, or reads found there
    pub fn default_count(&self) -> u64 {
        self.count(Partition::Default)
    }

    fn count(&self, partition: Partition) -> u64 {
        let tally = self.tally(partition);
        match self.mode {
            OperationMode::Write => tally.ops - tally.errors,
            OperationMode::Read => tally.found,
        }
    }

    pub fn ops(&self) -> u64 {
        self.hot.ops + self.default.ops
    }

    pub fn errors(&self) -> u64 {
        self.hot.errors + self.default.errors
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed seconds at millisecond resolution
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_millis() as f64 / 1000.0
    }

    /// Fraction of operations routed to the hot partition
    pub fn hot_fraction(&self) -> f64 {
        if self.ops() == 0 {
            return 0.0;
        }
        self.hot.ops as f64 / self.ops() as f64
    }

    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.ops() as f64 / secs
    }

    pub fn latency(&self) -> Option<&LatencyHistogram> {
        self.latency.as_ref()
    }
}
