//! Post-run verification and report assembly
//!
//! The verification pass re-derives where every key of the keyspace actually
//! lives, independently of the live counters gathered while the workload ran.
//! The two figures can legitimately differ: keys written twice, keys the
//! workload never touched, or keys absent from both partitions.

use super::histogram::LatencySummary;
use super::{PartitionTally, RunStats};
use crate::config::RunConfig;
use crate::engine::{BackendError, KvBackend, Partition};
use crate::workload::KeyCodec;
use serde::{Deserialize, Serialize};

/// Keys found per partition by the verification pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementCounts {
    pub hot: u64,
    pub default: u64,
}

impl PlacementCounts {
    pub fn total(&self) -> u64 {
        self.hot + self.default
    }
}

/// Count, for every key index in `[0, num_keys)`, which partition holds it
///
/// The hot partition is checked first and a hit there skips the default
/// partition, so a key present in both is counted once, as hot. Read-only
/// and independent of iteration order; `hot + default <= num_keys`.
/// A backend without a hot partition is checked against `default` only.
pub fn verify_placement(
    backend: &dyn KvBackend,
    num_keys: u64,
    codec: &KeyCodec,
) -> Result<PlacementCounts, BackendError> {
    let check_hot = backend.has_partition(Partition::Hot);
    let mut counts = PlacementCounts::default();
    let mut key = String::new();

    for index in 0..num_keys {
        codec.encode_into(index, &mut key);

        if check_hot && backend.get(Partition::Hot, &key)?.is_found() {
            counts.hot += 1;
            continue;
        }

        if backend.get(Partition::Default, &key)?.is_found() {
            counts.default += 1;
        }
    }

    Ok(counts)
}

/// Everything a finished run reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: String,
    pub host: String,
    pub backend: String,
    pub mode: String,
    pub policy: String,
    pub num_keys: u64,
    pub num_ops: u64,
    pub hot_start: u64,
    pub hot_end: u64,
    pub hot_ratio: u8,
    /// Whether the run opened a hot partition; the range fields are
    /// meaningless without one
    pub hot_partition: bool,
    pub value_size: usize,
    pub seed: Option<u64>,
    /// Wall-clock seconds of the operation loop, millisecond resolution
    pub elapsed_secs: f64,
    pub ops_per_sec: f64,
    /// Live count for the hot partition (writes routed, or reads found)
    pub hot_count: u64,
    /// Live count for the default partition
    pub default_count: u64,
    pub routed_hot_fraction: f64,
    pub hot: PartitionTally,
    pub default: PartitionTally,
    pub errors: u64,
    /// Ground-truth placement from the verification pass, when it ran
    pub verification: Option<PlacementCounts>,
    pub latency: Option<LatencySummary>,
    /// Backend statistics dump
    pub backend_statistics: String,
}

impl RunReport {
    pub fn build(
        config: &RunConfig,
        stats: &RunStats,
        verification: Option<PlacementCounts>,
        backend_statistics: String,
        started_at: String,
    ) -> Self {
        let workload = &config.workload;
        Self {
            started_at,
            host: host_name(),
            backend: config.backend.to_string(),
            mode: workload.mode.to_string(),
            policy: workload.policy.to_string(),
            num_keys: workload.num_keys,
            num_ops: workload.ops(),
            hot_start: workload.hot_start,
            hot_end: workload.hot_end,
            hot_ratio: workload.hot_ratio,
            hot_partition: config.partitions.hot.is_some(),
            value_size: workload.value_size,
            seed: config.runtime.seed,
            elapsed_secs: stats.elapsed_secs(),
            ops_per_sec: stats.ops_per_sec(),
            hot_count: stats.hot_count(),
            default_count: stats.default_count(),
            routed_hot_fraction: stats.hot_fraction(),
            hot: *stats.tally(Partition::Hot),
            default: *stats.tally(Partition::Default),
            errors: stats.errors(),
            verification,
            latency: stats.latency().and_then(|h| h.summary()),
            backend_statistics,
        }
    }
}

fn host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::workload::PartitionOptions;
    use crate::engine::memory::MemoryBackend;
    use crate::engine::OpenOptions;

    fn backend() -> MemoryBackend {
        MemoryBackend::open(&OpenOptions::hot_and_default(
            PartitionOptions::default(),
            PartitionOptions::default(),
        ))
    }

    #[test]
    fn test_counts_each_partition() {
        let mut db = backend();
        db.put(Partition::Hot, "0", b"v").unwrap();
        db.put(Partition::Hot, "1", b"v").unwrap();
        db.put(Partition::Default, "5", b"v").unwrap();

        let counts = verify_placement(&db, 10, &KeyCodec::default()).unwrap();
        assert_eq!(counts, PlacementCounts { hot: 2, default: 1 });
    }

    #[test]
    fn test_key_in_both_counts_once_as_hot() {
        let mut db = backend();
        db.put(Partition::Hot, "3", b"v").unwrap();
        db.put(Partition::Default, "3", b"v").unwrap();

        let counts = verify_placement(&db, 10, &KeyCodec::default()).unwrap();
        assert_eq!(counts, PlacementCounts { hot: 1, default: 0 });
    }

    #[test]
    fn test_idempotent_and_bounded() {
        let mut db = backend();
        for i in (0..100).step_by(3) {
            let partition = if i % 2 == 0 { Partition::Hot } else { Partition::Default };
            db.put(partition, &i.to_string(), b"v").unwrap();
        }

        let first = verify_placement(&db, 100, &KeyCodec::default()).unwrap();
        let second = verify_placement(&db, 100, &KeyCodec::default()).unwrap();
        assert_eq!(first, second);
        assert!(first.total() <= 100);
        assert_eq!(first.total(), 34);
    }

    #[test]
    fn test_keys_outside_keyspace_ignored() {
        let mut db = backend();
        db.put(Partition::Default, "500", b"v").unwrap();
        let counts = verify_placement(&db, 100, &KeyCodec::default()).unwrap();
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_prefixed_keys() {
        let mut db = MemoryBackend::open(&OpenOptions::default_only(PartitionOptions::default()));
        db.put(Partition::Default, "key_4", b"Z").unwrap();
        db.put(Partition::Default, "4", b"Z").unwrap();

        let counts = verify_placement(&db, 10, &KeyCodec::new("key_")).unwrap();
        assert_eq!(counts, PlacementCounts { hot: 0, default: 1 });
    }

    #[test]
    fn test_backend_error_propagates() {
        let mut db = backend();
        db.fail_on_key("2");
        assert!(matches!(
            verify_placement(&db, 10, &KeyCodec::default()),
            Err(BackendError::Injected(_))
        ));
    }
}
