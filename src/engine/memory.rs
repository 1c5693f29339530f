//! In-memory backend
//!
//! Each partition is an ordered map from key to value. Compaction and
//! compression settings are recorded and reported but have no effect on the
//! stored bytes. Counters use `Cell` so that `get(&self)` can count without
//! locking; the backend is owned by a single run thread.
//!
//! Failures can be injected per key for testing error policies.

use super::{BackendError, GetOutcome, KvBackend, OpenOptions, Partition};
use crate::config::workload::PartitionOptions;
use std::cell::Cell;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

/// Counters kept per partition
#[derive(Debug, Default)]
pub struct PartitionCounters {
    pub puts: Cell<u64>,
    pub gets: Cell<u64>,
    pub hits: Cell<u64>,
    pub misses: Cell<u64>,
    pub bytes_written: Cell<u64>,
}

impl PartitionCounters {
    fn bump(cell: &Cell<u64>, by: u64) {
        cell.set(cell.get() + by);
    }
}

/// One opened partition
#[derive(Debug, Default)]
pub struct PartitionData {
    pub options: PartitionOptions,
    pub entries: BTreeMap<String, Vec<u8>>,
    pub counters: PartitionCounters,
}

/// Volatile key-value backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    partitions: BTreeMap<Partition, PartitionData>,
    fail_keys: HashSet<String>,
    closed: bool,
}

impl MemoryBackend {
    /// Open the partitions listed in `options`
    pub fn open(options: &OpenOptions) -> Self {
        let partitions = options
            .partitions
            .iter()
            .map(|(partition, opts)| {
                (
                    *partition,
                    PartitionData {
                        options: *opts,
                        ..Default::default()
                    },
                )
            })
            .collect();

        Self {
            partitions,
            ..Default::default()
        }
    }

    /// Make every put/get of `key` fail with `BackendError::Injected`
    pub fn fail_on_key(&mut self, key: impl Into<String>) {
        self.fail_keys.insert(key.into());
    }

    /// Number of keys stored in `partition`
    pub fn len(&self, partition: Partition) -> usize {
        self.partitions
            .get(&partition)
            .map(|p| p.entries.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.values().all(|p| p.entries.is_empty())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Counters for `partition`, if it was opened
    pub fn counters(&self, partition: Partition) -> Option<&PartitionCounters> {
        self.partitions.get(&partition).map(|p| &p.counters)
    }

    pub(crate) fn partition_data(&self) -> &BTreeMap<Partition, PartitionData> {
        &self.partitions
    }

    pub(crate) fn load_entries(&mut self, partition: Partition, entries: BTreeMap<String, Vec<u8>>) {
        if let Some(data) = self.partitions.get_mut(&partition) {
            data.entries = entries;
        }
    }

    fn check_injected(&self, key: &str) -> Result<(), BackendError> {
        if self.fail_keys.contains(key) {
            return Err(BackendError::Injected(key.to_string()));
        }
        Ok(())
    }
}

impl KvBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn has_partition(&self, partition: Partition) -> bool {
        self.partitions.contains_key(&partition)
    }

    fn put(&mut self, partition: Partition, key: &str, value: &[u8]) -> Result<(), BackendError> {
        self.check_injected(key)?;
        let data = self
            .partitions
            .get_mut(&partition)
            .ok_or(BackendError::UnknownPartition(partition))?;

        PartitionCounters::bump(&data.counters.puts, 1);
        PartitionCounters::bump(&data.counters.bytes_written, (key.len() + value.len()) as u64);
        data.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, partition: Partition, key: &str) -> Result<GetOutcome, BackendError> {
        self.check_injected(key)?;
        let data = self
            .partitions
            .get(&partition)
            .ok_or(BackendError::UnknownPartition(partition))?;

        PartitionCounters::bump(&data.counters.gets, 1);
        match data.entries.get(key) {
            Some(value) => {
                PartitionCounters::bump(&data.counters.hits, 1);
                Ok(GetOutcome::Found(value.clone()))
            }
            None => {
                PartitionCounters::bump(&data.counters.misses, 1);
                Ok(GetOutcome::NotFound)
            }
        }
    }

    fn statistics(&self) -> String {
        format_statistics(self.name(), &self.partitions)
    }

    fn close(&mut self) -> Result<(), BackendError> {
        self.closed = true;
        Ok(())
    }
}

/// Render the per-partition counters as `name : value` lines
pub(crate) fn format_statistics(backend: &str, partitions: &BTreeMap<Partition, PartitionData>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "kvskew.backend : {}", backend);

    for (partition, data) in partitions {
        let c = &data.counters;
        let _ = writeln!(out, "[{}] {}", partition, data.options);
        let _ = writeln!(out, "  {}.keys.live : {}", partition, data.entries.len());
        let _ = writeln!(out, "  {}.put.count : {}", partition, c.puts.get());
        let _ = writeln!(out, "  {}.get.count : {}", partition, c.gets.get());
        let _ = writeln!(out, "  {}.get.hit : {}", partition, c.hits.get());
        let _ = writeln!(out, "  {}.get.miss : {}", partition, c.misses.get());
        let _ = writeln!(out, "  {}.bytes.written : {}", partition, c.bytes_written.get());
    }

    out
}
