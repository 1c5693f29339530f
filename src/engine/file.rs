//! File snapshot backend
//!
//! Holds partitions in memory like `MemoryBackend` and persists each one as a
//! bincode snapshot under the database directory:
//!
//! ```text
//! <db_path>/
//!   MANIFEST.json     partition options of the last writer
//!   default.snap      BTreeMap<String, Vec<u8>>
//!   hot.snap
//! ```
//!
//! Snapshots are loaded on open and rewritten on `close` when anything
//! changed. A write is staged in a `.tmp` file and renamed into place.
//!
//! The manifest is read back on open. Reopening a partition with different
//! compaction or compression than the last writer used logs a warning.

use super::memory::{format_statistics, MemoryBackend};
use super::{BackendError, GetOutcome, KvBackend, OpenOptions, Partition};
use crate::config::workload::PartitionOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MANIFEST: &str = "MANIFEST.json";

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    partitions: BTreeMap<Partition, PartitionOptions>,
}

/// Backend persisting partition snapshots to a directory
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    inner: MemoryBackend,
    /// Partition options recorded by the last writer
    previous: BTreeMap<Partition, PartitionOptions>,
    dirty: bool,
    closed: bool,
}

impl FileBackend {
    /// Open (and possibly create or wipe) the database at `path`
    pub fn open(path: &Path, options: &OpenOptions) -> Result<Self, BackendError> {
        if options.destroy_existing && path.exists() {
            debug!(path = %path.display(), "destroying existing database");
            fs::remove_dir_all(path).map_err(|e| open_error(path, e))?;
        }

        if !path.exists() {
            if !options.create_if_missing {
                return Err(BackendError::Open {
                    path: path.to_path_buf(),
                    reason: "database does not exist (create_if_missing is false)".to_string(),
                });
            }
            fs::create_dir_all(path).map_err(|e| open_error(path, e))?;
        } else if !path.is_dir() {
            return Err(BackendError::Open {
                path: path.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        let previous = match read_manifest(path)? {
            Some(manifest) => manifest.partitions,
            None => BTreeMap::new(),
        };
        for (partition, before, requested) in changed_partitions(&previous, options) {
            warn!(
                partition = %partition,
                previous = %before,
                requested = %requested,
                "partition options differ from the last writer"
            );
        }

        let mut inner = MemoryBackend::open(options);
        for (partition, _) in &options.partitions {
            let snap = snapshot_path(path, *partition);
            if snap.exists() {
                let entries = read_snapshot(&snap)?;
                debug!(partition = %partition, keys = entries.len(), "loaded snapshot");
                inner.load_entries(*partition, entries);
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            inner,
            previous,
            dirty: false,
            closed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Options the last writer recorded for `partition`, if any
    pub fn previous_options(&self, partition: Partition) -> Option<PartitionOptions> {
        self.previous.get(&partition).copied()
    }

    /// Number of keys currently held for `partition`
    pub fn len(&self, partition: Partition) -> usize {
        self.inner.len(partition)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Write every partition snapshot and the manifest
    pub fn flush(&mut self) -> Result<(), BackendError> {
        let mut manifest = Manifest {
            partitions: BTreeMap::new(),
        };

        for (partition, data) in self.inner.partition_data() {
            write_snapshot(&snapshot_path(&self.path, *partition), &data.entries)?;
            manifest.partitions.insert(*partition, data.options);
        }

        let manifest_path = self.path.join(MANIFEST);
        let tmp = manifest_path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(&manifest).map_err(|e| BackendError::Corrupt {
            path: manifest_path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &manifest_path)?;

        self.dirty = false;
        Ok(())
    }
}

impl KvBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn has_partition(&self, partition: Partition) -> bool {
        self.inner.has_partition(partition)
    }

    fn put(&mut self, partition: Partition, key: &str, value: &[u8]) -> Result<(), BackendError> {
        self.inner.put(partition, key, value)?;
        self.dirty = true;
        Ok(())
    }

    fn get(&self, partition: Partition, key: &str) -> Result<GetOutcome, BackendError> {
        self.inner.get(partition, key)
    }

    fn statistics(&self) -> String {
        let mut out = format_statistics(self.name(), self.inner.partition_data());
        out.push_str(&format!("kvskew.path : {}\n", self.path.display()));
        out
    }

    fn close(&mut self) -> Result<(), BackendError> {
        if self.closed {
            return Ok(());
        }
        if self.dirty {
            self.flush()?;
        }
        self.closed = true;
        Ok(())
    }
}

impl Drop for FileBackend {
    fn drop(&mut self) {
        if !self.closed && self.dirty {
            if let Err(e) = self.flush() {
                warn!(path = %self.path.display(), error = %e, "failed to flush snapshots on drop");
            }
        }
    }
}

fn snapshot_path(dir: &Path, partition: Partition) -> PathBuf {
    dir.join(format!("{}.snap", partition.name()))
}

fn open_error(path: &Path, e: std::io::Error) -> BackendError {
    BackendError::Open {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn read_manifest(dir: &Path) -> Result<Option<Manifest>, BackendError> {
    let path = dir.join(MANIFEST);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(&path)?;
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| BackendError::Corrupt {
            path,
            reason: e.to_string(),
        })
}

/// Opened partitions whose requested options differ from the recorded ones
///
/// Partitions the manifest does not mention are new and never reported.
fn changed_partitions(
    previous: &BTreeMap<Partition, PartitionOptions>,
    options: &OpenOptions,
) -> Vec<(Partition, PartitionOptions, PartitionOptions)> {
    options
        .partitions
        .iter()
        .filter_map(|(partition, requested)| match previous.get(partition) {
            Some(before) if before != requested => Some((*partition, *before, *requested)),
            _ => None,
        })
        .collect()
}

fn read_snapshot(path: &Path) -> Result<BTreeMap<String, Vec<u8>>, BackendError> {
    let file = fs::File::open(path)?;
    bincode::deserialize_from(BufReader::new(file)).map_err(|e| BackendError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write_snapshot(path: &Path, entries: &BTreeMap<String, Vec<u8>>) -> Result<(), BackendError> {
    let tmp = path.with_extension("tmp");
    let mut writer = BufWriter::new(fs::File::create(&tmp)?);
    bincode::serialize_into(&mut writer, entries).map_err(|e| BackendError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    writer.flush()?;
    drop(writer);
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both() -> OpenOptions {
        OpenOptions::hot_and_default(PartitionOptions::default(), PartitionOptions::default())
    }

    #[test]
    fn test_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");

        let mut db = FileBackend::open(&path, &both()).unwrap();
        db.put(Partition::Hot, "1", b"hot").unwrap();
        db.put(Partition::Default, "2", b"cold").unwrap();
        db.close().unwrap();

        assert!(path.join("hot.snap").exists());
        assert!(path.join("default.snap").exists());
        assert!(path.join(MANIFEST).exists());

        let mut options = both();
        options.create_if_missing = false;
        let db = FileBackend::open(&path, &options).unwrap();
        assert_eq!(db.get(Partition::Hot, "1").unwrap(), GetOutcome::Found(b"hot".to_vec()));
        assert_eq!(db.get(Partition::Default, "2").unwrap(), GetOutcome::Found(b"cold".to_vec()));
        assert_eq!(db.get(Partition::Default, "1").unwrap(), GetOutcome::NotFound);
    }

    #[test]
    fn test_missing_database_without_create() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = both();
        options.create_if_missing = false;

        let err = FileBackend::open(&dir.path().join("absent"), &options).unwrap_err();
        assert!(matches!(err, BackendError::Open { .. }));
    }

    #[test]
    fn test_destroy_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");

        let mut db = FileBackend::open(&path, &both()).unwrap();
        db.put(Partition::Default, "9", b"v").unwrap();
        db.close().unwrap();

        let mut options = both();
        options.destroy_existing = true;
        let db = FileBackend::open(&path, &options).unwrap();
        assert!(db.is_empty());
    }

    #[test]
    fn test_drop_flushes_dirty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");

        {
            let mut db = FileBackend::open(&path, &both()).unwrap();
            db.put(Partition::Hot, "3", b"v").unwrap();
        }

        let db = FileBackend::open(&path, &both()).unwrap();
        assert_eq!(db.len(Partition::Hot), 1);
    }

    #[test]
    fn test_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("default.snap"), b"\xff\xff\xff\xff\xff\xff\xff\xff\xff").unwrap();

        let err = FileBackend::open(&path, &both()).unwrap_err();
        assert!(matches!(err, BackendError::Corrupt { .. }));
    }

    #[test]
    fn test_reopen_reads_manifest_and_spots_changed_options() {
        use crate::config::workload::{CompactionStyle, CompressionType};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");

        let mut db = FileBackend::open(&path, &both()).unwrap();
        db.put(Partition::Hot, "1", b"v").unwrap();
        db.close().unwrap();

        let lz4 = PartitionOptions {
            compaction: CompactionStyle::Universal,
            compression: CompressionType::LZ4,
        };
        let reopened = OpenOptions::hot_and_default(PartitionOptions::default(), lz4);
        let db = FileBackend::open(&path, &reopened).unwrap();

        assert_eq!(db.previous_options(Partition::Hot), Some(PartitionOptions::default()));
        let changed = changed_partitions(&db.previous, &reopened);
        assert_eq!(changed, vec![(Partition::Hot, PartitionOptions::default(), lz4)]);
        assert!(changed_partitions(&db.previous, &both()).is_empty());
    }

    #[test]
    fn test_fresh_database_has_no_previous_options() {
        let dir = tempfile::tempdir().unwrap();
        let db = FileBackend::open(&dir.path().join("db"), &both()).unwrap();
        assert!(db.previous_options(Partition::Default).is_none());
    }

    #[test]
    fn test_corrupt_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join(MANIFEST), b"{ not json").unwrap();

        let err = FileBackend::open(&path, &both()).unwrap_err();
        assert!(matches!(err, BackendError::Corrupt { .. }));
    }

    #[test]
    fn test_path_is_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain");
        fs::write(&path, b"x").unwrap();

        assert!(matches!(FileBackend::open(&path, &both()), Err(BackendError::Open { .. })));
    }
}
