//! Storage backend abstraction
//!
//! kvskew never implements storage itself. It issues puts and gets against a
//! `KvBackend` and observes the outcomes. A backend exposes a small fixed set
//! of logical partitions (`default` and optionally `hot`), each opened with
//! its own compaction and compression settings.
//!
//! # Backends
//!
//! - **memory**: volatile maps, used by tests and dry experiments
//! - **file**: memory maps snapshotted per partition under the database
//!   directory, so a write run can be followed by a read run
//!
//! # Example
//!
//! ```
//! use kvskew::engine::{GetOutcome, KvBackend, OpenOptions, Partition};
//! use kvskew::engine::memory::MemoryBackend;
//!
//! let mut db = MemoryBackend::open(&OpenOptions::hot_and_default(Default::default(), Default::default()));
//! db.put(Partition::Hot, "7", b"vvvv").unwrap();
//!
//! assert!(matches!(db.get(Partition::Hot, "7").unwrap(), GetOutcome::Found(_)));
//! assert!(matches!(db.get(Partition::Default, "7").unwrap(), GetOutcome::NotFound));
//! ```

pub mod file;
pub mod memory;

use crate::config::workload::{BackendKind, PartitionOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Logical destination of an operation inside the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Default,
    Hot,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Default, Partition::Hot];

    pub fn name(&self) -> &'static str {
        match self {
            Partition::Default => "default",
            Partition::Hot => "hot",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a successful get
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetOutcome {
    Found(Vec<u8>),
    /// The key is absent; a normal, countable outcome
    NotFound,
}

impl GetOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, GetOutcome::Found(_))
    }
}

/// Backend failures other than "not found"
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to open database at {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("partition '{0}' was not opened")]
    UnknownPartition(Partition),

    #[error("corrupt snapshot {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("backend I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("injected failure for key '{0}'")]
    Injected(String),
}

/// Options passed to a backend when it is opened
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Create the database when the path does not exist
    pub create_if_missing: bool,
    /// Remove any existing database before opening
    pub destroy_existing: bool,
    /// Partitions to open with their storage settings
    pub partitions: Vec<(Partition, PartitionOptions)>,
}

impl OpenOptions {
    /// Both partitions, creating the database if needed
    pub fn hot_and_default(default: PartitionOptions, hot: PartitionOptions) -> Self {
        Self {
            create_if_missing: true,
            destroy_existing: false,
            partitions: vec![(Partition::Default, default), (Partition::Hot, hot)],
        }
    }

    /// Only the default partition, creating the database if needed
    pub fn default_only(default: PartitionOptions) -> Self {
        Self {
            create_if_missing: true,
            destroy_existing: false,
            partitions: vec![(Partition::Default, default)],
        }
    }
}

/// Key-value storage backend
///
/// # Lifecycle
///
/// 1. Open via `open_backend` (or a concrete type's `open`)
/// 2. Issue `put` / `get` against opened partitions
/// 3. Call `close` so buffered state reaches durable storage
///
/// # Thread Safety
///
/// Backends must be `Send`; runs are single-threaded and own their backend.
pub trait KvBackend: Send {
    /// Short backend name used in reports
    fn name(&self) -> &'static str;

    /// Whether `partition` was opened
    fn has_partition(&self, partition: Partition) -> bool;

    /// Store `value` under `key`, replacing any previous value
    fn put(&mut self, partition: Partition, key: &str, value: &[u8]) -> Result<(), BackendError>;

    /// Look up `key`
    fn get(&self, partition: Partition, key: &str) -> Result<GetOutcome, BackendError>;

    /// Free-form statistics dump, one counter per line
    fn statistics(&self) -> String;

    /// Flush and release the backend
    fn close(&mut self) -> Result<(), BackendError>;
}

/// Open the backend selected by `kind`
pub fn open_backend(
    kind: BackendKind,
    path: &Path,
    options: &OpenOptions,
) -> Result<Box<dyn KvBackend>, BackendError> {
    match kind {
        BackendKind::Memory => Ok(Box::new(memory::MemoryBackend::open(options))),
        BackendKind::File => Ok(Box::new(file::FileBackend::open(path, options)?)),
    }
}
