//! kvskew - skewed workload generator for key-value storage engines
//!
//! kvskew drives a key-value store with a configurable hot/cold or Zipfian
//! access pattern, routes every operation to one of two logical partitions,
//! and afterwards counts where each key actually landed.
//!
//! # Architecture
//!
//! - **Distributions**: seeded uniform source, Zipfian sampler, hot/cold key generator
//! - **Workload**: access planner (disjoint or overlap policy) and placement router
//! - **Engines**: in-memory and file-snapshot backends behind one `KvBackend` trait
//! - **Stats**: live per-partition counters, latency histograms, verification pass

pub mod config;
pub mod coordinator;
pub mod distribution;
pub mod engine;
pub mod output;
pub mod stats;
pub mod worker;
pub mod workload;

// Re-export commonly used types
pub use config::RunConfig;
pub use engine::{KvBackend, Partition};
pub use workload::AccessPlanner;

/// Result type used throughout kvskew
pub type Result<T> = anyhow::Result<T>;
