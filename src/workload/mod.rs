//! Access planning
//!
//! The `AccessPlanner` turns a workload policy and a seeded random source into
//! a stream of planned operations: which key to touch, whether the access
//! counted as hot, and which partition it is routed to.
//!
//! # Policies
//!
//! | Policy | Key | Partition |
//! |---|---|---|
//! | `Disjoint` | hot range if gated, else outside it | gate |
//! | `Overlap` | whole keyspace | in range AND gate |
//! | `Zipfian` | Zipf rank | always default |
//!
//! # Example
//!
//! ```
//! use kvskew::config::workload::WorkloadPolicy;
//! use kvskew::distribution::hotcold::HotRange;
//! use kvskew::distribution::random::RandomSource;
//! use kvskew::engine::Partition;
//! use kvskew::workload::AccessPlanner;
//!
//! let range = HotRange::new(0, 100, 1000).unwrap();
//! let mut planner = AccessPlanner::hot_cold(
//!     WorkloadPolicy::Disjoint, 1000, range, 100, RandomSource::with_seed(1),
//! ).unwrap();
//!
//! for op in planner.plan(50) {
//!     assert!(op.key <= 100);
//!     assert_eq!(op.partition, Partition::Hot);
//! }
//! ```

pub mod router;

use crate::config::workload::WorkloadPolicy;
use crate::config::{ConfigError, WorkloadConfig};
use crate::distribution::hotcold::{HotColdKeyGenerator, HotRange};
use crate::distribution::random::RandomSource;
use crate::distribution::zipf::ZipfianSampler;
use crate::engine::Partition;
use serde::{Deserialize, Serialize};

/// Outcome of the hot-access gate for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessDecision {
    Hot,
    Cold,
}

impl AccessDecision {
    pub fn from_gate(fired: bool) -> Self {
        if fired {
            AccessDecision::Hot
        } else {
            AccessDecision::Cold
        }
    }

    pub fn is_hot(&self) -> bool {
        matches!(self, AccessDecision::Hot)
    }
}

/// One operation as decided by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedOp {
    pub key: u64,
    pub decision: AccessDecision,
    pub partition: Partition,
}

/// Serializes key indices into backend keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyCodec {
    prefix: String,
}

impl KeyCodec {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// `prefix` followed by the decimal key
    pub fn encode(&self, key: u64) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Encode into a reusable buffer
    pub fn encode_into(&self, key: u64, buf: &mut String) {
        use std::fmt::Write;
        buf.clear();
        buf.push_str(&self.prefix);
        let _ = write!(buf, "{}", key);
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Per-policy sampling state
#[derive(Debug, Clone)]
enum Strategy {
    HotCold {
        generator: HotColdKeyGenerator,
        rng: RandomSource,
    },
    Zipfian {
        sampler: ZipfianSampler,
    },
}

/// Produces the operation stream for one run
#[derive(Debug, Clone)]
pub struct AccessPlanner {
    policy: WorkloadPolicy,
    hot_range: HotRange,
    strategy: Strategy,
}

impl AccessPlanner {
    /// Planner for the `Disjoint` or `Overlap` policy
    pub fn hot_cold(
        policy: WorkloadPolicy,
        num_keys: u64,
        hot_range: HotRange,
        hot_ratio: u8,
        rng: RandomSource,
    ) -> Result<Self, ConfigError> {
        if let WorkloadPolicy::Zipfian { alpha } = policy {
            return Self::zipfian(num_keys, alpha);
        }

        if policy == WorkloadPolicy::Disjoint && hot_ratio < 100 && hot_range.covers(num_keys) {
            return Err(ConfigError::NoColdKeys {
                start: hot_range.start(),
                end: hot_range.end(),
                num_keys,
            });
        }

        Ok(Self {
            policy,
            hot_range,
            strategy: Strategy::HotCold {
                generator: HotColdKeyGenerator::new(num_keys, hot_range, hot_ratio)?,
                rng,
            },
        })
    }

    /// Planner drawing Zipfian ranks over `num_keys` with the fixed seed
    pub fn zipfian(num_keys: u64, alpha: f64) -> Result<Self, ConfigError> {
        Self::from_sampler(ZipfianSampler::new(num_keys, alpha)?)
    }

    /// Planner around an existing sampler
    pub fn from_sampler(sampler: ZipfianSampler) -> Result<Self, ConfigError> {
        let policy = WorkloadPolicy::Zipfian { alpha: sampler.alpha() };
        // Zipfian runs never route hot; the range only satisfies the router
        let hot_range = HotRange::new(0, 0, sampler.ranks())?;
        Ok(Self {
            policy,
            hot_range,
            strategy: Strategy::Zipfian { sampler },
        })
    }

    /// Build the planner a workload configuration asks for
    pub fn from_config(workload: &WorkloadConfig, seed: Option<u64>) -> Result<Self, ConfigError> {
        match workload.policy {
            WorkloadPolicy::Zipfian { alpha } => Self::zipfian(workload.num_keys, alpha),
            policy => Self::hot_cold(
                policy,
                workload.num_keys,
                workload.hot_range()?,
                workload.hot_ratio,
                RandomSource::from_optional_seed(seed),
            ),
        }
    }

    /// Active policy
    pub fn policy(&self) -> WorkloadPolicy {
        self.policy
    }

    pub fn hot_range(&self) -> HotRange {
        self.hot_range
    }

    /// Plan the next operation
    pub fn next_op(&mut self) -> PlannedOp {
        let (key, decision) = match &mut self.strategy {
            Strategy::HotCold { generator, rng } => match self.policy {
                WorkloadPolicy::Overlap => {
                    let key = generator.any_key(rng);
                    let decision = AccessDecision::from_gate(generator.is_hot_access(rng));
                    (key, decision)
                }
                _ => {
                    let decision = AccessDecision::from_gate(generator.is_hot_access(rng));
                    let key = if decision.is_hot() {
                        generator.hot_key(rng)
                    } else {
                        generator.cold_key(rng)
                    };
                    (key, decision)
                }
            },
            Strategy::Zipfian { sampler } => (sampler.next(), AccessDecision::Cold),
        };

        PlannedOp {
            key,
            decision,
            partition: router::route(key, decision, self.policy, self.hot_range),
        }
    }

    /// Plan `len` operations
    pub fn plan(&mut self, len: usize) -> Vec<PlannedOp> {
        (0..len).map(|_| self.next_op()).collect()
    }
}

impl Iterator for AccessPlanner {
    type Item = PlannedOp;

    fn next(&mut self) -> Option<PlannedOp> {
        Some(self.next_op())
    }
}
