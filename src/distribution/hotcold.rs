//! Hot/cold key generation
//!
//! A keyspace `[0, num_keys)` carries one inclusive hot range. The generator
//! hands out hot keys (uniform inside the range), cold keys (uniform outside
//! it, by rejection) or plain uniform keys over the whole keyspace.

use super::random::RandomSource;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Inclusive key interval `[start, end]` treated as frequently accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotRange {
    start: u64,
    end: u64,
}

impl HotRange {
    /// Create a hot range inside the keyspace `[0, num_keys)`
    pub fn new(start: u64, end: u64, num_keys: u64) -> Result<Self, ConfigError> {
        if num_keys == 0 {
            return Err(ConfigError::EmptyKeyspace);
        }
        if start > end || end >= num_keys {
            return Err(ConfigError::InvalidHotRange { start, end, num_keys });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    #[inline]
    pub fn contains(&self, key: u64) -> bool {
        key >= self.start && key <= self.end
    }

    /// Number of keys in the range
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// True when the range covers the whole keyspace, leaving no cold keys
    pub fn covers(&self, num_keys: u64) -> bool {
        self.start == 0 && self.end + 1 >= num_keys
    }
}

/// Generates hot, cold, or unbiased keys for one keyspace
#[derive(Debug, Clone)]
pub struct HotColdKeyGenerator {
    num_keys: u64,
    hot_range: HotRange,
    hot_ratio: u8,
}

impl HotColdKeyGenerator {
    /// `hot_ratio` is the hot-access percentage in `[0, 100]`
    pub fn new(num_keys: u64, hot_range: HotRange, hot_ratio: u8) -> Result<Self, ConfigError> {
        if num_keys == 0 {
            return Err(ConfigError::EmptyKeyspace);
        }
        if hot_ratio > 100 {
            return Err(ConfigError::InvalidHotRatio(hot_ratio));
        }
        if hot_range.end() >= num_keys {
            return Err(ConfigError::InvalidHotRange {
                start: hot_range.start(),
                end: hot_range.end(),
                num_keys,
            });
        }
        Ok(Self {
            num_keys,
            hot_range,
            hot_ratio,
        })
    }

    pub fn num_keys(&self) -> u64 {
        self.num_keys
    }

    pub fn hot_range(&self) -> HotRange {
        self.hot_range
    }

    pub fn hot_ratio(&self) -> u8 {
        self.hot_ratio
    }

    /// Flip the hot-access gate
    #[inline]
    pub fn is_hot_access(&self, rng: &mut RandomSource) -> bool {
        rng.bernoulli_percent(self.hot_ratio)
    }

    /// Uniform key inside the hot range
    #[inline]
    pub fn hot_key(&self, rng: &mut RandomSource) -> u64 {
        rng.uniform(self.hot_range.start(), self.hot_range.end())
    }

    /// Uniform key outside the hot range
    ///
    /// Rejection sampling over the full keyspace. Precondition: the hot range
    /// must leave at least one cold key (`!hot_range.covers(num_keys)`),
    /// otherwise this never returns. `config::validator` enforces it before
    /// any run starts.
    pub fn cold_key(&self, rng: &mut RandomSource) -> u64 {
        loop {
            let key = rng.uniform(0, self.num_keys - 1);
            if !self.hot_range.contains(key) {
                return key;
            }
        }
    }

    /// Uniform key over the whole keyspace, hot range included
    #[inline]
    pub fn any_key(&self, rng: &mut RandomSource) -> u64 {
        rng.uniform(0, self.num_keys - 1)
    }
}
