//! Zipfian rank sampler
//!
//! Builds a fixed discrete distribution over ranks `1..=n` where the weight of
//! rank `k` is `k^-alpha`, and draws 0-indexed ranks from it.
//!
//! # Characteristics
//!
//! - Power law: P(k) ∝ 1 / k^alpha
//! - alpha = 0: uniform over all ranks
//! - alpha around 1: classic web/cache skew
//! - Large alpha: almost every draw lands on the first few ranks
//!
//! # Reproducibility
//!
//! The sampler is seeded with [`ZIPF_SEED`], not with process entropy, so two
//! runs over the same `(n, alpha)` produce an identical key-frequency profile.
//!
//! # Example
//!
//! ```
//! use kvskew::distribution::zipf::ZipfianSampler;
//!
//! let mut zipf = ZipfianSampler::new(1000, 0.99).unwrap();
//! let rank = zipf.next();
//! assert!(rank < 1000);
//! ```

use super::random::RandomSource;
use crate::config::ConfigError;

/// Seed every `ZipfianSampler::new` uses
pub const ZIPF_SEED: u64 = 42;

/// Zipf distribution over a fixed number of ranks
///
/// Uses inverse transform sampling against a pre-computed CDF, O(n) to build
/// and O(log n) per draw. The table is never mutated after construction.
#[derive(Debug, Clone)]
pub struct ZipfianSampler {
    alpha: f64,
    cdf: Vec<f64>,
    rng: RandomSource,
}

impl ZipfianSampler {
    /// Create a sampler over `n` ranks with skew `alpha`, seeded with [`ZIPF_SEED`]
    pub fn new(n: u64, alpha: f64) -> Result<Self, ConfigError> {
        Self::with_seed(n, alpha, ZIPF_SEED)
    }

    /// Create a sampler with a specific seed
    pub fn with_seed(n: u64, alpha: f64, seed: u64) -> Result<Self, ConfigError> {
        if n == 0 {
            return Err(ConfigError::EmptyKeyspace);
        }
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(ConfigError::InvalidZipfAlpha(alpha));
        }

        Ok(Self {
            alpha,
            cdf: build_cdf(n, alpha),
            rng: RandomSource::with_seed(seed),
        })
    }

    /// Number of ranks in the table
    pub fn ranks(&self) -> u64 {
        self.cdf.len() as u64
    }

    /// Skew parameter
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Probability mass of a 0-indexed rank
    pub fn probability(&self, rank: u64) -> f64 {
        let i = rank as usize;
        match i {
            0 => self.cdf.first().copied().unwrap_or(0.0),
            i if i < self.cdf.len() => self.cdf[i] - self.cdf[i - 1],
            _ => 0.0,
        }
    }

    /// Draw the next 0-indexed rank in `[0, n)`
    pub fn next(&mut self) -> u64 {
        let u = self.rng.unit();

        // First rank whose cumulative mass exceeds u
        let rank = self.cdf.partition_point(|&c| c <= u);

        // Guard against the last CDF entry landing a hair under 1.0
        rank.min(self.cdf.len() - 1) as u64
    }
}

fn build_cdf(n: u64, alpha: f64) -> Vec<f64> {
    let weights: Vec<f64> = (1..=n).map(|k| (k as f64).powf(-alpha)).collect();
    let total: f64 = weights.iter().sum();

    let mut cdf = Vec::with_capacity(weights.len());
    let mut cumulative = 0.0;
    for w in weights {
        cumulative += w / total;
        cdf.push(cumulative);
    }

    if let Some(last) = cdf.last_mut() {
        *last = 1.0;
    }
    cdf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zipf_basic_range() {
        let mut zipf = ZipfianSampler::new(1000, 1.2).unwrap();
        for _ in 0..1000 {
            assert!(zipf.next() < 1000);
        }
    }

    #[test]
    fn test_zipf_single_rank() {
        let mut zipf = ZipfianSampler::new(1, 2.0).unwrap();
        for _ in 0..100 {
            assert_eq!(zipf.next(), 0);
        }
    }

    #[test]
    fn test_zipf_fixed_seed_reproducible() {
        let mut a = ZipfianSampler::new(5000, 0.99).unwrap();
        let mut b = ZipfianSampler::new(5000, 0.99).unwrap();
        for _ in 0..500 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn test_zipf_different_seed_diverges() {
        let mut a = ZipfianSampler::with_seed(5000, 0.5, 1).unwrap();
        let mut b = ZipfianSampler::with_seed(5000, 0.5, 2).unwrap();
        let same = (0..200).filter(|_| a.next() == b.next()).count();
        assert!(same < 200);
    }

    #[test]
    fn test_zipf_alpha_zero_is_uniform() {
        let zipf = ZipfianSampler::new(10, 0.0).unwrap();
        for rank in 0..10 {
            assert!((zipf.probability(rank) - 0.1).abs() < 1e-9);
        }

        let mut zipf = zipf;
        let mut buckets = [0u32; 10];
        for _ in 0..20_000 {
            buckets[zipf.next() as usize] += 1;
        }
        for count in buckets {
            assert!(count > 1600 && count < 2400, "bucket count {} not uniform", count);
        }
    }

    #[test]
    fn test_zipf_skew() {
        let mut zipf = ZipfianSampler::new(1000, 1.5).unwrap();
        let mut head = 0u32;
        let mut tail = 0u32;
        for _ in 0..10_000 {
            let rank = zipf.next();
            if rank < 100 {
                head += 1;
            } else if rank >= 900 {
                tail += 1;
            }
        }
        assert!(head > tail * 10, "head={} tail={}", head, tail);
    }

    #[test]
    fn test_zipf_probabilities_sum_to_one() {
        let zipf = ZipfianSampler::new(250, 1.1).unwrap();
        let sum: f64 = (0..250).map(|r| zipf.probability(r)).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(zipf.probability(0) > zipf.probability(1));
        assert_eq!(zipf.probability(250), 0.0);
    }

    #[test]
    fn test_zipf_rejects_bad_parameters() {
        assert!(matches!(ZipfianSampler::new(0, 1.0), Err(ConfigError::EmptyKeyspace)));
        assert!(matches!(
            ZipfianSampler::new(10, -0.5),
            Err(ConfigError::InvalidZipfAlpha(_))
        ));
        assert!(ZipfianSampler::new(10, f64::NAN).is_err());
    }
}
