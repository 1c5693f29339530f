//! Key distributions
//!
//! This module provides the samplers that turn a seeded random source into key
//! indices. Keys are integers in `[0, num_keys)`; serialization to strings
//! happens later, in `workload::KeyCodec`.
//!
//! # Distributions
//!
//! - **RandomSource**: uniform integers and percentage gates (xoshiro256++)
//! - **HotColdKeyGenerator**: hot-range keys and cold keys outside the range
//! - **ZipfianSampler**: power-law ranks with a fixed seed
//!
//! # Example
//!
//! ```
//! use kvskew::distribution::hotcold::{HotColdKeyGenerator, HotRange};
//! use kvskew::distribution::random::RandomSource;
//!
//! let range = HotRange::new(0, 99, 1000).unwrap();
//! let gen = HotColdKeyGenerator::new(1000, range, 70).unwrap();
//! let mut rng = RandomSource::with_seed(1);
//!
//! let key = gen.cold_key(&mut rng);
//! assert!(key >= 100 && key < 1000);
//! ```

pub mod hotcold;
pub mod random;
pub mod zipf;
