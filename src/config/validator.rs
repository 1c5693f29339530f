//! Configuration validation

use super::*;

/// Validate complete configuration
///
/// Every check here runs before the backend is opened, so a rejected
/// configuration never leaves a partial run behind.
pub fn validate_config(config: &RunConfig) -> Result<(), ConfigError> {
    validate_workload(&config.workload)?;
    Ok(())
}

/// Validate workload configuration
pub fn validate_workload(workload: &WorkloadConfig) -> Result<(), ConfigError> {
    if workload.num_keys == 0 {
        return Err(ConfigError::EmptyKeyspace);
    }

    match workload.policy {
        WorkloadPolicy::Zipfian { alpha } => {
            if !alpha.is_finite() || alpha < 0.0 {
                return Err(ConfigError::InvalidZipfAlpha(alpha));
            }
        }
        WorkloadPolicy::Disjoint | WorkloadPolicy::Overlap => {
            if workload.hot_ratio > 100 {
                return Err(ConfigError::InvalidHotRatio(workload.hot_ratio));
            }
            let range = workload.hot_range()?;

            // Cold keys are found by rejection; a range with nothing outside
            // it would never yield one.
            if workload.policy == WorkloadPolicy::Disjoint
                && workload.hot_ratio < 100
                && range.covers(workload.num_keys)
            {
                return Err(ConfigError::NoColdKeys {
                    start: range.start(),
                    end: range.end(),
                    num_keys: workload.num_keys,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workload(policy: WorkloadPolicy, num_keys: u64, start: u64, end: u64, ratio: u8) -> WorkloadConfig {
        WorkloadConfig {
            mode: OperationMode::Write,
            policy,
            num_keys,
            num_ops: None,
            hot_start: start,
            hot_end: end,
            hot_ratio: ratio,
            value_size: 16,
            filler: b'v',
            key_prefix: String::new(),
        }
    }

    #[test]
    fn test_valid_disjoint() {
        assert!(validate_workload(&workload(WorkloadPolicy::Disjoint, 1000, 0, 100, 70)).is_ok());
    }

    #[test]
    fn test_empty_keyspace() {
        assert!(matches!(
            validate_workload(&workload(WorkloadPolicy::Overlap, 0, 0, 0, 10)),
            Err(ConfigError::EmptyKeyspace)
        ));
    }

    #[test]
    fn test_bad_hot_range() {
        assert!(matches!(
            validate_workload(&workload(WorkloadPolicy::Disjoint, 100, 50, 10, 10)),
            Err(ConfigError::InvalidHotRange { .. })
        ));
        assert!(matches!(
            validate_workload(&workload(WorkloadPolicy::Overlap, 100, 0, 100, 10)),
            Err(ConfigError::InvalidHotRange { .. })
        ));
    }

    #[test]
    fn test_bad_ratio() {
        assert!(matches!(
            validate_workload(&workload(WorkloadPolicy::Disjoint, 100, 0, 10, 150)),
            Err(ConfigError::InvalidHotRatio(150))
        ));
    }

    #[test]
    fn test_disjoint_full_range_needs_all_hot() {
        assert!(matches!(
            validate_workload(&workload(WorkloadPolicy::Disjoint, 100, 0, 99, 50)),
            Err(ConfigError::NoColdKeys { .. })
        ));
        // No cold draws happen at 100%
        assert!(validate_workload(&workload(WorkloadPolicy::Disjoint, 100, 0, 99, 100)).is_ok());
        // Overlap never rejects
        assert!(validate_workload(&workload(WorkloadPolicy::Overlap, 100, 0, 99, 50)).is_ok());
    }

    #[test]
    fn test_zipf_ignores_hot_range() {
        let w = workload(WorkloadPolicy::Zipfian { alpha: 0.9 }, 100, 0, 0, 0);
        assert!(validate_workload(&w).is_ok());

        let w = workload(WorkloadPolicy::Zipfian { alpha: -1.0 }, 100, 0, 0, 0);
        assert!(matches!(validate_workload(&w), Err(ConfigError::InvalidZipfAlpha(_))));
    }
}
