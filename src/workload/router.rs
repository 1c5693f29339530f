//! Placement routing
//!
//! Maps a generated key and its access decision to the partition the
//! operation is issued against. Pure, no state.

use super::AccessDecision;
use crate::config::workload::WorkloadPolicy;
use crate::distribution::hotcold::HotRange;
pub use crate::engine::Partition;

/// Decide the partition for one operation
///
/// - `Disjoint` / `Zipfian`: the access decision alone picks the partition.
/// - `Overlap`: hot only when the key lies in `hot_range` and the decision is hot.
#[inline]
pub fn route(key: u64, decision: AccessDecision, policy: WorkloadPolicy, hot_range: HotRange) -> Partition {
    let hot = match policy {
        WorkloadPolicy::Disjoint | WorkloadPolicy::Zipfian { .. } => decision.is_hot(),
        WorkloadPolicy::Overlap => hot_range.contains(key) && decision.is_hot(),
    };

    if hot {
        Partition::Hot
    } else {
        Partition::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> HotRange {
        HotRange::new(10, 20, 100).unwrap()
    }

    #[test]
    fn test_disjoint_follows_decision() {
        // Key identity is irrelevant under the disjoint policy
        assert_eq!(route(50, AccessDecision::Hot, WorkloadPolicy::Disjoint, range()), Partition::Hot);
        assert_eq!(route(15, AccessDecision::Cold, WorkloadPolicy::Disjoint, range()), Partition::Default);
    }

    #[test]
    fn test_overlap_needs_both() {
        let p = WorkloadPolicy::Overlap;
        assert_eq!(route(15, AccessDecision::Hot, p, range()), Partition::Hot);
        assert_eq!(route(15, AccessDecision::Cold, p, range()), Partition::Default);
        assert_eq!(route(50, AccessDecision::Hot, p, range()), Partition::Default);
        assert_eq!(route(50, AccessDecision::Cold, p, range()), Partition::Default);
    }

    #[test]
    fn test_overlap_range_edges() {
        let p = WorkloadPolicy::Overlap;
        assert_eq!(route(10, AccessDecision::Hot, p, range()), Partition::Hot);
        assert_eq!(route(20, AccessDecision::Hot, p, range()), Partition::Hot);
        assert_eq!(route(9, AccessDecision::Hot, p, range()), Partition::Default);
        assert_eq!(route(21, AccessDecision::Hot, p, range()), Partition::Default);
    }

    #[test]
    fn test_zipfian_cold_goes_default() {
        let p = WorkloadPolicy::Zipfian { alpha: 1.0 };
        assert_eq!(route(0, AccessDecision::Cold, p, range()), Partition::Default);
    }
}
