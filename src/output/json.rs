//! JSON output formatting
//!
//! Serializes the `RunReport` as pretty-printed JSON so runs over different
//! compaction and compression settings can be compared by scripts.

use crate::stats::aggregator::RunReport;
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serialize `report` to a JSON string
pub fn to_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

/// Write `report` as JSON to `path`
pub fn write_json_output(report: &RunReport, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, report).context("Failed to serialize report")?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregator::PlacementCounts;
    use crate::stats::PartitionTally;

    fn report() -> RunReport {
        RunReport {
            started_at: "2026-01-01T00:00:00+00:00".to_string(),
            host: "test".to_string(),
            backend: "file".to_string(),
            mode: "write".to_string(),
            policy: "overlap".to_string(),
            num_keys: 100,
            num_ops: 100,
            hot_start: 0,
            hot_end: 9,
            hot_ratio: 50,
            hot_partition: true,
            value_size: 8,
            seed: None,
            elapsed_secs: 0.001,
            ops_per_sec: 100_000.0,
            hot_count: 5,
            default_count: 95,
            routed_hot_fraction: 0.05,
            hot: PartitionTally { ops: 5, ..Default::default() },
            default: PartitionTally { ops: 95, ..Default::default() },
            errors: 0,
            verification: Some(PlacementCounts { hot: 4, default: 60 }),
            latency: None,
            backend_statistics: String::new(),
        }
    }

    #[test]
    fn test_to_json_fields() {
        let json = to_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["policy"], "overlap");
        assert_eq!(value["hot_count"], 5);
        assert_eq!(value["verification"]["default"], 60);
        assert!(value["seed"].is_null());
    }

    #[test]
    fn test_write_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json_output(&report(), &path).unwrap();

        let parsed: RunReport = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.num_keys, 100);
        assert_eq!(parsed.verification, Some(PlacementCounts { hot: 4, default: 60 }));
    }
}
