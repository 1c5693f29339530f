//! Human-readable text output

use crate::stats::aggregator::RunReport;
use std::fmt::Write;

/// Print run results to stdout
pub fn print_results(report: &RunReport) {
    print!("{}", render_results(report));
}

/// Render run results
///
/// Shows elapsed time, live per-partition counts, the verification pass (if
/// it ran), latency percentiles (if recorded), and the backend statistics.
pub fn render_results(report: &RunReport) -> String {
    let mut out = String::new();
    let rule = "═══════════════════════════════════════════════════════════";
    let is_write = report.mode == "write";

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "                    RUN RESULTS");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out);

    let _ = writeln!(out, "Workload: {} / {} on {} backend", report.mode, report.policy, report.backend);
    if report.hot_partition {
        let _ = writeln!(
            out,
            "Keys:     {} (hot range [{}, {}], hot ratio {}%)",
            format_number(report.num_keys),
            report.hot_start,
            report.hot_end,
            report.hot_ratio
        );
    } else {
        let _ = writeln!(out, "Keys:     {}", format_number(report.num_keys));
    }
    let _ = writeln!(out, "Ops:      {} ({} ops/s)", format_number(report.num_ops), format_rate(report.ops_per_sec));
    let _ = writeln!(out, "Elapsed:  {:.3}s", report.elapsed_secs);
    let _ = writeln!(out);

    let label = if is_write { "written" } else { "found" };
    let _ = writeln!(out, "Partitions (live):");
    let _ = writeln!(out, "  hot:     {} {}", format_number(report.hot_count), label);
    let _ = writeln!(out, "  default: {} {}", format_number(report.default_count), label);
    if !is_write {
        let misses = report.hot.not_found + report.default.not_found;
        let _ = writeln!(out, "  missed:  {}", format_number(misses));
    }
    let _ = writeln!(out, "  routed hot: {:.2}%", report.routed_hot_fraction * 100.0);
    if report.errors > 0 {
        let _ = writeln!(out, "  errors:  {}", format_number(report.errors));
    }
    let _ = writeln!(out);

    if let Some(verified) = &report.verification {
        let _ = writeln!(out, "Partitions (verified):");
        let _ = writeln!(out, "  hot:     {} keys", format_number(verified.hot));
        let _ = writeln!(out, "  default: {} keys", format_number(verified.default));
        let _ = writeln!(out, "  total:   {} of {}", format_number(verified.total()), format_number(report.num_keys));
        let _ = writeln!(out);
    }

    if let Some(latency) = &report.latency {
        let _ = writeln!(out, "Latency ({} samples):", format_number(latency.samples));
        let _ = writeln!(out, "  Min:    {:.2}us", latency.min_us);
        let _ = writeln!(out, "  Mean:   {:.2}us", latency.mean_us);
        let _ = writeln!(out, "  p50:    {:.2}us", latency.p50_us);
        let _ = writeln!(out, "  p90:    {:.2}us", latency.p90_us);
        let _ = writeln!(out, "  p99:    {:.2}us", latency.p99_us);
        let _ = writeln!(out, "  p99.9:  {:.2}us", latency.p99_9_us);
        let _ = writeln!(out, "  Max:    {:.2}us", latency.max_us);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Backend statistics:");
    let _ = write!(out, "{}", report.backend_statistics);
    let _ = writeln!(out, "{}", rule);

    out
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}

/// Format a rate with K/M/G suffixes
fn format_rate(rate: f64) -> String {
    if rate < 1_000.0 {
        format!("{:.0}", rate)
    } else if rate < 1_000_000.0 {
        format!("{:.2}K", rate / 1_000.0)
    } else if rate < 1_000_000_000.0 {
        format!("{:.2}M", rate / 1_000_000.0)
    } else {
        format!("{:.2}G", rate / 1_000_000_000.0)
    }
}
