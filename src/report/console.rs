//! Plain-text renderings of the metrics table and run summary. Returned as
//! strings so the event listener decides where they go.

use crate::runner::metrics::EndpointStats;
use crate::runner::state::RunSummary;
use colored::Colorize;
use std::collections::BTreeMap;
use std::fmt::Write;

const RULE_WIDTH: usize = 80;

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title.cyan().bold());
    let _ = writeln!(out, "{}\n", "=".repeat(RULE_WIDTH).cyan());
}

/// Per-endpoint latency table, in milliseconds
pub fn render_metrics(metrics: &BTreeMap<String, EndpointStats>) -> String {
    let mut out = String::new();
    heading(&mut out, "Performance Metrics");

    if metrics.is_empty() {
        let _ = writeln!(out, "No API calls were made.");
        return out;
    }

    let width = metrics.keys().map(String::len).max().unwrap_or(0).max(8);
    let _ = writeln!(
        out,
        "{:<width$}  {:>10}  {:>10}  {:>10}  {:>6}",
        "Endpoint", "Avg (ms)", "Min (ms)", "Max (ms)", "Calls",
        width = width
    );
    let _ = writeln!(out, "{}", "-".repeat(width + 44));
    for (key, stats) in metrics {
        let _ = writeln!(
            out,
            "{:<width$}  {:>10.2}  {:>10.2}  {:>10.2}  {:>6}",
            key,
            stats.avg * 1000.0,
            stats.min * 1000.0,
            stats.max * 1000.0,
            stats.count,
            width = width
        );
    }
    out
}

/// Stage table, overall totals and the closing verdict
pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    heading(&mut out, "Test Summary");

    let width = summary
        .stages
        .iter()
        .map(|s| s.stage.len())
        .max()
        .unwrap_or(0)
        .max(5);
    let _ = writeln!(
        out,
        "{:<width$}  {:>6}  {:>6}  {:>6}  {:>12}",
        "Stage", "Passed", "Failed", "Total", "Success Rate",
        width = width
    );
    let _ = writeln!(out, "{}", "-".repeat(width + 40));
    for stage in &summary.stages {
        let _ = writeln!(
            out,
            "{:<width$}  {}  {}  {:>6}  {:>11.1}%",
            stage.stage,
            format!("{:>6}", stage.passed).green(),
            format!("{:>6}", stage.failed).red(),
            stage.total,
            stage.success_rate * 100.0,
            width = width
        );
    }

    let _ = writeln!(out, "\n{}", "Summary:".yellow());
    let _ = writeln!(out, "  • Total Tests: {}", summary.total);
    let _ = writeln!(out, "  • {}", format!("Passed: {}", summary.passed).green());
    let _ = writeln!(out, "  • {}", format!("Failed: {}", summary.failed).red());
    let _ = writeln!(out, "  • Success Rate: {:.1}%", summary.success_percent());
    let _ = writeln!(out, "  • Total Time: {:.2}s", summary.duration_secs);
    let _ = writeln!(out, "\n{}", verdict(summary.success_percent()));
    out
}

/// Closing line: all passed, most passed (>= 80%), or significant failures
pub fn verdict(success_percent: f64) -> String {
    if success_percent >= 100.0 {
        "✓ All tests passed successfully!".green().to_string()
    } else if success_percent >= 80.0 {
        "⚠ Most tests passed, but some failures occurred."
            .yellow()
            .to_string()
    } else {
        "✗ Significant test failures detected!".red().to_string()
    }
}
