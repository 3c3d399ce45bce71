pub mod console;
pub mod json;
pub mod junit;
pub mod types;

use crate::error::Result as HarnessResult;
use anyhow::Result;
use std::path::Path;
use types::TestResults;

/// Write `results.json` and `junit.xml` for a finished run into `dir`
pub fn write_reports(results: &TestResults, dir: &Path) -> HarnessResult<()> {
    std::fs::create_dir_all(dir)?;

    let json_path = dir.join("results.json");
    std::fs::write(&json_path, serde_json::to_string_pretty(results)?)?;
    println!("    Generated JSON results: {}", json_path.display());

    junit::write_report(results, dir)
}

pub const FORMATS: [&str; 3] = ["json", "junit", "console"];

/// Re-render a saved `results.json` in another format
pub fn generate_report(results_path: &Path, format: &str, output: Option<&Path>) -> Result<()> {
    if !FORMATS.contains(&format) {
        anyhow::bail!("Unknown format: {} (expected one of {})", format, FORMATS.join(", "));
    }
    let test_results = crate::runner::load_results(results_path)?;

    match format {
        "json" => json::generate(&test_results, output),
        "junit" => {
            let xml = junit::generate_junit_xml(&test_results)?;
            match output {
                Some(path) => {
                    std::fs::write(path, xml)?;
                    println!("JUnit report saved to: {}", path.display());
                }
                None => println!("{}", xml),
            }
            Ok(())
        }
        "console" => {
            print!("{}", console::render_metrics(&test_results.metrics));
            print!("{}", console::render_summary(&test_results.summary));
            Ok(())
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}
