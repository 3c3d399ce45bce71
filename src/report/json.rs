use super::types::TestResults;
use anyhow::Result;
use std::path::Path;

/// Write the results as pretty JSON to `output`, or stdout when `None`
pub fn generate(results: &TestResults, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;

    if let Some(path) = output {
        std::fs::write(path, json)?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}
