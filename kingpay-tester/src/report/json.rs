use super::types::TestResults;
use anyhow::{Context, Result};
use std::path::Path;

/// File name used for saved run results
pub const RESULTS_FILE: &str = "test-results.json";

pub fn render(results: &TestResults) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Write results as pretty JSON to `path`
pub fn write(results: &TestResults, path: &Path) -> Result<()> {
    std::fs::write(path, render(results)?)
        .with_context(|| format!("writing {}", path.display()))
}

/// Load results saved by a previous run
pub fn read(path: &Path) -> Result<TestResults> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
