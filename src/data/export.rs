use std::path::Path;

use anyhow::{Context, Result};

use super::analysis::Analysis;

/// Write the analysis (controls, distributions, highlight entries) as pretty JSON.
pub fn write_json(analysis: &Analysis, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(analysis).context("serialising analysis")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
