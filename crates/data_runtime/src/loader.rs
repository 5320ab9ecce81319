//! Data loaders resolving paths under the workspace `data/` directory.

use crate::scenario::{Scenario, parse_scenario};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Read a raw JSON file under `data/` and return its string.
pub fn read_json(rel: impl AsRef<Path>) -> Result<String> {
    let path = crate::data_root().join(rel);
    let s = fs::read_to_string(&path).with_context(|| format!("read data: {}", path.display()))?;
    Ok(s)
}

/// Load and validate a scenario (from data/scenarios/*).
pub fn load_scenario(rel: impl AsRef<Path>) -> Result<Scenario> {
    let rel = rel.as_ref();
    let txt = read_json(rel)?;
    parse_scenario(&txt).with_context(|| format!("scenario {}", rel.display()))
}

/// Load a scenario from an arbitrary path (CLI input).
pub fn load_scenario_file(path: &Path) -> Result<Scenario> {
    let txt = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_scenario(&txt).with_context(|| format!("scenario {}", path.display()))
}

/// Every `*.json` under data/scenarios, sorted by file name.
pub fn scenario_paths() -> Result<Vec<PathBuf>> {
    let dir = crate::data_root().join("scenarios");
    let mut out = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("list {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}
