//! data_runtime: config and scenario schemas plus their loaders.
//!
//! Tools, tests and binaries read `data/` through this crate so the file
//! layout lives in one place.

pub mod loader;
pub mod scenario;
pub mod configs {
    pub mod signal;
    pub mod telemetry;
}

use std::path::PathBuf;

/// Workspace `data/` directory, falling back to a crate-local one.
pub fn data_root() -> PathBuf {
    // Prefer top-level workspace `data/` so tests and tools can run from any crate.
    let here = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let ws = here.join("../../data");
    if ws.is_dir() { ws } else { here.join("data") }
}
