//! Wire engine tuning loaded from data/config/signal.toml with env overrides
//! and clamping.

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Flood the 24-cell neighbourhood of every changed wire after dispatch.
    pub legacy_flood: bool,
    /// Notify the trigger cell's neighbourhood after placements and removals.
    pub notify_trigger_surroundings: bool,
    pub chunk_size: i32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            legacy_flood: true,
            notify_trigger_surroundings: false,
            chunk_size: 16,
        }
    }
}

pub const CHUNK_MIN: i32 = 4;
pub const CHUNK_MAX: i32 = 64;

fn clamp(mut cfg: SignalConfig) -> SignalConfig {
    cfg.chunk_size = cfg.chunk_size.clamp(CHUNK_MIN, CHUNK_MAX);
    cfg
}

/// Parse a config from TOML text without env overrides.
pub fn parse(txt: &str) -> Result<SignalConfig> {
    let cfg: SignalConfig = toml::from_str(txt).context("parse signal TOML")?;
    Ok(clamp(cfg))
}

/// Load the signal config from the default location, falling back to defaults.
pub fn load_default() -> Result<SignalConfig> {
    let path = crate::data_root().join("config/signal.toml");
    let mut cfg = if path.is_file() {
        let txt = std::fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))?;
        parse(&txt)?
    } else {
        SignalConfig::default()
    };
    // Env overrides
    if let Some(v) = std::env::var("SIGNAL_LEGACY_FLOOD").ok().and_then(|v| v.parse().ok()) {
        cfg.legacy_flood = v;
    }
    if let Some(v) = std::env::var("SIGNAL_NOTIFY_SURROUNDINGS").ok().and_then(|v| v.parse().ok()) {
        cfg.notify_trigger_surroundings = v;
    }
    if let Some(v) = std::env::var("SIGNAL_CHUNK_SIZE").ok().and_then(|v| v.parse().ok()) {
        cfg.chunk_size = v;
    }
    Ok(clamp(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = parse("legacy_flood = false").expect("parse");
        assert!(!cfg.legacy_flood);
        assert!(!cfg.notify_trigger_surroundings);
        assert_eq!(cfg.chunk_size, 16);
    }

    #[test]
    fn chunk_size_is_clamped() {
        assert_eq!(parse("chunk_size = 1").unwrap().chunk_size, CHUNK_MIN);
        assert_eq!(parse("chunk_size = 500").unwrap().chunk_size, CHUNK_MAX);
    }

    #[test]
    fn unknown_types_fail() {
        assert!(parse("legacy_flood = \"yes\"").is_err());
    }
}
