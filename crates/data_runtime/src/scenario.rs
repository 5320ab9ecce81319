//! Scenario schema: a grid layout, an ordered list of triggers and the
//! expected outcome.
//!
//! Cells reuse `CellState`'s tagged JSON form; positions are `[x, y, z]`.
//! Unknown fields are rejected so typos in hand-written scenarios surface.

use anyhow::{Context, Result, bail};
use core_devices::CellState;
use core_grid::{Position, Power};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Inclusive `[min, max]` bounds; unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[Position; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<i32>,
    #[serde(default)]
    pub fills: Vec<Fill>,
    #[serde(default)]
    pub cells: Vec<CellEntry>,
    #[serde(default)]
    pub triggers: Vec<TriggerSpec>,
    #[serde(default)]
    pub expect: Expectations,
}

/// Inclusive box filled with one state; applied before `cells`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fill {
    pub from: Position,
    pub to: Position,
    pub cell: CellState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellEntry {
    pub at: Position,
    pub cell: CellState,
}

/// One engine entry point invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerSpec {
    /// Optionally write `cell` at `at` first, then run the placement cycle.
    Placed {
        at: Position,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cell: Option<CellState>,
    },
    /// Clear `at` to air, then run the removal cycle.
    Removed { at: Position },
    /// Optionally rewrite a neighbouring device first (e.g. switch a source
    /// off), then re-evaluate the wire at `at`.
    NeighborChanged {
        at: Position,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        write: Option<CellEntry>,
    },
}

impl TriggerSpec {
    pub fn at(&self) -> Position {
        match self {
            Self::Placed { at, .. } | Self::Removed { at } | Self::NeighborChanged { at, .. } => *at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PowerExpect {
    pub at: Position,
    pub level: Power,
}

/// Checked after every trigger has run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Expectations {
    /// Exact wire levels at the end.
    pub power: Vec<PowerExpect>,
    /// Positions that must appear in some cycle's notify list.
    pub notified_includes: Vec<Position>,
    /// Positions that must not appear in any cycle's notify list.
    pub notified_excludes: Vec<Position>,
    /// Expected number of turn-on drops over the whole run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_on_drops: Option<usize>,
}

impl Scenario {
    /// Structural checks serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("scenario name is empty");
        }
        if self.triggers.is_empty() {
            bail!("scenario '{}' has no triggers", self.name);
        }
        if let Some([min, max]) = self.bounds {
            if min.x > max.x || min.y > max.y || min.z > max.z {
                bail!("scenario '{}' bounds min {min} exceeds max {max}", self.name);
            }
        }
        Ok(())
    }
}

/// Parse and validate a scenario from JSON text.
pub fn parse_scenario(txt: &str) -> Result<Scenario> {
    let sc: Scenario = serde_json::from_str(txt).context("parse scenario json")?;
    sc.validate()?;
    Ok(sc)
}
