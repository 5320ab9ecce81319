//! Scenario playback: build a `SparseGrid` from a scenario, run its triggers
//! through a `WireEngine` and compare the result with its expectations.

use crate::engine::{CycleReport, EngineError, WireEngine};
use core_devices::CellState;
use core_grid::{Position, Power};
use data_runtime::configs::signal::SignalConfig;
use data_runtime::scenario::{Scenario, TriggerSpec};
use std::collections::HashSet;
use thiserror::Error;
use voxel_grid::{GridBounds, GridError, SparseGrid};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scenario '{name}': layout: {source}")]
    Layout {
        name: String,
        #[source]
        source: GridError,
    },
    #[error("scenario '{name}': trigger #{index}: {source}")]
    Trigger {
        name: String,
        index: usize,
        #[source]
        source: EngineError,
    },
    #[error("scenario '{name}': trigger #{index} write: {source}")]
    TriggerWrite {
        name: String,
        index: usize,
        #[source]
        source: GridError,
    },
}

/// One unmet expectation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Mismatch {
    #[error("power at {at}: expected {expected}, found {found:?}")]
    Power {
        at: Position,
        expected: Power,
        found: Option<Power>,
    },
    #[error("{0} was never notified")]
    NotNotified(Position),
    #[error("{0} was notified")]
    Notified(Position),
    #[error("turn-on drops: expected {expected}, found {found}")]
    TurnOnDrops { expected: usize, found: usize },
}

/// Grid state and per-trigger reports after playback.
#[derive(Debug)]
pub struct ScenarioRun {
    pub grid: SparseGrid,
    pub reports: Vec<CycleReport>,
}

impl ScenarioRun {
    pub fn turn_on_drops(&self) -> usize {
        self.reports.iter().map(|r| r.turn_on_drops.len()).sum()
    }
}

/// Lay out fills then single cells. Chunk size comes from the scenario when
/// set, else from `cfg`.
pub fn build_grid(sc: &Scenario, cfg: &SignalConfig) -> Result<SparseGrid, SceneError> {
    let layout = |source| SceneError::Layout { name: sc.name.clone(), source };
    let mut grid = SparseGrid::new(sc.chunk_size.unwrap_or(cfg.chunk_size));
    if let Some([min, max]) = sc.bounds {
        grid = grid.with_bounds(GridBounds { min, max });
    }
    for f in &sc.fills {
        grid.fill(f.from, f.to, f.cell).map_err(layout)?;
    }
    for c in &sc.cells {
        grid.put(c.at, c.cell).map_err(layout)?;
    }
    Ok(grid)
}

/// Apply the trigger's grid edit, then run the matching engine entry point.
pub fn apply_trigger(
    engine: &WireEngine,
    grid: &mut SparseGrid,
    trigger: &TriggerSpec,
) -> Result<CycleReport, TriggerFailure> {
    match trigger {
        TriggerSpec::Placed { at, cell } => {
            if let Some(state) = cell {
                grid.put(*at, *state).map_err(TriggerFailure::Write)?;
            }
            engine.on_placed(grid, *at).map_err(TriggerFailure::Engine)
        }
        TriggerSpec::Removed { at } => {
            grid.put(*at, CellState::Air).map_err(TriggerFailure::Write)?;
            engine.on_removed(grid, *at).map_err(TriggerFailure::Engine)
        }
        TriggerSpec::NeighborChanged { at, write } => {
            if let Some(w) = write {
                grid.put(w.at, w.cell).map_err(TriggerFailure::Write)?;
            }
            engine
                .on_neighbor_power_changed(grid, *at)
                .map_err(TriggerFailure::Engine)
        }
    }
}

/// Why `apply_trigger` failed.
#[derive(Debug)]
pub enum TriggerFailure {
    Write(GridError),
    Engine(EngineError),
}

/// Build the grid and play every trigger in order.
pub fn run_scenario(sc: &Scenario, cfg: &SignalConfig) -> Result<ScenarioRun, SceneError> {
    let engine = WireEngine::new(cfg);
    let mut grid = build_grid(sc, cfg)?;
    let mut reports = Vec::with_capacity(sc.triggers.len());
    for (index, t) in sc.triggers.iter().enumerate() {
        let report = apply_trigger(&engine, &mut grid, t).map_err(|e| match e {
            TriggerFailure::Write(source) => SceneError::TriggerWrite {
                name: sc.name.clone(),
                index,
                source,
            },
            TriggerFailure::Engine(source) => SceneError::Trigger {
                name: sc.name.clone(),
                index,
                source,
            },
        })?;
        reports.push(report);
    }
    log::debug!("scene: '{}' played {} triggers", sc.name, reports.len());
    Ok(ScenarioRun { grid, reports })
}

/// Every expectation the run does not meet, in declaration order.
pub fn check_expectations(sc: &Scenario, run: &ScenarioRun) -> Vec<Mismatch> {
    let mut out = Vec::new();
    for e in &sc.expect.power {
        let found = run.grid.power_at(e.at);
        if found != Some(e.level) {
            out.push(Mismatch::Power {
                at: e.at,
                expected: e.level,
                found,
            });
        }
    }
    let notified: HashSet<Position> = run
        .reports
        .iter()
        .flat_map(|r| r.notified.iter().copied())
        .collect();
    for &q in &sc.expect.notified_includes {
        if !notified.contains(&q) {
            out.push(Mismatch::NotNotified(q));
        }
    }
    for &q in &sc.expect.notified_excludes {
        if notified.contains(&q) {
            out.push(Mismatch::Notified(q));
        }
    }
    if let Some(expected) = sc.expect.turn_on_drops {
        let found = run.turn_on_drops();
        if found != expected {
            out.push(Mismatch::TurnOnDrops { expected, found });
        }
    }
    out
}
