//! Seeded random layouts checked against the propagation invariants.

use anyhow::{Result, bail};
use core_devices::CellState;
use core_grid::{Facing, Position, Power};
use data_runtime::configs::signal::SignalConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use signal_core::{CycleReport, WireEngine, recalculate};
use std::collections::HashSet;
use voxel_grid::SparseGrid;

const EXTENT: i32 = 8;

#[derive(Debug, Default)]
pub struct FuzzStats {
    pub cycles: usize,
    pub changed: usize,
    pub turn_on_drops: usize,
}

fn random_pos(rng: &mut ChaCha8Rng) -> Position {
    Position::new(
        rng.gen_range(0..EXTENT),
        rng.gen_range(0..3),
        rng.gen_range(0..EXTENT),
    )
}

fn random_facing(rng: &mut ChaCha8Rng) -> Facing {
    Facing::ALL[rng.gen_range(0..Facing::ALL.len())]
}

fn random_device(rng: &mut ChaCha8Rng) -> CellState {
    match rng.gen_range(0..10) {
        0..=3 => CellState::Solid,
        4 | 5 => CellState::Source {
            level: Power::new(rng.gen_range(1..=15)),
        },
        6 => CellState::Diode {
            facing: Facing::HORIZONTAL[rng.gen_range(0..4)],
            powered: rng.gen_bool(0.5),
        },
        7 => CellState::Comparator {
            facing: Facing::HORIZONTAL[rng.gen_range(0..4)],
            output: Power::new(rng.gen_range(0..=15)),
        },
        8 => CellState::Torch {
            facing: random_facing(rng),
            lit: rng.gen_bool(0.7),
        },
        _ => CellState::Piston {
            facing: random_facing(rng),
        },
    }
}

/// Invariants every cycle must hold; `grid` is the state right after it.
fn check_cycle(grid: &SparseGrid, report: &CycleReport) -> Result<()> {
    let changed: HashSet<Position> = report.changed.iter().copied().collect();
    if let Some(q) = report.notified.iter().find(|q| changed.contains(q)) {
        bail!("{} at {}: notified changed wire {q}", report.trigger, report.pos);
    }
    if let Some((q, v)) = grid.wire_levels().into_iter().find(|(_, v)| v.get() > 15) {
        bail!("wire {q} out of range: {v}");
    }
    // replaying on a copy must match exactly, and change nothing further
    let mut again = grid.clone();
    let second = recalculate(&mut again, report.pos)?;
    if !second.changed.is_empty() {
        bail!(
            "{} at {}: second pass changed {:?}",
            report.trigger,
            report.pos,
            second.changed
        );
    }
    Ok(())
}

/// One layout: devices first, then wires placed one by one, then about a
/// third of them removed.
fn layout_round(
    cfg: &SignalConfig,
    rng: &mut ChaCha8Rng,
    cells: usize,
    wires: usize,
    stats: &mut FuzzStats,
) -> Result<()> {
    let engine = WireEngine::new(cfg);
    let mut grid = SparseGrid::new(cfg.chunk_size);
    for _ in 0..cells {
        let at = random_pos(rng);
        grid.put(at, random_device(rng))?;
    }
    let mut placed = Vec::new();
    for _ in 0..wires {
        let at = random_pos(rng);
        if grid.get(at) != CellState::Air {
            continue;
        }
        grid.put(at, CellState::WIRE)?;
        let before = grid.clone();
        let report = engine.on_placed(&mut grid, at)?;
        check_cycle(&grid, &report)?;
        // same input, same output
        let mut replay = before;
        let twin = engine.on_placed(&mut replay, at)?;
        if twin != report || replay.wire_levels() != grid.wire_levels() {
            bail!("placement at {at} is not deterministic");
        }
        stats.cycles += 1;
        stats.changed += report.changed.len();
        stats.turn_on_drops += report.turn_on_drops.len();
        placed.push(at);
    }
    for at in placed.into_iter().step_by(3) {
        grid.remove(at)?;
        let report = engine.on_removed(&mut grid, at)?;
        check_cycle(&grid, &report)?;
        stats.cycles += 1;
        stats.changed += report.changed.len();
        stats.turn_on_drops += report.turn_on_drops.len();
    }
    Ok(())
}

pub fn run(cfg: &SignalConfig, seed: u64, cells: usize, wires: usize, rounds: usize) -> Result<FuzzStats> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut stats = FuzzStats::default();
    for round in 0..rounds {
        if let Err(e) = layout_round(cfg, &mut rng, cells, wires, &mut stats) {
            bail!("seed {seed:#x} round {round}: {e:#}");
        }
    }
    if stats.turn_on_drops > 0 {
        tracing::warn!(drops = stats.turn_on_drops, "turn-on drops observed");
    }
    Ok(stats)
}
