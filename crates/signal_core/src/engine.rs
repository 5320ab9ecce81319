//! Trigger entry points: recalculate, dispatch, notify.
//!
//! One `WireEngine` call is one cycle. The relaxation runs to completion
//! first, then the notify set is derived from its changed wires and every
//! entry is delivered to the grid in order.

use crate::dispatch::UpdateDispatcher;
use crate::recalc::recalculate;
use crate::context::TurnOnDrop;
use core_grid::{NeighborOffsetTable, Position};
use data_runtime::configs::signal::SignalConfig;
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use voxel_grid::{GridAccessor, GridError};

/// What started a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Placed,
    Removed,
    NeighborChanged,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Placed => "placed",
            Trigger::Removed => "removed",
            Trigger::NeighborChanged => "neighbor_changed",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{trigger} cycle at {pos} failed: {source}")]
pub struct EngineError {
    pub trigger: Trigger,
    pub pos: Position,
    #[source]
    pub source: GridError,
}

/// Outcome of one cycle.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CycleReport {
    pub trigger: Trigger,
    pub pos: Position,
    /// Wires written, in first-touched order.
    pub changed: Vec<Position>,
    /// Positions notified, in delivery order.
    pub notified: Vec<Position>,
    #[serde(skip)]
    pub turn_on_drops: Vec<TurnOnDrop>,
    pub steps: usize,
}

/// Wire propagation engine. Holds configuration only; all per-call state
/// lives in the relaxation context.
#[derive(Clone, Copy, Debug)]
pub struct WireEngine {
    dispatcher: UpdateDispatcher,
    notify_trigger_surroundings: bool,
}

impl Default for WireEngine {
    fn default() -> Self {
        Self::new(&SignalConfig::default())
    }
}

impl WireEngine {
    pub fn new(cfg: &SignalConfig) -> Self {
        Self {
            dispatcher: UpdateDispatcher::new(cfg.legacy_flood),
            notify_trigger_surroundings: cfg.notify_trigger_surroundings,
        }
    }

    #[inline]
    pub fn dispatcher(&self) -> UpdateDispatcher {
        self.dispatcher
    }

    /// A wire was written at `pos`.
    pub fn on_placed<G: GridAccessor + ?Sized>(
        &self,
        grid: &mut G,
        pos: Position,
    ) -> Result<CycleReport, EngineError> {
        self.run_cycle(grid, Trigger::Placed, pos)
    }

    /// The wire at `pos` was cleared.
    pub fn on_removed<G: GridAccessor + ?Sized>(
        &self,
        grid: &mut G,
        pos: Position,
    ) -> Result<CycleReport, EngineError> {
        self.run_cycle(grid, Trigger::Removed, pos)
    }

    /// Something next to the wire at `pos` changed its output.
    pub fn on_neighbor_power_changed<G: GridAccessor + ?Sized>(
        &self,
        grid: &mut G,
        pos: Position,
    ) -> Result<CycleReport, EngineError> {
        self.run_cycle(grid, Trigger::NeighborChanged, pos)
    }

    fn run_cycle<G: GridAccessor + ?Sized>(
        &self,
        grid: &mut G,
        trigger: Trigger,
        pos: Position,
    ) -> Result<CycleReport, EngineError> {
        let t0 = Instant::now();
        let wrap = |source: GridError| EngineError { trigger, pos, source };
        if !pos.is_addressable() {
            return Err(wrap(GridError::OutOfBounds(pos)));
        }
        let relax = recalculate(grid, pos).map_err(wrap)?;
        let set = self
            .dispatcher
            .compute_notify_set(&*grid, &relax.changed)
            .map_err(wrap)?;
        let mut notified = set.to_vec();
        for &q in &notified {
            grid.notify(q).map_err(wrap)?;
        }
        if self.notify_trigger_surroundings && trigger != Trigger::NeighborChanged {
            for &off in NeighborOffsetTable::extended() {
                let q = pos.offset(off);
                grid.notify(q).map_err(wrap)?;
                notified.push(q);
            }
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0;
        metrics::counter!("signal.recalc_total", "trigger" => trigger.as_str()).increment(1);
        metrics::counter!("signal.wires_changed_total").increment(relax.changed.len() as u64);
        metrics::counter!("signal.notifications_total").increment(notified.len() as u64);
        metrics::histogram!("signal.cycle.ms").record(ms);
        log::debug!(
            "signal: {trigger} at {pos}: {} changed, {} notified, {} steps ({ms:.3} ms)",
            relax.changed.len(),
            notified.len(),
            relax.steps
        );
        Ok(CycleReport {
            trigger,
            pos,
            changed: relax.changed.into_iter().collect(),
            notified,
            turn_on_drops: relax.turn_on_drops,
            steps: relax.steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_devices::CellState;
    use core_grid::Power;
    use glam::IVec3;
    use voxel_grid::SparseGrid;

    fn p(x: i32, y: i32, z: i32) -> Position {
        Position::new(x, y, z)
    }

    fn engine(flood: bool, surroundings: bool) -> WireEngine {
        WireEngine::new(&SignalConfig {
            legacy_flood: flood,
            notify_trigger_surroundings: surroundings,
            ..SignalConfig::default()
        })
    }

    #[test]
    fn notifications_reach_the_grid_in_report_order() {
        let mut g = SparseGrid::default();
        g.put(p(0, 0, 0), CellState::Source { level: Power::MAX }).unwrap();
        g.put(p(1, 0, 0), CellState::WIRE).unwrap();
        let r = WireEngine::default().on_placed(&mut g, p(1, 0, 0)).unwrap();
        assert_eq!(r.changed, vec![p(1, 0, 0)]);
        assert_eq!(g.take_notifications(), r.notified);
        assert!(!r.notified.contains(&p(1, 0, 0)));
    }

    #[test]
    fn unchanged_cycle_notifies_nothing() {
        let mut g = SparseGrid::default();
        g.put(p(0, 0, 0), CellState::WIRE).unwrap();
        let r = engine(true, false).on_neighbor_power_changed(&mut g, p(0, 0, 0)).unwrap();
        assert!(r.changed.is_empty());
        assert!(r.notified.is_empty());
    }

    #[test]
    fn trigger_surroundings_are_appended_for_placement_only() {
        let mut g = SparseGrid::default();
        g.put(p(0, 0, 0), CellState::WIRE).unwrap();
        let e = engine(false, true);
        let r = e.on_placed(&mut g, p(0, 0, 0)).unwrap();
        assert_eq!(r.notified.len(), 24);
        assert_eq!(r.notified[0], p(0, -1, 0));
        let r = e.on_neighbor_power_changed(&mut g, p(0, 0, 0)).unwrap();
        assert!(r.notified.is_empty());
    }

    #[test]
    fn grid_errors_carry_trigger_and_position() {
        let mut g = SparseGrid::default();
        g.put(p(0, 0, 0), CellState::WIRE).unwrap();
        g.unload_chunk(IVec3::new(-1, 0, 0));
        let err = WireEngine::default().on_placed(&mut g, p(0, 0, 0)).unwrap_err();
        assert_eq!(err.trigger, Trigger::Placed);
        assert_eq!(err.pos, p(0, 0, 0));
        assert!(matches!(err.source, GridError::ChunkUnloaded { .. }));
        assert!(err.to_string().starts_with("placed cycle at (0, 0, 0) failed"));
    }

    #[test]
    fn cycles_at_the_coordinate_edge_stay_in_range() {
        let mut g = SparseGrid::default();
        let edge = p(Position::COORD_MAX, Position::COORD_MIN, 0);
        g.put(edge, CellState::WIRE).unwrap();
        let source = p(Position::COORD_MAX - 1, Position::COORD_MIN, 0);
        g.put(source, CellState::Source { level: Power::MAX }).unwrap();
        let r = engine(true, true).on_placed(&mut g, edge).unwrap();
        assert_eq!(g.power_at(edge), Some(Power::MAX));
        assert_eq!(r.changed, vec![edge]);

        let past = p(i32::MAX, 0, 0);
        let err = WireEngine::default().on_neighbor_power_changed(&mut g, past).unwrap_err();
        assert_eq!(err.source, GridError::OutOfBounds(past));
    }
}
