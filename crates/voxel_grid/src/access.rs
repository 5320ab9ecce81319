//! Read/write contract the propagation engine consumes.

use core_devices::CellState;
use core_devices::conduction::{SideSet, conducting_sides};
use core_grid::{Facing, Position, Power};
use glam::IVec3;
use thiserror::Error;

/// Grid access failures. Any of these aborts the relaxation in progress.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),
    #[error("chunk {chunk} is not loaded")]
    ChunkUnloaded { chunk: IVec3 },
    #[error("cell at {0} is not a wire")]
    NotAWire(Position),
}

/// Narrow grid interface used by `signal_core`.
pub trait GridAccessor {
    fn cell_state(&self, pos: Position) -> Result<CellState, GridError>;

    /// Write a wire's power; visible to every later read in the same call.
    fn set_power(&mut self, pos: Position, level: Power) -> Result<(), GridError>;

    fn is_solid_opaque(&self, pos: Position) -> Result<bool, GridError> {
        Ok(self.cell_state(pos)?.is_solid_opaque())
    }

    /// Power reaching `pos` from non-wire sources, with every wire's own
    /// emission disabled for the duration of the query.
    fn external_power_excluding_self(&self, pos: Position) -> Result<Power, GridError>;

    /// Forward one downstream update to the host.
    fn notify(&mut self, pos: Position) -> Result<(), GridError>;
}

/// Horizontal sides the wire at `pos` conducts toward, read through any grid.
pub fn conducting_sides_at<G: GridAccessor + ?Sized>(grid: &G, pos: Position) -> Result<SideSet, GridError> {
    let mut n = [CellState::Air; 4];
    for (slot, f) in n.iter_mut().zip(Facing::HORIZONTAL) {
        *slot = grid.cell_state(pos.step(f))?;
    }
    Ok(conducting_sides(&n))
}

impl<G: GridAccessor + ?Sized> GridAccessor for &mut G {
    fn cell_state(&self, pos: Position) -> Result<CellState, GridError> {
        (**self).cell_state(pos)
    }
    fn set_power(&mut self, pos: Position, level: Power) -> Result<(), GridError> {
        (**self).set_power(pos, level)
    }
    fn is_solid_opaque(&self, pos: Position) -> Result<bool, GridError> {
        (**self).is_solid_opaque(pos)
    }
    fn external_power_excluding_self(&self, pos: Position) -> Result<Power, GridError> {
        (**self).external_power_excluding_self(pos)
    }
    fn notify(&mut self, pos: Position) -> Result<(), GridError> {
        (**self).notify(pos)
    }
}
