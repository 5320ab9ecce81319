//! Power emission model for `SparseGrid`.
//!
//! Weak power reaches direct neighbours; strong power also charges an opaque
//! block, which then relays it to every cell touching that block. Wire
//! emission is controlled per query with `WireEmission` instead of a shared
//! toggle, so the "excluding wires" query needs no state change.

use crate::{GridError, SparseGrid, conducting_sides_at};
use core_devices::CellState;
use core_grid::{Facing, Position, Power};

/// Whether wires contribute to a power query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireEmission {
    Enabled,
    Suppressed,
}

impl SparseGrid {
    fn wire_emission(&self, from: Position, power: Power, dir: Facing) -> Result<Power, GridError> {
        if dir == Facing::Down {
            return Ok(power);
        }
        if dir.is_horizontal() && conducting_sides_at(self, from)?.contains(dir) {
            return Ok(power);
        }
        Ok(Power::ZERO)
    }

    /// Weak power the cell at `from` emits toward its neighbour in direction `dir`.
    pub fn weak_emission(
        &self,
        from: Position,
        dir: Facing,
        wires: WireEmission,
    ) -> Result<Power, GridError> {
        Ok(match self.read(from)? {
            CellState::Source { level } => level,
            CellState::Torch { facing, lit } if lit && dir != facing.opposite() => Power::MAX,
            CellState::Diode { facing, powered } if powered && dir == facing => Power::MAX,
            CellState::Comparator { facing, output } if dir == facing => output,
            CellState::Wire { power } if wires == WireEmission::Enabled => {
                self.wire_emission(from, power, dir)?
            }
            _ => Power::ZERO,
        })
    }

    /// Strong power the cell at `from` drives into the block in direction `dir`.
    pub fn strong_emission(
        &self,
        from: Position,
        dir: Facing,
        wires: WireEmission,
    ) -> Result<Power, GridError> {
        Ok(match self.read(from)? {
            CellState::Torch { lit, .. } if lit && dir == Facing::Up => Power::MAX,
            CellState::Diode { facing, powered } if powered && dir == facing => Power::MAX,
            CellState::Comparator { facing, output } if dir == facing => output,
            CellState::Wire { power } if wires == WireEmission::Enabled => {
                self.wire_emission(from, power, dir)?
            }
            _ => Power::ZERO,
        })
    }

    /// Strongest strong power charging the block at `block`.
    fn strong_power_into(&self, block: Position, wires: WireEmission) -> Result<Power, GridError> {
        let mut best = Power::ZERO;
        for f in Facing::ALL {
            best = best.max(self.strong_emission(block.step(f), f.opposite(), wires)?);
            if best == Power::MAX {
                break;
            }
        }
        Ok(best)
    }

    /// Power arriving at `pos` from all six sides.
    pub fn received_power_with(&self, pos: Position, wires: WireEmission) -> Result<Power, GridError> {
        let mut best = Power::ZERO;
        for f in Facing::ALL {
            let n = pos.step(f);
            let p = if self.read(n)?.is_solid_opaque() {
                self.strong_power_into(n, wires)?
            } else {
                self.weak_emission(n, f.opposite(), wires)?
            };
            best = best.max(p);
            if best == Power::MAX {
                break;
            }
        }
        Ok(best)
    }

    /// Power a non-wire consumer at `pos` sees, wires included.
    pub fn received_power(&self, pos: Position) -> Result<Power, GridError> {
        self.received_power_with(pos, WireEmission::Enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridAccessor;

    fn p(x: i32, y: i32, z: i32) -> Position {
        Position::new(x, y, z)
    }

    #[test]
    fn source_powers_direct_neighbours_only() {
        let mut g = SparseGrid::default();
        g.put(p(0, 0, 0), CellState::Source { level: Power::new(12) }).unwrap();
        assert_eq!(g.external_power_excluding_self(p(1, 0, 0)).unwrap(), Power::new(12));
        assert_eq!(g.external_power_excluding_self(p(2, 0, 0)).unwrap(), Power::ZERO);
        assert_eq!(g.external_power_excluding_self(p(1, 1, 0)).unwrap(), Power::ZERO);
    }

    #[test]
    fn torch_charges_block_above_which_relays() {
        let mut g = SparseGrid::default();
        g.put(p(0, 0, 0), CellState::Torch { facing: Facing::Up, lit: true }).unwrap();
        g.put(p(0, 1, 0), CellState::Solid).unwrap();
        // beside the charged block
        assert_eq!(g.external_power_excluding_self(p(1, 1, 0)).unwrap(), Power::MAX);
        // unlit torch relays nothing
        g.put(p(0, 0, 0), CellState::Torch { facing: Facing::Up, lit: false }).unwrap();
        assert_eq!(g.external_power_excluding_self(p(1, 1, 0)).unwrap(), Power::ZERO);
    }

    #[test]
    fn torch_does_not_power_its_attachment() {
        let mut g = SparseGrid::default();
        // torch on the east face of a block at the origin
        g.put(p(1, 0, 0), CellState::Torch { facing: Facing::East, lit: true }).unwrap();
        assert_eq!(g.weak_emission(p(1, 0, 0), Facing::West, WireEmission::Enabled).unwrap(), Power::ZERO);
        assert_eq!(g.weak_emission(p(1, 0, 0), Facing::East, WireEmission::Enabled).unwrap(), Power::MAX);
    }

    #[test]
    fn diode_outputs_through_front_only() {
        let mut g = SparseGrid::default();
        g.put(p(0, 0, 0), CellState::Diode { facing: Facing::East, powered: true }).unwrap();
        assert_eq!(g.external_power_excluding_self(p(1, 0, 0)).unwrap(), Power::MAX);
        assert_eq!(g.external_power_excluding_self(p(-1, 0, 0)).unwrap(), Power::ZERO);
        assert_eq!(g.external_power_excluding_self(p(0, 0, 1)).unwrap(), Power::ZERO);
    }

    #[test]
    fn wires_are_excluded_from_external_queries() {
        let mut g = SparseGrid::default();
        g.put(p(0, 0, 0), CellState::wire(14)).unwrap();
        g.put(p(0, -1, 0), CellState::Solid).unwrap();
        // wire powers the lamp-like cell beside it when wires emit
        assert_eq!(g.received_power(p(1, 0, 0)).unwrap(), Power::new(14));
        assert_eq!(g.external_power_excluding_self(p(1, 0, 0)).unwrap(), Power::ZERO);
        // and charges the block below it, which relays to that block's neighbours
        assert_eq!(g.received_power(p(1, -1, 0)).unwrap(), Power::new(14));
        assert_eq!(g.external_power_excluding_self(p(1, -1, 0)).unwrap(), Power::ZERO);
    }

    #[test]
    fn straight_through_wire_skips_perpendicular_sides() {
        let mut g = SparseGrid::default();
        g.put(p(-1, 0, 0), CellState::Diode { facing: Facing::East, powered: true }).unwrap();
        g.put(p(0, 0, 0), CellState::wire(15)).unwrap();
        assert_eq!(g.received_power(p(1, 0, 0)).unwrap(), Power::MAX);
        assert_eq!(g.received_power(p(0, 0, 1)).unwrap(), Power::ZERO);
    }
}
