//! Horizontal conduction rule for wires.
//!
//! A wire conducts in cross mode (all four sides) unless a diode or comparator
//! outputs into it; then it conducts straight through along that emitter's axis.

use crate::CellState;
use core_grid::{Axis, Facing};

/// Small set of horizontal sides, iterated in `Facing::HORIZONTAL` order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SideSet(u8);

impl SideSet {
    pub const NONE: SideSet = SideSet(0);
    pub const CROSS: SideSet = SideSet(0b1111);

    #[inline]
    fn bit(f: Facing) -> u8 {
        match f {
            Facing::West => 1,
            Facing::East => 2,
            Facing::North => 4,
            Facing::South => 8,
            Facing::Down | Facing::Up => 0,
        }
    }

    #[inline]
    pub fn contains(self, f: Facing) -> bool {
        let b = Self::bit(f);
        b != 0 && self.0 & b != 0
    }

    #[inline]
    pub fn insert(&mut self, f: Facing) {
        self.0 |= Self::bit(f);
    }

    pub fn iter(self) -> impl Iterator<Item = Facing> {
        Facing::HORIZONTAL.into_iter().filter(move |f| self.contains(*f))
    }
}

/// Sides a wire conducts toward, given its horizontal neighbours in
/// `Facing::HORIZONTAL` order.
pub fn conducting_sides(neighbors: &[CellState; 4]) -> SideSet {
    let mut x = false;
    let mut z = false;
    for (f, state) in Facing::HORIZONTAL.iter().zip(neighbors.iter()) {
        // emitter on side `f` outputs into the wire when it faces back at it
        if state.directional_output() == Some(f.opposite()) {
            match f.axis() {
                Axis::X => x = true,
                Axis::Z => z = true,
                Axis::Y => {}
            }
        }
    }
    if !x && !z {
        return SideSet::CROSS;
    }
    let mut out = SideSet::NONE;
    for f in Facing::HORIZONTAL {
        let keep = match f.axis() {
            Axis::X => x,
            Axis::Z => z,
            Axis::Y => false,
        };
        if keep {
            out.insert(f);
        }
    }
    out
}
