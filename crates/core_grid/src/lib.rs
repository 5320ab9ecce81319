//! core_grid: strongly-typed grid coordinates, facings and power levels.
//!
//! Scope
//! - `Position` integer cell coordinate (value-hashed, usable as a map key).
//! - `Facing`/`Axis` with the canonical update orders used by propagation.
//! - `Power` newtype that can never leave `0..=15`.
//! - `NeighborOffsetTable` (see `offsets`) with the horizontal, vertical and
//!   24-entry extended neighbourhoods.
//!
//! Keep this crate tiny: `glam` for offsets, `serde` for data files.

#![forbid(unsafe_code)]

pub mod offsets;

pub use offsets::NeighborOffsetTable;

use core::fmt;
use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Integer cell coordinate.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const ORIGIN: Position = Position::new(0, 0, 0);
    /// Propagation reads up to two cells past any cell it starts from, so
    /// the outer two layers of the `i32` range are never addressable.
    pub const COORD_MIN: i32 = i32::MIN + 2;
    pub const COORD_MAX: i32 = i32::MAX - 2;

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Every coordinate lies in `COORD_MIN..=COORD_MAX`.
    #[inline]
    pub fn is_addressable(self) -> bool {
        let ok = |c: i32| (Self::COORD_MIN..=Self::COORD_MAX).contains(&c);
        ok(self.x) && ok(self.y) && ok(self.z)
    }

    /// Position translated by a raw offset. Only defined for addressable
    /// positions and offsets of at most two per axis.
    #[inline]
    pub fn offset(self, d: IVec3) -> Self {
        Self::new(self.x + d.x, self.y + d.y, self.z + d.z)
    }

    /// Adjacent position one step toward `facing`.
    #[inline]
    pub fn step(self, facing: Facing) -> Self {
        self.offset(facing.offset())
    }

    #[inline]
    pub fn up(self) -> Self {
        self.step(Facing::Up)
    }

    #[inline]
    pub fn down(self) -> Self {
        self.step(Facing::Down)
    }

    #[inline]
    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// Chunk coordinate containing this position for cubic chunks of edge `size`.
    #[inline]
    pub fn chunk(self, size: i32) -> IVec3 {
        let s = size.max(1);
        IVec3::new(
            self.x.div_euclid(s),
            self.y.div_euclid(s),
            self.z.div_euclid(s),
        )
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<IVec3> for Position {
    fn from(v: IVec3) -> Self {
        Position::new(v.x, v.y, v.z)
    }
}
impl From<Position> for IVec3 {
    fn from(p: Position) -> Self {
        p.as_ivec3()
    }
}
impl From<[i32; 3]> for Position {
    fn from(v: [i32; 3]) -> Self {
        Position::new(v[0], v[1], v[2])
    }
}
impl From<Position> for [i32; 3] {
    fn from(p: Position) -> Self {
        [p.x, p.y, p.z]
    }
}

/// Coordinate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn is_horizontal(self) -> bool {
        !matches!(self, Axis::Y)
    }
}

/// One of the six cell faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Down,
    Up,
    West,
    East,
    North,
    South,
}

impl Facing {
    /// Same-layer update order.
    pub const HORIZONTAL: [Facing; 4] = [Facing::West, Facing::East, Facing::North, Facing::South];
    /// Vertical update order: below before above.
    pub const VERTICAL: [Facing; 2] = [Facing::Down, Facing::Up];
    /// Full update order, vertical first.
    pub const ALL: [Facing; 6] = [
        Facing::Down,
        Facing::Up,
        Facing::West,
        Facing::East,
        Facing::North,
        Facing::South,
    ];

    #[inline]
    pub const fn offset(self) -> IVec3 {
        match self {
            Facing::Down => IVec3::new(0, -1, 0),
            Facing::Up => IVec3::new(0, 1, 0),
            Facing::West => IVec3::new(-1, 0, 0),
            Facing::East => IVec3::new(1, 0, 0),
            Facing::North => IVec3::new(0, 0, -1),
            Facing::South => IVec3::new(0, 0, 1),
        }
    }

    #[inline]
    pub const fn opposite(self) -> Facing {
        match self {
            Facing::Down => Facing::Up,
            Facing::Up => Facing::Down,
            Facing::West => Facing::East,
            Facing::East => Facing::West,
            Facing::North => Facing::South,
            Facing::South => Facing::North,
        }
    }

    #[inline]
    pub const fn axis(self) -> Axis {
        match self {
            Facing::Down | Facing::Up => Axis::Y,
            Facing::West | Facing::East => Axis::X,
            Facing::North | Facing::South => Axis::Z,
        }
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        self.axis().is_horizontal()
    }
}

/// Signal strength; always within `0..=Power::MAX`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Power(u8);

impl Power {
    pub const ZERO: Power = Power(0);
    pub const MAX: Power = Power(15);

    /// Clamp any integer into range.
    #[inline]
    pub fn new(level: i32) -> Self {
        Power(level.clamp(0, Self::MAX.0 as i32) as u8)
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_on(self) -> bool {
        self.0 > 0
    }

    /// One propagation step of decay, saturating at zero.
    #[inline]
    pub fn decayed(self) -> Self {
        Power(self.0.saturating_sub(1))
    }
}

impl fmt::Debug for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Power {
    fn from(v: i32) -> Self {
        Power::new(v)
    }
}
impl From<Power> for i32 {
    fn from(p: Power) -> Self {
        p.0 as i32
    }
}
