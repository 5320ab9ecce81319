//! Static neighbour offset tables.

use crate::Facing;
use glam::IVec3;

/// Precomputed relative offsets used by propagation and notification.
pub struct NeighborOffsetTable;

impl NeighborOffsetTable {
    /// Same-layer neighbours (W, E, N, S).
    pub const HORIZONTAL: [IVec3; 4] = [
        Facing::West.offset(),
        Facing::East.offset(),
        Facing::North.offset(),
        Facing::South.offset(),
    ];

    /// Below, then above.
    pub const VERTICAL: [IVec3; 2] = [Facing::Down.offset(), Facing::Up.offset()];

    /// Direct plus diagonal neighbourhood flooded after every cycle.
    ///
    /// Order: the six direct offsets (vertical first), then every pairwise sum
    /// of facings in `Facing::ALL` order with duplicates and the origin removed.
    pub const EXTENDED: [IVec3; 24] = [
        // direct
        IVec3::new(0, -1, 0),
        IVec3::new(0, 1, 0),
        IVec3::new(-1, 0, 0),
        IVec3::new(1, 0, 0),
        IVec3::new(0, 0, -1),
        IVec3::new(0, 0, 1),
        // down + *
        IVec3::new(0, -2, 0),
        IVec3::new(-1, -1, 0),
        IVec3::new(1, -1, 0),
        IVec3::new(0, -1, -1),
        IVec3::new(0, -1, 1),
        // up + *
        IVec3::new(0, 2, 0),
        IVec3::new(-1, 1, 0),
        IVec3::new(1, 1, 0),
        IVec3::new(0, 1, -1),
        IVec3::new(0, 1, 1),
        // west + *
        IVec3::new(-2, 0, 0),
        IVec3::new(-1, 0, -1),
        IVec3::new(-1, 0, 1),
        // east + *
        IVec3::new(2, 0, 0),
        IVec3::new(1, 0, -1),
        IVec3::new(1, 0, 1),
        // north/south doubles
        IVec3::new(0, 0, -2),
        IVec3::new(0, 0, 2),
    ];

    /// Offsets of the extended neighbourhood in flood order.
    #[inline]
    pub fn extended() -> &'static [IVec3] {
        &Self::EXTENDED
    }
}
