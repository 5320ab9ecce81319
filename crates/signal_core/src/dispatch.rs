//! Notify-set construction after a relaxation.
//!
//! Only cells whose behaviour can change are added from the targeted passes;
//! the extended-neighbourhood flood is kept for compatibility with hosts that
//! rely on it. Wires written in the cycle are removed from the final set.

use core_devices::is_sensitive;
use core_grid::{Facing, NeighborOffsetTable, Position};
use indexmap::IndexSet;
use voxel_grid::{GridAccessor, GridError, conducting_sides_at};

/// Ordered set of positions to notify, in emission order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotifySet(IndexSet<Position>);

impl NotifySet {
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn contains(&self, p: Position) -> bool {
        self.0.contains(&p)
    }

    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Position> {
        self.iter().collect()
    }
}

/// Builds notify sets for wires changed by one relaxation.
#[derive(Clone, Copy, Debug)]
pub struct UpdateDispatcher {
    /// Flood the 24-cell extended neighbourhood of every changed wire.
    pub legacy_flood: bool,
}

impl Default for UpdateDispatcher {
    fn default() -> Self {
        Self { legacy_flood: true }
    }
}

impl UpdateDispatcher {
    pub fn new(legacy_flood: bool) -> Self {
        Self { legacy_flood }
    }

    pub fn compute_notify_set<G: GridAccessor + ?Sized>(
        &self,
        grid: &G,
        changed: &IndexSet<Position>,
    ) -> Result<NotifySet, GridError> {
        compute_notify_set(grid, changed, self.legacy_flood)
    }
}

/// Derive the ordered notify set for `changed` (first-touched order).
pub fn compute_notify_set<G: GridAccessor + ?Sized>(
    grid: &G,
    changed: &IndexSet<Position>,
    legacy_flood: bool,
) -> Result<NotifySet, GridError> {
    let mut set = IndexSet::new();
    for &p in changed {
        add_blocks_needing_update(grid, p, &mut set)?;
    }
    if legacy_flood {
        // reverse order keeps the update sequence hosts already depend on
        for &p in changed.iter().rev() {
            for &off in NeighborOffsetTable::extended() {
                set.insert(p.offset(off));
            }
        }
    }
    set.retain(|q| !changed.contains(q));
    Ok(NotifySet(set))
}

/// Cells the wire at `p` can affect: direct neighbours first, then cells
/// reached through a solid block the wire powers.
fn add_blocks_needing_update<G: GridAccessor + ?Sized>(
    grid: &G,
    p: Position,
    set: &mut IndexSet<Position>,
) -> Result<(), GridError> {
    let sides = conducting_sides_at(grid, p)?;
    let powers = |f: Facing| f == Facing::Down || sides.contains(f);
    for f in Facing::ALL {
        if !powers(f) {
            continue;
        }
        let q = p.step(f);
        if is_sensitive(&grid.cell_state(q)?, f, true) {
            set.insert(q);
        }
    }
    for f in Facing::ALL {
        if !powers(f) {
            continue;
        }
        let q = p.step(f);
        if grid.is_solid_opaque(q)? {
            for g in Facing::ALL {
                let r = q.step(g);
                if is_sensitive(&grid.cell_state(r)?, g, false) {
                    set.insert(r);
                }
            }
        }
    }
    Ok(())
}
