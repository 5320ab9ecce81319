//! voxel_grid: sparse chunked cell store + the grid access contract.
//!
//! Scope
//! - `GridAccessor`/`GridError`: the narrow read/write interface the signal
//!   engine is written against (see `access`).
//! - `SparseGrid`: reference store. Absent cells are air, chunks can be
//!   unloaded (reads then fail hard), writes mark their chunk dirty.
//! - Power emission model for non-wire sources (see `power`).
//!
//! Extending
//! - Persist chunks by hashing their cell maps when a save path is added.

#![forbid(unsafe_code)]

pub mod access;
pub mod power;

pub use access::{GridAccessor, GridError, conducting_sides_at};
pub use power::WireEmission;

use core_devices::CellState;
use core_grid::{Position, Power};
use glam::IVec3;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Inclusive bounds. Reads outside return air, writes outside fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridBounds {
    pub min: Position,
    pub max: Position,
}

impl GridBounds {
    #[inline]
    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.min.x
            && p.y >= self.min.y
            && p.z >= self.min.z
            && p.x <= self.max.x
            && p.y <= self.max.y
            && p.z <= self.max.z
    }
}

/// Sparse cell map partitioned into cubic chunks.
#[derive(Clone, Debug)]
pub struct SparseGrid {
    cells: HashMap<Position, CellState>,
    chunk: i32,
    bounds: Option<GridBounds>,
    unloaded: HashSet<IVec3>,
    /// Chunks written since the last pop; ordered so hosts drain them deterministically.
    dirty_chunks: BTreeSet<(i32, i32, i32)>,
    notifications: Vec<Position>,
}

impl Default for SparseGrid {
    fn default() -> Self {
        Self::new(16)
    }
}

impl SparseGrid {
    /// Empty, unbounded grid with chunks of edge `chunk`.
    pub fn new(chunk: i32) -> Self {
        Self {
            cells: HashMap::new(),
            chunk: chunk.max(1),
            bounds: None,
            unloaded: HashSet::new(),
            dirty_chunks: BTreeSet::new(),
            notifications: Vec::new(),
        }
    }

    pub fn with_bounds(mut self, bounds: GridBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    #[inline]
    pub fn chunk_size(&self) -> i32 {
        self.chunk
    }

    #[inline]
    pub fn bounds(&self) -> Option<GridBounds> {
        self.bounds
    }

    #[inline]
    pub fn chunk_of(&self, p: Position) -> IVec3 {
        p.chunk(self.chunk)
    }

    #[inline]
    fn in_bounds(&self, p: Position) -> bool {
        self.bounds.map_or(true, |b| b.contains(p))
    }

    /// Raw cell lookup ignoring chunk loading (tools and tests).
    pub fn get(&self, p: Position) -> CellState {
        self.cells.get(&p).copied().unwrap_or_default()
    }

    /// Power of the wire at `p`, if any.
    pub fn power_at(&self, p: Position) -> Option<Power> {
        self.get(p).wire_power()
    }

    /// Checked lookup used by the access contract.
    fn read(&self, p: Position) -> Result<CellState, GridError> {
        if !self.in_bounds(p) {
            return Ok(CellState::Air);
        }
        let chunk = self.chunk_of(p);
        if self.unloaded.contains(&chunk) {
            return Err(GridError::ChunkUnloaded { chunk });
        }
        Ok(self.get(p))
    }

    fn check_writable(&self, p: Position) -> Result<(), GridError> {
        if !self.in_bounds(p) || !p.is_addressable() {
            return Err(GridError::OutOfBounds(p));
        }
        let chunk = self.chunk_of(p);
        if self.unloaded.contains(&chunk) {
            return Err(GridError::ChunkUnloaded { chunk });
        }
        Ok(())
    }

    /// Write a cell; air clears the entry.
    pub fn put(&mut self, p: Position, state: CellState) -> Result<(), GridError> {
        self.check_writable(p)?;
        if state == CellState::Air {
            self.cells.remove(&p);
        } else {
            self.cells.insert(p, state);
        }
        self.mark_chunk_dirty(p);
        Ok(())
    }

    /// Clear a cell and return what was there.
    pub fn remove(&mut self, p: Position) -> Result<CellState, GridError> {
        self.check_writable(p)?;
        let old = self.cells.remove(&p).unwrap_or_default();
        self.mark_chunk_dirty(p);
        Ok(old)
    }

    /// Fill the inclusive box `a..=b` with `state`.
    pub fn fill(&mut self, a: Position, b: Position, state: CellState) -> Result<(), GridError> {
        for z in a.z.min(b.z)..=a.z.max(b.z) {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                for x in a.x.min(b.x)..=a.x.max(b.x) {
                    self.put(Position::new(x, y, z), state)?;
                }
            }
        }
        Ok(())
    }

    /// Mark a chunk unloaded; every checked access inside it fails until reloaded.
    pub fn unload_chunk(&mut self, chunk: IVec3) {
        self.unloaded.insert(chunk);
    }

    pub fn load_chunk(&mut self, chunk: IVec3) {
        self.unloaded.remove(&chunk);
    }

    #[inline]
    pub fn is_loaded(&self, chunk: IVec3) -> bool {
        !self.unloaded.contains(&chunk)
    }

    #[inline]
    fn mark_chunk_dirty(&mut self, p: Position) {
        let c = self.chunk_of(p);
        self.dirty_chunks.insert((c.x, c.y, c.z));
    }

    /// Pop up to `n` dirty chunks, lowest coordinate first.
    pub fn pop_dirty_chunks(&mut self, n: usize) -> Vec<IVec3> {
        let mut out = Vec::new();
        while out.len() < n {
            let Some((x, y, z)) = self.dirty_chunks.pop_first() else {
                break;
            };
            out.push(IVec3::new(x, y, z));
        }
        out
    }

    /// Number of dirty chunks currently queued.
    #[inline]
    pub fn dirty_len(&self) -> usize {
        self.dirty_chunks.len()
    }

    /// Non-air cell count.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every wire and its level, ordered by position.
    pub fn wire_levels(&self) -> BTreeMap<Position, Power> {
        self.cells
            .iter()
            .filter_map(|(p, s)| s.wire_power().map(|w| (*p, w)))
            .collect()
    }

    /// Notifications received so far, in order.
    #[inline]
    pub fn notifications(&self) -> &[Position] {
        &self.notifications
    }

    /// Drain the notification log.
    pub fn take_notifications(&mut self) -> Vec<Position> {
        std::mem::take(&mut self.notifications)
    }
}

impl GridAccessor for SparseGrid {
    fn cell_state(&self, pos: Position) -> Result<CellState, GridError> {
        self.read(pos)
    }

    fn set_power(&mut self, pos: Position, level: Power) -> Result<(), GridError> {
        self.check_writable(pos)?;
        match self.cells.get_mut(&pos) {
            Some(CellState::Wire { power }) => *power = level,
            _ => return Err(GridError::NotAWire(pos)),
        }
        self.mark_chunk_dirty(pos);
        Ok(())
    }

    fn external_power_excluding_self(&self, pos: Position) -> Result<Power, GridError> {
        self.received_power_with(pos, WireEmission::Suppressed)
    }

    fn notify(&mut self, pos: Position) -> Result<(), GridError> {
        log::trace!("grid: notify {pos}");
        self.notifications.push(pos);
        Ok(())
    }
}
