//! redwire: wire power propagation on a sparse voxel grid.
//!
//! Thin facade over the workspace crates so hosts and integration tests
//! depend on one name:
//! - `grid`: coordinates, facings, power levels (`core_grid`)
//! - `devices`: cell states and device rules (`core_devices`)
//! - `voxel`: the grid access contract and the sparse reference grid (`voxel_grid`)
//! - `signal`: relaxation, dispatch and the trigger engine (`signal_core`)
//! - `data`: configs and scenarios (`data_runtime`)

pub use core_devices as devices;
pub use core_grid as grid;
pub use data_runtime as data;
pub use signal_core as signal;
pub use voxel_grid as voxel;

pub use core_devices::CellState;
pub use core_grid::{Facing, Position, Power};
pub use signal_core::{CycleReport, EngineError, Trigger, WireEngine};
pub use voxel_grid::{GridAccessor, GridError, SparseGrid};
