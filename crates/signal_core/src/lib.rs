//! signal_core: wire power propagation over a `GridAccessor`.
//!
//! Flow per trigger (see `engine`):
//! 1. `recalc::recalculate` relaxes wire power from the trigger position in
//!    two FIFO phases (turn-off, then turn-on) and returns the ordered set of
//!    wires it wrote.
//! 2. `dispatch::compute_notify_set` turns that set into the ordered list of
//!    cells whose behaviour may change, minus the wires themselves.
//! 3. The engine delivers one `notify` per entry.
//!
//! `scene_build` plays data-driven scenarios; `telemetry` installs logging
//! and metrics for binaries.

#![forbid(unsafe_code)]

pub mod context;
pub mod dispatch;
pub mod engine;
pub mod recalc;
pub mod scene_build;
pub mod telemetry;

pub use context::{Phase, Relaxation, RelaxationContext, TurnOnDrop};
pub use dispatch::{NotifySet, UpdateDispatcher, compute_notify_set};
pub use engine::{CycleReport, EngineError, Trigger, WireEngine};
pub use recalc::{SignalRecalculator, recalculate};
