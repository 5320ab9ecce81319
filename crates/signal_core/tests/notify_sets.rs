use core_devices::CellState;
use core_grid::{Facing, Position, Power};
use data_runtime::configs::signal::SignalConfig;
use signal_core::WireEngine;
use std::collections::HashSet;
use voxel_grid::SparseGrid;

fn p(x: i32, y: i32, z: i32) -> Position {
    Position::new(x, y, z)
}

fn layout() -> SparseGrid {
    let mut g = SparseGrid::default();
    g.put(p(0, 0, 0), CellState::Source { level: Power::MAX }).unwrap();
    for x in 1..=4 {
        g.put(p(x, 0, 0), CellState::WIRE).unwrap();
        g.put(p(x, -1, 0), CellState::Solid).unwrap();
    }
    g.put(p(5, 0, 0), CellState::Piston { facing: Facing::Up }).unwrap();
    g.put(p(2, 0, 1), CellState::Diode { facing: Facing::South, powered: false }).unwrap();
    g
}

#[test]
fn notified_cells_are_disjoint_from_changed_wires() {
    for flood in [true, false] {
        let cfg = SignalConfig { legacy_flood: flood, ..SignalConfig::default() };
        let mut g = layout();
        let r = WireEngine::new(&cfg).on_placed(&mut g, p(1, 0, 0)).unwrap();
        let changed: HashSet<_> = r.changed.iter().copied().collect();
        assert!(r.notified.iter().all(|q| !changed.contains(q)), "flood={flood}");
        // no duplicates either
        let uniq: HashSet<_> = r.notified.iter().collect();
        assert_eq!(uniq.len(), r.notified.len());
    }
}

#[test]
fn targeted_pass_reaches_devices_at_the_end_of_the_line() {
    let cfg = SignalConfig { legacy_flood: false, ..SignalConfig::default() };
    let mut g = layout();
    let r = WireEngine::new(&cfg).on_placed(&mut g, p(1, 0, 0)).unwrap();
    // piston east of the last wire, diode input facing the line
    assert!(r.notified.contains(&p(5, 0, 0)));
    assert!(r.notified.contains(&p(2, 0, 1)));
    // cells under the powered floor
    assert!(r.notified.contains(&p(3, -2, 0)));
}

#[test]
fn runs_are_deterministic() {
    let run = || {
        let mut g = layout();
        let e = WireEngine::default();
        let a = e.on_placed(&mut g, p(1, 0, 0)).unwrap();
        g.remove(p(0, 0, 0)).unwrap();
        let b = e.on_removed(&mut g, p(0, 0, 0)).unwrap();
        (a, b, g.take_notifications())
    };
    assert_eq!(run(), run());
}
