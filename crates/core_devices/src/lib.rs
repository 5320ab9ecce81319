//! core_devices: closed palette of cell kinds and the fixed device rules.
//!
//! Scope
//! - `CellState`: every kind of cell the propagation engine can meet.
//! - `DeviceClass` + static `DEVICES` table: name and notification rule per
//!   category, looked up instead of dispatching per device type.
//! - `is_sensitive`: whether a stimulus arriving on a side can change a device.
//! - `conduction`: which horizontal sides a wire conducts toward.
//!
//! Facing conventions
//! - Diode/comparator `facing` is the output direction (input at `pos - facing`).
//! - Piston `facing` is the push direction.
//! - Torch `facing` points away from the block it is attached to.

#![forbid(unsafe_code)]

pub mod conduction;

use core_grid::{Facing, Power};
use serde::{Deserialize, Serialize};

/// State of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellState {
    #[default]
    Air,
    Wire {
        #[serde(default)]
        power: Power,
    },
    /// Opaque full cube.
    Solid,
    Diode {
        facing: Facing,
        #[serde(default)]
        powered: bool,
    },
    Comparator {
        facing: Facing,
        #[serde(default)]
        output: Power,
    },
    Torch {
        facing: Facing,
        #[serde(default = "lit_default")]
        lit: bool,
    },
    Piston {
        facing: Facing,
    },
    /// Constant emitter on every side.
    Source {
        level: Power,
    },
    Other {
        #[serde(default)]
        opaque: bool,
    },
}

fn lit_default() -> bool {
    true
}

impl CellState {
    /// Unpowered wire.
    pub const WIRE: CellState = CellState::Wire { power: Power::ZERO };

    #[inline]
    pub fn wire(level: i32) -> Self {
        CellState::Wire {
            power: Power::new(level),
        }
    }

    #[inline]
    pub fn is_wire(&self) -> bool {
        matches!(self, CellState::Wire { .. })
    }

    /// Power of a wire cell; `None` for anything else.
    #[inline]
    pub fn wire_power(&self) -> Option<Power> {
        match *self {
            CellState::Wire { power } => Some(power),
            _ => None,
        }
    }

    /// Opaque full cubes block stepping and relay strong power.
    #[inline]
    pub fn is_solid_opaque(&self) -> bool {
        matches!(self, CellState::Solid | CellState::Other { opaque: true })
    }

    /// Output facing of a directional emitter (diode or comparator).
    #[inline]
    pub fn directional_output(&self) -> Option<Facing> {
        match *self {
            CellState::Diode { facing, .. } | CellState::Comparator { facing, .. } => Some(facing),
            _ => None,
        }
    }

    pub fn class(&self) -> DeviceClass {
        match self {
            CellState::Wire { .. } => DeviceClass::Wire,
            CellState::Solid => DeviceClass::Opaque,
            CellState::Diode { .. } => DeviceClass::Diode,
            CellState::Comparator { .. } => DeviceClass::Comparator,
            CellState::Torch { .. } => DeviceClass::Torch,
            CellState::Piston { .. } => DeviceClass::Piston,
            CellState::Source { .. } => DeviceClass::Source,
            CellState::Air | CellState::Other { .. } => DeviceClass::Other,
        }
    }
}

/// Device categories with fixed notification rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Wire,
    Opaque,
    Diode,
    Comparator,
    Torch,
    Piston,
    Source,
    Other,
}

/// How a device category filters incoming stimulus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideRule {
    /// Every side, every stimulus.
    Always,
    /// Not through the face it pushes from.
    NotFront,
    /// Only through the input face.
    InputOnly,
    /// Input face, plus side faces when the stimulus comes from a wire.
    InputOrWireSide,
    /// Only non-wire stimulus entering from the attachment block.
    AttachmentOnly,
}

#[derive(Clone, Copy, Debug)]
pub struct DeviceInfo {
    pub class: DeviceClass,
    pub name: &'static str,
    pub rule: SideRule,
}

/// Rule table indexed by `DeviceClass as usize`.
pub static DEVICES: &[DeviceInfo] = &[
    DeviceInfo {
        class: DeviceClass::Wire,
        name: "wire",
        rule: SideRule::Always,
    },
    DeviceInfo {
        class: DeviceClass::Opaque,
        name: "solid",
        rule: SideRule::Always,
    },
    DeviceInfo {
        class: DeviceClass::Diode,
        name: "diode",
        rule: SideRule::InputOnly,
    },
    DeviceInfo {
        class: DeviceClass::Comparator,
        name: "comparator",
        rule: SideRule::InputOrWireSide,
    },
    DeviceInfo {
        class: DeviceClass::Torch,
        name: "torch",
        rule: SideRule::AttachmentOnly,
    },
    DeviceInfo {
        class: DeviceClass::Piston,
        name: "piston",
        rule: SideRule::NotFront,
    },
    DeviceInfo {
        class: DeviceClass::Source,
        name: "source",
        rule: SideRule::Always,
    },
    DeviceInfo {
        class: DeviceClass::Other,
        name: "other",
        rule: SideRule::Always,
    },
];

/// Fetch the table entry for a category.
pub fn info(class: DeviceClass) -> &'static DeviceInfo {
    &DEVICES[class as usize]
}

/// Whether a stimulus travelling in direction `side` into a cell in `state`
/// can change that cell's behaviour. `via_wire` is true when the stimulus is
/// a wire directly adjacent, false when relayed through a solid block.
pub fn is_sensitive(state: &CellState, side: Facing, via_wire: bool) -> bool {
    match info(state.class()).rule {
        SideRule::Always => true,
        SideRule::NotFront => match *state {
            CellState::Piston { facing } => facing != side.opposite(),
            _ => true,
        },
        SideRule::InputOnly => state.directional_output() == Some(side),
        SideRule::InputOrWireSide => match state.directional_output() {
            Some(facing) if facing == side => true,
            Some(facing) => via_wire && side.is_horizontal() && facing.axis() != side.axis(),
            None => true,
        },
        SideRule::AttachmentOnly => match *state {
            CellState::Torch { facing, .. } => !via_wire && facing == side,
            _ => true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_class() {
        for (i, d) in DEVICES.iter().enumerate() {
            assert_eq!(d.class as usize, i, "{} out of place", d.name);
        }
    }

    #[test]
    fn piston_ignores_its_front() {
        let p = CellState::Piston {
            facing: Facing::West,
        };
        // stimulus from the west cell travels east into the front face
        assert!(!is_sensitive(&p, Facing::East, true));
        assert!(is_sensitive(&p, Facing::West, true));
        assert!(is_sensitive(&p, Facing::Down, false));
    }

    #[test]
    fn diode_only_listens_on_input() {
        let d = CellState::Diode {
            facing: Facing::East,
            powered: false,
        };
        assert!(is_sensitive(&d, Facing::East, true));
        assert!(!is_sensitive(&d, Facing::West, true));
        assert!(!is_sensitive(&d, Facing::North, true));
        assert!(!is_sensitive(&d, Facing::Down, false));
    }

    #[test]
    fn comparator_side_inputs_need_wire() {
        let c = CellState::Comparator {
            facing: Facing::East,
            output: Power::ZERO,
        };
        assert!(is_sensitive(&c, Facing::East, false));
        assert!(is_sensitive(&c, Facing::North, true));
        assert!(is_sensitive(&c, Facing::South, true));
        assert!(!is_sensitive(&c, Facing::North, false));
        assert!(!is_sensitive(&c, Facing::West, true));
        assert!(!is_sensitive(&c, Facing::Down, true));
    }

    #[test]
    fn torch_follows_attachment_only() {
        let t = CellState::Torch {
            facing: Facing::Up,
            lit: true,
        };
        assert!(!is_sensitive(&t, Facing::Up, true));
        assert!(is_sensitive(&t, Facing::Up, false));
        assert!(!is_sensitive(&t, Facing::East, false));
    }

    #[test]
    fn plain_cells_always_listen() {
        for s in [
            CellState::Air,
            CellState::Solid,
            CellState::WIRE,
            CellState::Other { opaque: false },
            CellState::Source { level: Power::MAX },
        ] {
            for f in Facing::ALL {
                assert!(is_sensitive(&s, f, true));
                assert!(is_sensitive(&s, f, false));
            }
        }
    }

    #[test]
    fn serde_tags_cells() {
        let c: CellState = serde_json::from_str(r#"{"type":"diode","facing":"east"}"#).unwrap();
        assert_eq!(
            c,
            CellState::Diode {
                facing: Facing::East,
                powered: false
            }
        );
        let w: CellState = serde_json::from_str(r#"{"type":"wire"}"#).unwrap();
        assert_eq!(w, CellState::WIRE);
        let s: CellState = serde_json::from_str(r#"{"type":"source","level":20}"#).unwrap();
        assert_eq!(s, CellState::Source { level: Power::MAX });
    }
}
