//! Two-phase wire power relaxation.
//!
//! Phase one drains `turn_off` and drops every wire that lost support to zero
//! (raising any that can already go higher); phase two drains `turn_on` and
//! raises wires back to the level their sources and neighbours justify. Both
//! lists are FIFO; the drain order is the observable update order.

use crate::context::{Phase, Relaxation, RelaxationContext, TurnOnDrop};
use core_grid::{Facing, Position, Power};
use voxel_grid::{GridAccessor, GridError};

/// Recompute every wire reachable from `pos` and return what changed.
///
/// `pos` may hold anything; when it no longer holds a wire (it was just
/// removed) its neighbours are re-evaluated directly. A grid error aborts the
/// call; writes made before it are kept.
pub fn recalculate<G: GridAccessor + ?Sized>(grid: &mut G, pos: Position) -> Result<Relaxation, GridError> {
    let mut ctx = RelaxationContext::new();
    if grid.cell_state(pos)?.is_wire() {
        ctx.queue_turn_off(pos);
    } else {
        check_surrounding_wires(&*grid, &mut ctx, pos)?;
    }
    while let Some(p) = ctx.pop_turn_off() {
        turn_off_step(grid, &mut ctx, p)?;
        ctx.resume(p);
    }
    ctx.enter_turn_on();
    while let Some(p) = ctx.pop_turn_on() {
        turn_on_step(grid, &mut ctx, p)?;
    }
    Ok(ctx.finish())
}

/// Stateless handle bundling a grid with the relaxation entry point.
pub struct SignalRecalculator<'g, G: GridAccessor + ?Sized> {
    grid: &'g mut G,
}

impl<'g, G: GridAccessor + ?Sized> SignalRecalculator<'g, G> {
    pub fn new(grid: &'g mut G) -> Self {
        Self { grid }
    }

    pub fn recalculate(&mut self, pos: Position) -> Result<Relaxation, GridError> {
        recalculate(&mut *self.grid, pos)
    }
}

/// Target power for the wire at `p`: strongest of external sources and
/// decayed neighbour wires.
fn target_power<G: GridAccessor + ?Sized>(grid: &G, p: Position) -> Result<(Power, Power), GridError> {
    let external = grid.external_power_excluding_self(p)?;
    let wire = surrounding_wire_power(grid, p)?.decayed();
    Ok((external.max(wire), external))
}

fn set_wire_power<G: GridAccessor + ?Sized>(
    grid: &mut G,
    ctx: &mut RelaxationContext,
    p: Position,
    level: Power,
) -> Result<(), GridError> {
    grid.set_power(p, level)?;
    ctx.record_change(p);
    Ok(())
}

fn turn_off_step<G: GridAccessor + ?Sized>(
    grid: &mut G,
    ctx: &mut RelaxationContext,
    p: Position,
) -> Result<(), GridError> {
    let Some(current) = grid.cell_state(p)?.wire_power() else {
        return Ok(());
    };
    let (target, external) = target_power(&*grid, p)?;
    if target < current {
        // still fed directly, only weaker: come back in the turn-on phase
        if external.is_on() {
            ctx.queue_turn_on(p);
        }
        // wires fed by this one must drop first
        set_wire_power(grid, ctx, p, Power::ZERO)?;
    } else if target > current {
        set_wire_power(grid, ctx, p, target)?;
    }
    check_surrounding_wires(&*grid, ctx, p)
}

fn turn_on_step<G: GridAccessor + ?Sized>(
    grid: &mut G,
    ctx: &mut RelaxationContext,
    p: Position,
) -> Result<(), GridError> {
    debug_assert_eq!(ctx.phase(), Phase::TurnOn);
    let Some(current) = grid.cell_state(p)?.wire_power() else {
        return Ok(());
    };
    let (target, _) = target_power(&*grid, p)?;
    if target > current {
        set_wire_power(grid, ctx, p, target)?;
    } else if target < current {
        log::warn!(
            "signal: turn-on at {p} computed {} below current {}; left uncorrected",
            target.get(),
            current.get()
        );
        metrics::counter!("signal.turn_on_drops_total").increment(1);
        ctx.record_drop(TurnOnDrop { pos: p, current, target });
    }
    check_surrounding_wires(&*grid, ctx, p)
}

/// Queue a neighbouring wire depending on how its power compares to `other`.
fn add_wire_to_list<G: GridAccessor + ?Sized>(
    grid: &G,
    ctx: &mut RelaxationContext,
    q: Position,
    other: Power,
) -> Result<(), GridError> {
    let Some(power) = grid.cell_state(q)?.wire_power() else {
        return Ok(());
    };
    let (power, other) = (i32::from(power), i32::from(other));
    // could be fed more strongly by the neighbour
    if power < other - 1 {
        ctx.queue_turn_on(q);
    }
    // was probably fed by the neighbour and must be re-checked
    if power > other {
        ctx.queue_turn_off(q);
    }
    Ok(())
}

/// Re-evaluate the wires around `p`: same layer first, then stepped wires
/// below, then above.
pub fn check_surrounding_wires<G: GridAccessor + ?Sized>(
    grid: &G,
    ctx: &mut RelaxationContext,
    p: Position,
) -> Result<(), GridError> {
    let own = grid.cell_state(p)?.wire_power().unwrap_or(Power::ZERO);
    for f in Facing::HORIZONTAL {
        add_wire_to_list(grid, ctx, p.step(f), own)?;
    }
    for v in Facing::VERTICAL {
        let o = p.step(v);
        let solid = grid.is_solid_opaque(o)?;
        for h in Facing::HORIZONTAL {
            let q = o.step(h);
            let steps = match v {
                Facing::Up => !solid,
                _ => solid && !grid.is_solid_opaque(q)?,
            };
            if steps {
                add_wire_to_list(grid, ctx, q, own)?;
            }
        }
    }
    Ok(())
}

/// Strongest wire that could feed `p`, before decay.
pub fn surrounding_wire_power<G: GridAccessor + ?Sized>(grid: &G, p: Position) -> Result<Power, GridError> {
    let wire_at = |q: Position| -> Result<Power, GridError> {
        Ok(grid.cell_state(q)?.wire_power().unwrap_or(Power::ZERO))
    };
    let above_solid = grid.is_solid_opaque(p.up())?;
    let mut best = Power::ZERO;
    for f in Facing::HORIZONTAL {
        let q = p.step(f);
        best = best.max(wire_at(q)?);
        if grid.is_solid_opaque(q)? {
            // climbing onto the neighbour block needs headroom above `p`
            if !above_solid {
                best = best.max(wire_at(q.up())?);
            }
        } else {
            best = best.max(wire_at(q.down())?);
        }
    }
    Ok(best)
}
