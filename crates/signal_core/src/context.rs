//! Per-call relaxation state.
//!
//! A `RelaxationContext` is created by `recalc::recalculate`, threaded through
//! every step by `&mut`, and consumed into a `Relaxation` at the end. Nothing
//! outlives the call, so nested or overlapping recalculations each own their
//! worklists.

use core_grid::{Position, Power};
use indexmap::IndexSet;
use std::collections::{HashSet, VecDeque};

/// Which worklist is being drained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    TurnOff,
    TurnOn,
}

/// Turn-on step that computed a target below the wire's current power.
/// Recorded and left uncorrected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnOnDrop {
    pub pos: Position,
    pub current: Power,
    pub target: Power,
}

/// FIFO of positions with O(1) membership.
#[derive(Debug, Default)]
struct Worklist {
    queue: VecDeque<Position>,
    members: HashSet<Position>,
}

impl Worklist {
    #[inline]
    fn contains(&self, p: Position) -> bool {
        self.members.contains(&p)
    }

    fn push(&mut self, p: Position) -> bool {
        if !self.members.insert(p) {
            return false;
        }
        self.queue.push_back(p);
        true
    }

    fn pop(&mut self) -> Option<Position> {
        let p = self.queue.pop_front()?;
        self.members.remove(&p);
        Some(p)
    }

    fn remove(&mut self, p: Position) -> bool {
        if !self.members.remove(&p) {
            return false;
        }
        self.queue.retain(|q| *q != p);
        true
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Worklists and change record for one `recalculate` call.
#[derive(Debug)]
pub struct RelaxationContext {
    turn_off: Worklist,
    turn_on: Worklist,
    /// Pulled out of `turn_on` into `turn_off`; re-queued for turn-on after
    /// their turn-off step.
    resume_turn_on: HashSet<Position>,
    changed: IndexSet<Position>,
    phase: Phase,
    drops: Vec<TurnOnDrop>,
    steps: usize,
}

impl Default for RelaxationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RelaxationContext {
    pub fn new() -> Self {
        Self {
            turn_off: Worklist::default(),
            turn_on: Worklist::default(),
            resume_turn_on: HashSet::new(),
            changed: IndexSet::new(),
            phase: Phase::TurnOff,
            drops: Vec::new(),
            steps: 0,
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_queued_turn_off(&self, p: Position) -> bool {
        self.turn_off.contains(p)
    }

    #[inline]
    pub fn is_queued_turn_on(&self, p: Position) -> bool {
        self.turn_on.contains(p)
    }

    /// Queue `p` for the turn-on phase unless it is already queued anywhere.
    pub fn queue_turn_on(&mut self, p: Position) -> bool {
        if self.turn_off.contains(p) {
            return false;
        }
        self.turn_on.push(p)
    }

    /// Queue `p` for the turn-off phase.
    ///
    /// A position pending turn-on moves over and returns to turn-on after its
    /// turn-off step. Ignored once the turn-on phase has started.
    pub fn queue_turn_off(&mut self, p: Position) -> bool {
        if self.phase == Phase::TurnOn {
            log::trace!("signal: turn-off request for {p} ignored during turn-on");
            return false;
        }
        if self.turn_off.contains(p) {
            return false;
        }
        if self.turn_on.remove(p) {
            self.resume_turn_on.insert(p);
        }
        self.turn_off.push(p)
    }

    pub(crate) fn pop_turn_off(&mut self) -> Option<Position> {
        let p = self.turn_off.pop()?;
        self.steps += 1;
        Some(p)
    }

    /// Re-queue a position that was moved out of `turn_on`, if it was.
    pub(crate) fn resume(&mut self, p: Position) {
        if self.resume_turn_on.remove(&p) {
            self.turn_on.push(p);
        }
    }

    /// Switch to the turn-on phase. The turn-off list is empty by now.
    pub(crate) fn enter_turn_on(&mut self) {
        debug_assert!(self.turn_off.is_empty());
        self.phase = Phase::TurnOn;
    }

    pub(crate) fn pop_turn_on(&mut self) -> Option<Position> {
        let p = self.turn_on.pop()?;
        self.steps += 1;
        Some(p)
    }

    /// Record a written wire; first write wins the ordering slot.
    #[inline]
    pub fn record_change(&mut self, p: Position) {
        self.changed.insert(p);
    }

    #[inline]
    pub fn changed(&self) -> &IndexSet<Position> {
        &self.changed
    }

    pub(crate) fn record_drop(&mut self, drop: TurnOnDrop) {
        self.drops.push(drop);
    }

    /// Consume the context into its outcome.
    pub fn finish(self) -> Relaxation {
        Relaxation {
            changed: self.changed,
            turn_on_drops: self.drops,
            steps: self.steps,
        }
    }
}

/// Outcome of one `recalculate` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Relaxation {
    /// Every wire written this call, in first-touched order.
    pub changed: IndexSet<Position>,
    pub turn_on_drops: Vec<TurnOnDrop>,
    /// Worklist entries processed across both phases.
    pub steps: usize,
}
