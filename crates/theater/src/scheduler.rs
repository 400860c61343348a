// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Stage`] — the global interrupt-based scheduler (spec §4.6).
//!
//! Modelled as a pull-based driver rather than one that schedules its own
//! microtasks/macrotasks: the host calls [`Stage::drive`] whenever it is
//! ready to let the stage work, mirroring [`theater_core::TimerWheel`]'s
//! `fire_due` shape. `Stage` is generic over no clock type — `Clock` isn't
//! object-safe as a trait object, so `now` is erased into a plain closure
//! at construction (design note 9's "facades and handles" applied to time).

use crate::agent::Agent;
use crate::gig::Gig;
use crate::config::StageConfig;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;
use theater_core::{Clock, ExclusiveStatus};

/// A scheduled opportunity for the stage to run gigs under a time budget
/// (spec §4.6's priority→budget table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Immediate,
    Fast,
    Normal,
}

struct StageState {
    handling: Option<Interrupt>,
}

struct StageCell {
    config: StageConfig,
    now: Box<dyn Fn() -> Instant>,
    /// At most one gig/agent at a time (spec §4.6 point 2's "stage emptied"
    /// precondition/postcondition); a plain slot rather than an
    /// `ExclusiveStatus`, since a gig's/agent's home-status tag must keep
    /// reflecting workload/agenda/postponed or ready/waiting/idle even
    /// while it is momentarily on stage.
    active: RefCell<Option<Gig>>,
    busy: RefCell<Option<Agent>>,
    suspended: ExclusiveStatus<Agent>,
    ready: ExclusiveStatus<Agent>,
    waiting: ExclusiveStatus<Agent>,
    idle: ExclusiveStatus<Agent>,
    armed: Cell<Option<Interrupt>>,
    state: RefCell<StageState>,
}

/// The scheduler every [`Agent`] on a theater shares. Cheap to clone (an
/// `Rc` handle); the host drives it forward by calling [`Stage::drive`].
#[derive(Clone)]
pub struct Stage {
    cell: Rc<StageCell>,
}

impl Stage {
    pub fn new<C: Clock + 'static>(clock: C, config: StageConfig) -> Self {
        Self {
            cell: Rc::new(StageCell {
                config,
                now: Box::new(move || clock.now()),
                active: RefCell::new(None),
                busy: RefCell::new(None),
                suspended: ExclusiveStatus::new("suspended"),
                ready: ExclusiveStatus::new("ready"),
                waiting: ExclusiveStatus::new("waiting"),
                idle: ExclusiveStatus::new("idle"),
                armed: Cell::new(None),
                state: RefCell::new(StageState { handling: None }),
            }),
        }
    }

    pub(crate) fn suspended(&self) -> &ExclusiveStatus<Agent> {
        &self.cell.suspended
    }

    pub(crate) fn ready(&self) -> &ExclusiveStatus<Agent> {
        &self.cell.ready
    }

    pub(crate) fn waiting(&self) -> &ExclusiveStatus<Agent> {
        &self.cell.waiting
    }

    pub(crate) fn idle(&self) -> &ExclusiveStatus<Agent> {
        &self.cell.idle
    }

    /// Link a freshly cast agent into its home status (`idle`, until it has
    /// work).
    pub(crate) fn register(&self, agent: &Agent) {
        self.cell.idle.add(agent.clone());
    }

    /// Move `agent` into whichever of `suspended`/`ready`/`waiting`/`idle`
    /// currently matches its tag, unlinking it from wherever it was.
    pub(crate) fn rehome(&self, agent: &Agent, target: &ExclusiveStatus<Agent>) {
        match agent.status_tag_name() {
            Some(name) if name == self.cell.suspended.name() => target.transfer(&self.cell.suspended, agent.clone()),
            Some(name) if name == self.cell.ready.name() => target.transfer(&self.cell.ready, agent.clone()),
            Some(name) if name == self.cell.waiting.name() => target.transfer(&self.cell.waiting, agent.clone()),
            Some(name) if name == self.cell.idle.name() => target.transfer(&self.cell.idle, agent.clone()),
            _ => target.add(agent.clone()),
        }
    }

    /// Remove a buried agent from whichever of the four home statuses
    /// currently holds it, without re-linking it anywhere.
    pub(crate) fn retire(&self, agent: &Agent) {
        match agent.status_tag_name() {
            Some(name) if name == self.cell.suspended.name() => {
                self.cell.suspended.delete(agent);
            }
            Some(name) if name == self.cell.ready.name() => {
                self.cell.ready.delete(agent);
            }
            Some(name) if name == self.cell.waiting.name() => {
                self.cell.waiting.delete(agent);
            }
            Some(name) if name == self.cell.idle.name() => {
                self.cell.idle.delete(agent);
            }
            _ => {}
        }
    }

    /// Arm a fast (microtask) interrupt if nothing stronger is already
    /// scheduled (spec §4.5's per-negotiation debounce).
    pub(crate) fn maybe_arm_fast(&self) {
        if self.cell.armed.get().is_none() {
            self.cell.armed.set(Some(Interrupt::Fast));
        }
    }

    fn arm_normal_if_due(&self) {
        if !self.cell.ready.is_empty() && self.cell.armed.get().is_none() {
            self.cell.armed.set(Some(Interrupt::Normal));
        }
    }

    pub fn is_closed(&self) -> bool {
        self.cell.state.borrow().handling.is_none()
    }

    /// The host's tick function: runs the currently armed interrupt, if
    /// any. Returns whether an interrupt ran.
    pub fn drive(&self) -> bool {
        let interrupt = match self.cell.armed.take() {
            Some(interrupt) => interrupt,
            None => return false,
        };
        self.drive_interrupt(interrupt);
        true
    }

    fn budget(&self, interrupt: Interrupt) -> std::time::Duration {
        match interrupt {
            Interrupt::Immediate => self.cell.config.immediate_budget,
            Interrupt::Fast => self.cell.config.fast_budget,
            Interrupt::Normal => self.cell.config.normal_budget,
        }
    }

    fn drive_interrupt(&self, interrupt: Interrupt) {
        {
            let mut state = self.cell.state.borrow_mut();
            assert!(state.handling.is_none(), "Stage interrupts must not nest");
            state.handling = Some(interrupt);
        }

        let deadline = (self.cell.now)() + self.budget(interrupt);
        loop {
            if (self.cell.now)() >= deadline {
                break;
            }
            let Some(agent) = self.cell.ready.front() else { break };
            let Some(gig) = agent.front_workload_gig() else { break };
            self.run_gig_on_stage(&agent, &gig);
        }

        self.cell.state.borrow_mut().handling = None;
        self.arm_normal_if_due();
    }

    /// Run exactly one gig: the precondition/postcondition "stage emptied"
    /// check from spec §4.6 point 2.
    fn run_gig_on_stage(&self, agent: &Agent, gig: &Gig) {
        assert!(self.cell.active.borrow().is_none(), "active non-empty before takeStage");
        assert!(self.cell.busy.borrow().is_none(), "busy non-empty before takeStage");
        agent.workload().delete(gig);
        *self.cell.active.borrow_mut() = Some(gig.clone());
        *self.cell.busy.borrow_mut() = Some(agent.clone());
        agent.mark_showing(true);
        gig.take_stage();
        agent.mark_showing(false);
        *self.cell.active.borrow_mut() = None;
        *self.cell.busy.borrow_mut() = None;
    }

    /// Run a single inert gig as an immediate interrupt (spec §4.8). Caller
    /// (`surprise`) has already checked the gig/agent preconditions.
    pub(crate) fn run_surprise(&self, agent: &Agent, gig: &Gig) {
        {
            let mut state = self.cell.state.borrow_mut();
            assert!(state.handling.is_none(), "surprise requires the stage to be closed");
            state.handling = Some(Interrupt::Immediate);
        }
        self.run_gig_on_stage(agent, gig);
        self.cell.state.borrow_mut().handling = None;
        self.arm_normal_if_due();
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
