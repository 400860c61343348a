// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Agent`] — owns a role, a team, and the three gig queues (spec §3, §4.5).

use crate::casting::Casting;
use crate::error::StageError;
use crate::gig::Gig;
use crate::scene::{Role, Scene, Selector};
use crate::scheduler::Stage;
use crate::supervision::{Guard, Incident, Verdict};
use crate::value::Value;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use theater_core::{define_id, Blooper, Destiny, ExclusiveStatus, Signal, Tagged};

define_id! {
    pub struct AgentId("agt-");
}

struct TeamMember {
    agent: Agent,
    guard: Guard,
}

struct AgentInner {
    suspended: bool,
    initializing: Option<Gig>,
    manager: Option<Weak<AgentCell>>,
    team: Vec<TeamMember>,
    role: Box<dyn Role>,
    dead: Destiny<bool>,
}

struct AgentCell {
    id: AgentId,
    tag: Cell<Option<&'static str>>,
    stage: Stage,
    showing: Cell<bool>,
    workload: ExclusiveStatus<Gig>,
    agenda: ExclusiveStatus<Gig>,
    postponed: ExclusiveStatus<Gig>,
    inner: RefCell<AgentInner>,
}

/// An actor: an opaque handle over a role, its team, and its three gig
/// queues. Cheap to clone (an `Rc`).
#[derive(Clone)]
pub struct Agent {
    cell: Rc<AgentCell>,
}

impl PartialEq for Agent {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl Tagged for Agent {
    fn status_tag(&self) -> &Cell<Option<&'static str>> {
        &self.cell.tag
    }
}

impl Agent {
    /// Cast an immortal root actor with no manager (director, janitor,
    /// troupe — spec §4.8).
    pub fn cast_root(stage: &Stage, casting: Casting) -> Agent {
        Self::cast_with(stage, None, casting)
    }

    /// Cast a new team member of `self`.
    pub fn cast(&self, casting: Casting) -> Agent {
        Self::cast_with(&self.cell.stage, Some(self), casting)
    }

    fn cast_with(stage: &Stage, manager: Option<&Agent>, casting: Casting) -> Agent {
        let role = (casting.role_factory)();
        let agent = Agent {
            cell: Rc::new(AgentCell {
                id: AgentId::new(),
                tag: Cell::new(None),
                stage: stage.clone(),
                showing: Cell::new(false),
                workload: ExclusiveStatus::new("workload"),
                agenda: ExclusiveStatus::new("agenda"),
                postponed: ExclusiveStatus::new("postponed"),
                inner: RefCell::new(AgentInner {
                    suspended: false,
                    initializing: None,
                    manager: manager.map(|m| Rc::downgrade(&m.cell)),
                    team: Vec::new(),
                    role,
                    dead: Destiny::new(),
                }),
            }),
        };
        stage.register(&agent);
        if let Some(manager) = manager {
            manager.cell.inner.borrow_mut().team.push(TeamMember { agent: agent.clone(), guard: casting.guard.clone() });
        }
        if let Some((selector, params)) = casting.init {
            let gig = Gig::new(&agent, selector, params);
            agent.cell.inner.borrow_mut().initializing = Some(gig.clone());
            gig.run();
        }
        agent
    }

    pub fn id(&self) -> AgentId {
        self.cell.id
    }

    pub fn stage(&self) -> Stage {
        self.cell.stage.clone()
    }

    pub fn manager(&self) -> Option<Agent> {
        self.cell.inner.borrow().manager.as_ref().and_then(Weak::upgrade).map(|cell| Agent { cell })
    }

    pub fn is_dead(&self) -> bool {
        self.cell.inner.borrow().dead.is_finished()
    }

    pub fn is_suspended(&self) -> bool {
        self.cell.inner.borrow().suspended
    }

    /// A cue that reveals once this agent is buried (`theater.mourn`).
    pub fn dead(&self) -> Destiny<bool> {
        self.cell.inner.borrow().dead.clone()
    }

    pub(crate) fn status_tag_name(&self) -> Option<&'static str> {
        self.cell.tag.get()
    }

    pub(crate) fn workload(&self) -> &ExclusiveStatus<Gig> {
        &self.cell.workload
    }

    pub(crate) fn mark_showing(&self, showing: bool) {
        self.cell.showing.set(showing);
    }

    pub fn is_showing(&self) -> bool {
        self.cell.showing.get()
    }

    /// Post a gig to the right queue (postponed / agenda / workload) and
    /// renegotiate (spec §4.5).
    pub fn post(&self, gig: Gig) {
        if self.is_dead() {
            gig.stop(Blooper::new(StageError::Ghost("posted to a buried agent")));
            return;
        }
        let initializing = self.cell.inner.borrow().initializing.clone();
        let is_init_gig = initializing.as_ref() == Some(&gig);
        if initializing.is_some() && !is_init_gig {
            self.place(&self.cell.postponed, gig);
        } else if gig.has_pending_commitment() {
            self.place(&self.cell.agenda, gig);
        } else {
            self.place(&self.cell.workload, gig);
        }
        self.negotiate();
    }

    /// Move `gig` into `target`, unlinking it from whichever of this
    /// agent's own queues currently holds it (or just linking it fresh).
    fn place(&self, target: &ExclusiveStatus<Gig>, gig: Gig) {
        match gig.status_tag_name() {
            Some(name) if name == self.cell.workload.name() => target.transfer(&self.cell.workload, gig),
            Some(name) if name == self.cell.agenda.name() => target.transfer(&self.cell.agenda, gig),
            Some(name) if name == self.cell.postponed.name() => target.transfer(&self.cell.postponed, gig),
            _ => target.add(gig),
        }
    }

    pub(crate) fn front_workload_gig(&self) -> Option<Gig> {
        self.cell.workload.front()
    }

    fn negotiate(&self) {
        let suspended = self.cell.inner.borrow().suspended;
        let target = if suspended {
            self.cell.stage.suspended()
        } else if !self.cell.workload.is_empty() {
            self.cell.stage.ready()
        } else if !self.cell.agenda.is_empty() {
            self.cell.stage.waiting()
        } else {
            self.cell.stage.idle()
        };
        self.cell.stage.rehome(self, target);
        if !self.cell.stage.ready().is_empty() {
            self.cell.stage.maybe_arm_fast();
        }
    }

    /// Resolve a selector against this agent's current role (spec §4.5
    /// `createScene`).
    pub(crate) fn create_scene(&self, selector: &Selector, params: Value) -> Result<Box<dyn Scene>, StageError> {
        let inner = self.cell.inner.borrow();
        match selector {
            Selector::Free(factory) => Ok(factory(&*inner.role, params)),
            Selector::Named(name) => match inner.role.method_table().iter().find(|(n, _)| n == name) {
                Some((_, factory)) => Ok(factory(&*inner.role, params)),
                None => inner.role.improvise(name, params),
            },
        }
    }

    /// Called once a gig reaches `Finished`: clears the initialisation gate
    /// if this was it, then drains anything it had postponed.
    pub(crate) fn on_gig_finished(&self, gig: &Gig) {
        let was_init = {
            let mut inner = self.cell.inner.borrow_mut();
            if inner.initializing.as_ref() == Some(gig) {
                inner.initializing = None;
                true
            } else {
                false
            }
        };
        if was_init {
            for postponed in self.cell.postponed.iter().collect::<Vec<_>>() {
                self.cell.postponed.delete(&postponed);
                self.post(postponed);
            }
        }
        self.negotiate();
    }

    /// Set `suspended`, propagating to every team member, then renegotiate.
    pub fn suspend(&self) {
        self.cell.inner.borrow_mut().suspended = true;
        let team: Vec<Agent> = self.cell.inner.borrow().team.iter().map(|m| m.agent.clone()).collect();
        for child in team {
            child.suspend();
        }
        self.negotiate();
    }

    /// The `#reset` protocol (spec §4.5): stop every pending gig, bury
    /// every team member, dispose the current role.
    fn reset(&self) {
        for gig in self.cell.workload.iter().collect::<Vec<_>>() {
            gig.stop(Blooper::new(StageError::Reset("agent reset")));
        }
        for gig in self.cell.agenda.iter().collect::<Vec<_>>() {
            gig.stop(Blooper::new(StageError::Reset("agent reset")));
        }
        for gig in self.cell.postponed.iter().collect::<Vec<_>>() {
            gig.stop(Blooper::new(StageError::Reset("agent reset")));
        }
        let team: Vec<Agent> = self.cell.inner.borrow_mut().team.drain(..).map(|m| m.agent).collect();
        for child in &team {
            child.bury_self();
        }
        self.cell.inner.borrow().role.dispose();
    }

    /// A manager burying a specific, still-living child.
    pub(crate) fn bury(&self, child: &Agent) {
        self.cell.inner.borrow_mut().team.retain(|m| m.agent != *child);
        child.bury_self();
    }

    /// Run this agent's reset protocol and seal its death.
    pub(crate) fn bury_self(&self) {
        if self.is_dead() {
            return;
        }
        self.reset();
        self.cell.stage.retire(self);
        self.cell.inner.borrow().dead.finish(Signal::Prompt(true));
    }

    /// `theater.cast(...).kill()`: bury this agent, returning a cue that
    /// reveals once it is dead.
    pub fn kill(&self) -> future::Cue<bool> {
        self.bury_self();
        future::from_destiny(self.dead()).autocue()
    }

    /// Reinstall a fresh role from `casting` after killing every
    /// descendant (spec §4.4's `Recast` verdict).
    pub(crate) fn recast(&self, casting: Casting) {
        self.reset();
        let role = (casting.role_factory)();
        let mut inner = self.cell.inner.borrow_mut();
        inner.suspended = false;
        inner.role = role;
        drop(inner);
        if let Some((selector, params)) = casting.init {
            let gig = Gig::new(self, selector, params);
            self.cell.inner.borrow_mut().initializing = Some(gig.clone());
            gig.run();
        }
        self.negotiate();
    }

    /// A manager's decision about an incident raised by one of its team
    /// members.
    pub(crate) fn judge(&self, incident: &Incident) -> Verdict {
        let inner = self.cell.inner.borrow();
        match inner.team.iter().find(|m| m.agent == incident.offender) {
            Some(member) => (member.guard)(incident),
            None => Verdict::Punish,
        }
    }

    /// A manager resuming (recasting) one of its team members.
    pub(crate) fn resume(&self, child: &Agent, casting: Casting) {
        child.recast(casting);
    }

    /// Raise a fresh escalation in this agent's own supervision scope
    /// (spec §4.4's `Escalate` verdict: the manager of the original
    /// offender now treats the incident as its own failure).
    pub(crate) fn escalate(&self, incident: Incident) {
        let Some(manager) = self.manager() else {
            return;
        };
        let fresh = Incident { offender: self.clone(), blooper: incident.blooper, selector: incident.selector, params: incident.params };
        match manager.judge(&fresh) {
            Verdict::Forgive => {}
            Verdict::Punish => {
                self.suspend();
                manager.bury(self);
            }
            Verdict::Escalate => {
                self.suspend();
                manager.bury(self);
                manager.escalate(fresh);
            }
            Verdict::Recast(casting) => manager.resume(self, casting),
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
