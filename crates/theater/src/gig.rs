// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Gig`] — a unit of work driving one scene coroutine forward (spec §4.4).

use crate::agent::Agent;
use crate::scene::{Scene, Selector, Step};
use crate::supervision::{Incident, Poison, Verdict};
use crate::value::{unit, Value};
use future::Rollback;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use theater_core::{define_id, Blooper, Destiny, Signal, Tagged};

define_id! {
    pub struct GigId("gig-");
}

enum Phase {
    Inert,
    /// Linked into exactly one of the agent's workload/agenda/postponed
    /// exclusive statuses, or currently on the scheduler's `active` list;
    /// which one is recorded by [`Gig`]'s own [`Tagged`] tag, not here.
    Queued,
    TakingStage,
    Finished(Signal<Value>),
}

struct GigInner {
    agent: Option<Agent>,
    selector: Selector,
    params: Value,
    scene: Option<Box<dyn Scene>>,
    progress: Option<Signal<Value>>,
    rollback: Option<Rollback<Value>>,
    controller: Option<Destiny<Value>>,
    phase: Phase,
}

struct GigCell {
    id: GigId,
    tag: Cell<Option<&'static str>>,
    inner: RefCell<GigInner>,
}

/// A unit of work: drives a scene forward, commits to the hints it yields,
/// and carries its own completion.
pub struct Gig {
    cell: Rc<GigCell>,
}

impl Clone for Gig {
    fn clone(&self) -> Self {
        Self { cell: self.cell.clone() }
    }
}

impl PartialEq for Gig {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl Tagged for Gig {
    fn status_tag(&self) -> &Cell<Option<&'static str>> {
        &self.cell.tag
    }
}

impl Gig {
    pub fn new(agent: &Agent, selector: Selector, params: Value) -> Self {
        Self {
            cell: Rc::new(GigCell {
                id: GigId::new(),
                tag: Cell::new(None),
                inner: RefCell::new(GigInner {
                    agent: Some(agent.clone()),
                    selector,
                    params,
                    scene: None,
                    progress: None,
                    rollback: None,
                    controller: Some(Destiny::new()),
                    phase: Phase::Inert,
                }),
            }),
        }
    }

    pub fn id(&self) -> GigId {
        self.cell.id
    }

    pub fn agent(&self) -> Option<Agent> {
        self.cell.inner.borrow().agent.clone()
    }

    pub fn is_inert(&self) -> bool {
        matches!(self.cell.inner.borrow().phase, Phase::Inert)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.cell.inner.borrow().phase, Phase::Finished(_))
    }

    /// The sealed fate, once this gig reaches `Finished`.
    pub fn fate(&self) -> Option<Signal<Value>> {
        match &self.cell.inner.borrow().phase {
            Phase::Finished(signal) => Some(signal.clone()),
            _ => None,
        }
    }

    pub(crate) fn has_pending_commitment(&self) -> bool {
        self.cell.inner.borrow().rollback.is_some()
    }

    pub(crate) fn status_tag_name(&self) -> Option<&'static str> {
        self.cell.tag.get()
    }

    /// Start this gig, if it is still `Inert`: posts it onto its agent's
    /// workload. A no-op otherwise.
    pub fn run(&self) {
        let agent = {
            let mut inner = self.cell.inner.borrow_mut();
            if !matches!(inner.phase, Phase::Inert) {
                return;
            }
            inner.phase = Phase::Queued;
            inner.agent.clone()
        };
        if let Some(agent) = agent {
            agent.post(self.clone());
        }
    }

    /// A lazy completion cue: forces `run` on first use, then reveals the
    /// gig's eventual fate (spec §4.4 "external awaiters").
    pub fn awaiter(&self) -> future::Cue<Value> {
        self.run();
        let controller = self.cell.inner.borrow().controller.clone().unwrap_or_else(|| {
            unreachable!("a gig's controller is only cleared after its fate already sealed it")
        });
        future::from_destiny(controller).autocue()
    }

    /// Cancel a running/anticipated gig, finishing it `Blooper(reason)` and
    /// invoking the pending rollback. A no-op on an inert or finished gig.
    pub fn stop(&self, reason: Blooper) {
        {
            let inner = self.cell.inner.borrow();
            if matches!(inner.phase, Phase::Inert | Phase::Finished(_)) {
                return;
            }
        }
        self.finish(Signal::Blooper(reason));
    }

    /// Perform one step (spec §4.4's `takeStage` contract). Caller (the
    /// scheduler) is responsible for the active/busy bookkeeping around
    /// this call.
    pub(crate) fn take_stage(&self) {
        let progress = {
            let mut inner = self.cell.inner.borrow_mut();
            assert!(matches!(inner.phase, Phase::Queued), "Gig::take_stage called on a gig not ready for the stage");
            inner.phase = Phase::TakingStage;
            inner.progress.take().unwrap_or_else(|| Signal::Prompt(unit()))
        };

        let needs_scene = self.cell.inner.borrow().scene.is_none();
        if needs_scene {
            let (agent, selector, params) = {
                let inner = self.cell.inner.borrow();
                (inner.agent.clone(), inner.selector.clone(), inner.params.clone())
            };
            let Some(agent) = agent else {
                unreachable!("a gig taking the stage always still has its agent");
            };
            match agent.create_scene(&selector, params) {
                Ok(scene) => self.cell.inner.borrow_mut().scene = Some(scene),
                Err(err) => {
                    self.handle_failure(Blooper::new(err));
                    return;
                }
            }
        }

        let step = {
            let mut inner = self.cell.inner.borrow_mut();
            let scene = inner
                .scene
                .as_mut()
                .unwrap_or_else(|| unreachable!("scene is always created before the first resume"));
            scene.resume(progress)
        };

        match step {
            Step::Return(value) => self.finish(Signal::Prompt(value)),
            Step::Yield(hint) => self.commit_hint(hint),
            Step::Throw(err) => self.handle_failure(err),
        }
    }

    fn commit_hint(&self, hint: future::Hint<Value>) {
        let gig = self.clone();
        let rollback = future::commit(hint, move |signal| gig.resume_after_commit(signal));
        let mut inner = self.cell.inner.borrow_mut();
        inner.rollback = rollback;
        inner.phase = Phase::Queued;
        let agent = inner.agent.clone();
        drop(inner);
        if let Some(agent) = agent {
            agent.post(self.clone());
        }
    }

    fn resume_after_commit(&self, signal: Signal<Value>) {
        let mut inner = self.cell.inner.borrow_mut();
        if matches!(inner.phase, Phase::Finished(_)) {
            return;
        }
        inner.rollback = None;
        inner.progress = Some(signal);
        inner.phase = Phase::Queued;
        let agent = inner.agent.clone();
        drop(inner);
        if let Some(agent) = agent {
            agent.post(self.clone());
        }
    }

    fn handle_failure(&self, err: Blooper) {
        if err.is::<Poison>() {
            let agent = self.cell.inner.borrow().agent.clone();
            self.finish(Signal::Prompt(crate::value::value(true)));
            if let Some(agent) = agent {
                agent.suspend();
                if let Some(manager) = agent.manager() {
                    manager.bury(&agent);
                }
            }
            return;
        }

        let (agent, selector, params) = {
            let inner = self.cell.inner.borrow();
            (inner.agent.clone(), inner.selector.clone(), inner.params.clone())
        };
        let Some(agent) = agent else {
            unreachable!("a gig handling failure always still has its agent");
        };
        let Some(manager) = agent.manager() else {
            // No manager to consult (an immortal root actor): the failure
            // surfaces only through this gig's own fate.
            self.finish(Signal::Blooper(err));
            return;
        };
        let incident = Incident { offender: agent.clone(), blooper: err.clone(), selector, params };
        match manager.judge(&incident) {
            Verdict::Forgive => self.finish(Signal::Blooper(err)),
            Verdict::Punish => {
                self.finish(Signal::Blooper(err));
                agent.suspend();
                manager.bury(&agent);
            }
            Verdict::Escalate => {
                self.finish(Signal::Blooper(err));
                agent.suspend();
                manager.bury(&agent);
                manager.escalate(incident);
            }
            Verdict::Recast(casting) => {
                self.finish(Signal::Blooper(err));
                agent.suspend();
                manager.resume(&agent, casting);
            }
        }
    }

    fn finish(&self, signal: Signal<Value>) {
        let (controller, agent, rollback) = {
            let mut inner = self.cell.inner.borrow_mut();
            assert!(!matches!(inner.phase, Phase::Finished(_)), "Gig finished twice");
            let agent = inner.agent.take();
            inner.selector = Selector::Named("");
            inner.params = unit();
            inner.scene = None;
            inner.progress = None;
            let rollback = inner.rollback.take();
            let controller = inner.controller.take();
            inner.phase = Phase::Finished(signal.clone());
            (controller, agent, rollback)
        };
        // Cancel outside the borrow: `end(false, _)` can reenter this gig
        // (e.g. drop a waiting producer) while unwinding the cue tree.
        if let Some(rollback) = rollback {
            rollback.cancel();
        }
        if let Some(controller) = controller {
            controller.finish(signal);
        }
        if let Some(agent) = &agent {
            agent.on_gig_finished(self);
        }
    }
}

#[cfg(test)]
#[path = "gig_tests.rs"]
mod tests;
