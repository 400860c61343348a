// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! theater: a cooperative actor system whose actors run scene coroutines,
//! organised in a supervision tree with per-child verdicts, driven by a
//! budget-limited stage scheduler (spec §1, §2).
//!
//! Built on [`future`]'s cue engine: a scene yields a [`future::Hint`], the
//! owning [`Gig`] commits it, and the resulting rollback becomes the gig's
//! cancellable commitment.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod agent;
pub mod casting;
pub mod config;
pub mod error;
pub mod gig;
pub mod scene;
pub mod scheduler;
pub mod supervision;
pub mod surprise;
pub mod value;

pub use agent::{Agent, AgentId};
pub use casting::Casting;
pub use config::StageConfig;
pub use error::StageError;
pub use gig::{Gig, GigId};
pub use scene::{Role, Scene, Selector, SceneFactory, Step};
pub use scheduler::{Interrupt, Stage};
pub use supervision::{forgiving, punishing, Guard, Incident, Poison, Verdict};
pub use surprise::surprise;
pub use value::Value;

use std::any::Any;
use theater_core::{Blooper, Clock};

/// The role carrying ad hoc top-level `play`/`run` scenes — the equivalent
/// of the source's "janitor" actor (spec §4.4's helper-gig remark, §9's
/// immortal troupe). Exposes no marked scene methods: every top-level
/// scene is posted as a [`Selector::Free`] factory.
struct JanitorRole;

impl Role for JanitorRole {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The library's entry point: owns the [`Stage`] and the immortal janitor
/// actor that hosts ad hoc top-level scenes (spec §9's "collect them into a
/// single theater context").
pub struct Theater {
    stage: Stage,
    janitor: Agent,
}

impl Theater {
    pub fn new<C: Clock + 'static>(clock: C, config: StageConfig) -> Self {
        let stage = Stage::new(clock, config);
        let janitor = Agent::cast_root(&stage, Casting::new(|| Box::new(JanitorRole) as Box<dyn Role>, forgiving()));
        Self { stage, janitor }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// `theater.play(scenic, …params)`: build an inert gig on the janitor.
    pub fn play(&self, selector: Selector, params: Value) -> Gig {
        Gig::new(&self.janitor, selector, params)
    }

    /// `theater.run(scenic, …params)`: build and immediately start a gig.
    pub fn run(&self, selector: Selector, params: Value) -> Gig {
        let gig = self.play(selector, params);
        gig.run();
        gig
    }

    /// `theater.cast({...})`: a fresh root actor (no manager).
    pub fn cast(&self, casting: Casting) -> Agent {
        Agent::cast_root(&self.stage, casting)
    }

    /// `theater.surprise(inert_job)`: the synchronous single-gig bootstrap.
    pub fn surprise(&self, gig: &Gig) -> Result<Value, Blooper> {
        surprise::surprise(gig)
    }

    /// `theater.when(hint)`: materialise any hint into a waitable cue.
    pub fn when(&self, hint: future::Hint<Value>) -> future::Cue<Value> {
        hint.materialize()
    }

    /// `theater.mourn(actor)`: a cue that fires once `agent` is buried.
    pub fn mourn(&self, agent: &Agent) -> future::Cue<bool> {
        future::from_destiny(agent.dead()).autocue()
    }
}

/// Shared test scaffolding: a no-op role and a ready-made stage, used by
/// several modules' test files so each doesn't reinvent a stub actor.
#[cfg(test)]
pub(crate) mod test_support {
    use crate::agent::Agent;
    use crate::casting::Casting;
    use crate::config::StageConfig;
    use crate::scene::Role;
    use crate::scheduler::Stage;
    use crate::supervision::forgiving;
    use std::any::Any;
    use theater_core::FakeClock;

    pub struct NullRole;

    impl Role for NullRole {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    pub fn stage() -> Stage {
        Stage::new(FakeClock::new(), StageConfig::default())
    }

    pub fn root_agent(stage: &Stage) -> Agent {
        Agent::cast_root(stage, Casting::new(|| Box::new(NullRole) as Box<dyn Role>, forgiving()))
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
