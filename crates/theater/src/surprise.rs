// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `surprise` — the synchronous single-gig bootstrap (spec §4.8), used to
//! construct immortal root actors before the scheduler is pumping.

use crate::gig::Gig;
use crate::value::Value;
use theater_core::{Blooper, Signal};

/// Run `gig` (which must be inert, on an employable agent, with the stage
/// closed) to completion in a single step and return its result.
pub fn surprise(gig: &Gig) -> Result<Value, Blooper> {
    assert!(gig.is_inert(), "surprise requires an inert gig");
    let agent = gig.agent().unwrap_or_else(|| unreachable!("an inert gig always still has its agent"));
    assert!(!agent.is_dead() && !agent.is_suspended(), "surprise requires an employable agent");
    let stage = agent.stage();
    assert!(stage.is_closed(), "surprise requires the stage to be closed");

    gig.run();
    stage.run_surprise(&agent, gig);

    assert!(gig.is_finished(), "a surprise scene must complete in a single step");
    match gig.fate().unwrap_or_else(|| unreachable!("a finished gig always has a fate")) {
        Signal::Prompt(value) => Ok(value),
        Signal::Blooper(err) => Err(err),
    }
}

#[cfg(test)]
#[path = "surprise_tests.rs"]
mod tests;
