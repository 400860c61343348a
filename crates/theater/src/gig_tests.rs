// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::scene::{Role, Scene, Selector, Step};
use crate::test_support;
use crate::value::value;
use std::cell::Cell;
use std::rc::Rc;
use theater_core::Blooper;

struct ReturnScene(Option<Value>);

impl Scene for ReturnScene {
    fn resume(&mut self, _signal: Signal<Value>) -> Step {
        match self.0.take() {
            Some(v) => Step::Return(v),
            None => unreachable!("ReturnScene resumed twice in a test"),
        }
    }
}

fn return_42(_role: &dyn Role, _params: Value) -> Box<dyn Scene> {
    Box::new(ReturnScene(Some(value(42i64))))
}

struct ThrowScene;

impl Scene for ThrowScene {
    fn resume(&mut self, _signal: Signal<Value>) -> Step {
        Step::Throw(Blooper::message("boom"))
    }
}

fn throw_boom(_role: &dyn Role, _params: Value) -> Box<dyn Scene> {
    Box::new(ThrowScene)
}

struct YieldThenReturnScene {
    yielded: bool,
}

impl Scene for YieldThenReturnScene {
    fn resume(&mut self, signal: Signal<Value>) -> Step {
        if !self.yielded {
            self.yielded = true;
            Step::Yield(future::Hint::Cue(future::combinators::spark(Signal::Prompt(value(())))))
        } else {
            match signal {
                Signal::Prompt(_) => Step::Return(value("after yield")),
                Signal::Blooper(e) => Step::Throw(e),
            }
        }
    }
}

fn yield_then_return(_role: &dyn Role, _params: Value) -> Box<dyn Scene> {
    Box::new(YieldThenReturnScene { yielded: false })
}

fn drain(stage: &crate::scheduler::Stage) {
    for _ in 0..64 {
        if !stage.drive() {
            break;
        }
    }
}

#[test]
fn a_gig_starts_inert_and_becomes_queued_on_run() {
    let stage = test_support::stage();
    let agent = test_support::root_agent(&stage);
    let gig = Gig::new(&agent, Selector::free(return_42), value(()));
    assert!(gig.is_inert());
    gig.run();
    assert!(!gig.is_inert());
}

#[test]
fn a_gig_finishes_exactly_once_and_clears_its_fields() {
    let stage = test_support::stage();
    let agent = test_support::root_agent(&stage);
    let gig = Gig::new(&agent, Selector::free(return_42), value(()));
    gig.run();
    drain(&stage);

    assert!(gig.is_finished());
    let fate = gig.fate().expect("fate should be sealed");
    match fate {
        Signal::Prompt(v) => assert_eq!(*v.downcast::<i64>().unwrap(), 42),
        Signal::Blooper(e) => panic!("unexpected blooper: {e}"),
    }
    // The agent reference is nulled to break the gig/agent cycle (spec §3).
    assert!(gig.agent().is_none());
}

#[test]
fn a_throwing_scene_finishes_the_gig_as_blooper() {
    let stage = test_support::stage();
    let agent = test_support::root_agent(&stage);
    let gig = Gig::new(&agent, Selector::free(throw_boom), value(()));
    gig.run();
    drain(&stage);

    match gig.fate().expect("fate should be sealed") {
        Signal::Blooper(e) => assert_eq!(e.to_string(), "boom"),
        Signal::Prompt(_) => panic!("expected a blooper"),
    }
}

#[test]
fn a_gig_that_yields_resumes_after_its_commitment_settles() {
    let stage = test_support::stage();
    let agent = test_support::root_agent(&stage);
    let gig = Gig::new(&agent, Selector::free(yield_then_return), value(()));
    gig.run();
    drain(&stage);

    match gig.fate().expect("fate should be sealed") {
        Signal::Prompt(v) => assert_eq!(*v.downcast::<&str>().unwrap(), "after yield"),
        Signal::Blooper(e) => panic!("unexpected blooper: {e}"),
    }
}

#[test]
fn awaiter_forces_an_inert_gig_to_run_and_reveals_its_fate() {
    let stage = test_support::stage();
    let agent = test_support::root_agent(&stage);
    let gig = Gig::new(&agent, Selector::free(return_42), value(()));
    assert!(gig.is_inert());

    let awaiter = gig.awaiter();
    awaiter.block(|_| {});
    assert!(!gig.is_inert());
    drain(&stage);
    assert!(awaiter.is_used());
}

#[test]
fn stop_on_an_inert_gig_is_a_no_op() {
    let stage = test_support::stage();
    let agent = test_support::root_agent(&stage);
    let gig = Gig::new(&agent, Selector::free(return_42), value(()));
    gig.stop(Blooper::message("cancelled"));
    assert!(gig.is_inert());
}

struct WaitForeverScene(Option<future::Cue<Value>>);

impl Scene for WaitForeverScene {
    fn resume(&mut self, _signal: Signal<Value>) -> Step {
        Step::Yield(future::Hint::Cue(self.0.take().expect("resumed twice")))
    }
}

#[test]
fn stopping_a_gig_with_a_live_commitment_cancels_its_rollback() {
    let stage = test_support::stage();
    let agent = test_support::root_agent(&stage);
    let cancelled = Rc::new(Cell::new(false));
    let cancelled_for_end = cancelled.clone();
    let factory = move |_role: &dyn Role, _params: Value| {
        let cancelled_for_end = cancelled_for_end.clone();
        let cue = future::Cue::leaf(|_cue| {}, move |revealing, _cue| {
            if !revealing {
                cancelled_for_end.set(true);
            }
        });
        Box::new(WaitForeverScene(Some(cue))) as Box<dyn Scene>
    };
    let gig = Gig::new(&agent, Selector::free(factory), value(()));
    gig.run();
    drain(&stage);

    assert!(gig.has_pending_commitment(), "gig should be waiting on its yielded cue");
    assert!(!cancelled.get());

    gig.stop(Blooper::message("cancelled"));
    assert!(cancelled.get(), "stopping a gig with a live commitment must cancel its rollback");
}
