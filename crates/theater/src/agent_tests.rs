// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::gig::Gig;
use crate::scene::{Role, Scene, Selector, Step};
use crate::supervision::{forgiving, punishing, Verdict};
use crate::test_support::{self, NullRole};
use crate::value::value;
use theater_core::Blooper;

struct ThrowScene;

impl Scene for ThrowScene {
    fn resume(&mut self, _signal: Signal<Value>) -> Step {
        Step::Throw(Blooper::message("child misbehaved"))
    }
}

fn throw_selector() -> Selector {
    Selector::free(|_role, _params| Box::new(ThrowScene) as Box<dyn Scene>)
}

fn drain(stage: &crate::scheduler::Stage) {
    for _ in 0..64 {
        if !stage.drive() {
            break;
        }
    }
}

#[test]
fn posting_a_gig_makes_the_agent_ready() {
    let stage = test_support::stage();
    let agent = test_support::root_agent(&stage);
    assert_eq!(agent.status_tag_name(), Some("idle"));

    let gig = Gig::new(&agent, Selector::named("nothing"), value(()));
    gig.run();
    assert_eq!(agent.status_tag_name(), Some("ready"));
}

#[test]
fn suspend_propagates_to_team_members() {
    let stage = test_support::stage();
    let manager = test_support::root_agent(&stage);
    let child = manager.cast(Casting::new(|| Box::new(NullRole) as Box<dyn Role>, forgiving()));

    manager.suspend();

    assert!(manager.is_suspended());
    assert!(child.is_suspended());
    assert_eq!(manager.status_tag_name(), Some("suspended"));
    assert_eq!(child.status_tag_name(), Some("suspended"));
}

/// Boundary scenario D (spec §8): a punished child is suspended and buried,
/// its gig's fate is a blooper, `mourn` fires, and a further post is
/// stopped with a ghost blooper.
#[test]
fn punish_verdict_buries_the_offender_and_ghosts_further_posts() {
    let stage = test_support::stage();
    let manager = test_support::root_agent(&stage);
    let child = manager.cast(Casting::new(|| Box::new(NullRole) as Box<dyn Role>, punishing()));

    let gig = Gig::new(&child, throw_selector(), value(()));
    gig.run();
    drain(&stage);

    match gig.fate().expect("fate should be sealed") {
        Signal::Blooper(e) => assert_eq!(e.to_string(), "child misbehaved"),
        Signal::Prompt(_) => panic!("expected a blooper"),
    }
    assert!(child.is_dead());

    let mourn = future::from_destiny(child.dead()).autocue();
    mourn.block(|_| {});
    assert!(mourn.is_used());

    let ghost = Gig::new(&child, Selector::named("whatever"), value(()));
    ghost.run();
    match ghost.fate().expect("a dead agent ghosts every posted gig immediately") {
        Signal::Blooper(e) => assert!(e.to_string().contains("ghost")),
        Signal::Prompt(_) => panic!("expected a ghost blooper"),
    }
}

/// Boundary scenario C (spec §8): a forgiven child keeps running, the
/// parent receives no escalation, and `kill` still works afterwards.
#[test]
fn forgive_verdict_leaves_the_child_alive() {
    let stage = test_support::stage();
    let manager = test_support::root_agent(&stage);
    let child = manager.cast(Casting::new(|| Box::new(NullRole) as Box<dyn Role>, forgiving()));

    let gig = Gig::new(&child, throw_selector(), value(()));
    gig.run();
    drain(&stage);

    assert!(matches!(gig.fate(), Some(Signal::Blooper(_))));
    assert!(!child.is_dead());

    let killed = child.kill();
    killed.block(|_| {});
    drain(&stage);
    assert!(matches!(killed.fate(), Some(Signal::Prompt(true))));
}

#[test]
fn judge_punishes_an_unrecognised_offender_by_default() {
    let stage = test_support::stage();
    let manager = test_support::root_agent(&stage);
    let stranger = test_support::root_agent(&stage);
    let incident = Incident { offender: stranger, blooper: Blooper::message("x"), selector: Selector::named("x"), params: value(()) };
    assert!(matches!(manager.judge(&incident), Verdict::Punish));
}
