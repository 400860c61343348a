// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::hint::Hint;
use std::cell::RefCell;
use theater_core::{Clock, SystemClock};

fn observe<T: Clone + 'static>(cue: Cue<T>) -> Rc<RefCell<Option<Signal<T>>>> {
    let seen = Rc::new(RefCell::new(None));
    let seen2 = seen.clone();
    cue.block(move |s| *seen2.borrow_mut() = Some(s));
    seen
}

#[test]
fn spark_reveals_on_block() {
    let seen = observe(spark(Signal::Prompt(5)));
    assert_eq!(seen.borrow().clone().unwrap().into_result().unwrap(), 5);
}

#[test]
fn capture_round_trips_with_spark_of_the_trapped_signal() {
    let captured = observe(capture(Hint::Cue(spark(Signal::Prompt(3))), |s| s.map(|v| v * 2)));
    let direct = observe(spark(Signal::Prompt(6)));
    assert_eq!(
        captured.borrow().clone().unwrap().into_result().unwrap(),
        direct.borrow().clone().unwrap().into_result().unwrap()
    );
}

#[test]
fn all_reveals_prompts_in_order_synchronously() {
    let hints = vec![
        Hint::Cue(spark(Signal::Prompt(1))),
        Hint::Cue(spark(Signal::Prompt(2))),
    ];
    let seen = observe(all(hints));
    assert_eq!(seen.borrow().clone().unwrap().into_result().unwrap(), vec![1, 2]);
}

#[test]
fn all_short_circuits_on_first_blooper() {
    let hints = vec![
        Hint::Cue(spark(Signal::<i32>::blooper(Blooper::message("e1")))),
        Hint::Cue(Cue::leaf_without_end(|_| {})), // never reveals on its own
    ];
    let seen = observe(all(hints));
    assert!(seen.borrow().as_ref().unwrap().is_blooper());
}

#[test]
fn any_reveals_an_aggregate_blooper_when_every_branch_fails() {
    let hints = vec![
        Hint::Cue(spark(Signal::<i32>::blooper(Blooper::message("e1")))),
        Hint::Cue(spark(Signal::<i32>::blooper(Blooper::message("e2")))),
    ];
    let seen = observe(any(hints));
    let message = format!("{}", seen.borrow().clone().unwrap().into_result().unwrap_err());
    assert!(message.contains("e1") && message.contains("e2"));
}

#[test]
fn any_reveals_the_first_prompt_and_cancels_the_rest() {
    let pending: Cue<i32> = Cue::leaf_without_end(|_| {});
    let pending_clone = pending.clone();
    let hints = vec![Hint::Cue(spark(Signal::Prompt(9))), Hint::Cue(pending_clone)];
    let seen = observe(any(hints));
    assert_eq!(seen.borrow().clone().unwrap().into_result().unwrap(), 9);
    assert!(pending.is_used());
}

#[test]
fn race_cancels_the_loser() {
    let loser: Cue<&'static str> = Cue::leaf_without_end(|_| {});
    let loser_clone = loser.clone();
    let hints = vec![Hint::Cue(spark(Signal::Prompt("x"))), Hint::Cue(loser_clone)];
    let seen = observe(race(hints));
    assert_eq!(seen.borrow().clone().unwrap().into_result().unwrap(), "x");
    assert!(loser.is_used());
}

#[test]
fn settle_collects_every_signal_without_short_circuiting() {
    let hints = vec![
        Hint::Cue(spark(Signal::Prompt(1))),
        Hint::Cue(spark(Signal::blooper(Blooper::message("boom")))),
    ];
    let seen = observe(settle(hints));
    let signals = seen.borrow().clone().unwrap().into_result().unwrap();
    assert!(signals[0].is_prompt());
    assert!(signals[1].is_blooper());
}

#[test]
fn timeout_reveals_once_the_wheel_reports_the_deadline_passed() {
    let wheel = Rc::new(TimerWheel::new());
    let clock = theater_core::FakeClock::new();
    let cue = timeout(wheel.clone(), clock.clone(), Duration::from_millis(10));
    let seen = observe(cue);
    assert!(seen.borrow().is_none());

    clock.advance(Duration::from_millis(10));
    wheel.fire_due(clock.now());
    assert!(seen.borrow().is_some());
}

#[test]
fn cancelling_a_timeout_disarms_it() {
    let wheel = Rc::new(TimerWheel::new());
    let clock = theater_core::FakeClock::new();
    let cue = timeout(wheel.clone(), clock.clone(), Duration::from_millis(10));
    cue.block(|_| {});
    cue.unblock();

    clock.advance(Duration::from_millis(10));
    wheel.fire_due(clock.now());
    assert!(wheel.is_empty());
}

#[test]
fn once_reveals_via_its_begin_closure() {
    let seen = observe(once(|cue| cue.reveal(Signal::Prompt(1))));
    assert_eq!(seen.borrow().clone().unwrap().into_result().unwrap(), 1);
}

#[test]
fn often_produces_independent_leaves_sharing_begin_logic() {
    let tp = often(|cue| cue.reveal(Signal::Prompt(1)));
    let a = observe(tp.autocue());
    let b = observe(tp.autocue());
    assert_eq!(a.borrow().clone().unwrap().into_result().unwrap(), 1);
    assert_eq!(b.borrow().clone().unwrap().into_result().unwrap(), 1);
}

#[test]
fn system_clock_is_a_usable_timeout_source() {
    let wheel = Rc::new(TimerWheel::new());
    let _cue = timeout(wheel, SystemClock, Duration::from_millis(1));
}
