// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `future.*` combinator surface (spec §6): `once`/`often`, `spark`,
//! `timeout`, `capture`, and the `all`/`any`/`race`/`settle` families.
//!
//! Each family combinator builds an ordinary [`Cue`] whose `begin` blocks
//! every child against the combinator's own bookkeeping and whose `end`
//! cancels whichever children are still `Pending` — there is no separate
//! tree-walking "flatten" step; recursion falls out of `Cue::block` calling
//! `begin`, which for a nested family recurses into its own children.

use crate::cue::Cue;
use crate::hint::Hint;
use crate::teleprompter::Teleprompter;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use theater_core::{Blooper, Clock, Signal, TimerHandle, TimerWheel};

/// A single-shot leaf with no cleanup.
pub fn once<T: Clone + 'static>(begin: impl FnOnce(Cue<T>) + 'static) -> Cue<T> {
    Cue::leaf_without_end(begin)
}

/// A single-shot leaf with cleanup run on `Pending -> Used`.
pub fn once_with_end<T: Clone + 'static>(
    begin: impl FnOnce(Cue<T>) + 'static,
    end: impl FnOnce(bool, Cue<T>) + 'static,
) -> Cue<T> {
    Cue::leaf(begin, end)
}

/// A restartable source of fresh leaves sharing the same begin/end logic.
pub fn often<T: Clone + 'static>(begin: impl Fn(Cue<T>) + 'static) -> Teleprompter<T> {
    let begin = Rc::new(begin);
    Teleprompter::new(move || {
        let begin = begin.clone();
        Cue::leaf_without_end(move |cue| begin(cue))
    })
}

/// `often` with cleanup.
pub fn often_with_end<T: Clone + 'static>(
    begin: impl Fn(Cue<T>) + 'static,
    end: impl Fn(bool, Cue<T>) + 'static,
) -> Teleprompter<T> {
    let begin = Rc::new(begin);
    let end = Rc::new(end);
    Teleprompter::new(move || {
        let begin = begin.clone();
        let end = end.clone();
        Cue::leaf(move |cue| begin(cue), move |revealing, cue| end(revealing, cue))
    })
}

/// An `Unused` leaf that reveals `signal` the instant it is blocked — the
/// synchronous degenerate hint.
pub fn spark<T: Clone + 'static>(signal: Signal<T>) -> Cue<T> {
    Cue::leaf_without_end(move |cue| cue.reveal(signal))
}

/// A leaf cue that reveals `Prompt(())` once `duration` has elapsed, driven
/// by `wheel` (see [`theater_core::TimerWheel`] for how time actually
/// advances in a single-threaded host).
pub fn timeout<C: Clock + 'static>(wheel: Rc<TimerWheel>, clock: C, duration: Duration) -> Cue<()> {
    let handle: Rc<Cell<Option<TimerHandle>>> = Rc::new(Cell::new(None));
    let handle_for_end = handle.clone();
    let wheel_for_end = wheel.clone();
    Cue::leaf(
        move |cue| {
            let deadline = clock.now() + duration;
            let armed = wheel.arm(deadline, move || cue.reveal(Signal::Prompt(())));
            handle.set(Some(armed));
        },
        move |revealing, _cue| {
            if !revealing {
                if let Some(armed) = handle_for_end.get() {
                    wheel_for_end.disarm(armed);
                }
            }
        },
    )
}

/// A decorator applying a synchronous `Signal -> Signal` trap to the child's
/// revelation.
pub fn capture<T: Clone + 'static, U: Clone + 'static>(
    hint: Hint<T>,
    trap: impl FnOnce(Signal<T>) -> Signal<U> + 'static,
) -> Cue<U> {
    let child_slot: Rc<RefCell<Option<Cue<T>>>> = Rc::new(RefCell::new(None));
    let child_slot_end = child_slot.clone();
    Cue::leaf(
        move |outer| {
            let child = hint.materialize();
            *child_slot.borrow_mut() = Some(child.clone());
            let outer_for_child = outer.clone();
            child.block(move |signal| outer_for_child.reveal(trap(signal)));
        },
        move |_revealing, _outer| {
            if let Some(child) = child_slot_end.borrow_mut().take() {
                if child.is_pending() {
                    child.unblock();
                }
            }
        },
    )
}

fn materialize_all<T: Clone + 'static>(hints: Vec<Hint<T>>) -> Vec<Cue<T>> {
    hints.into_iter().map(Hint::materialize).collect()
}

fn cancel_pending<T>(children: &[Cue<T>])
where
    T: Clone + 'static,
{
    for child in children {
        if child.is_pending() {
            child.unblock();
        }
    }
}

/// `All` — reveal a vector of every prompt, in child order; the first
/// blooper short-circuits and cancels the remaining still-pending children.
pub fn all<T: Clone + 'static>(hints: Vec<Hint<T>>) -> Cue<Vec<T>> {
    let n = hints.len();
    let children_slot: Rc<RefCell<Vec<Cue<T>>>> = Rc::new(RefCell::new(Vec::new()));
    let children_slot_end = children_slot.clone();
    Cue::leaf(
        move |outer| {
            if n == 0 {
                outer.reveal(Signal::Prompt(Vec::new()));
                return;
            }
            let children = materialize_all(hints);
            *children_slot.borrow_mut() = children.clone();
            let results: Rc<RefCell<Vec<Option<T>>>> = Rc::new(RefCell::new((0..n).map(|_| None).collect()));
            let remaining = Rc::new(Cell::new(n));
            let decided = Rc::new(Cell::new(false));
            for (index, child) in children.iter().cloned().enumerate() {
                let results = results.clone();
                let remaining = remaining.clone();
                let decided = decided.clone();
                let outer = outer.clone();
                let children_slot = children_slot.clone();
                child.block(move |signal| {
                    if decided.get() {
                        return;
                    }
                    match signal {
                        Signal::Prompt(value) => {
                            results.borrow_mut()[index] = Some(value);
                            remaining.set(remaining.get() - 1);
                            if remaining.get() == 0 {
                                decided.set(true);
                                let values = results
                                    .borrow_mut()
                                    .iter_mut()
                                    .map(|v| match v.take() {
                                        Some(value) => value,
                                        None => unreachable!("all results present once remaining hits zero"),
                                    })
                                    .collect();
                                outer.reveal(Signal::Prompt(values));
                            }
                        }
                        Signal::Blooper(err) => {
                            decided.set(true);
                            cancel_pending(&children_slot.borrow());
                            outer.reveal(Signal::Blooper(err));
                        }
                    }
                });
            }
            // A sibling may have decided synchronously before every child in
            // this loop got a chance to block; sweep up anything still
            // pending now that the whole cohort has been committed.
            if decided.get() {
                cancel_pending(&children_slot.borrow());
            }
        },
        move |_revealing, _outer| cancel_pending(&children_slot_end.borrow()),
    )
}

/// `Any` — reveal the first prompt; if every branch fails, reveal an
/// aggregate blooper.
pub fn any<T: Clone + 'static>(hints: Vec<Hint<T>>) -> Cue<T> {
    let n = hints.len();
    let children_slot: Rc<RefCell<Vec<Cue<T>>>> = Rc::new(RefCell::new(Vec::new()));
    let children_slot_end = children_slot.clone();
    Cue::leaf(
        move |outer| {
            if n == 0 {
                outer.reveal(Signal::blooper(Blooper::message("any() over no hints")));
                return;
            }
            let children = materialize_all(hints);
            *children_slot.borrow_mut() = children.clone();
            let errors: Rc<RefCell<Vec<Option<Blooper>>>> = Rc::new(RefCell::new((0..n).map(|_| None).collect()));
            let remaining = Rc::new(Cell::new(n));
            let decided = Rc::new(Cell::new(false));
            for (index, child) in children.iter().cloned().enumerate() {
                let errors = errors.clone();
                let remaining = remaining.clone();
                let decided = decided.clone();
                let outer = outer.clone();
                let children_slot = children_slot.clone();
                child.block(move |signal| {
                    if decided.get() {
                        return;
                    }
                    match signal {
                        Signal::Prompt(value) => {
                            decided.set(true);
                            cancel_pending(&children_slot.borrow());
                            outer.reveal(Signal::Prompt(value));
                        }
                        Signal::Blooper(err) => {
                            errors.borrow_mut()[index] = Some(err);
                            remaining.set(remaining.get() - 1);
                            if remaining.get() == 0 {
                                decided.set(true);
                                let all_errors = errors
                                    .borrow_mut()
                                    .iter_mut()
                                    .map(|e| match e.take() {
                                        Some(err) => err,
                                        None => unreachable!("all errors present once remaining hits zero"),
                                    })
                                    .collect();
                                outer.reveal(Signal::blooper(Blooper::aggregate(all_errors)));
                            }
                        }
                    }
                });
            }
            if decided.get() {
                cancel_pending(&children_slot.borrow());
            }
        },
        move |_revealing, _outer| cancel_pending(&children_slot_end.borrow()),
    )
}

/// `Race` — the first signal of any kind wins; the rest are cancelled.
pub fn race<T: Clone + 'static>(hints: Vec<Hint<T>>) -> Cue<T> {
    let n = hints.len();
    let children_slot: Rc<RefCell<Vec<Cue<T>>>> = Rc::new(RefCell::new(Vec::new()));
    let children_slot_end = children_slot.clone();
    Cue::leaf(
        move |outer| {
            if n == 0 {
                outer.reveal(Signal::blooper(Blooper::message("race() over no hints")));
                return;
            }
            let children = materialize_all(hints);
            *children_slot.borrow_mut() = children.clone();
            let decided = Rc::new(Cell::new(false));
            for child in children.iter() {
                let decided = decided.clone();
                let outer = outer.clone();
                let children_slot = children_slot.clone();
                child.block(move |signal| {
                    if decided.get() {
                        return;
                    }
                    decided.set(true);
                    cancel_pending(&children_slot.borrow());
                    outer.reveal(signal);
                });
            }
            if decided.get() {
                cancel_pending(&children_slot.borrow());
            }
        },
        move |_revealing, _outer| cancel_pending(&children_slot_end.borrow()),
    )
}

/// `Settle` — collect every branch's signal, prompts and bloopers alike, in
/// child order. Never short-circuits.
pub fn settle<T: Clone + 'static>(hints: Vec<Hint<T>>) -> Cue<Vec<Signal<T>>> {
    let n = hints.len();
    let children_slot: Rc<RefCell<Vec<Cue<T>>>> = Rc::new(RefCell::new(Vec::new()));
    let children_slot_end = children_slot.clone();
    Cue::leaf(
        move |outer| {
            if n == 0 {
                outer.reveal(Signal::Prompt(Vec::new()));
                return;
            }
            let children = materialize_all(hints);
            *children_slot.borrow_mut() = children.clone();
            let results: Rc<RefCell<Vec<Option<Signal<T>>>>> = Rc::new(RefCell::new((0..n).map(|_| None).collect()));
            let remaining = Rc::new(Cell::new(n));
            for (index, child) in children.into_iter().enumerate() {
                let results = results.clone();
                let remaining = remaining.clone();
                let outer = outer.clone();
                child.block(move |signal| {
                    results.borrow_mut()[index] = Some(signal);
                    remaining.set(remaining.get() - 1);
                    if remaining.get() == 0 {
                        let all_signals = results
                            .borrow_mut()
                            .iter_mut()
                            .map(|s| match s.take() {
                                Some(signal) => signal,
                                None => unreachable!("all signals present once remaining hits zero"),
                            })
                            .collect();
                        outer.reveal(Signal::Prompt(all_signals));
                    }
                });
            }
        },
        move |_revealing, _outer| cancel_pending(&children_slot_end.borrow()),
    )
}

#[cfg(test)]
#[path = "combinators_tests.rs"]
mod tests;
