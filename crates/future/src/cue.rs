// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Cue`] — the one-shot asynchronous event (spec §3, §4.2).
//!
//! A cue is also the engine's event-tree node: leaves carry user `begin`/`end`
//! closures, decorators and families are built out of leaves plus combinator
//! logic in [`crate::combinators`] and [`crate::commit`]. All of them share
//! this same state machine.

use std::cell::RefCell;
use std::rc::Rc;
use theater_core::Signal;

type BeginFn<T> = Box<dyn FnOnce(Cue<T>)>;
type EndFn<T> = Box<dyn FnOnce(bool, Cue<T>)>;
type RevealFn<T> = Box<dyn FnOnce(Signal<T>)>;

enum State<T> {
    Unused { begin: BeginFn<T>, end: Option<EndFn<T>> },
    Pending { end: Option<EndFn<T>>, on_reveal: Option<RevealFn<T>> },
    UsedRevealed(Signal<T>),
    UsedCancelled,
}

struct Inner<T> {
    state: State<T>,
}

/// A one-shot future: `Unused --block--> Pending --reveal--> Used(revealed)`,
/// or `Pending --unblock--> Used(cancelled)`.
///
/// Cloning shares the same underlying state (it's the handle the `begin`/`end`
/// closures and the parent's `on_reveal` callback all see).
pub struct Cue<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Cue<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Clone + 'static> Cue<T> {
    /// Build a leaf cue. `begin` runs exactly once on `Unused -> Pending`;
    /// `end` runs exactly once on `Pending -> Used`, told whether a signal
    /// propagated (`true`) or the cue was cancelled (`false`).
    pub fn leaf(
        begin: impl FnOnce(Cue<T>) + 'static,
        end: impl FnOnce(bool, Cue<T>) + 'static,
    ) -> Self {
        Self::leaf_impl(Box::new(begin), Some(Box::new(end)))
    }

    /// A leaf with no cleanup action.
    pub fn leaf_without_end(begin: impl FnOnce(Cue<T>) + 'static) -> Self {
        Self::leaf_impl(Box::new(begin), None)
    }

    fn leaf_impl(begin: BeginFn<T>, end: Option<EndFn<T>>) -> Self {
        Self { inner: Rc::new(RefCell::new(Inner { state: State::Unused { begin, end } })) }
    }

    /// A stable identity for this cue, usable as a map/removal key (e.g. by
    /// [`crate::exchange::Exchange`] to find a cancelled waiter). Two clones
    /// of the same cue share a token; distinct cues never do.
    pub fn token(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    pub fn is_unused(&self) -> bool {
        matches!(self.inner.borrow().state, State::Unused { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.inner.borrow().state, State::Pending { .. })
    }

    pub fn is_used(&self) -> bool {
        matches!(self.inner.borrow().state, State::UsedRevealed(_) | State::UsedCancelled)
    }

    /// The revealed signal, if this cue reached `Used(revealed)`.
    pub fn fate(&self) -> Option<Signal<T>> {
        match &self.inner.borrow().state {
            State::UsedRevealed(signal) => Some(signal.clone()),
            _ => None,
        }
    }

    /// `Unused -> Pending`. Registers `on_reveal`, the callback invoked when
    /// this cue reveals (the parent's propagation point), then runs `begin`.
    ///
    /// `begin` runs after the internal borrow is released so it may
    /// synchronously call [`Self::reveal`] on the same cue (reentrant
    /// revelation during `block`, spec §4.2) without a double-borrow panic.
    ///
    /// Blocking a cue that is not `Unused` is a fatal invariant violation.
    pub fn block(&self, on_reveal: impl FnOnce(Signal<T>) + 'static) {
        let begin = {
            let mut inner = self.inner.borrow_mut();
            let state = std::mem::replace(&mut inner.state, State::UsedCancelled);
            let (begin, end) = match state {
                State::Unused { begin, end } => (begin, end),
                other => {
                    inner.state = other;
                    unreachable!("Cue::block called on a cue that is not Unused");
                }
            };
            inner.state = State::Pending { end, on_reveal: Some(Box::new(on_reveal)) };
            begin
        };
        begin(self.clone());
    }

    /// `Pending -> Used(revealed)`. Runs `end(true, _)` then the parent's
    /// `on_reveal`, in that order. Revealing a cue that is not `Pending` is a
    /// fatal invariant violation.
    pub fn reveal(&self, signal: Signal<T>) {
        let (end, on_reveal) = {
            let mut inner = self.inner.borrow_mut();
            let state = std::mem::replace(&mut inner.state, State::UsedCancelled);
            match state {
                State::Pending { end, on_reveal } => {
                    inner.state = State::UsedRevealed(signal.clone());
                    (end, on_reveal)
                }
                other => {
                    inner.state = other;
                    unreachable!("Cue::reveal called on a cue that is not Pending");
                }
            }
        };
        if let Some(end) = end {
            end(true, self.clone());
        }
        if let Some(on_reveal) = on_reveal {
            on_reveal(signal);
        }
    }

    /// `Pending -> Used(cancelled)`. Runs `end(false, _)`; the parent is not
    /// notified (cancellation is driven top-down by the parent itself, not
    /// propagated back up). A no-op on a cue that never left `Unused` or that
    /// is already `Used`.
    pub fn unblock(&self) {
        let end = {
            let mut inner = self.inner.borrow_mut();
            let state = std::mem::replace(&mut inner.state, State::UsedCancelled);
            match state {
                State::Pending { end, .. } => end,
                other @ (State::Unused { .. } | State::UsedRevealed(_) | State::UsedCancelled) => {
                    inner.state = other;
                    None
                }
            }
        };
        if let Some(end) = end {
            end(false, self.clone());
        }
    }
}

#[cfg(test)]
#[path = "cue_tests.rs"]
mod tests;
