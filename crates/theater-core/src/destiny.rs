// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Destiny`] — anything whose completion is signalled at most once, with a
//! table of waiters pending that completion (spec §3, §4.1).
//!
//! This is the primitive substrate the `future` crate's `Teleprompter`/`Cue`
//! adapter is built on: `future::from_destiny` wires a `Destiny`'s waiter
//! table into a proper `Hint`. Kept dependency-free of `future` here so the
//! two crates don't form a cycle.

use crate::signal::Signal;
use std::cell::RefCell;
use std::rc::Rc;

type Waiter<T> = Box<dyn FnOnce(Signal<T>)>;

struct Inner<T> {
    fate: Option<Signal<T>>,
    pending: Vec<(u64, Waiter<T>)>,
    next_token: u64,
}

/// A token identifying a registered waiter, for later cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaiterToken(u64);

/// A completion that fires at most once, fanning out to every registered
/// waiter. Not `Send`/`Sync`: the theater/future engines are single-threaded
/// cooperative (spec §5), so this is a plain `Rc<RefCell<_>>` rather than an
/// `Arc<Mutex<_>>` — there is never a second thread to synchronize with.
pub struct Destiny<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Destiny<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Clone> Destiny<T> {
    pub fn new() -> Self {
        Self { inner: Rc::new(RefCell::new(Inner { fate: None, pending: Vec::new(), next_token: 0 })) }
    }

    pub fn is_finished(&self) -> bool {
        self.inner.borrow().fate.is_some()
    }

    pub fn fate(&self) -> Option<Signal<T>> {
        self.inner.borrow().fate.clone()
    }

    /// Seal the fate and reveal every pending waiter, in insertion order.
    /// Finishing an already-finished destiny is a fatal programming error.
    pub fn finish(&self, signal: Signal<T>) {
        let pending = {
            let mut inner = self.inner.borrow_mut();
            assert!(inner.fate.is_none(), "Destiny finished twice");
            inner.fate = Some(signal.clone());
            std::mem::take(&mut inner.pending)
        };
        for (_, waiter) in pending {
            waiter(signal.clone());
        }
    }

    /// Register a waiter. If the fate is already sealed, it is invoked
    /// synchronously. Otherwise it is queued and a token is returned so it
    /// can be withdrawn via [`Self::cancel_waiter`] before the fate seals.
    pub fn begin(&self, waiter: impl FnOnce(Signal<T>) + 'static) -> Option<WaiterToken> {
        let fate = {
            let mut inner = self.inner.borrow_mut();
            match inner.fate.clone() {
                Some(fate) => Some(fate),
                None => {
                    let token = inner.next_token;
                    inner.next_token += 1;
                    inner.pending.push((token, Box::new(waiter)));
                    return Some(WaiterToken(token));
                }
            }
        };
        if let Some(fate) = fate {
            waiter(fate);
        }
        None
    }

    /// Withdraw a previously registered waiter (cancellation). No-op if the
    /// fate already sealed and the waiter already ran.
    pub fn cancel_waiter(&self, token: WaiterToken) {
        let mut inner = self.inner.borrow_mut();
        inner.pending.retain(|(t, _)| *t != token.0);
    }
}

impl<T: Clone> Default for Destiny<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "destiny_tests.rs"]
mod tests;
