// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`TimerWheel`] — a pending-deadline table, the timer analogue of
//! [`crate::destiny::Destiny`]'s pending-waiter table.
//!
//! Spec §5 models timeouts as leaf cues whose `begin` arms a timer and whose
//! `end` disarms it, and states the engine is single-threaded cooperative
//! with no blocking operations. A background-thread timer can't satisfy
//! that: its callback would have to reach back into the `Rc<RefCell<_>>`
//! cue graph from a different thread. Instead the host drives time forward
//! by calling [`TimerWheel::fire_due`] with the current time once per
//! interrupt (the stage scheduler does this), the same way a single-threaded
//! event loop's timer wheel is polled once per tick.

use std::cell::{Cell, RefCell};
use std::time::Instant;

type Callback = Box<dyn FnOnce()>;

struct Entry {
    id: u64,
    deadline: Instant,
    callback: Option<Callback>,
}

/// A handle identifying an armed timer, for [`TimerWheel::disarm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u64);

#[derive(Default)]
pub struct TimerWheel {
    entries: RefCell<Vec<Entry>>,
    next_id: Cell<u64>,
}

impl TimerWheel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer that fires `callback` the first time [`Self::fire_due`]
    /// observes `deadline` has passed.
    pub fn arm(&self, deadline: Instant, callback: impl FnOnce() + 'static) -> TimerHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push(Entry { id, deadline, callback: Some(Box::new(callback)) });
        TimerHandle(id)
    }

    /// Withdraw a previously armed timer. No-op if it already fired.
    pub fn disarm(&self, handle: TimerHandle) {
        self.entries.borrow_mut().retain(|e| e.id != handle.0);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Fire every armed timer whose deadline is `<= now`, in deadline order.
    pub fn fire_due(&self, now: Instant) {
        let due = {
            let mut entries = self.entries.borrow_mut();
            entries.sort_by_key(|e| e.deadline);
            let split = entries.partition_point(|e| e.deadline <= now);
            entries.drain(..split).collect::<Vec<_>>()
        };
        for mut entry in due {
            if let Some(callback) = entry.callback.take() {
                callback();
            }
        }
    }

    /// The earliest armed deadline, if any — used by the scheduler to decide
    /// whether a macrotask interrupt needs arming for an upcoming timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.borrow().iter().map(|e| e.deadline).min()
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
