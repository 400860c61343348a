// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridges a [`theater_core::Destiny`] into a [`Teleprompter`].
//!
//! Kept out of `theater-core` so that crate stays free of `future`'s cue
//! machinery (spec §4.1's remark that `Destiny` "exposes a teleprompter over
//! its completion" is implemented on this side of the dependency edge).

use crate::cue::Cue;
use crate::teleprompter::Teleprompter;
use std::cell::Cell;
use std::rc::Rc;
use theater_core::Destiny;

/// Wrap `destiny` so each `autocue()` call returns a cue that reveals when
/// the destiny's fate seals (synchronously, if it already has).
pub fn from_destiny<T: Clone + 'static>(destiny: Destiny<T>) -> Teleprompter<T> {
    Teleprompter::new(move || {
        let destiny = destiny.clone();
        let token = Rc::new(Cell::new(None));
        let token_for_end = token.clone();
        let destiny_for_end = destiny.clone();
        Cue::leaf(
            move |cue| {
                let registered = destiny.begin(move |signal| cue.reveal(signal));
                token.set(registered);
            },
            move |revealing, _cue| {
                if !revealing {
                    if let Some(registered) = token_for_end.get() {
                        destiny_for_end.cancel_waiter(registered);
                    }
                }
            },
        )
    })
}

#[cfg(test)]
#[path = "destiny_bridge_tests.rs"]
mod tests;
