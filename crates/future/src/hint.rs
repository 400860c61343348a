// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Hint`] — anything that can become a one-shot asynchronous event: a
//! cue, a teleprompter, or a foreign promise (spec §3, GLOSSARY).

use crate::cue::Cue;
use crate::teleprompter::Teleprompter;
use theater_core::Signal;

/// A completion owned by something outside the cue engine — a channel from
/// an embedding host's own async runtime, for instance. Bridged in as a leaf
/// cue (spec §9 "Thenable jobs / foreign promises").
pub trait ForeignPromise<T> {
    /// Register interest in the eventual signal. Called at most once.
    fn then(self: Box<Self>, on_settle: Box<dyn FnOnce(Signal<T>)>);
}

/// Anything that can be materialised into a cue when someone commits to
/// wait on it.
pub enum Hint<T> {
    Cue(Cue<T>),
    Teleprompter(Teleprompter<T>),
    Foreign(Box<dyn ForeignPromise<T>>),
}

impl<T: Clone + 'static> Hint<T> {
    /// Turn this hint into a fresh `Unused` cue.
    pub fn materialize(self) -> Cue<T> {
        match self {
            Hint::Cue(cue) => cue,
            Hint::Teleprompter(tp) => tp.autocue(),
            Hint::Foreign(promise) => Cue::leaf_without_end(move |cue| {
                promise.then(Box::new(move |signal| {
                    // A foreign promise has no cancellation channel back into
                    // its source; if this cue was already cancelled while the
                    // promise was in flight, drop the late signal instead of
                    // revealing a Used cue.
                    if cue.is_pending() {
                        cue.reveal(signal);
                    }
                }));
            }),
        }
    }
}

impl<T> From<Cue<T>> for Hint<T> {
    fn from(cue: Cue<T>) -> Self {
        Hint::Cue(cue)
    }
}

impl<T> From<Teleprompter<T>> for Hint<T> {
    fn from(tp: Teleprompter<T>) -> Self {
        Hint::Teleprompter(tp)
    }
}

#[cfg(test)]
#[path = "hint_tests.rs"]
mod tests;
