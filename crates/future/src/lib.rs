// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! future: the asynchronous primitive layer (spec §3, §4.2, §4.3) — cues,
//! teleprompters, hints, the commit protocol, the family/decorator
//! combinators, and the bounded `Exchange`.
//!
//! This is the substrate the `theater` crate's scene coroutines yield into:
//! a scene yields a [`Hint`], the gig [`commit`]s it, and the resulting
//! rollback (if any) becomes the gig's cancellable commitment.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod combinators;
pub mod commit;
pub mod cue;
pub mod destiny_bridge;
pub mod exchange;
pub mod hint;
pub mod teleprompter;

pub use combinators::{all, any, capture, once, once_with_end, often, often_with_end, race, settle, spark, timeout};
pub use commit::{commit, Rollback};
pub use cue::Cue;
pub use destiny_bridge::from_destiny;
pub use exchange::Exchange;
pub use hint::{ForeignPromise, Hint};
pub use teleprompter::Teleprompter;
