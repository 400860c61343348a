// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the actor runtime (spec §7).
//!
//! Scene failure (category 1) and cancellation (category 4) aren't modelled
//! as [`StageError`] at all: the former becomes a `Blooper` routed through
//! supervision, the latter simply finishes a gig as cancelled. `StageError`
//! covers category 2 (commitment/selector-resolution failure, surfaced
//! through the gig's fate) and the recoverable corner of category 3
//! (misuse an embedder can trigger, e.g. calling a scene helper off-stage).
//! Protocol violations that are purely internal bugs stay as `assert!`/
//! `unreachable!` per the workspace's panic-over-unwrap convention.

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("no scene method or improvisation for selector {0:?}")]
    SelectorNotFound(String),
    #[error("role helper used off-stage: {0}")]
    OffStage(&'static str),
    #[error("agent reset: {0}")]
    Reset(&'static str),
    #[error("posted to a dead agent (ghost): {0}")]
    Ghost(&'static str),
}

impl StageError {
    pub fn selector_not_found(selector: impl Into<String>) -> Self {
        StageError::SelectorNotFound(selector.into())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
