// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error types.
//!
//! [`Blooper`] is the failure half of a [`crate::signal::Signal`]: a
//! cheaply-clonable, type-erased error. Cloning matters because a single
//! failure can be observed from more than one place at once — the gig that
//! raised it, the external awaiter of its completion, and (on escalation)
//! the manager's own supervision scope.

use std::fmt;
use std::sync::Arc;

/// A type-erased, cloneable failure value.
#[derive(Clone)]
pub struct Blooper(Arc<dyn std::error::Error + Send + Sync + 'static>);

impl Blooper {
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    pub fn message(msg: impl Into<String>) -> Self {
        Self::new(MessageError(msg.into()))
    }

    /// Combine several bloopers into one aggregate (used by the `any` family
    /// when every branch fails, spec §4.2).
    pub fn aggregate(bloopers: Vec<Blooper>) -> Self {
        Self::new(AggregateError(bloopers))
    }

    /// Whether the wrapped error is (or wraps, via `source`) an `E` — used to
    /// recognise sentinel errors such as the poison marker (spec §4.4).
    pub fn is<E: std::error::Error + 'static>(&self) -> bool {
        self.0.is::<E>()
    }

    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

impl fmt::Debug for Blooper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Blooper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Blooper {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.as_ref())
    }
}

#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MessageError {}

#[derive(Debug)]
struct AggregateError(Vec<Blooper>);

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} branches failed: ", self.0.len(), self.0.len())?;
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{b}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
