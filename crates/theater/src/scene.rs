// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenes, roles, and the `Play` marker (spec §4.7, design note 9).
//!
//! A scene is modelled as a hand-written state machine exposing `step`
//! (here `resume`) rather than a native coroutine: `Step::Yield(hint)` is a
//! suspension point, `Step::Return`/`Step::Throw` are terminal. A role's
//! marked scene methods are registered at construction time through the
//! [`play_scenes!`] macro rather than a language-level decorator (design
//! note 9b) — each entry is a plain `fn` pointer, so the marker is
//! structurally verifiable by table membership instead of runtime tagging.

use crate::error::StageError;
use crate::value::Value;
use future::Hint;
use std::any::Any;
use theater_core::{Blooper, Signal};

/// One resumption of a scene coroutine.
pub enum Step {
    Yield(Hint<Value>),
    Return(Value),
    Throw(Blooper),
}

/// A coroutine that yields hints and completes with a value or error.
pub trait Scene {
    fn resume(&mut self, signal: Signal<Value>) -> Step;
}

/// A marked scene method: built with the role as receiver and the gig's
/// parameters, producing a fresh scene.
pub type SceneFactory = fn(&dyn Role, Value) -> Box<dyn Scene>;

/// The transient object encapsulating an actor's current behaviour. Scene
/// methods are registered via [`play_scenes!`]; anything not in the table
/// falls through to [`Role::improvise`].
pub trait Role: Any {
    fn method_table(&self) -> &'static [(&'static str, SceneFactory)] {
        &[]
    }

    /// Resolve a selector that matched neither a callable nor a marked
    /// method. The default rejects every selector.
    fn improvise(&self, selector: &str, _params: Value) -> Result<Box<dyn Scene>, StageError> {
        Err(StageError::selector_not_found(selector))
    }

    /// Run during the agent's `#reset` protocol, before the role is
    /// dropped. The default does nothing.
    fn dispose(&self) {}

    fn as_any(&self) -> &dyn Any;
}

/// A free-standing scene factory bound to its closure, rather than a role
/// method table entry.
pub type FreeFactory = std::rc::Rc<dyn Fn(&dyn Role, Value) -> Box<dyn Scene>>;

/// How a gig resolves its scene: a free-standing factory (closure bound to
/// params at `play`/`run` time) or a name looked up on the acting role.
#[derive(Clone)]
pub enum Selector {
    Named(&'static str),
    Free(FreeFactory),
}

impl Selector {
    pub fn named(name: &'static str) -> Self {
        Selector::Named(name)
    }

    pub fn free(factory: impl Fn(&dyn Role, Value) -> Box<dyn Scene> + 'static) -> Self {
        Selector::Free(std::rc::Rc::new(factory))
    }
}

/// Register a role's marked scene methods into a static method table
/// (design note 9b's "registration macro" substitute for a class-build-time
/// decorator). `$factory` must accept `(&$role, Value) -> Box<dyn Scene>`.
#[macro_export]
macro_rules! play_scenes {
    ($role:ty { $($name:literal => $factory:expr),+ $(,)? }) => {
        impl $role {
            pub const SCENE_METHODS: &'static [(&'static str, $crate::scene::SceneFactory)] = &[
                $(($name, {
                    fn call(role: &dyn $crate::scene::Role, params: $crate::value::Value) -> Box<dyn $crate::scene::Scene> {
                        let role = match role.as_any().downcast_ref::<$role>() {
                            Some(role) => role,
                            None => unreachable!("play_scenes! table entry invoked against the wrong role type"),
                        };
                        $factory(role, params)
                    }
                    call
                })),+
            ];
        }
    };
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
