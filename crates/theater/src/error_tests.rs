// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn selector_not_found_carries_the_selector_name() {
    let err = StageError::selector_not_found("danceScene");
    assert_eq!(err.to_string(), "no scene method or improvisation for selector \"danceScene\"");
}

#[test]
fn variants_render_distinct_messages() {
    assert!(StageError::OffStage("castChild").to_string().contains("castChild"));
    assert!(StageError::Reset("agent reset").to_string().contains("agent reset"));
    assert!(StageError::Ghost("dead").to_string().contains("ghost"));
}
