// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::supervision::forgiving;
use crate::test_support::NullRole;
use crate::value::unit;

#[test]
fn with_init_records_the_initialisation_gig_recipe() {
    let casting = Casting::new(|| Box::new(NullRole) as Box<dyn Role>, forgiving());
    assert!(casting.init.is_none());

    let casting = casting.with_init(Selector::named("setup"), unit());
    let (selector, _params) = casting.init.expect("init should be set");
    assert!(matches!(selector, Selector::Named("setup")));
}
