// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone)]
struct Member(Rc<(u32, Cell<Option<&'static str>>)>);

impl Member {
    fn new(id: u32) -> Self {
        Self(Rc::new((id, Cell::new(None))))
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Tagged for Member {
    fn status_tag(&self) -> &Cell<Option<&'static str>> {
        &self.0.1
    }
}

#[test]
fn add_links_and_stamps_tag() {
    let workload = ExclusiveStatus::new("workload");
    let m = Member::new(1);
    workload.add(m.clone());
    assert_eq!(workload.len(), 1);
    assert_eq!(m.status_tag().get(), Some("workload"));
}

#[test]
fn transfer_unlinks_from_previous_status() {
    let workload = ExclusiveStatus::new("workload");
    let agenda = ExclusiveStatus::new("agenda");
    let m = Member::new(1);
    workload.add(m.clone());

    agenda.transfer(&workload, m.clone());

    assert!(workload.is_empty());
    assert_eq!(agenda.len(), 1);
    assert_eq!(m.status_tag().get(), Some("agenda"));
}

#[test]
fn iteration_is_fifo() {
    let status = ExclusiveStatus::new("ready");
    let members: Vec<_> = (0..3).map(Member::new).collect();
    for m in &members {
        status.add(m.clone());
    }
    let seen: Vec<u32> = status.iter().map(|m| m.0 .0).collect();
    assert_eq!(seen, vec![0, 1, 2]);
}

#[test]
#[should_panic(expected = "modified during iteration")]
fn mutation_during_iteration_is_fatal() {
    let status = ExclusiveStatus::new("ready");
    status.add(Member::new(1));
    let mut iter = status.iter();
    iter.next();
    status.add(Member::new(2));
    iter.next();
}

#[test]
fn delete_of_absent_member_is_noop() {
    let status = ExclusiveStatus::new("ready");
    let m = Member::new(1);
    assert!(!status.delete(&m));
}

#[test]
fn clear_unstamps_every_member() {
    let status = ExclusiveStatus::new("ready");
    let members: Vec<_> = (0..3).map(Member::new).collect();
    for m in &members {
        status.add(m.clone());
    }
    status.clear();
    assert!(status.is_empty());
    for m in &members {
        assert_eq!(m.status_tag().get(), None);
    }
}
