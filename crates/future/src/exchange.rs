// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Exchange`] — a bounded producer/consumer buffer (spec §3, §4.3).

use crate::cue::Cue;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use theater_core::Signal;

struct ProducerSlot<T> {
    item: Option<T>,
    cue: Cue<()>,
}

struct ConsumerSlot<T> {
    cue: Cue<T>,
}

struct Inner<T> {
    capacity: usize,
    items: VecDeque<T>,
    waiting_producers: VecDeque<ProducerSlot<T>>,
    waiting_consumers: VecDeque<ConsumerSlot<T>>,
}

/// A bounded FIFO rendezvous point. `produce`/`consume` each return a cue
/// that reveals once the transfer completes; a capacity-0 exchange is a pure
/// rendezvous (every producer must find a waiting consumer or vice versa).
pub struct Exchange<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Exchange<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Clone + 'static> Exchange<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                capacity,
                items: VecDeque::new(),
                waiting_producers: VecDeque::new(),
                waiting_consumers: VecDeque::new(),
            })),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// A producer is blocked waiting for room or a consumer.
    pub fn is_overflowing(&self) -> bool {
        !self.inner.borrow().waiting_producers.is_empty()
    }

    /// A consumer is blocked waiting for an item.
    pub fn is_underflowing(&self) -> bool {
        !self.inner.borrow().waiting_consumers.is_empty()
    }

    /// Offer `item`. Reveals `Prompt(())` once it has been handed to a
    /// waiting consumer or buffered; cancelling before then withdraws the
    /// offer.
    pub fn produce(&self, item: T) -> Cue<()> {
        let exchange = self.clone();
        let exchange_for_cancel = self.clone();
        Cue::leaf(
            move |cue| exchange.begin_produce(item, cue),
            move |revealing, cue| {
                if !revealing {
                    exchange_for_cancel.withdraw_producer(cue.token());
                }
            },
        )
    }

    /// Wait for an item. Reveals `Prompt(item)` once one is available;
    /// cancelling before then withdraws the request.
    pub fn consume(&self) -> Cue<T> {
        let exchange = self.clone();
        let exchange_for_cancel = self.clone();
        Cue::leaf(
            move |cue| exchange.begin_consume(cue),
            move |revealing, cue| {
                if !revealing {
                    exchange_for_cancel.withdraw_consumer(cue.token());
                }
            },
        )
    }

    fn begin_produce(&self, item: T, cue: Cue<()>) {
        let mut inner = self.inner.borrow_mut();
        if let Some(consumer) = inner.waiting_consumers.pop_front() {
            drop(inner);
            consumer.cue.reveal(Signal::Prompt(item));
            cue.reveal(Signal::Prompt(()));
            return;
        }
        if inner.items.len() < inner.capacity {
            inner.items.push_back(item);
            drop(inner);
            cue.reveal(Signal::Prompt(()));
            return;
        }
        inner.waiting_producers.push_back(ProducerSlot { item: Some(item), cue });
    }

    fn begin_consume(&self, cue: Cue<T>) {
        let mut inner = self.inner.borrow_mut();
        if let Some(mut producer) = inner.waiting_producers.pop_front() {
            let item = match producer.item.take() {
                Some(item) => item,
                None => unreachable!("a waiting producer always holds its item until woken"),
            };
            inner.items.push_back(item);
            let popped = match inner.items.pop_front() {
                Some(item) => item,
                None => unreachable!("an item was just pushed onto this queue"),
            };
            drop(inner);
            producer.cue.reveal(Signal::Prompt(()));
            cue.reveal(Signal::Prompt(popped));
            return;
        }
        if let Some(item) = inner.items.pop_front() {
            drop(inner);
            cue.reveal(Signal::Prompt(item));
            return;
        }
        inner.waiting_consumers.push_back(ConsumerSlot { cue });
    }

    fn withdraw_producer(&self, token: usize) {
        self.inner.borrow_mut().waiting_producers.retain(|p| p.cue.token() != token);
    }

    fn withdraw_consumer(&self, token: usize) {
        self.inner.borrow_mut().waiting_consumers.retain(|c| c.cue.token() != token);
    }
}

#[cfg(test)]
#[path = "exchange_tests.rs"]
mod tests;
