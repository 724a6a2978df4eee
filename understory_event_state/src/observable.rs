// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A value cell that notifies subscribers when it changes.
//!
//! ```
//! use core::cell::Cell;
//! use std::rc::Rc;
//! use understory_event_state::observable::Observable;
//!
//! let seen = Rc::new(Cell::new(0));
//! let mut cell = Observable::new(1);
//! let sink = seen.clone();
//! cell.subscribe(move |v| sink.set(*v));
//!
//! assert!(cell.set(2));
//! assert_eq!(seen.get(), 2);
//! // Writing the same value is not a change.
//! assert!(!cell.set(2));
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// Handle returned by [`Observable::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Box<dyn FnMut(&T)>;

/// Observable value with change notification.
pub struct Observable<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    next_id: u64,
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T> {
    /// Create a cell holding `value` with no subscribers.
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Borrow the current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Register a callback run after every change, in subscription order.
    pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns `false` if `id` is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drop every subscriber.
    pub fn clear_subscribers(&mut self) {
        self.subscribers.clear();
    }

    fn notify(&mut self) {
        for (_, callback) in &mut self.subscribers {
            callback(&self.value);
        }
    }
}

impl<T: PartialEq> Observable<T> {
    /// Store `value`; subscribers run only if it differs from the current one.
    ///
    /// Returns whether the value changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.notify();
        true
    }

    /// Store `value` and return the previous one, notifying on change.
    pub fn replace(&mut self, value: T) -> T
    where
        T: Clone,
    {
        let old = self.value.clone();
        self.set(value);
        old
    }
}

impl<T: Copy> Observable<T> {
    /// Copy out the current value.
    pub fn value(&self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    #[test]
    fn subscribers_run_in_order_on_change() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut cell = Observable::new(0_u8);
        let a = log.clone();
        cell.subscribe(move |v| a.borrow_mut().push(("a", *v)));
        let b = log.clone();
        cell.subscribe(move |v| b.borrow_mut().push(("b", *v)));

        cell.set(5);
        assert_eq!(*log.borrow(), vec![("a", 5), ("b", 5)]);
    }

    #[test]
    fn unchanged_value_does_not_notify() {
        let count = Rc::new(RefCell::new(0));
        let mut cell = Observable::new("x");
        let c = count.clone();
        cell.subscribe(move |_| *c.borrow_mut() += 1);
        assert!(!cell.set("x"));
        assert_eq!(*count.borrow(), 0);
        assert_eq!(cell.replace("y"), "x");
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let count = Rc::new(RefCell::new(0));
        let mut cell = Observable::new(0_i32);
        let c = count.clone();
        let id = cell.subscribe(move |_| *c.borrow_mut() += 1);
        assert!(cell.unsubscribe(id));
        assert!(!cell.unsubscribe(id));
        cell.set(1);
        assert_eq!(*count.borrow(), 0);
        assert_eq!(cell.subscriber_count(), 0);
        assert_eq!(cell.value(), 1);
    }
}
