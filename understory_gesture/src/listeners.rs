// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node gesture listeners.
//!
//! Listeners are stored per target so removing a node's listeners touches only
//! that node's list. Within a node, listeners run in registration order.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::event::GestureEvent;
use crate::handler::{Handler, Requests};
use crate::types::GestureType;

/// Handle returned by [`ListenerTable::add`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Early stop after a listener runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stop {
    /// Finish the current node, then skip ancestors.
    Propagation,
    /// Skip the remaining listeners on this node and all ancestors.
    Immediate,
}

/// Per-listener propagation behavior.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Keep resolving ancestors even when this listener consumes the gesture.
    pub propagate: bool,
    /// Stop unconditionally after this listener runs.
    pub stop: Option<Stop>,
}

pub(crate) struct Entry<K> {
    pub(crate) id: ListenerId,
    pub(crate) gesture: GestureType,
    pub(crate) tool_name: Option<String>,
    pub(crate) options: ListenerOptions,
    pub(crate) callback: Handler<K>,
}

impl<K> Entry<K> {
    /// Whether this entry runs for `gesture` under the active `tool`.
    pub(crate) fn matches(&self, gesture: GestureType, tool: Option<&str>) -> bool {
        self.gesture == gesture
            && self
                .tool_name
                .as_deref()
                .is_none_or(|required| Some(required) == tool)
    }
}

/// Listener storage keyed by target node.
pub struct ListenerTable<K> {
    by_target: HashMap<K, Vec<Entry<K>>>,
    owners: HashMap<ListenerId, K>,
    next_id: u64,
}

impl<K> fmt::Debug for ListenerTable<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerTable")
            .field("targets", &self.by_target.len())
            .field("listeners", &self.owners.len())
            .finish_non_exhaustive()
    }
}

impl<K> Default for ListenerTable<K> {
    fn default() -> Self {
        Self {
            by_target: HashMap::new(),
            owners: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<K: Copy + Eq + Hash> ListenerTable<K> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `gesture` on `target`.
    ///
    /// With `tool_name` set the listener runs only while that tool is the
    /// event's active tool.
    pub fn add(
        &mut self,
        target: K,
        gesture: GestureType,
        tool_name: Option<String>,
        options: ListenerOptions,
        callback: impl FnMut(&GestureEvent<K>, K, &mut Requests<K>) -> bool + 'static,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.by_target.entry(target).or_default().push(Entry {
            id,
            gesture,
            tool_name,
            options,
            callback: Box::new(callback),
        });
        self.owners.insert(id, target);
        id
    }

    /// Remove one listener. Returns `false` if `id` is unknown.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let Some(target) = self.owners.remove(&id) else {
            return false;
        };
        if let Some(list) = self.by_target.get_mut(&target) {
            list.retain(|e| e.id != id);
            if list.is_empty() {
                self.by_target.remove(&target);
            }
        }
        true
    }

    /// Remove every listener on `target`. Returns how many were removed.
    pub fn remove_target(&mut self, target: K) -> usize {
        let Some(list) = self.by_target.remove(&target) else {
            return 0;
        };
        for e in &list {
            self.owners.remove(&e.id);
        }
        list.len()
    }

    /// Whether `target` has a listener for `gesture` under `tool`.
    pub fn has_listener(&self, target: K, gesture: GestureType, tool: Option<&str>) -> bool {
        self.by_target
            .get(&target)
            .is_some_and(|list| list.iter().any(|e| e.matches(gesture, tool)))
    }

    /// Total number of listeners.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Drop every listener.
    pub fn clear(&mut self) {
        self.by_target.clear();
        self.owners.clear();
    }

    pub(crate) fn entries_mut(&mut self, target: K) -> Option<&mut Vec<Entry<K>>> {
        self.by_target.get_mut(&target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &GestureEvent<u32>, _: u32, _: &mut Requests<u32>) -> bool {
        false
    }

    #[test]
    fn add_and_remove() {
        let mut table = ListenerTable::new();
        let a = table.add(1, GestureType::Click, None, ListenerOptions::default(), noop);
        let b = table.add(1, GestureType::Drag, None, ListenerOptions::default(), noop);
        table.add(2, GestureType::Click, None, ListenerOptions::default(), noop);
        assert_eq!(table.len(), 3);
        assert!(table.remove(a));
        assert!(!table.remove(a));
        assert!(!table.has_listener(1, GestureType::Click, None));
        assert!(table.has_listener(1, GestureType::Drag, None));
        assert!(table.remove(b));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn remove_target_is_local() {
        let mut table = ListenerTable::new();
        table.add(1, GestureType::Click, None, ListenerOptions::default(), noop);
        table.add(1, GestureType::Move, None, ListenerOptions::default(), noop);
        let kept = table.add(2, GestureType::Click, None, ListenerOptions::default(), noop);
        assert_eq!(table.remove_target(1), 2);
        assert_eq!(table.remove_target(1), 0);
        assert_eq!(table.len(), 1);
        assert!(table.remove(kept));
        assert!(table.is_empty());
    }

    #[test]
    fn tool_filter() {
        let mut table = ListenerTable::new();
        table.add(
            1,
            GestureType::Click,
            Some("pen".into()),
            ListenerOptions::default(),
            noop,
        );
        assert!(table.has_listener(1, GestureType::Click, Some("pen")));
        assert!(!table.has_listener(1, GestureType::Click, Some("eraser")));
        assert!(!table.has_listener(1, GestureType::Click, None));
    }
}
