// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named, cancellable deadlines.
//!
//! The gesture engine never sleeps or spawns. A timer is just a deadline in
//! milliseconds stored under a [`TimerKey`]; the host calls into the engine
//! from its event loop with the current time and the engine drains the due
//! entries with [`Timers::take_due`]. Scheduling a key that is already pending
//! replaces it, and the returned [`TimerId`] changes, so a handler can tell a
//! stale firing from the live one.
//!
//! ```
//! use understory_event_state::timer::{TimerKey, Timers};
//!
//! let mut timers = Timers::new();
//! timers.schedule(TimerKey::LongPress, 500);
//! assert_eq!(timers.next_deadline(), Some(500));
//! assert!(timers.take_due(499).is_empty());
//! let due = timers.take_due(500);
//! assert_eq!(due[0].0, TimerKey::LongPress);
//! assert!(timers.is_empty());
//! ```

use alloc::collections::BTreeMap;
use smallvec::SmallVec;

/// Name of a timer slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKey {
    /// Long-press detection for the current interaction.
    LongPress,
    /// Expiry of the "recently saw a trackpad" hint.
    TrackpadHint,
    /// Collaborator-defined debounce slot.
    Named(&'static str),
}

/// Handle of one scheduled firing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A pending deadline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timer {
    /// Handle of this firing.
    pub id: TimerId,
    /// Time in milliseconds at or after which the timer is due.
    pub deadline: u64,
}

/// Set of pending timers keyed by name.
#[derive(Clone, Debug, Default)]
pub struct Timers {
    pending: BTreeMap<TimerKey, Timer>,
    next_id: u64,
}

impl Timers {
    /// Create an empty timer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `key` to fire at `deadline`, replacing any pending firing.
    pub fn schedule(&mut self, key: TimerKey, deadline: u64) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        if let Some(old) = self.pending.insert(key, Timer { id, deadline }) {
            log::trace!("{key:?} rescheduled {} -> {deadline}", old.deadline);
        }
        id
    }

    /// Cancel `key`. Returns `true` if it was pending.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        let cancelled = self.pending.remove(&key).is_some();
        if cancelled {
            log::trace!("{key:?} cancelled");
        }
        cancelled
    }

    /// Whether `key` is pending.
    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.pending.contains_key(&key)
    }

    /// The pending firing for `key`.
    pub fn get(&self, key: TimerKey) -> Option<Timer> {
        self.pending.get(&key).copied()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.values().map(|t| t.deadline).min()
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn take_due(&mut self, now: u64) -> SmallVec<[(TimerKey, TimerId); 2]> {
        let mut due: SmallVec<[(TimerKey, Timer); 2]> = self
            .pending
            .iter()
            .filter(|(_, t)| t.deadline <= now)
            .map(|(k, t)| (*k, *t))
            .collect();
        due.sort_by_key(|(_, t)| (t.deadline, t.id));
        for (key, _) in &due {
            self.pending.remove(key);
        }
        due.into_iter().map(|(k, t)| (k, t.id)).collect()
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reschedule_replaces_and_changes_id() {
        let mut timers = Timers::new();
        let first = timers.schedule(TimerKey::LongPress, 100);
        let second = timers.schedule(TimerKey::LongPress, 300);
        assert_ne!(first, second);
        assert_eq!(timers.len(), 1);
        assert!(timers.take_due(100).is_empty());
        assert_eq!(timers.take_due(300)[0], (TimerKey::LongPress, second));
    }

    #[test]
    fn cancel_reports_whether_pending() {
        let mut timers = Timers::new();
        assert!(!timers.cancel(TimerKey::TrackpadHint));
        timers.schedule(TimerKey::TrackpadHint, 10);
        assert!(timers.is_pending(TimerKey::TrackpadHint));
        assert!(timers.cancel(TimerKey::TrackpadHint));
        assert!(timers.is_empty());
    }

    #[test]
    fn due_timers_come_out_earliest_first() {
        let mut timers = Timers::new();
        timers.schedule(TimerKey::Named("debounce"), 50);
        timers.schedule(TimerKey::LongPress, 20);
        timers.schedule(TimerKey::TrackpadHint, 90);
        let due = timers.take_due(60);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].0, TimerKey::LongPress);
        assert_eq!(due[1].0, TimerKey::Named("debounce"));
        assert_eq!(timers.next_deadline(), Some(90));
    }

    #[test]
    fn clear_cancels_everything() {
        let mut timers = Timers::new();
        timers.schedule(TimerKey::LongPress, 1);
        timers.schedule(TimerKey::TrackpadHint, 2);
        timers.clear();
        assert!(timers.is_empty());
        assert_eq!(timers.next_deadline(), None);
    }
}
