// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pointer position tracking.
//!
//! [`PointerPositions`] keeps, for every active pointer (mouse button or touch
//! contact), where it went down, where it was on the previous move and where
//! it is now. It also remembers whether the pointer ever travelled at least
//! the configured move threshold away from its origin, which is what turns a
//! pending click into a drag.
//!
//! ## Usage
//!
//! ```
//! use understory_event_state::pointer::PointerPositions;
//! use kurbo::Point;
//!
//! let mut pointers = PointerPositions::with_threshold(5.0);
//!
//! assert!(pointers.on_down(1, Point::new(0.0, 0.0)));
//! // 3px: still a click.
//! assert_eq!(pointers.on_move(1, Point::new(3.0, 0.0)), Some(false));
//! // 8px: the threshold is crossed once.
//! assert_eq!(pointers.on_move(1, Point::new(8.0, 0.0)), Some(true));
//! assert_eq!(pointers.on_move(1, Point::new(9.0, 0.0)), Some(false));
//!
//! let released = pointers.on_up(1).unwrap();
//! assert_eq!(released.origin, Point::new(0.0, 0.0));
//! assert!(pointers.is_empty());
//! ```
//!
//! ## Map invariant
//!
//! The origin, previous and current maps are views over one record per
//! pointer, so their key sets are always identical while a pointer is active
//! and a release removes the id from all three at once.

use alloc::collections::BTreeMap;
use kurbo::Point;

/// Pointer or touch identifier.
pub type PointerId = u64;

/// Ordered map from pointer id to a position.
pub type PositionMap = BTreeMap<PointerId, Point>;

/// State for one active pointer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Track {
    /// Position at pointer down.
    pub origin: Point,
    /// Position before the latest move.
    pub previous: Point,
    /// Latest position.
    pub current: Point,
    /// True once the pointer travelled at least the threshold from its origin.
    pub threshold_exceeded: bool,
}

/// Tracks origins and positions of all active pointers.
#[derive(Clone, Debug)]
pub struct PointerPositions {
    tracks: BTreeMap<PointerId, Track>,
    /// Distance from origin at which a pointer counts as moved.
    pub move_threshold: f64,
}

impl PointerPositions {
    /// Create a tracker with a 5-pixel move threshold.
    pub fn new() -> Self {
        Self::with_threshold(5.0)
    }

    /// Create a tracker with a custom move threshold in pixels.
    pub fn with_threshold(move_threshold: f64) -> Self {
        Self {
            tracks: BTreeMap::new(),
            move_threshold,
        }
    }

    /// Record a pointer down.
    ///
    /// Returns `true` if the pointer was not already active. A repeated down
    /// for an active id leaves its record untouched.
    pub fn on_down(&mut self, pointer_id: PointerId, position: Point) -> bool {
        if self.tracks.contains_key(&pointer_id) {
            return false;
        }
        self.tracks.insert(
            pointer_id,
            Track {
                origin: position,
                previous: position,
                current: position,
                threshold_exceeded: false,
            },
        );
        true
    }

    /// Record a pointer move.
    ///
    /// Shifts the current position into `previous` and stores the new one.
    ///
    /// # Returns
    /// `None` if the pointer is not active, `Some(true)` if this move is the
    /// first to reach the move threshold, `Some(false)` otherwise.
    pub fn on_move(&mut self, pointer_id: PointerId, position: Point) -> Option<bool> {
        let threshold = self.move_threshold;
        let track = self.tracks.get_mut(&pointer_id)?;
        track.previous = track.current;
        track.current = position;

        if track.threshold_exceeded {
            return Some(false);
        }
        // Compare squared lengths; the threshold is never negative.
        let exceeded = track.origin.distance_squared(position) >= threshold * threshold;
        track.threshold_exceeded = exceeded;
        Some(exceeded)
    }

    /// Record a pointer release and drop its record.
    ///
    /// Returns the final record, or `None` if the pointer was not active.
    pub fn on_up(&mut self, pointer_id: PointerId) -> Option<Track> {
        self.tracks.remove(&pointer_id)
    }

    /// Update the latest position without shifting `previous`.
    ///
    /// Used for the release position, which is not a move.
    pub fn set_current(&mut self, pointer_id: PointerId, position: Point) -> bool {
        match self.tracks.get_mut(&pointer_id) {
            Some(track) => {
                track.current = position;
                true
            }
            None => false,
        }
    }

    /// Whether `pointer_id` is active.
    pub fn is_pressed(&self, pointer_id: PointerId) -> bool {
        self.tracks.contains_key(&pointer_id)
    }

    /// Record for an active pointer.
    pub fn get(&self, pointer_id: PointerId) -> Option<&Track> {
        self.tracks.get(&pointer_id)
    }

    /// The active pointer with the lowest id, with its record.
    pub fn primary(&self) -> Option<(PointerId, &Track)> {
        self.tracks.iter().next().map(|(id, t)| (*id, t))
    }

    /// Whether any active pointer ever reached the move threshold.
    pub fn any_exceeded(&self) -> bool {
        self.tracks.values().any(|t| t.threshold_exceeded)
    }

    /// Number of active pointers.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether no pointer is active.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Iterate active pointers in id order.
    pub fn iter(&self) -> impl Iterator<Item = (PointerId, &Track)> {
        self.tracks.iter().map(|(id, t)| (*id, t))
    }

    /// Snapshot of origins by pointer id.
    pub fn origins(&self) -> PositionMap {
        self.tracks.iter().map(|(id, t)| (*id, t.origin)).collect()
    }

    /// Snapshot of previous positions by pointer id.
    pub fn previous_positions(&self) -> PositionMap {
        self.tracks.iter().map(|(id, t)| (*id, t.previous)).collect()
    }

    /// Snapshot of current positions by pointer id.
    pub fn current_positions(&self) -> PositionMap {
        self.tracks.iter().map(|(id, t)| (*id, t.current)).collect()
    }

    /// Drop every active pointer.
    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}

impl Default for PointerPositions {
    fn default() -> Self {
        Self::new()
    }
}
