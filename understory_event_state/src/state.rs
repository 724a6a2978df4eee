// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The aggregate input state owned by one engine.

use kurbo::Point;

use crate::keys::PressedKeys;
use crate::lock::{LockSlot, Policy, PolicyOverrides};
use crate::mode::{ActionMode, ClickMode, InputDevice};
use crate::observable::Observable;
use crate::pointer::PointerPositions;
use crate::timer::{TimerKey, Timers};

/// Canonical mutable input state.
///
/// The three modes are [`Observable`] cells so hosts and the engine can react
/// to transitions; everything else is plain data mutated by the normalizers.
/// `K` is the host's node handle, used to remember who holds the lock.
#[derive(Debug)]
pub struct InputState<K> {
    /// Best-effort device of the latest input.
    pub input_device: Observable<InputDevice>,
    /// Button or category of the current interaction.
    pub click_mode: Observable<ClickMode>,
    /// Gesture state-machine variable.
    pub action_mode: Observable<ActionMode>,
    /// Held keys.
    pub pressed_keys: PressedKeys,
    /// Active pointers and their positions.
    pub pointers: PointerPositions,
    /// Pending deadlines.
    pub timers: Timers,
    /// Single-slot policy override.
    pub lock: LockSlot<K>,
    /// Set by the wheel normalizer after trackpad-looking input; cleared when
    /// the [`TimerKey::TrackpadHint`] timer fires.
    pub was_recently_trackpad: bool,
    /// Last known pointer position, the fallback when input has none.
    pub last_target_origin: Option<Point>,
}

impl<K> InputState<K> {
    /// Create an idle state with the given move threshold.
    pub fn new(move_threshold: f64) -> Self {
        Self {
            input_device: Observable::default(),
            click_mode: Observable::default(),
            action_mode: Observable::default(),
            pressed_keys: PressedKeys::new(),
            pointers: PointerPositions::with_threshold(move_threshold),
            timers: Timers::new(),
            lock: LockSlot::new(),
            was_recently_trackpad: false,
            last_target_origin: None,
        }
    }

    /// Current device classification.
    pub fn current_input_device(&self) -> InputDevice {
        self.input_device.value()
    }

    /// Current click mode.
    pub fn current_click_mode(&self) -> ClickMode {
        self.click_mode.value()
    }

    /// Current action mode.
    pub fn current_action_mode(&self) -> ActionMode {
        self.action_mode.value()
    }

    /// Install a lock, replacing any lock already held.
    pub fn set_lock_state(&mut self, origin: K, overrides: PolicyOverrides) {
        self.lock.set(origin, overrides);
    }

    /// Clear the lock slot.
    pub fn reset_lock_state(&mut self) {
        self.lock.reset();
    }

    /// Policy after applying the lock (if any) to `defaults`.
    pub fn effective_policy(&self, defaults: &Policy) -> Policy {
        self.lock.effective(defaults)
    }

    /// `position`, or the last known pointer position, or the origin.
    pub fn position_or_last(&self, position: Option<Point>) -> Point {
        position
            .or(self.last_target_origin)
            .unwrap_or(Point::ZERO)
    }

    /// Return the pointer state machine to idle.
    ///
    /// Cancels the long-press timer, drops every active pointer and resets
    /// action and click modes. Keys, the lock and the trackpad hint are kept.
    pub fn reset_interaction(&mut self) {
        self.timers.cancel(TimerKey::LongPress);
        self.pointers.clear();
        self.action_mode.set(ActionMode::None);
        self.click_mode.set(ClickMode::None);
    }

    /// Clear everything: timers, pointers, keys, lock, hints and modes.
    ///
    /// Subscribers are dropped too; the state is inert afterwards until new
    /// input arrives.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.pointers.clear();
        self.pressed_keys.clear();
        self.lock.reset();
        self.was_recently_trackpad = false;
        self.last_target_origin = None;
        self.input_device.clear_subscribers();
        self.click_mode.clear_subscribers();
        self.action_mode.clear_subscribers();
        self.input_device.set(InputDevice::Unknown);
        self.click_mode.set(ClickMode::None);
        self.action_mode.set(ActionMode::None);
    }
}
