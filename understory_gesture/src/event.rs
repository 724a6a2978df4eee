// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture events delivered to tools and listeners.

use alloc::collections::BTreeSet;
use alloc::string::String;

use kurbo::{Point, Vec2};
use understory_event_state::{ClickMode, InputDevice, Key, PointerId, PositionMap};

use crate::types::GestureType;

/// Payload specific to a gesture family.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureDetail {
    /// Click family, `move` and `select-input`.
    Pointer,
    /// Drag family.
    Drag {
        /// Where each active pointer went down.
        origins: PositionMap,
        /// Each pointer's position before the latest move.
        previous_positions: PositionMap,
        /// Each pointer's current position.
        positions: PositionMap,
    },
    /// Key family.
    Key {
        /// Set on `key-pressed`.
        key_pressed: Option<Key>,
        /// Set on `key-released`.
        key_released: Option<Key>,
    },
    /// Wheel family.
    Wheel {
        /// Raw wheel delta.
        delta: Vec2,
        /// Multiplicative zoom for `trackpad-pinch`; above 1 zooms in.
        zoom_factor: Option<f64>,
    },
    /// Registered custom type.
    Custom {
        /// Registered name.
        name: String,
        /// Host-supplied payload.
        detail: Option<String>,
    },
}

/// A normalized gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureEvent<K> {
    /// What happened.
    pub gesture: GestureType,
    /// Node the gesture is resolved against.
    pub target: K,
    /// Position in host coordinates.
    pub position: Point,
    /// Position after the host's scaling hook, or `position` when unscaled.
    pub scaled_position: Point,
    /// Button or category of the current interaction.
    pub click_mode: ClickMode,
    /// Best-effort device of the input.
    pub input_device: InputDevice,
    /// Keys held when the gesture fired.
    pub pressed_keys: BTreeSet<Key>,
    /// Active tool for `click_mode`, if any.
    pub tool_name: Option<String>,
    /// Pointer that produced the gesture, for pointer gestures.
    pub pointer_id: Option<PointerId>,
    /// Milliseconds.
    pub timestamp: u64,
    /// Family-specific payload.
    pub detail: GestureDetail,
}

impl<K> GestureEvent<K> {
    /// Whether `key` was held.
    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed_keys.iter().any(|k| k.as_str() == key)
    }

    /// Displacement of the event's pointer from its origin, for drag events.
    pub fn drag_delta(&self) -> Option<Vec2> {
        let GestureDetail::Drag {
            origins, positions, ..
        } = &self.detail
        else {
            return None;
        };
        let id = self.pointer_id.or_else(|| positions.keys().next().copied())?;
        Some(*positions.get(&id)? - *origins.get(&id)?)
    }

    /// Movement of the event's pointer since the previous drag event.
    pub fn drag_step(&self) -> Option<Vec2> {
        let GestureDetail::Drag {
            previous_positions,
            positions,
            ..
        } = &self.detail
        else {
            return None;
        };
        let id = self.pointer_id.or_else(|| positions.keys().next().copied())?;
        Some(*positions.get(&id)? - *previous_positions.get(&id)?)
    }

    /// Zoom factor of a pinch.
    pub fn zoom_factor(&self) -> Option<f64> {
        match self.detail {
            GestureDetail::Wheel { zoom_factor, .. } => zoom_factor,
            _ => None,
        }
    }
}
