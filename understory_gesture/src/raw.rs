// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw input records handed to the engine by the host.
//!
//! These mirror what a platform event loop delivers, reduced to the fields the
//! normalizers read. Timestamps are milliseconds on the host's clock; the same
//! clock drives [`GestureEngine::poll_timers`](crate::GestureEngine::poll_timers).

use alloc::string::String;

use kurbo::{Point, Vec2};
use smallvec::SmallVec;
use understory_event_state::{Key, PointerId};

bitflags::bitflags! {
    /// Raw event kinds the engine listens to.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RawEvents: u16 {
        /// Key down.
        const KEY_DOWN     = 1 << 0;
        /// Key up.
        const KEY_UP       = 1 << 1;
        /// Wheel.
        const WHEEL        = 1 << 2;
        /// Mouse button down.
        const MOUSE_DOWN   = 1 << 3;
        /// Mouse move.
        const MOUSE_MOVE   = 1 << 4;
        /// Mouse button up.
        const MOUSE_UP     = 1 << 5;
        /// Mouse left the surface.
        const MOUSE_LEAVE  = 1 << 6;
        /// Touch start.
        const TOUCH_START  = 1 << 7;
        /// Touch move.
        const TOUCH_MOVE   = 1 << 8;
        /// Touch end.
        const TOUCH_END    = 1 << 9;
        /// Touch cancel.
        const TOUCH_CANCEL = 1 << 10;
        /// Text selection in an input control.
        const SELECT       = 1 << 11;
        /// A registered custom gesture source.
        const CUSTOM       = 1 << 12;
    }
}

/// Pointer id [`PointerInput::mouse`] assigns. Hosts with their own mouse ids
/// may pass those instead.
pub const MOUSE_POINTER_ID: PointerId = 0;

/// Keyboard input.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyInput<K> {
    /// Node the key event was delivered to.
    pub target: K,
    /// Key identifier.
    pub key: Key,
    /// Platform auto-repeat.
    pub repeat: bool,
    /// Milliseconds.
    pub timestamp: u64,
}

impl<K> KeyInput<K> {
    /// A non-repeating key event.
    pub fn new(target: K, key: impl Into<Key>, timestamp: u64) -> Self {
        Self {
            target,
            key: key.into(),
            repeat: false,
            timestamp,
        }
    }
}

/// Wheel input.
#[derive(Clone, Debug, PartialEq)]
pub struct WheelInput<K> {
    /// Node under the pointer.
    pub target: K,
    /// Pointer position, if the platform reported one.
    pub position: Option<Point>,
    /// Scroll delta in pixels.
    pub delta: Vec2,
    /// Whether ctrl was held; trackpads report pinches this way.
    pub ctrl_key: bool,
    /// Milliseconds.
    pub timestamp: u64,
}

/// Source of a pointer event.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Mouse or trackpad cursor.
    #[default]
    Mouse,
    /// Touch contact.
    Touch,
    /// Stylus; classified like a mouse.
    Pen,
}

/// A single pointer down, move or up.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerInput<K> {
    /// Node under the pointer.
    pub target: K,
    /// Stable id for the duration of the contact.
    pub pointer_id: PointerId,
    /// Source of the event.
    pub kind: PointerKind,
    /// Button code: 0 primary, 1 auxiliary, 2 secondary.
    pub button: u16,
    /// Position, if the platform reported one.
    pub position: Option<Point>,
    /// Milliseconds.
    pub timestamp: u64,
}

impl<K> PointerInput<K> {
    /// A mouse event with the given button at `position`.
    pub fn mouse(target: K, button: u16, position: Point, timestamp: u64) -> Self {
        Self {
            target,
            pointer_id: MOUSE_POINTER_ID,
            kind: PointerKind::Mouse,
            button,
            position: Some(position),
            timestamp,
        }
    }

    /// A touch contact at `position`.
    pub fn touch(target: K, pointer_id: PointerId, position: Point, timestamp: u64) -> Self {
        Self {
            target,
            pointer_id,
            kind: PointerKind::Touch,
            button: 0,
            position: Some(position),
            timestamp,
        }
    }
}

/// One changed contact in a touch event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TouchPoint {
    /// Contact id.
    pub id: PointerId,
    /// Contact position.
    pub position: Point,
}

/// Touch input carrying every contact that changed.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchInput<K> {
    /// Node the touch event was delivered to.
    pub target: K,
    /// Contacts that changed in this event.
    pub changed: SmallVec<[TouchPoint; 2]>,
    /// Milliseconds.
    pub timestamp: u64,
}

impl<K: Copy> TouchInput<K> {
    /// Split into one [`PointerInput`] per changed contact.
    pub fn pointers(&self) -> impl Iterator<Item = PointerInput<K>> + '_ {
        self.changed
            .iter()
            .map(|t| PointerInput::touch(self.target, t.id, t.position, self.timestamp))
    }
}

/// Text selection inside an input control.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectInput<K> {
    /// The input control.
    pub target: K,
    /// Pointer position, if known.
    pub position: Option<Point>,
    /// Milliseconds.
    pub timestamp: u64,
}

/// Raw event for a registered custom gesture type.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomInput<K> {
    /// Node the event was delivered to.
    pub target: K,
    /// Position, if meaningful.
    pub position: Option<Point>,
    /// Free-form payload name carried to the handlers.
    pub detail: Option<String>,
    /// Milliseconds.
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use smallvec::smallvec;

    #[test]
    fn touch_splits_into_pointer_inputs() {
        let touch = TouchInput {
            target: 4_u32,
            changed: smallvec![
                TouchPoint {
                    id: 1,
                    position: Point::new(1.0, 2.0),
                },
                TouchPoint {
                    id: 2,
                    position: Point::new(3.0, 4.0),
                },
            ],
            timestamp: 9,
        };
        let pointers: Vec<_> = touch.pointers().collect();
        assert_eq!(pointers.len(), 2);
        assert_eq!(pointers[1].pointer_id, 2);
        assert_eq!(pointers[1].kind, PointerKind::Touch);
        assert_eq!(pointers[1].timestamp, 9);
    }

    #[test]
    fn mouse_uses_reserved_id() {
        let p = PointerInput::mouse(1_u32, 2, Point::ZERO, 0);
        assert_eq!(p.pointer_id, MOUSE_POINTER_ID);
        assert_eq!(p.button, 2);
    }
}
