// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.
//!
//! [`GestureConfig`] is plain data. It deserializes with the camelCase option
//! names hosts already use (`moveThreshold`, `longPressDuration`, …) and every
//! field has a default, so a partial document is fine:
//!
//! ```
//! use understory_gesture::GestureConfig;
//!
//! let config: GestureConfig = toml::from_str("moveThreshold = 12.0").unwrap();
//! assert_eq!(config.move_threshold, 12.0);
//! assert_eq!(config.long_press_duration, 500);
//! assert!(config.validate().is_ok());
//! ```
//!
//! Closure hooks (position scaling, its authorization predicate, node opt-out)
//! are set on the engine instead.

use alloc::format;
use serde::{Deserialize, Serialize};
use understory_event_state::Policy;

use crate::error::GestureError;
use crate::raw::RawEvents;

bitflags::bitflags! {
    /// Per-category disable switches derived from a [`GestureConfig`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Disabled: u8 {
        /// Keyboard input is ignored.
        const KEY   = 0b0000_0001;
        /// Wheel input is ignored.
        const WHEEL = 0b0000_0010;
        /// Mouse (and pen) input is ignored.
        const MOUSE = 0b0000_0100;
        /// Touch input is ignored.
        const TOUCH = 0b0000_1000;
        /// `click-start`, `click`, `click-end` and `long-press` are not emitted.
        const CLICK = 0b0001_0000;
        /// `drag-start`, `drag` and `drag-end` are not emitted.
        const DRAG  = 0b0010_0000;
        /// `move` is not emitted.
        const MOVE  = 0b0100_0000;
    }
}

/// Static engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GestureConfig {
    /// Produce gestures at all.
    pub enabled: bool,
    /// Ask the host to prevent the platform default for wheel input.
    pub prevent_default_wheel: bool,
    /// Ask the host to prevent the platform default for mouse input.
    pub prevent_default_mouse: bool,
    /// Ask the host to prevent the platform default for touch input.
    pub prevent_default_touch: bool,
    /// Distance in pixels a pointer travels from its origin before a pending
    /// click becomes a drag.
    pub move_threshold: f64,
    /// Milliseconds a still pointer is held before `long-press` fires.
    pub long_press_duration: u64,
    /// Apply the host's position scaling hook to every event.
    ///
    /// A predicate installed with `set_authorize_event_scaling` takes
    /// precedence over this flag.
    pub authorize_event_scaling: bool,
    /// Ignore keyboard input.
    pub disable_key_events: bool,
    /// Ignore wheel input.
    pub disable_wheel_events: bool,
    /// Ignore mouse input.
    pub disable_mouse_events: bool,
    /// Ignore touch input.
    pub disable_touch_events: bool,
    /// Suppress click, click-start, click-end and long-press.
    pub disable_click_events: bool,
    /// Suppress drag-start, drag and drag-end.
    pub disable_drag_events: bool,
    /// Suppress move.
    pub disable_move_event: bool,
    /// Milliseconds trackpad-looking wheel input keeps biasing classification.
    pub trackpad_hint_duration: u64,
    /// Zoom factor change per wheel delta unit for `trackpad-pinch`.
    pub pinch_zoom_step: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        let policy = Policy::default();
        Self {
            enabled: policy.enabled,
            prevent_default_wheel: policy.prevent_default_wheel,
            prevent_default_mouse: policy.prevent_default_mouse,
            prevent_default_touch: policy.prevent_default_touch,
            move_threshold: 5.0,
            long_press_duration: 500,
            authorize_event_scaling: false,
            disable_key_events: false,
            disable_wheel_events: false,
            disable_mouse_events: false,
            disable_touch_events: false,
            disable_click_events: false,
            disable_drag_events: false,
            disable_move_event: false,
            trackpad_hint_duration: 300,
            pinch_zoom_step: 0.01,
        }
    }
}

impl GestureConfig {
    /// Check numeric fields.
    pub fn validate(&self) -> Result<(), GestureError> {
        if !self.move_threshold.is_finite() || self.move_threshold < 0.0 {
            return Err(GestureError::InvalidConfig {
                field: "moveThreshold",
                message: format!(
                    "expected a finite, non-negative distance, got {}",
                    self.move_threshold
                ),
            });
        }
        if self.long_press_duration == 0 {
            return Err(GestureError::InvalidConfig {
                field: "longPressDuration",
                message: "must be at least 1ms".into(),
            });
        }
        if self.trackpad_hint_duration == 0 {
            return Err(GestureError::InvalidConfig {
                field: "trackpadHintDuration",
                message: "must be at least 1ms".into(),
            });
        }
        if !self.pinch_zoom_step.is_finite() || self.pinch_zoom_step <= 0.0 {
            return Err(GestureError::InvalidConfig {
                field: "pinchZoomStep",
                message: format!(
                    "expected a finite, positive step, got {}",
                    self.pinch_zoom_step
                ),
            });
        }
        Ok(())
    }

    /// The default policy a lock falls back to.
    pub fn default_policy(&self) -> Policy {
        Policy {
            enabled: self.enabled,
            prevent_default_wheel: self.prevent_default_wheel,
            prevent_default_mouse: self.prevent_default_mouse,
            prevent_default_touch: self.prevent_default_touch,
        }
    }

    /// Collect the disable switches.
    pub fn disabled(&self) -> Disabled {
        let mut d = Disabled::empty();
        d.set(Disabled::KEY, self.disable_key_events);
        d.set(Disabled::WHEEL, self.disable_wheel_events);
        d.set(Disabled::MOUSE, self.disable_mouse_events);
        d.set(Disabled::TOUCH, self.disable_touch_events);
        d.set(Disabled::CLICK, self.disable_click_events);
        d.set(Disabled::DRAG, self.disable_drag_events);
        d.set(Disabled::MOVE, self.disable_move_event);
        d
    }

    /// Raw event kinds the host needs to listen to for this configuration.
    pub fn raw_events(&self) -> RawEvents {
        let disabled = self.disabled();
        let mut raw = RawEvents::SELECT;
        if !disabled.contains(Disabled::KEY) {
            raw |= RawEvents::KEY_DOWN | RawEvents::KEY_UP;
        }
        if !disabled.contains(Disabled::WHEEL) {
            raw |= RawEvents::WHEEL;
        }
        if !disabled.contains(Disabled::MOUSE) {
            raw |= RawEvents::MOUSE_DOWN
                | RawEvents::MOUSE_MOVE
                | RawEvents::MOUSE_UP
                | RawEvents::MOUSE_LEAVE;
        }
        if !disabled.contains(Disabled::TOUCH) {
            raw |= RawEvents::TOUCH_START
                | RawEvents::TOUCH_MOVE
                | RawEvents::TOUCH_END
                | RawEvents::TOUCH_CANCEL;
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = GestureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_policy(), Policy::default());
        assert!(config.disabled().is_empty());
    }

    #[test]
    fn camel_case_options_deserialize() {
        let config: GestureConfig = toml::from_str(
            r#"
            enabled = true
            preventDefaultMouse = true
            moveThreshold = 10.0
            longPressDuration = 800
            disableWheelEvents = true
            disableMoveEvent = true
            "#,
        )
        .unwrap();
        assert!(config.prevent_default_mouse);
        assert_eq!(config.move_threshold, 10.0);
        assert_eq!(config.long_press_duration, 800);
        assert_eq!(config.disabled(), Disabled::WHEEL | Disabled::MOVE);
        // Unspecified fields keep their defaults.
        assert!(config.prevent_default_touch);
        assert_eq!(config.trackpad_hint_duration, 300);
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let config = GestureConfig {
            move_threshold: -1.0,
            ..GestureConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GestureError::InvalidConfig {
                field: "moveThreshold",
                ..
            })
        ));
    }

    #[test]
    fn zero_durations_are_rejected() {
        let config = GestureConfig {
            long_press_duration: 0,
            ..GestureConfig::default()
        };
        assert!(config.validate().is_err());
        let config = GestureConfig {
            pinch_zoom_step: 0.0,
            ..GestureConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn raw_events_follow_disable_flags() {
        let config = GestureConfig {
            disable_key_events: true,
            disable_touch_events: true,
            ..GestureConfig::default()
        };
        let raw = config.raw_events();
        assert!(!raw.contains(RawEvents::KEY_DOWN));
        assert!(!raw.contains(RawEvents::TOUCH_START));
        assert!(raw.contains(RawEvents::MOUSE_DOWN | RawEvents::WHEEL));
        // Click/drag/move suppression does not detach raw listeners.
        let config = GestureConfig {
            disable_click_events: true,
            ..GestureConfig::default()
        };
        assert_eq!(config.raw_events(), GestureConfig::default().raw_events());
    }
}
