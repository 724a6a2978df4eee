// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wheel normalization.
//!
//! Platforms do not say whether a wheel event came from a mouse or a
//! trackpad, so classification is a heuristic and will sometimes be wrong:
//!
//! 1. `ctrl` held: `trackpad-pinch`. The zoom factor is
//!    `1 - delta.y * pinch_zoom_step`, so scrolling up zooms in.
//! 2. A horizontal component or a fractional delta: `trackpad-scroll`. This
//!    arms a short-lived hint that biases the next events toward the trackpad.
//! 3. A whole-pixel vertical notch: `mouse-wheel`, unless the hint is still
//!    live, in which case it is another `trackpad-scroll`.

use core::fmt::Debug;
use core::hash::Hash;

use understory_event_state::{InputDevice, TimerKey};

use crate::engine::{GestureEngine, InputResponse};
use crate::event::GestureDetail;
use crate::raw::{RawEvents, WheelInput};
use crate::types::{GestureType, NodeLookup};

/// Smallest zoom factor a pinch reports.
const MIN_ZOOM_FACTOR: f64 = 0.01;

impl<K, L> GestureEngine<K, L>
where
    K: Copy + Eq + Hash + Debug + 'static,
    L: NodeLookup<K>,
{
    /// Wheel input: classifies and fires one wheel-family gesture.
    pub fn on_wheel(&mut self, input: WheelInput<K>) -> InputResponse {
        let mut response = InputResponse::default();
        if !self.accepts(input.target, RawEvents::WHEEL) {
            return response;
        }
        let position = self.state.position_or_last(input.position);
        if input.position.is_some() {
            self.state.last_target_origin = input.position;
        }
        let (gesture, zoom_factor) = self.classify_wheel(&input);
        self.emit(
            gesture,
            input.target,
            position,
            None,
            input.timestamp,
            GestureDetail::Wheel {
                delta: input.delta,
                zoom_factor,
            },
            &mut response,
        );
        response.prevent_default |= self.effective_policy().prevent_default_wheel;
        response
    }

    fn classify_wheel(&mut self, input: &WheelInput<K>) -> (GestureType, Option<f64>) {
        let delta = input.delta;
        if input.ctrl_key {
            self.state.input_device.set(InputDevice::Trackpad);
            let zoom = (1.0 - delta.y * self.config.pinch_zoom_step).max(MIN_ZOOM_FACTOR);
            return (GestureType::TrackpadPinch, Some(zoom));
        }
        let fractional = delta.x % 1.0 != 0.0 || delta.y % 1.0 != 0.0;
        if delta.x != 0.0 || fractional || self.state.was_recently_trackpad {
            self.state.was_recently_trackpad = true;
            self.state.input_device.set(InputDevice::Trackpad);
            self.state.timers.schedule(
                TimerKey::TrackpadHint,
                input
                    .timestamp
                    .saturating_add(self.config.trackpad_hint_duration),
            );
            return (GestureType::TrackpadScroll, None);
        }
        self.state.input_device.set(InputDevice::Mouse);
        (GestureType::MouseWheel, None)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GestureConfig;
    use crate::raw::WheelInput;
    use crate::testing::{LEAF, engine, kinds};
    use crate::types::GestureType;
    use alloc::vec;
    use kurbo::{Point, Vec2};
    use understory_event_state::InputDevice;

    fn wheel(dx: f64, dy: f64, ctrl_key: bool, timestamp: u64) -> WheelInput<u32> {
        WheelInput {
            target: LEAF,
            position: Some(Point::new(50.0, 50.0)),
            delta: Vec2::new(dx, dy),
            ctrl_key,
            timestamp,
        }
    }

    #[test]
    fn ctrl_wheel_is_pinch_zooming_in_for_negative_delta() {
        let (mut engine, log) = engine(GestureConfig::default());
        let r = engine.on_wheel(wheel(0.0, -5.0, true, 0));
        assert!(r.fired(GestureType::TrackpadPinch));
        assert!(r.prevent_default);
        let zoom = log.borrow()[0].zoom_factor().unwrap();
        assert!(zoom > 1.0, "zoom factor {zoom} should zoom in");
        assert_eq!(engine.state().current_input_device(), InputDevice::Trackpad);
    }

    #[test]
    fn pinch_zoom_out_is_clamped() {
        let (mut engine, log) = engine(GestureConfig::default());
        engine.on_wheel(wheel(0.0, 10_000.0, true, 0));
        let zoom = log.borrow()[0].zoom_factor().unwrap();
        assert!(zoom > 0.0 && zoom < 1.0);
    }

    #[test]
    fn whole_notch_is_mouse_wheel() {
        let (mut engine, _) = engine(GestureConfig::default());
        let r = engine.on_wheel(wheel(0.0, 100.0, false, 0));
        assert!(r.fired(GestureType::MouseWheel));
        assert_eq!(engine.state().current_input_device(), InputDevice::Mouse);
        assert_eq!(engine.pending_timer_count(), 0);
    }

    #[test]
    fn fractional_or_horizontal_is_trackpad_scroll() {
        for (dx, dy) in [(0.0, 3.25), (4.0, 0.0)] {
            let (mut engine, _) = engine(GestureConfig::default());
            let r = engine.on_wheel(wheel(dx, dy, false, 0));
            assert!(r.fired(GestureType::TrackpadScroll), "({dx}, {dy})");
            assert!(engine.state().was_recently_trackpad);
        }
    }

    #[test]
    fn hint_biases_notches_until_it_expires() {
        let (mut engine, log) = engine(GestureConfig::default());
        engine.on_wheel(wheel(0.0, 2.5, false, 0));
        // A whole notch inside the hint window still reads as trackpad.
        engine.on_wheel(wheel(0.0, 4.0, false, 100));
        // The second event refreshed the hint to 400.
        engine.poll_timers(399);
        assert!(engine.state().was_recently_trackpad);
        engine.poll_timers(400);
        assert!(!engine.state().was_recently_trackpad);
        engine.on_wheel(wheel(0.0, 4.0, false, 500));
        assert_eq!(
            kinds(&log),
            vec![
                GestureType::TrackpadScroll,
                GestureType::TrackpadScroll,
                GestureType::MouseWheel
            ]
        );
    }

    #[test]
    fn huge_hint_duration_saturates() {
        let (mut engine, _) = engine(GestureConfig {
            trackpad_hint_duration: u64::MAX,
            ..GestureConfig::default()
        });
        let r = engine.on_wheel(wheel(0.0, 2.5, false, 10));
        assert!(r.fired(GestureType::TrackpadScroll));
        assert_eq!(engine.next_deadline(), Some(u64::MAX));
    }

    #[test]
    fn prevent_default_follows_policy() {
        let (mut engine, _) = engine(GestureConfig {
            prevent_default_wheel: false,
            ..GestureConfig::default()
        });
        assert!(!engine.on_wheel(wheel(0.0, 100.0, false, 0)).prevent_default);
    }

    #[test]
    fn disabled_wheel_events_detach() {
        let (mut engine, log) = engine(GestureConfig {
            disable_wheel_events: true,
            ..GestureConfig::default()
        });
        let r = engine.on_wheel(wheel(0.0, 100.0, false, 0));
        assert!(!r.prevent_default);
        assert!(log.borrow().is_empty());
    }
}
