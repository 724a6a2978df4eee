// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard normalization.

use core::fmt::Debug;
use core::hash::Hash;

use crate::engine::{GestureEngine, InputResponse};
use crate::event::GestureDetail;
use crate::raw::{KeyInput, RawEvents};
use crate::types::{GestureType, NodeLookup};

impl<K, L> GestureEngine<K, L>
where
    K: Copy + Eq + Hash + Debug + 'static,
    L: NodeLookup<K>,
{
    /// Key down: fires `key-pressed` once per physical press, then switches to
    /// the tool bound to the key, if any.
    pub fn on_key_down(&mut self, input: KeyInput<K>) -> InputResponse {
        let mut response = InputResponse::default();
        if !self.accepts(input.target, RawEvents::KEY_DOWN) {
            return response;
        }
        if input.repeat || self.state.pressed_keys.contains(&input.key) {
            log::trace!("key `{}` already held", input.key);
            return response;
        }
        self.state.pressed_keys.press(input.key.clone());
        let position = self.state.position_or_last(None);
        self.emit(
            GestureType::KeyPressed,
            input.target,
            position,
            None,
            input.timestamp,
            GestureDetail::Key {
                key_pressed: Some(input.key.clone()),
                key_released: None,
            },
            &mut response,
        );
        if self.tools.tool_for_key(&input.key).is_some() {
            if let Err(err) = self.tools.set_tool_by_key(&input.key) {
                log::warn!("key `{}` tool switch failed: {err}", input.key);
            }
        }
        response
    }

    /// Key up: fires `key-released` for a key that was held.
    pub fn on_key_up(&mut self, input: KeyInput<K>) -> InputResponse {
        let mut response = InputResponse::default();
        if !self.accepts(input.target, RawEvents::KEY_UP) {
            return response;
        }
        if !self.state.pressed_keys.release(&input.key) {
            return response;
        }
        let position = self.state.position_or_last(None);
        self.emit(
            GestureType::KeyReleased,
            input.target,
            position,
            None,
            input.timestamp,
            GestureDetail::Key {
                key_pressed: None,
                key_released: Some(input.key),
            },
            &mut response,
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GestureConfig;
    use crate::event::GestureDetail;
    use crate::raw::KeyInput;
    use crate::registry::ToolBehavior;
    use crate::testing::{LEAF, engine, kinds};
    use crate::types::GestureType;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use understory_event_state::{ClickMode, Key};

    #[test]
    fn press_and_release() {
        let (mut engine, log) = engine(GestureConfig::default());
        engine.on_key_down(KeyInput::new(LEAF, "Shift", 0));
        engine.on_key_up(KeyInput::new(LEAF, "Shift", 5));
        assert_eq!(
            kinds(&log),
            vec![GestureType::KeyPressed, GestureType::KeyReleased]
        );
        let log = log.borrow();
        assert!(log[0].is_pressed("Shift"));
        assert!(matches!(
            &log[1].detail,
            GestureDetail::Key { key_released: Some(k), .. } if k.as_str() == "Shift"
        ));
        assert!(log[1].pressed_keys.is_empty());
    }

    #[test]
    fn repeats_and_held_keys_are_ignored() {
        let (mut engine, log) = engine(GestureConfig::default());
        engine.on_key_down(KeyInput::new(LEAF, "a", 0));
        engine.on_key_down(KeyInput::new(LEAF, "a", 1));
        engine.on_key_down(KeyInput {
            repeat: true,
            ..KeyInput::new(LEAF, "b", 2)
        });
        assert_eq!(kinds(&log), vec![GestureType::KeyPressed]);
        assert_eq!(engine.state().pressed_keys.len(), 1);
    }

    #[test]
    fn releasing_unpressed_key_is_silent() {
        let (mut engine, log) = engine(GestureConfig::default());
        let r = engine.on_key_up(KeyInput::new(LEAF, "x", 0));
        assert!(r.gestures.is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn bound_key_switches_tool_after_key_pressed() {
        let (mut engine, log) = engine(GestureConfig::default());
        let activations: Rc<RefCell<Vec<ClickMode>>> = Rc::default();
        let a = activations.clone();
        engine.add_tool("hand", LEAF, Some(Key::from("h"))).unwrap();
        let hand = ToolBehavior::new().on_activate(move |m| a.borrow_mut().push(m));
        engine.set_tool_behavior("hand", hand).unwrap();
        engine.on_key_down(KeyInput::new(LEAF, "h", 0));
        assert_eq!(engine.tools().current_tool(ClickMode::Key), Some("hand"));
        assert_eq!(*activations.borrow(), vec![ClickMode::Key]);
        // key-pressed was dispatched before the switch.
        assert_eq!(log.borrow()[0].tool_name, None);
    }

    #[test]
    fn disabled_key_events_detach() {
        let (mut engine, log) = engine(GestureConfig {
            disable_key_events: true,
            ..GestureConfig::default()
        });
        engine.on_key_down(KeyInput::new(LEAF, "a", 0));
        assert!(log.borrow().is_empty());
        assert!(engine.state().pressed_keys.is_empty());
    }
}
