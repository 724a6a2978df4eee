// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mouse and touch normalization: the click, long-press and drag machine.
//!
//! ```text
//!            down                 moved >= threshold
//!   None ─────────────▶ Click ─────────────────────────▶ Drag
//!    ▲                    │  held >= long_press_duration   │
//!    │                    ▼                                │
//!    │                LongPress                            │
//!    └──────────── last pointer up ◀───────────────────────┘
//! ```
//!
//! Terminal gestures fire when the last active pointer lifts. Click, drag and
//! terminal gestures go to the node the interaction started on; `move` goes to
//! the hovered node.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Point;
use understory_event_state::{ActionMode, ClickMode, InputDevice, PointerId, TimerKey};

use crate::config::Disabled;
use crate::engine::{GestureEngine, InputResponse};
use crate::event::GestureDetail;
use crate::raw::{PointerInput, PointerKind, RawEvents, TouchInput};
use crate::types::{GestureType, NodeLookup};

#[derive(Copy, Clone)]
enum Phase {
    Down,
    Move,
    Up,
    Cancel,
    Leave,
}

fn raw_kind(kind: PointerKind, phase: Phase) -> RawEvents {
    match (kind, phase) {
        (PointerKind::Touch, Phase::Down) => RawEvents::TOUCH_START,
        (PointerKind::Touch, Phase::Move) => RawEvents::TOUCH_MOVE,
        (PointerKind::Touch, Phase::Up | Phase::Leave) => RawEvents::TOUCH_END,
        (PointerKind::Touch, Phase::Cancel) => RawEvents::TOUCH_CANCEL,
        (_, Phase::Down) => RawEvents::MOUSE_DOWN,
        (_, Phase::Move) => RawEvents::MOUSE_MOVE,
        (_, Phase::Up | Phase::Cancel) => RawEvents::MOUSE_UP,
        (_, Phase::Leave) => RawEvents::MOUSE_LEAVE,
    }
}

impl<K, L> GestureEngine<K, L>
where
    K: Copy + Eq + Hash + Debug + 'static,
    L: NodeLookup<K>,
{
    /// Pointer down. The first active pointer starts an interaction and fires
    /// `click-start`; further pointers join it.
    pub fn on_pointer_down(&mut self, input: PointerInput<K>) -> InputResponse {
        let mut response = InputResponse::default();
        if !self.accepts(input.target, raw_kind(input.kind, Phase::Down)) {
            return response;
        }
        let id = input.pointer_id;
        let position = self.state.position_or_last(input.position);
        self.state.last_target_origin = Some(position);
        if !self.state.pointers.on_down(id, position) {
            log::trace!("pointer {id} already down");
            return response;
        }
        if input.kind != PointerKind::Touch {
            self.mouse_pointers.push(id);
        }
        if self.state.pointers.len() == 1 {
            let device = match input.kind {
                PointerKind::Touch => InputDevice::Touch,
                _ if self.state.was_recently_trackpad => InputDevice::Trackpad,
                _ => InputDevice::Mouse,
            };
            let click_mode = match input.kind {
                PointerKind::Touch => ClickMode::Left,
                _ => ClickMode::from_button(input.button),
            };
            self.state.input_device.set(device);
            self.state.click_mode.set(click_mode);
            self.state.action_mode.set(ActionMode::Click);
            self.interaction_target = Some(input.target);
            self.state.timers.schedule(
                TimerKey::LongPress,
                input.timestamp.saturating_add(self.config.long_press_duration),
            );
            self.emit_click(
                GestureType::ClickStart,
                input.target,
                position,
                id,
                input.timestamp,
                &mut response,
            );
        }
        response.prevent_default |= self.prevent_default_for(input.kind);
        response
    }

    /// Pointer move. Fires `move` at the hovered node and advances a pending
    /// click into a drag once any pointer reaches the move threshold.
    pub fn on_pointer_move(&mut self, input: PointerInput<K>) -> InputResponse {
        let mut response = InputResponse::default();
        if !self.accepts(input.target, raw_kind(input.kind, Phase::Move)) {
            return response;
        }
        let id = input.pointer_id;
        let position = self.state.position_or_last(input.position);
        self.state.last_target_origin = Some(position);
        if !self.disabled.contains(Disabled::MOVE) {
            self.emit(
                GestureType::Move,
                input.target,
                position,
                Some(id),
                input.timestamp,
                GestureDetail::Pointer,
                &mut response,
            );
        }
        response.prevent_default |= self.prevent_default_for(input.kind);
        if self.state.pointers.on_move(id, position).is_none() {
            return response;
        }
        let target = self.interaction_target.unwrap_or(input.target);
        match self.state.current_action_mode() {
            ActionMode::Click if self.state.pointers.any_exceeded() => {
                self.state.timers.cancel(TimerKey::LongPress);
                self.state.action_mode.set(ActionMode::Drag);
                let origin = self
                    .state
                    .pointers
                    .get(id)
                    .map_or(position, |track| track.origin);
                let ts = input.timestamp;
                self.emit_drag(GestureType::DragStart, target, origin, id, ts, &mut response);
                self.emit_drag(GestureType::Drag, target, position, id, ts, &mut response);
            }
            ActionMode::Drag => {
                let ts = input.timestamp;
                self.emit_drag(GestureType::Drag, target, position, id, ts, &mut response);
            }
            _ => {}
        }
        response
    }

    /// Pointer up. When the last active pointer lifts, fires the terminal
    /// gestures for the current action and returns to idle.
    pub fn on_pointer_up(&mut self, input: PointerInput<K>) -> InputResponse {
        let mut response = InputResponse::default();
        if !self.accepts(input.target, raw_kind(input.kind, Phase::Up)) {
            return response;
        }
        self.release_pointer(&input, &mut response);
        response.prevent_default |= self.prevent_default_for(input.kind);
        response
    }

    /// The mouse left the surface: an implicit up at the last known position
    /// for every active mouse or pen pointer, whatever its id.
    pub fn on_pointer_leave(&mut self, target: K, timestamp: u64) -> InputResponse {
        let mut response = InputResponse::default();
        if !self.accepts(target, raw_kind(PointerKind::Mouse, Phase::Leave)) {
            return response;
        }
        let ids = self.mouse_pointers.clone();
        for pointer_id in ids {
            let input = PointerInput {
                target,
                pointer_id,
                kind: PointerKind::Mouse,
                button: 0,
                position: None,
                timestamp,
            };
            self.release_pointer(&input, &mut response);
        }
        response
    }

    /// Touch start for every changed contact.
    pub fn on_touch_start(&mut self, input: &TouchInput<K>) -> InputResponse {
        let mut response = InputResponse::default();
        for pointer in input.pointers() {
            response.merge(self.on_pointer_down(pointer));
        }
        response
    }

    /// Touch move for every changed contact.
    pub fn on_touch_move(&mut self, input: &TouchInput<K>) -> InputResponse {
        let mut response = InputResponse::default();
        for pointer in input.pointers() {
            response.merge(self.on_pointer_move(pointer));
        }
        response
    }

    /// Touch end for every changed contact.
    pub fn on_touch_end(&mut self, input: &TouchInput<K>) -> InputResponse {
        let mut response = InputResponse::default();
        for pointer in input.pointers() {
            response.merge(self.on_pointer_up(pointer));
        }
        response
    }

    /// Touch cancel; handled like the contacts lifting.
    pub fn on_touch_cancel(&mut self, input: &TouchInput<K>) -> InputResponse {
        let mut response = InputResponse::default();
        for pointer in input.pointers() {
            if !self.accepts(pointer.target, raw_kind(PointerKind::Touch, Phase::Cancel)) {
                continue;
            }
            self.release_pointer(&pointer, &mut response);
        }
        response
    }

    /// Long-press deadline reached. Stale firings are ignored.
    pub(crate) fn fire_long_press(&mut self, now: u64, response: &mut InputResponse) {
        if self.state.current_action_mode() != ActionMode::Click
            || self.state.pointers.any_exceeded()
        {
            return;
        }
        let Some((id, position)) = self.state.pointers.primary().map(|(id, t)| (id, t.current))
        else {
            return;
        };
        let Some(target) = self.interaction_target else {
            return;
        };
        self.state.action_mode.set(ActionMode::LongPress);
        self.emit_click(GestureType::LongPress, target, position, id, now, response);
    }

    fn release_pointer(&mut self, input: &PointerInput<K>, response: &mut InputResponse) {
        let id = input.pointer_id;
        if !self.state.pointers.is_pressed(id) {
            return;
        }
        let position = self.state.position_or_last(input.position);
        self.state.last_target_origin = Some(position);
        self.state.pointers.set_current(id, position);
        self.mouse_pointers.retain(|p| *p != id);
        if self.state.pointers.len() > 1 {
            self.state.pointers.on_up(id);
            return;
        }
        let target = self.interaction_target.unwrap_or(input.target);
        let ts = input.timestamp;
        match self.state.current_action_mode() {
            ActionMode::Click => {
                self.state.timers.cancel(TimerKey::LongPress);
                self.emit_click(GestureType::Click, target, position, id, ts, response);
                self.emit_click(GestureType::ClickEnd, target, position, id, ts, response);
            }
            ActionMode::LongPress => {
                self.emit_click(GestureType::ClickEnd, target, position, id, ts, response);
            }
            ActionMode::Drag => {
                self.emit_drag(GestureType::DragEnd, target, position, id, ts, response);
            }
            ActionMode::None => {}
        }
        self.state.pointers.on_up(id);
        self.end_interaction();
    }

    fn emit_click(
        &mut self,
        gesture: GestureType,
        target: K,
        position: Point,
        id: PointerId,
        timestamp: u64,
        response: &mut InputResponse,
    ) {
        if self.disabled.contains(Disabled::CLICK) {
            return;
        }
        let detail = GestureDetail::Pointer;
        self.emit(gesture, target, position, Some(id), timestamp, detail, response);
    }

    fn emit_drag(
        &mut self,
        gesture: GestureType,
        target: K,
        position: Point,
        id: PointerId,
        timestamp: u64,
        response: &mut InputResponse,
    ) {
        if self.disabled.contains(Disabled::DRAG) {
            return;
        }
        let pointers = &self.state.pointers;
        let detail = GestureDetail::Drag {
            origins: pointers.origins(),
            previous_positions: pointers.previous_positions(),
            positions: pointers.current_positions(),
        };
        self.emit(gesture, target, position, Some(id), timestamp, detail, response);
    }

    fn prevent_default_for(&self, kind: PointerKind) -> bool {
        let policy = self.effective_policy();
        match kind {
            PointerKind::Touch => policy.prevent_default_touch,
            PointerKind::Mouse | PointerKind::Pen => policy.prevent_default_mouse,
        }
    }
}
