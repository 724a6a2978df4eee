// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Event State: the input state store behind a gesture engine.
//!
//! ## Overview
//!
//! This crate holds the canonical, mutable input state that gesture
//! normalizers read and write while turning raw keyboard, wheel, mouse and
//! touch events into gestures. It performs no dispatch and owns no callbacks
//! other than change subscribers; `understory_gesture` builds the engine on
//! top of it.
//!
//! ## Pieces
//!
//! - [`mode`]: [`InputDevice`], [`ClickMode`] and [`ActionMode`].
//! - [`keys`]: [`Key`] identifiers and the [`PressedKeys`] set.
//! - [`pointer`]: [`PointerPositions`], per-pointer origin, previous and
//!   current positions with move-threshold tracking.
//! - [`timer`]: [`Timers`], named deadlines the host drives with its clock.
//! - [`lock`]: [`Policy`], [`PolicyOverrides`] and the single-slot
//!   [`LockSlot`].
//! - [`observable`]: [`Observable`], a value cell with change subscribers.
//! - [`state`]: [`InputState`], everything above bundled per engine.
//!
//! ## Example
//!
//! ```
//! use kurbo::Point;
//! use understory_event_state::{ActionMode, InputState, TimerKey};
//!
//! let mut state: InputState<u32> = InputState::new(5.0);
//! state.pointers.on_down(1, Point::new(10.0, 10.0));
//! state.action_mode.set(ActionMode::Click);
//! state.timers.schedule(TimerKey::LongPress, 500);
//!
//! // The pointer travels past the threshold: the long press is off.
//! if state.pointers.on_move(1, Point::new(30.0, 10.0)) == Some(true) {
//!     state.timers.cancel(TimerKey::LongPress);
//!     state.action_mode.set(ActionMode::Drag);
//! }
//! assert_eq!(state.current_action_mode(), ActionMode::Drag);
//! assert!(state.timers.is_empty());
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: `no_std` builds relying on `libm` for float math.
//! - `serde`: derives serde traits for modes, keys and policy overrides.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod keys;
pub mod lock;
pub mod mode;
pub mod observable;
pub mod pointer;
pub mod state;
pub mod timer;

pub use keys::{Key, PressedKeys};
pub use lock::{LockSlot, LockState, Policy, PolicyOverrides};
pub use mode::{ActionMode, ClickMode, InputDevice};
pub use observable::{Observable, SubscriptionId};
pub use pointer::{PointerId, PointerPositions, PositionMap, Track};
pub use state::InputState;
pub use timer::{Timer, TimerId, TimerKey, Timers};
