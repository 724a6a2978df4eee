// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_gesture --heading-base-level=0

//! Understory Gesture: input normalization and gesture dispatch.
//!
//! ## Overview
//!
//! A [`GestureEngine`] turns raw keyboard, wheel, mouse and touch events into
//! a small vocabulary of gestures (`click`, `long-press`, `drag`,
//! `trackpad-pinch`, `key-pressed` and friends) and routes each gesture to
//! the active tool and to listeners registered on the target's ancestry.
//!
//! The engine does no hit testing and owns no UI tree. The host tells it the
//! target of each raw event and answers ancestry questions through
//! [`NodeLookup`]. Time is host-driven as well: raw events carry timestamps
//! and the host calls [`GestureEngine::poll_timers`] once
//! [`GestureEngine::next_deadline`] passes.
//!
//! ## Pieces
//!
//! - [`normalize`]: the key, wheel and pointer entry points.
//! - [`dispatcher`]: tool-then-listeners resolution with stop semantics.
//! - [`listeners`]: the per-node [`ListenerTable`].
//! - [`registry`]: tools, their substrate nodes, key bindings and behaviors.
//! - [`handler`]: callback types and the deferred [`Requests`] queue.
//! - [`engine`]: configuration, lock, timers, hooks and teardown.
//! - [`instances`]: an [`EngineRegistry`] for hosts running several engines.
//!
//! State shared by the normalizers (modes, pointers, pressed keys, timers and
//! the lock) lives in [`understory_event_state`].
//!
//! ## Example
//!
//! ```
//! use kurbo::Point;
//! use understory_gesture::{
//!     GestureConfig, GestureEngine, GestureType, ListenerOptions, NoParent, PointerInput,
//! };
//!
//! let mut engine: GestureEngine<u32, _> =
//!     GestureEngine::new(GestureConfig::default(), NoParent).unwrap();
//! engine
//!     .add_listener(7, GestureType::Click, ListenerOptions::default(), |ev, _, _| {
//!         assert_eq!(ev.position, Point::new(4.0, 4.0));
//!         true
//!     })
//!     .unwrap();
//!
//! engine.on_pointer_down(PointerInput::mouse(7, 0, Point::new(4.0, 4.0), 0));
//! let r = engine.on_pointer_up(PointerInput::mouse(7, 0, Point::new(4.0, 4.0), 80));
//! assert!(r.consumed);
//! assert_eq!(
//!     r.gestures.as_slice(),
//!     &[GestureType::Click, GestureType::ClickEnd]
//! );
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: `no_std` builds relying on `libm` for float math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod event;
pub mod handler;
pub mod instances;
pub mod listeners;
pub mod normalize;
pub mod raw;
pub mod registry;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::{Disabled, GestureConfig};
pub use engine::{GestureEngine, InputResponse};
pub use error::GestureError;
pub use event::{GestureDetail, GestureEvent};
pub use handler::{Handler, Request, Requests, ToolHook};
pub use instances::{EngineId, EngineRegistry};
pub use listeners::{ListenerId, ListenerOptions, ListenerTable, Stop};
pub use raw::{
    CustomInput, KeyInput, MOUSE_POINTER_ID, PointerInput, PointerKind, RawEvents, SelectInput,
    TouchInput, TouchPoint, WheelInput,
};
pub use registry::{SetToolOptions, ToolBehavior, ToolChange, ToolRegistry};
pub use types::{CustomGesture, GestureType, GestureTypes, NoParent, NodeLookup, path_to_root};
