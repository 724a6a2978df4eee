// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw input entry points.
//!
//! Each submodule adds one family of `on_*` methods to
//! [`GestureEngine`](crate::GestureEngine):
//!
//! - [`key`]: `on_key_down` and `on_key_up`.
//! - [`wheel`]: `on_wheel`, classifying trackpad scroll, pinch and mouse wheel.
//! - [`pointer`]: mouse and touch input driving the click, long-press and
//!   drag state machine.
//!
//! Every entry point first checks that the raw kind is attached, the effective
//! policy is enabled and no node on the target's ancestry opted out. If any of
//! those fails the event is dropped without touching state.

pub mod key;
pub mod pointer;
pub mod wheel;
