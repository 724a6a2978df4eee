// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Callback signature and the request queue callbacks write to.
//!
//! Tool behaviors and listeners cannot borrow the engine while it dispatches.
//! Instead they push [`Request`]s; the engine applies them in order once the
//! dispatch completes.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use understory_event_state::{ClickMode, PolicyOverrides};

use crate::event::GestureEvent;
use crate::registry::SetToolOptions;

/// Gesture callback. Receives the event, the node currently handling it and
/// the request queue. Returning `true` consumes the gesture.
pub type Handler<K> = Box<dyn FnMut(&GestureEvent<K>, K, &mut Requests<K>) -> bool>;

/// Callback run on tool activation or deactivation.
pub type ToolHook = Box<dyn FnMut(ClickMode)>;

/// A deferred engine mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum Request<K> {
    /// Install a lock.
    Lock {
        /// Lock holder.
        origin: K,
        /// Overridden policy fields.
        overrides: PolicyOverrides,
    },
    /// Clear the lock.
    ResetLock,
    /// Switch the active tool.
    SetTool {
        /// Tool name.
        name: String,
        /// Click mode slot to assign.
        mode: ClickMode,
        /// Switch options.
        options: SetToolOptions,
    },
    /// Ask the host to prevent the platform default for the raw event.
    PreventDefault,
}

/// Queue of requests issued during one dispatch.
#[derive(Clone, Debug)]
pub struct Requests<K> {
    queue: Vec<Request<K>>,
}

impl<K> Default for Requests<K> {
    fn default() -> Self {
        Self { queue: Vec::new() }
    }
}

impl<K> Requests<K> {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the engine policy on behalf of `origin`.
    pub fn lock(&mut self, origin: K, overrides: PolicyOverrides) {
        self.queue.push(Request::Lock { origin, overrides });
    }

    /// Clear whatever lock is held.
    pub fn reset_lock(&mut self) {
        self.queue.push(Request::ResetLock);
    }

    /// Switch `mode` to the tool `name`.
    pub fn set_tool(&mut self, name: impl Into<String>, mode: ClickMode, options: SetToolOptions) {
        self.queue.push(Request::SetTool {
            name: name.into(),
            mode,
            options,
        });
    }

    /// Prevent the platform default.
    pub fn prevent_default(&mut self) {
        self.queue.push(Request::PreventDefault);
    }

    /// Number of queued requests.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take the queued requests, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = Request<K>> + '_ {
        self.queue.drain(..)
    }
}
