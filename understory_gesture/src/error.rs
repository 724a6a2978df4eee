// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wiring and configuration errors.

use alloc::string::String;

use understory_event_state::Key;

use crate::instances::EngineId;

/// Error returned when a name, key or id does not resolve, or when the
/// configuration is unusable.
///
/// Raw input never produces these; they indicate a mistake in how the host
/// or a collaborator wired the engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GestureError {
    /// No tool nodes or behavior are registered under this name.
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
    /// No tool is bound to this key.
    #[error("no tool is bound to key `{0}`")]
    UnboundKey(Key),
    /// The gesture type name is neither built in nor registered.
    #[error("unknown gesture type `{0}`")]
    UnknownGestureType(String),
    /// The gesture type name is built in or was registered before.
    #[error("gesture type `{0}` is already registered")]
    DuplicateGestureType(String),
    /// A configuration field holds an unusable value.
    #[error("invalid configuration for `{field}`: {message}")]
    InvalidConfig {
        /// Option name, as spelled in the serialized configuration.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
    /// The engine id is stale or was never issued.
    #[error("no engine with id {0:?}")]
    UnknownEngine(EngineId),
    /// The engine was destroyed and no longer accepts registrations.
    #[error("engine has been destroyed")]
    Destroyed,
}
