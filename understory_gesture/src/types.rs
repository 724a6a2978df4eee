// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: the gesture vocabulary and node ancestry lookup.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::error::GestureError;

/// Handle of a registered custom gesture type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomGesture(pub(crate) u32);

/// Gesture vocabulary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GestureType {
    /// `key-pressed`
    KeyPressed,
    /// `key-released`
    KeyReleased,
    /// `click`
    Click,
    /// `click-start`
    ClickStart,
    /// `click-end`
    ClickEnd,
    /// `long-press`
    LongPress,
    /// `move`
    Move,
    /// `drag-start`
    DragStart,
    /// `drag`
    Drag,
    /// `drag-end`
    DragEnd,
    /// `trackpad-scroll`
    TrackpadScroll,
    /// `trackpad-pinch`
    TrackpadPinch,
    /// `mouse-wheel`
    MouseWheel,
    /// `select-input`
    SelectInput,
    /// A type registered with
    /// [`GestureEngine::register_gesture_type`](crate::GestureEngine::register_gesture_type).
    Custom(CustomGesture),
}

const BUILTIN: [(GestureType, &str); 14] = [
    (GestureType::KeyPressed, "key-pressed"),
    (GestureType::KeyReleased, "key-released"),
    (GestureType::Click, "click"),
    (GestureType::ClickStart, "click-start"),
    (GestureType::ClickEnd, "click-end"),
    (GestureType::LongPress, "long-press"),
    (GestureType::Move, "move"),
    (GestureType::DragStart, "drag-start"),
    (GestureType::Drag, "drag"),
    (GestureType::DragEnd, "drag-end"),
    (GestureType::TrackpadScroll, "trackpad-scroll"),
    (GestureType::TrackpadPinch, "trackpad-pinch"),
    (GestureType::MouseWheel, "mouse-wheel"),
    (GestureType::SelectInput, "select-input"),
];

impl GestureType {
    /// Name of a built-in type; `None` for custom types.
    pub fn as_str(self) -> Option<&'static str> {
        BUILTIN
            .iter()
            .find(|(ty, _)| *ty == self)
            .map(|(_, name)| *name)
    }

    /// Built-in type with this name.
    pub fn from_name(name: &str) -> Option<Self> {
        BUILTIN
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(ty, _)| *ty)
    }

    /// Every built-in type.
    pub fn builtins() -> impl Iterator<Item = Self> {
        BUILTIN.iter().map(|(ty, _)| *ty)
    }

    /// Whether this is one of the click family gestures.
    pub fn is_click(self) -> bool {
        matches!(
            self,
            Self::Click | Self::ClickStart | Self::ClickEnd | Self::LongPress
        )
    }

    /// Whether this is one of the drag family gestures.
    pub fn is_drag(self) -> bool {
        matches!(self, Self::DragStart | Self::Drag | Self::DragEnd)
    }
}

impl fmt::Display for GestureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(CustomGesture(n)) => write!(f, "custom#{n}"),
            builtin => f.write_str(builtin.as_str().unwrap_or_default()),
        }
    }
}

/// Name table for built-in and registered gesture types.
#[derive(Clone, Debug, Default)]
pub struct GestureTypes {
    custom: Vec<String>,
}

impl GestureTypes {
    /// Create a table holding only the built-in vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom type.
    ///
    /// Fails if `name` is built in or already registered.
    pub fn register(&mut self, name: &str) -> Result<GestureType, GestureError> {
        if self.lookup(name).is_some() {
            return Err(GestureError::DuplicateGestureType(name.into()));
        }
        let index = u32::try_from(self.custom.len())
            .map_err(|_| GestureError::DuplicateGestureType(name.into()))?;
        self.custom.push(name.into());
        Ok(GestureType::Custom(CustomGesture(index)))
    }

    /// Resolve a name to a built-in or registered type.
    pub fn lookup(&self, name: &str) -> Option<GestureType> {
        GestureType::from_name(name).or_else(|| {
            self.custom
                .iter()
                .position(|n| n == name)
                .and_then(|i| u32::try_from(i).ok())
                .map(|i| GestureType::Custom(CustomGesture(i)))
        })
    }

    /// Name of a type, or `None` for a custom handle this table never issued.
    pub fn name_of(&self, ty: GestureType) -> Option<&str> {
        match ty {
            GestureType::Custom(CustomGesture(i)) => usize::try_from(i)
                .ok()
                .and_then(|i| self.custom.get(i))
                .map(String::as_str),
            builtin => builtin.as_str(),
        }
    }

    /// Registered custom names, in registration order.
    pub fn custom_names(&self) -> impl Iterator<Item = &str> {
        self.custom.iter().map(String::as_str)
    }

    /// Forget every custom type.
    pub fn clear(&mut self) {
        self.custom.clear();
    }
}

/// Host-provided ancestry and liveness of UI nodes.
pub trait NodeLookup<K> {
    /// Parent of `node`, or `None` at a root.
    fn parent_of(&self, node: &K) -> Option<K>;

    /// Whether `node` still exists. Used by advisory registry cleanup.
    fn is_alive(&self, _node: &K) -> bool {
        true
    }
}

/// Lookup for flat hosts: every node is a root.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoParent;

impl<K> NodeLookup<K> for NoParent {
    fn parent_of(&self, _node: &K) -> Option<K> {
        None
    }
}

impl<K: Copy + Eq + Hash> NodeLookup<K> for HashMap<K, K> {
    fn parent_of(&self, node: &K) -> Option<K> {
        self.get(node).copied()
    }
}

/// Upper bound on the ancestry walk, guarding against cyclic lookups.
const MAX_DEPTH: usize = 1024;

/// Path from `target` up to its root, target first.
pub fn path_to_root<K: Copy + PartialEq>(target: K, lookup: &impl NodeLookup<K>) -> Vec<K> {
    let mut out = Vec::new();
    let mut cur = target;
    loop {
        out.push(cur);
        if out.len() >= MAX_DEPTH {
            break;
        }
        match lookup.parent_of(&cur) {
            Some(p) if p != cur => cur = p,
            _ => break,
        }
    }
    out
}
