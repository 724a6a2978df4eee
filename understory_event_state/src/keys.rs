// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key identifiers and the pressed-key set.

use alloc::collections::BTreeSet;
use alloc::string::String;
use core::fmt;

/// Identifier of a keyboard key, such as `"Shift"`, `"a"` or `"Escape"`.
///
/// This is the DOM `KeyboardEvent.key` string; no normalization is applied, so
/// `"a"` and `"A"` are distinct keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Key(String);

impl Key {
    /// Create a key identifier.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Self(key.into())
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of currently held keys.
///
/// Iteration is ordered by key identifier so snapshots compare equal
/// regardless of press order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PressedKeys {
    keys: BTreeSet<Key>,
}

impl PressedKeys {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press.
    ///
    /// Returns `false` if the key was already held (for example an OS
    /// auto-repeat), in which case nothing changes.
    pub fn press(&mut self, key: Key) -> bool {
        self.keys.insert(key)
    }

    /// Record a key release. Returns `false` if the key was not held.
    pub fn release(&mut self, key: &Key) -> bool {
        self.keys.remove(key)
    }

    /// Whether `key` is held.
    pub fn contains(&self, key: &Key) -> bool {
        self.keys.contains(key)
    }

    /// Number of held keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no key is held.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate held keys in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter()
    }

    /// Copy of the current set, for attaching to an event.
    pub fn snapshot(&self) -> BTreeSet<Key> {
        self.keys.clone()
    }

    /// Release every key.
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn repeated_press_is_ignored() {
        let mut keys = PressedKeys::new();
        assert!(keys.press(Key::from("Shift")));
        assert!(!keys.press(Key::from("Shift")));
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn release_of_unknown_key_reports_false() {
        let mut keys = PressedKeys::new();
        assert!(!keys.release(&Key::from("a")));
        keys.press(Key::from("a"));
        assert!(keys.release(&Key::from("a")));
        assert!(keys.is_empty());
    }

    #[test]
    fn snapshot_is_ordered_and_detached() {
        let mut keys = PressedKeys::new();
        keys.press(Key::from("z"));
        keys.press(Key::from("Control"));
        let snap = keys.snapshot();
        keys.clear();
        let order: Vec<&str> = snap.iter().map(Key::as_str).collect();
        assert_eq!(order, ["Control", "z"]);
        assert!(keys.is_empty());
    }
}
