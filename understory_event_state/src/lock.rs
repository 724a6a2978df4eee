// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input policy and the single-slot lock that overrides it.
//!
//! A [`Policy`] says whether the engine produces gestures at all and whether
//! the host should prevent the platform default for each input family. The
//! configured policy is the default; a collaborator may temporarily override
//! parts of it with [`LockSlot::set`]. There is one slot: the last writer
//! wins and a reset clears whatever lock is held, regardless of who set it.
//!
//! ```
//! use understory_event_state::lock::{LockSlot, Policy, PolicyOverrides};
//!
//! let defaults = Policy::default();
//! let mut lock: LockSlot<u32> = LockSlot::new();
//!
//! lock.set(7, PolicyOverrides { enabled: Some(false), ..PolicyOverrides::default() });
//! assert!(!lock.effective(&defaults).enabled);
//! assert_eq!(lock.origin(), Some(&7));
//!
//! lock.reset();
//! assert_eq!(lock.effective(&defaults), defaults);
//! ```

/// Effective enable and prevent-default policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Policy {
    /// Whether gestures are produced at all.
    pub enabled: bool,
    /// Prevent the platform default for wheel input.
    pub prevent_default_wheel: bool,
    /// Prevent the platform default for mouse input.
    pub prevent_default_mouse: bool,
    /// Prevent the platform default for touch input.
    pub prevent_default_touch: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            enabled: true,
            prevent_default_wheel: true,
            prevent_default_mouse: false,
            prevent_default_touch: true,
        }
    }
}

/// Partial policy; `None` fields fall through to the defaults.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct PolicyOverrides {
    /// Override for [`Policy::enabled`].
    pub enabled: Option<bool>,
    /// Override for [`Policy::prevent_default_wheel`].
    pub prevent_default_wheel: Option<bool>,
    /// Override for [`Policy::prevent_default_mouse`].
    pub prevent_default_mouse: Option<bool>,
    /// Override for [`Policy::prevent_default_touch`].
    pub prevent_default_touch: Option<bool>,
}

impl PolicyOverrides {
    /// Overrides that only disable the engine.
    pub fn disabled() -> Self {
        Self {
            enabled: Some(false),
            ..Self::default()
        }
    }

    /// Apply these overrides on top of `base`.
    pub fn apply(&self, base: &Policy) -> Policy {
        Policy {
            enabled: self.enabled.unwrap_or(base.enabled),
            prevent_default_wheel: self
                .prevent_default_wheel
                .unwrap_or(base.prevent_default_wheel),
            prevent_default_mouse: self
                .prevent_default_mouse
                .unwrap_or(base.prevent_default_mouse),
            prevent_default_touch: self
                .prevent_default_touch
                .unwrap_or(base.prevent_default_touch),
        }
    }
}

/// A held lock: who set it and what it overrides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockState<K> {
    /// Node that installed the lock.
    pub origin: K,
    /// Overridden policy fields.
    pub overrides: PolicyOverrides,
}

/// Single lock slot.
#[derive(Clone, Debug)]
pub struct LockSlot<K> {
    state: Option<LockState<K>>,
}

impl<K> LockSlot<K> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Install a lock, replacing any lock already held.
    ///
    /// Returns the replaced lock, if there was one.
    pub fn set(&mut self, origin: K, overrides: PolicyOverrides) -> Option<LockState<K>> {
        self.state.replace(LockState { origin, overrides })
    }

    /// Clear the slot. Returns the lock that was held.
    pub fn reset(&mut self) -> Option<LockState<K>> {
        self.state.take()
    }

    /// The held lock, if any.
    pub fn get(&self) -> Option<&LockState<K>> {
        self.state.as_ref()
    }

    /// Node that installed the held lock.
    pub fn origin(&self) -> Option<&K> {
        self.state.as_ref().map(|s| &s.origin)
    }

    /// Whether a lock is held.
    pub fn is_locked(&self) -> bool {
        self.state.is_some()
    }

    /// Merge the held overrides (if any) over `defaults`.
    pub fn effective(&self, defaults: &Policy) -> Policy {
        match &self.state {
            Some(lock) => lock.overrides.apply(defaults),
            None => *defaults,
        }
    }
}

impl<K> Default for LockSlot<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_yields_defaults() {
        let lock: LockSlot<u8> = LockSlot::new();
        let defaults = Policy {
            enabled: true,
            prevent_default_wheel: false,
            prevent_default_mouse: true,
            prevent_default_touch: false,
        };
        assert_eq!(lock.effective(&defaults), defaults);
        assert!(!lock.is_locked());
    }

    #[test]
    fn overrides_only_touch_named_fields() {
        let mut lock = LockSlot::new();
        lock.set(
            1_u8,
            PolicyOverrides {
                prevent_default_mouse: Some(true),
                ..PolicyOverrides::default()
            },
        );
        let effective = lock.effective(&Policy::default());
        assert!(effective.enabled);
        assert!(effective.prevent_default_mouse);
        assert_eq!(
            effective.prevent_default_wheel,
            Policy::default().prevent_default_wheel
        );
    }

    #[test]
    fn last_writer_wins() {
        let mut lock = LockSlot::new();
        assert!(lock.set(1_u8, PolicyOverrides::disabled()).is_none());
        let replaced = lock.set(2_u8, PolicyOverrides::default());
        assert_eq!(replaced.map(|l| l.origin), Some(1));
        assert_eq!(lock.origin(), Some(&2));
        assert!(lock.effective(&Policy::default()).enabled);
    }

    #[test]
    fn reset_restores_defaults_exactly() {
        let defaults = Policy::default();
        let mut lock = LockSlot::new();
        lock.set(
            3_u8,
            PolicyOverrides {
                enabled: Some(false),
                prevent_default_wheel: Some(false),
                prevent_default_mouse: Some(true),
                prevent_default_touch: Some(false),
            },
        );
        assert_ne!(lock.effective(&defaults), defaults);
        assert_eq!(lock.reset().map(|l| l.origin), Some(3));
        assert_eq!(lock.effective(&defaults), defaults);
        assert!(lock.reset().is_none());
    }
}
