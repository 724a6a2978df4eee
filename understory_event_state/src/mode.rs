// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device, click, and action modes.

/// Best-effort classification of the device that produced the latest input.
///
/// Browsers and most windowing systems do not expose physical device identity,
/// so this is inferred from event shape by the normalizers and may be wrong.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum InputDevice {
    /// No input seen yet.
    #[default]
    Unknown,
    /// A mouse with a discrete wheel.
    Mouse,
    /// A trackpad (continuous scroll, pinch via ctrl+wheel).
    Trackpad,
    /// A touch screen.
    Touch,
}

/// Which button or category initiated the current interaction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ClickMode {
    /// Nothing pressed.
    #[default]
    None,
    /// Primary button, or a touch contact.
    Left,
    /// Secondary button.
    Right,
    /// Auxiliary (wheel) button.
    Middle,
    /// Any other button code.
    Other,
    /// Keyboard-driven interaction.
    Key,
}

impl ClickMode {
    /// Map a DOM-style `MouseEvent.button` code to a click mode.
    ///
    /// `0` is the primary button, `1` the auxiliary button and `2` the
    /// secondary button. Every other code maps to [`ClickMode::Other`].
    pub const fn from_button(button: u16) -> Self {
        match button {
            0 => Self::Left,
            1 => Self::Middle,
            2 => Self::Right,
            _ => Self::Other,
        }
    }
}

/// The gesture state-machine variable.
///
/// `Click` is the pending state entered on the first pointer down: the
/// interaction becomes a plain click on release unless it turns into a
/// long press or a drag first.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ActionMode {
    /// No active interaction.
    #[default]
    None,
    /// A pointer is down and has neither moved past the threshold nor been held.
    Click,
    /// The long-press timer fired while the pointer was still.
    LongPress,
    /// A pointer moved past the threshold.
    Drag,
}

impl ActionMode {
    /// Whether an interaction is in progress.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }
}
