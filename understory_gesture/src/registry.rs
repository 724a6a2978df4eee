// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tool/substrate registry.
//!
//! A tool is a named bundle of gesture behavior. Nodes register as the tool's
//! substrate: while the tool is active for the interaction's click mode, the
//! first substrate node on the target's ancestry gets the gesture before any
//! ordinary listener. A substrate node may be embedded into another node, in
//! which case the tool acts on that target instead.
//!
//! Membership is non-owning. Hosts remove nodes explicitly with
//! [`ToolRegistry::remove_node`]; [`ToolRegistry::cleanup`] additionally
//! prunes whatever the host's [`NodeLookup`] reports as dead.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use understory_event_state::ClickMode;
//! use understory_gesture::registry::{SetToolOptions, ToolBehavior, ToolRegistry};
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let mut tools: ToolRegistry<u32> = ToolRegistry::new();
//! for name in ["pen", "eraser"] {
//!     tools.add_tool(name, 1, None);
//!     let (a, d) = (log.clone(), log.clone());
//!     tools.set_tool_behavior(
//!         name,
//!         ToolBehavior::new()
//!             .on_activate(move |_| a.borrow_mut().push(format!("+{name}")))
//!             .on_deactivate(move |_| d.borrow_mut().push(format!("-{name}"))),
//!     );
//! }
//!
//! tools.set_tool("pen", ClickMode::Left, SetToolOptions::default()).unwrap();
//! tools.set_tool("eraser", ClickMode::Left, SetToolOptions::default()).unwrap();
//! assert_eq!(*log.borrow(), ["+pen", "-pen", "+eraser"]);
//! assert_eq!(tools.current_tool(ClickMode::Left), Some("eraser"));
//! ```

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::{SmallVec, smallvec};
use understory_event_state::{ClickMode, Key};

use crate::error::GestureError;
use crate::event::GestureEvent;
use crate::handler::{Handler, Requests, ToolHook};
use crate::types::{GestureType, NodeLookup};

/// Capability record of a tool: optional behavior per gesture type and
/// optional lifecycle hooks.
pub struct ToolBehavior<K> {
    handlers: HashMap<GestureType, Handler<K>>,
    on_activate: Option<ToolHook>,
    on_deactivate: Option<ToolHook>,
    on_select: Option<Box<dyn FnMut(bool)>>,
}

impl<K> fmt::Debug for ToolBehavior<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolBehavior")
            .field("handlers", &self.handlers.keys().collect::<SmallVec<[_; 8]>>())
            .field("on_activate", &self.on_activate.is_some())
            .field("on_deactivate", &self.on_deactivate.is_some())
            .field("on_select", &self.on_select.is_some())
            .finish()
    }
}

impl<K> Default for ToolBehavior<K> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
            on_activate: None,
            on_deactivate: None,
            on_select: None,
        }
    }
}

impl<K> ToolBehavior<K> {
    /// A behavior with no slots filled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle `gesture`. Returning `true` consumes it.
    pub fn on(
        mut self,
        gesture: GestureType,
        handler: impl FnMut(&GestureEvent<K>, K, &mut Requests<K>) -> bool + 'static,
    ) -> Self {
        self.handlers.insert(gesture, Box::new(handler));
        self
    }

    /// Run when the tool becomes active for a click mode.
    pub fn on_activate(mut self, hook: impl FnMut(ClickMode) + 'static) -> Self {
        self.on_activate = Some(Box::new(hook));
        self
    }

    /// Run when the tool stops being active for a click mode.
    pub fn on_deactivate(mut self, hook: impl FnMut(ClickMode) + 'static) -> Self {
        self.on_deactivate = Some(Box::new(hook));
        self
    }

    /// Run when the tool is selected (`true`) or deselected (`false`).
    pub fn on_select(mut self, hook: impl FnMut(bool) + 'static) -> Self {
        self.on_select = Some(Box::new(hook));
        self
    }

    /// Whether the behavior handles `gesture`.
    pub fn handles(&self, gesture: GestureType) -> bool {
        self.handlers.contains_key(&gesture)
    }

    pub(crate) fn handler_mut(&mut self, gesture: GestureType) -> Option<&mut Handler<K>> {
        self.handlers.get_mut(&gesture)
    }
}

/// Options for [`ToolRegistry::set_tool`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SetToolOptions {
    /// Move the selection to the new tool.
    pub select: bool,
    /// Run deactivation and activation hooks.
    pub activate: bool,
    /// Also make the tool active for [`ClickMode::None`].
    pub set_as_no_action: bool,
}

impl Default for SetToolOptions {
    fn default() -> Self {
        Self {
            select: true,
            activate: true,
            set_as_no_action: false,
        }
    }
}

/// Result of [`ToolRegistry::set_tool`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolChange {
    /// Slot that was assigned.
    pub mode: ClickMode,
    /// Tool active before the call.
    pub previous: Option<String>,
    /// Tool active after the call.
    pub current: String,
    /// Whether the slot changed.
    pub changed: bool,
}

/// Registry of tools, their substrate nodes and the active tool per click mode.
pub struct ToolRegistry<K> {
    tools: HashMap<String, SmallVec<[K; 2]>>,
    behaviors: HashMap<String, ToolBehavior<K>>,
    current: BTreeMap<ClickMode, String>,
    key_bindings: BTreeMap<Key, String>,
    embedded: HashMap<K, K>,
    selected: BTreeSet<String>,
}

impl<K: fmt::Debug> fmt::Debug for ToolRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools)
            .field("behaviors", &self.behaviors.len())
            .field("current", &self.current)
            .field("key_bindings", &self.key_bindings)
            .field("embedded", &self.embedded)
            .field("selected", &self.selected)
            .finish()
    }
}

impl<K> Default for ToolRegistry<K> {
    fn default() -> Self {
        Self {
            tools: HashMap::new(),
            behaviors: HashMap::new(),
            current: BTreeMap::new(),
            key_bindings: BTreeMap::new(),
            embedded: HashMap::new(),
            selected: BTreeSet::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + fmt::Debug> ToolRegistry<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` as substrate of the tool `name`, optionally binding `key`
    /// to the tool.
    ///
    /// Registering the same node twice is a no-op. Returns whether the node
    /// was added.
    pub fn add_tool(&mut self, name: &str, node: K, key: Option<Key>) -> bool {
        if let Some(key) = key {
            self.key_bindings.insert(key, name.into());
        }
        let nodes = self.tools.entry(name.into()).or_default();
        if nodes.contains(&node) {
            return false;
        }
        nodes.push(node);
        true
    }

    /// Install or replace the behavior of `name`.
    pub fn set_tool_behavior(&mut self, name: &str, behavior: ToolBehavior<K>) {
        self.behaviors.insert(name.into(), behavior);
    }

    /// Whether anything is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name) || self.behaviors.contains_key(name)
    }

    /// Unregister one substrate node of `name`.
    pub fn remove_tool_node(&mut self, name: &str, node: K) -> bool {
        let Some(nodes) = self.tools.get_mut(name) else {
            return false;
        };
        let before = nodes.len();
        nodes.retain(|n| *n != node);
        let removed = nodes.len() != before;
        if removed {
            self.embedded.remove(&node);
        }
        removed
    }

    /// Forget `node` everywhere: as substrate of any tool and on either side
    /// of an embedding. Returns how many registrations were dropped.
    pub fn remove_node(&mut self, node: K) -> usize {
        let mut removed = 0;
        for nodes in self.tools.values_mut() {
            let before = nodes.len();
            nodes.retain(|n| *n != node);
            removed += before - nodes.len();
        }
        let before = self.embedded.len();
        self.embedded
            .retain(|proxy, target| *proxy != node && *target != node);
        removed + (before - self.embedded.len())
    }

    /// Drop the tool `name` entirely.
    ///
    /// Runs its deactivation hook for every click mode it was active in.
    /// Returns `false` if nothing was registered under `name`.
    pub fn remove_tool(&mut self, name: &str) -> bool {
        if !self.contains(name) {
            return false;
        }
        let modes: SmallVec<[ClickMode; 4]> = self
            .current
            .iter()
            .filter(|(_, n)| n.as_str() == name)
            .map(|(m, _)| *m)
            .collect();
        for mode in modes {
            self.current.remove(&mode);
            self.deactivate(name, mode);
        }
        if self.selected.remove(name) {
            self.notify_select(name, false);
        }
        if let Some(nodes) = self.tools.remove(name) {
            for node in nodes {
                self.embedded.remove(&node);
            }
        }
        self.behaviors.remove(name);
        self.key_bindings.retain(|_, n| n.as_str() != name);
        log::debug!("removed tool `{name}`");
        true
    }

    /// Make `name` the active tool for `mode`.
    ///
    /// When the slot changes the previous tool's deactivation hook runs before
    /// the new tool's activation hook, once each. Assigning the tool already
    /// active is a no-op.
    pub fn set_tool(
        &mut self,
        name: &str,
        mode: ClickMode,
        options: SetToolOptions,
    ) -> Result<ToolChange, GestureError> {
        if !self.contains(name) {
            return Err(GestureError::UnknownTool(name.into()));
        }
        let mut modes: SmallVec<[ClickMode; 2]> = smallvec![mode];
        if options.set_as_no_action && mode != ClickMode::None {
            modes.push(ClickMode::None);
        }

        let mut change = ToolChange {
            mode,
            previous: self.current.get(&mode).cloned(),
            current: name.into(),
            changed: false,
        };
        for m in modes {
            let previous = self.current.get(&m).cloned();
            if previous.as_deref() == Some(name) {
                continue;
            }
            self.current.insert(m, name.into());
            log::debug!("tool for {m:?}: {previous:?} -> `{name}`");
            if options.activate {
                if let Some(prev) = &previous {
                    self.deactivate(prev, m);
                }
                self.activate(name, m);
            }
            if m == mode {
                change.changed = true;
            }
        }

        if change.changed && options.select && !self.selected.contains(name) {
            if let Some(prev) = &change.previous {
                if self.selected.remove(prev.as_str()) {
                    self.notify_select(prev, false);
                }
            }
            self.selected.insert(name.into());
            self.notify_select(name, true);
        }
        Ok(change)
    }

    /// Activate the tool bound to `key` for [`ClickMode::Key`].
    pub fn set_tool_by_key(&mut self, key: &Key) -> Result<ToolChange, GestureError> {
        let name = self
            .key_bindings
            .get(key)
            .cloned()
            .ok_or_else(|| GestureError::UnboundKey(key.clone()))?;
        self.set_tool(&name, ClickMode::Key, SetToolOptions::default())
    }

    /// Redirect the tool acting on `tool_node` to `target`.
    pub fn embed_tool(&mut self, tool_node: K, target: K) -> Option<K> {
        self.embedded.insert(tool_node, target)
    }

    /// Remove an embedding. Returns the previous target.
    pub fn unembed_tool(&mut self, tool_node: K) -> Option<K> {
        self.embedded.remove(&tool_node)
    }

    /// Prune nodes `lookup` reports as dead. Returns how many were dropped.
    pub fn cleanup(&mut self, lookup: &impl NodeLookup<K>) -> usize {
        let mut pruned = 0;
        for nodes in self.tools.values_mut() {
            let before = nodes.len();
            nodes.retain(|n| lookup.is_alive(n));
            pruned += before - nodes.len();
        }
        let before = self.embedded.len();
        self.embedded
            .retain(|proxy, target| lookup.is_alive(proxy) && lookup.is_alive(target));
        pruned += before - self.embedded.len();
        if pruned > 0 {
            log::debug!("tool registry cleanup pruned {pruned} entries");
        }
        pruned
    }

    /// Active tool for `mode`.
    pub fn current_tool(&self, mode: ClickMode) -> Option<&str> {
        self.current.get(&mode).map(String::as_str)
    }

    /// Substrate nodes of `name`.
    pub fn tool_nodes(&self, name: &str) -> &[K] {
        self.tools.get(name).map_or(&[][..], |n| n.as_slice())
    }

    /// Whether `name` is selected.
    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    /// Tool bound to `key`.
    pub fn tool_for_key(&self, key: &Key) -> Option<&str> {
        self.key_bindings.get(key).map(String::as_str)
    }

    /// Embedding target of `tool_node`.
    pub fn embedded_target(&self, tool_node: K) -> Option<K> {
        self.embedded.get(&tool_node).copied()
    }

    /// First node of `path` registered as substrate of `name`.
    pub fn bound_node(&self, name: &str, path: &[K]) -> Option<K> {
        let nodes = self.tools.get(name)?;
        path.iter().copied().find(|n| nodes.contains(n))
    }

    /// Registered tool names.
    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.tools
            .keys()
            .chain(self.behaviors.keys().filter(|n| !self.tools.contains_key(*n)))
            .map(String::as_str)
    }

    /// Drop every registration without running hooks.
    pub fn clear(&mut self) {
        self.tools.clear();
        self.behaviors.clear();
        self.current.clear();
        self.key_bindings.clear();
        self.embedded.clear();
        self.selected.clear();
    }

    /// Behavior installed for `name`.
    pub fn behavior(&self, name: &str) -> Option<&ToolBehavior<K>> {
        self.behaviors.get(name)
    }

    pub(crate) fn behavior_mut(&mut self, name: &str) -> Option<&mut ToolBehavior<K>> {
        self.behaviors.get_mut(name)
    }

    fn activate(&mut self, name: &str, mode: ClickMode) {
        if let Some(hook) = self
            .behaviors
            .get_mut(name)
            .and_then(|b| b.on_activate.as_mut())
        {
            hook(mode);
        }
    }

    fn deactivate(&mut self, name: &str, mode: ClickMode) {
        if let Some(hook) = self
            .behaviors
            .get_mut(name)
            .and_then(|b| b.on_deactivate.as_mut())
        {
            hook(mode);
        }
    }

    fn notify_select(&mut self, name: &str, selected: bool) {
        if let Some(hook) = self
            .behaviors
            .get_mut(name)
            .and_then(|b| b.on_select.as_mut())
        {
            hook(selected);
        }
    }
}
