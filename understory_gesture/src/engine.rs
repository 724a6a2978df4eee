// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The gesture engine: state, registries, hooks and the dispatch pipeline.
//!
//! Raw entry points live in [`crate::normalize`]; this module holds what they
//! share. Every entry point returns an [`InputResponse`] describing what fired
//! and whether the host should prevent the platform default.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;
use core::hash::Hash;

use kurbo::Point;
use smallvec::SmallVec;
use understory_event_state::{
    ClickMode, InputState, Key, PointerId, Policy, PolicyOverrides, TimerKey,
};

use crate::config::{Disabled, GestureConfig};
use crate::dispatcher::{self, DispatchReport};
use crate::error::GestureError;
use crate::event::{GestureDetail, GestureEvent};
use crate::handler::{Request, Requests};
use crate::listeners::{ListenerId, ListenerOptions, ListenerTable};
use crate::raw::{CustomInput, RawEvents, SelectInput};
use crate::registry::{SetToolOptions, ToolBehavior, ToolChange, ToolRegistry};
use crate::types::{GestureType, GestureTypes, NodeLookup, path_to_root};

type ScaleHook<K> = Box<dyn Fn(Point, K) -> Point>;
type NodePredicate<K> = Box<dyn Fn(K) -> bool>;
type OptOutHook<K> = Box<dyn Fn(K, RawEvents) -> bool>;

/// What one raw event or timer poll produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputResponse {
    /// The host should prevent the platform default for the raw event.
    pub prevent_default: bool,
    /// Some tool or listener consumed a fired gesture.
    pub consumed: bool,
    /// Gestures fired, in order.
    pub gestures: SmallVec<[GestureType; 4]>,
    /// Timers that came due, for [`GestureEngine::poll_timers`].
    pub timers: SmallVec<[TimerKey; 2]>,
}

impl InputResponse {
    /// Whether `gesture` fired.
    pub fn fired(&self, gesture: GestureType) -> bool {
        self.gestures.contains(&gesture)
    }

    /// Fold `other` into `self`.
    pub fn merge(&mut self, other: Self) {
        self.prevent_default |= other.prevent_default;
        self.consumed |= other.consumed;
        self.gestures.extend(other.gestures);
        self.timers.extend(other.timers);
    }
}

/// Input normalization and gesture dispatch for one UI surface.
///
/// `K` is the host's node handle; `L` answers ancestry questions about those
/// nodes. The engine is single-threaded: feed it raw events in arrival order
/// and call [`poll_timers`](Self::poll_timers) when
/// [`next_deadline`](Self::next_deadline) passes.
pub struct GestureEngine<K, L> {
    pub(crate) config: GestureConfig,
    pub(crate) defaults: Policy,
    pub(crate) disabled: Disabled,
    pub(crate) state: InputState<K>,
    pub(crate) tools: ToolRegistry<K>,
    pub(crate) listeners: ListenerTable<K>,
    pub(crate) gesture_types: GestureTypes,
    pub(crate) lookup: L,
    pub(crate) raw_listeners: RawEvents,
    /// Node the current pointer interaction started on.
    pub(crate) interaction_target: Option<K>,
    /// Active pointers that came from a mouse or pen.
    pub(crate) mouse_pointers: SmallVec<[PointerId; 2]>,
    scale: Option<ScaleHook<K>>,
    authorize_scaling: Option<NodePredicate<K>>,
    opt_out: Option<OptOutHook<K>>,
    destroyed: bool,
}

impl<K: fmt::Debug, L> fmt::Debug for GestureEngine<K, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("tools", &self.tools)
            .field("listeners", &self.listeners)
            .field("raw_listeners", &self.raw_listeners)
            .field("interaction_target", &self.interaction_target)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl<K, L> GestureEngine<K, L>
where
    K: Copy + Eq + Hash + fmt::Debug + 'static,
    L: NodeLookup<K>,
{
    /// Build an engine for `config`.
    pub fn new(config: GestureConfig, lookup: L) -> Result<Self, GestureError> {
        config.validate()?;
        let mut state = InputState::new(config.move_threshold);
        state
            .input_device
            .subscribe(|device| log::debug!("input device -> {device:?}"));
        state
            .action_mode
            .subscribe(|mode| log::debug!("action mode -> {mode:?}"));
        let raw_listeners = config.raw_events();
        log::debug!("gesture engine listening to {raw_listeners:?}");
        Ok(Self {
            defaults: config.default_policy(),
            disabled: config.disabled(),
            config,
            state,
            tools: ToolRegistry::new(),
            listeners: ListenerTable::new(),
            gesture_types: GestureTypes::new(),
            lookup,
            raw_listeners,
            interaction_target: None,
            mouse_pointers: SmallVec::new(),
            scale: None,
            authorize_scaling: None,
            opt_out: None,
            destroyed: false,
        })
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Input state, for inspection and subscriptions.
    pub fn state(&self) -> &InputState<K> {
        &self.state
    }

    /// Mutable input state, for subscribing to mode changes.
    pub fn state_mut(&mut self) -> &mut InputState<K> {
        &mut self.state
    }

    /// Tool registry.
    pub fn tools(&self) -> &ToolRegistry<K> {
        &self.tools
    }

    /// Mutable tool registry, for embedding and node removal.
    pub fn tools_mut(&mut self) -> &mut ToolRegistry<K> {
        &mut self.tools
    }

    /// The host's ancestry lookup.
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Mutable ancestry lookup, for hosts that keep their tree in it.
    pub fn lookup_mut(&mut self) -> &mut L {
        &mut self.lookup
    }

    /// Node the current pointer interaction started on.
    pub fn interaction_target(&self) -> Option<K> {
        self.interaction_target
    }

    /// Raw event kinds currently attached.
    pub fn raw_listeners(&self) -> RawEvents {
        self.raw_listeners
    }

    /// Number of attached raw listeners, one per built-in kind plus one per
    /// registered custom type.
    pub fn attached_listener_count(&self) -> usize {
        let builtin = self.raw_listeners.difference(RawEvents::CUSTOM).iter().count();
        let custom = if self.raw_listeners.contains(RawEvents::CUSTOM) {
            self.gesture_types.custom_names().count()
        } else {
            0
        };
        builtin + custom
    }

    /// Number of registered gesture listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether [`destroy`](Self::destroy) ran.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Install the position scaling hook used when scaling is authorized.
    pub fn set_scale_event_position(&mut self, hook: impl Fn(Point, K) -> Point + 'static) {
        self.scale = Some(Box::new(hook));
    }

    /// Decide per target whether to scale positions, overriding
    /// [`GestureConfig::authorize_event_scaling`].
    pub fn set_authorize_event_scaling(&mut self, predicate: impl Fn(K) -> bool + 'static) {
        self.authorize_scaling = Some(Box::new(predicate));
    }

    /// Let nodes opt out of gesture handling for a raw event kind. When the
    /// predicate holds for the raw target or an ancestor, the engine ignores
    /// the event and the platform default proceeds.
    pub fn set_opt_out(&mut self, predicate: impl Fn(K, RawEvents) -> bool + 'static) {
        self.opt_out = Some(Box::new(predicate));
    }

    // --- listeners ---

    /// Listen for `gesture` on `target`.
    pub fn add_listener(
        &mut self,
        target: K,
        gesture: GestureType,
        options: ListenerOptions,
        callback: impl FnMut(&GestureEvent<K>, K, &mut Requests<K>) -> bool + 'static,
    ) -> Result<ListenerId, GestureError> {
        self.ensure_alive()?;
        Ok(self.listeners.add(target, gesture, None, options, callback))
    }

    /// Listen for `gesture` on `target` while the tool `tool_name` is active.
    pub fn add_tool_listener(
        &mut self,
        target: K,
        gesture: GestureType,
        tool_name: &str,
        options: ListenerOptions,
        callback: impl FnMut(&GestureEvent<K>, K, &mut Requests<K>) -> bool + 'static,
    ) -> Result<ListenerId, GestureError> {
        self.ensure_alive()?;
        Ok(self
            .listeners
            .add(target, gesture, Some(tool_name.into()), options, callback))
    }

    /// Remove a listener.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Remove every listener on `target`.
    pub fn remove_listeners_for(&mut self, target: K) -> usize {
        self.listeners.remove_target(target)
    }

    /// Forget `node`: its listeners and its tool registrations.
    pub fn remove_node(&mut self, node: K) -> usize {
        self.listeners.remove_target(node) + self.tools.remove_node(node)
    }

    // --- tools ---

    /// Register `node` as substrate of the tool `name`.
    pub fn add_tool(
        &mut self,
        name: &str,
        node: K,
        key: Option<Key>,
    ) -> Result<bool, GestureError> {
        self.ensure_alive()?;
        Ok(self.tools.add_tool(name, node, key))
    }

    /// Install the behavior of `name`.
    pub fn set_tool_behavior(
        &mut self,
        name: &str,
        behavior: ToolBehavior<K>,
    ) -> Result<(), GestureError> {
        self.ensure_alive()?;
        self.tools.set_tool_behavior(name, behavior);
        Ok(())
    }

    /// Make `name` the active tool for `mode`.
    pub fn set_tool(
        &mut self,
        name: &str,
        mode: ClickMode,
        options: SetToolOptions,
    ) -> Result<ToolChange, GestureError> {
        self.ensure_alive()?;
        self.tools.set_tool(name, mode, options)
    }

    /// Activate the tool bound to `key` for [`ClickMode::Key`].
    pub fn set_tool_by_key(&mut self, key: &Key) -> Result<ToolChange, GestureError> {
        self.ensure_alive()?;
        self.tools.set_tool_by_key(key)
    }

    /// Prune tool nodes the lookup reports as dead.
    pub fn cleanup_tools(&mut self) -> usize {
        self.tools.cleanup(&self.lookup)
    }

    // --- lock ---

    /// Override the policy on behalf of `origin`, replacing any held lock.
    ///
    /// A lock that disables the engine also ends the current pointer
    /// interaction so nothing stays pressed while gestures are off.
    pub fn set_lock_state(&mut self, origin: K, overrides: PolicyOverrides) {
        log::debug!("lock set by {origin:?}: {overrides:?}");
        self.state.set_lock_state(origin, overrides);
        if !self.effective_policy().enabled {
            self.end_interaction();
        }
    }

    /// Clear the lock; the policy returns to the configured defaults.
    pub fn reset_lock_state(&mut self) {
        if let Some(lock) = self.state.lock.reset() {
            log::debug!("lock held by {:?} reset", lock.origin);
        }
    }

    /// Node holding the lock.
    pub fn lock_origin(&self) -> Option<K> {
        self.state.lock.origin().copied()
    }

    /// Configured policy with the lock applied.
    pub fn effective_policy(&self) -> Policy {
        self.state.effective_policy(&self.defaults)
    }

    // --- timers ---

    /// Fire every timer due at `now`.
    pub fn poll_timers(&mut self, now: u64) -> InputResponse {
        let mut response = InputResponse::default();
        if self.destroyed {
            return response;
        }
        for (key, _) in self.state.timers.take_due(now) {
            response.timers.push(key);
            match key {
                TimerKey::LongPress => self.fire_long_press(now, &mut response),
                TimerKey::TrackpadHint => {
                    self.state.was_recently_trackpad = false;
                    log::trace!("trackpad hint expired at {now}");
                }
                TimerKey::Named(name) => log::trace!("timer `{name}` elapsed at {now}"),
            }
        }
        response
    }

    /// Schedule a collaborator timer; it is reported by
    /// [`poll_timers`](Self::poll_timers) once due.
    pub fn schedule_timer(&mut self, name: &'static str, deadline: u64) {
        self.state.timers.schedule(TimerKey::Named(name), deadline);
    }

    /// Cancel a collaborator timer.
    pub fn cancel_timer(&mut self, name: &'static str) -> bool {
        self.state.timers.cancel(TimerKey::Named(name))
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.state.timers.next_deadline()
    }

    /// Number of pending timers.
    pub fn pending_timer_count(&self) -> usize {
        self.state.timers.len()
    }

    // --- custom gestures ---

    /// Register a custom gesture type and attach a raw listener for it.
    pub fn register_gesture_type(&mut self, name: &str) -> Result<GestureType, GestureError> {
        self.ensure_alive()?;
        let ty = self.gesture_types.register(name)?;
        self.raw_listeners |= RawEvents::CUSTOM;
        log::debug!("registered gesture type `{name}` as {ty}");
        Ok(ty)
    }

    /// Resolve a gesture type name.
    pub fn gesture_type(&self, name: &str) -> Result<GestureType, GestureError> {
        self.gesture_types
            .lookup(name)
            .ok_or_else(|| GestureError::UnknownGestureType(name.into()))
    }

    /// Name of a gesture type.
    pub fn gesture_name(&self, ty: GestureType) -> Option<&str> {
        self.gesture_types.name_of(ty)
    }

    /// Route a raw event of the registered custom type `name`.
    pub fn dispatch_custom(
        &mut self,
        name: &str,
        input: CustomInput<K>,
    ) -> Result<InputResponse, GestureError> {
        let ty = match self.gesture_types.lookup(name) {
            Some(ty @ GestureType::Custom(_)) => ty,
            _ => return Err(GestureError::UnknownGestureType(name.into())),
        };
        let mut response = InputResponse::default();
        if !self.accepts(input.target, RawEvents::CUSTOM) {
            return Ok(response);
        }
        let position = self.state.position_or_last(input.position);
        let detail = GestureDetail::Custom {
            name: name.into(),
            detail: input.detail,
        };
        self.emit(
            ty,
            input.target,
            position,
            None,
            input.timestamp,
            detail,
            &mut response,
        );
        Ok(response)
    }

    /// Text selection in an input control.
    pub fn on_select_input(&mut self, input: SelectInput<K>) -> InputResponse {
        let mut response = InputResponse::default();
        if !self.accepts(input.target, RawEvents::SELECT) {
            return response;
        }
        let position = self.state.position_or_last(input.position);
        self.emit(
            GestureType::SelectInput,
            input.target,
            position,
            None,
            input.timestamp,
            GestureDetail::Pointer,
            &mut response,
        );
        response
    }

    // --- teardown ---

    /// Cancel all timers, detach all raw listeners and drop every registration.
    ///
    /// Later input is ignored and configuration calls fail with
    /// [`GestureError::Destroyed`].
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.state.clear();
        self.raw_listeners = RawEvents::empty();
        self.tools.clear();
        self.listeners.clear();
        self.gesture_types.clear();
        self.interaction_target = None;
        self.mouse_pointers.clear();
        self.scale = None;
        self.authorize_scaling = None;
        self.opt_out = None;
        self.destroyed = true;
        log::debug!("gesture engine destroyed");
    }

    // --- pipeline ---

    fn ensure_alive(&self) -> Result<(), GestureError> {
        if self.destroyed {
            Err(GestureError::Destroyed)
        } else {
            Ok(())
        }
    }

    /// Whether a raw event of `kind` delivered to `target` is processed.
    pub(crate) fn accepts(&self, target: K, kind: RawEvents) -> bool {
        if self.destroyed || !self.raw_listeners.contains(kind) {
            return false;
        }
        if !self.effective_policy().enabled {
            log::trace!("{kind:?} on {target:?} ignored: engine disabled");
            return false;
        }
        if let Some(opt_out) = &self.opt_out {
            if path_to_root(target, &self.lookup)
                .into_iter()
                .any(|node| opt_out(node, kind))
            {
                log::trace!("{kind:?} on {target:?} ignored: opted out");
                return false;
            }
        }
        true
    }

    pub(crate) fn scaled_position(&self, position: Point, target: K) -> Point {
        let authorized = match &self.authorize_scaling {
            Some(predicate) => predicate(target),
            None => self.config.authorize_event_scaling,
        };
        match &self.scale {
            Some(scale) if authorized => scale(position, target),
            _ => position,
        }
    }

    /// Build, dispatch and record one gesture, then apply queued requests.
    pub(crate) fn emit(
        &mut self,
        gesture: GestureType,
        target: K,
        position: Point,
        pointer_id: Option<PointerId>,
        timestamp: u64,
        detail: GestureDetail,
        response: &mut InputResponse,
    ) -> DispatchReport<K> {
        if self.destroyed || !self.effective_policy().enabled {
            return DispatchReport::default();
        }
        let click_mode = self.state.current_click_mode();
        let event = GestureEvent {
            gesture,
            target,
            position,
            scaled_position: self.scaled_position(position, target),
            click_mode,
            input_device: self.state.current_input_device(),
            pressed_keys: self.state.pressed_keys.snapshot(),
            tool_name: self.tools.current_tool(click_mode).map(String::from),
            pointer_id,
            timestamp,
            detail,
        };
        log::trace!("{gesture} at {position:?} on {target:?}");
        let mut requests = Requests::new();
        let report = dispatcher::dispatch(
            &event,
            &mut self.tools,
            &mut self.listeners,
            &self.lookup,
            &mut requests,
        );
        response.gestures.push(gesture);
        response.consumed |= report.consumed();
        self.apply(&mut requests, response);
        report
    }

    fn apply(&mut self, requests: &mut Requests<K>, response: &mut InputResponse) {
        for request in requests.drain() {
            match request {
                Request::Lock { origin, overrides } => self.set_lock_state(origin, overrides),
                Request::ResetLock => self.reset_lock_state(),
                Request::SetTool {
                    name,
                    mode,
                    options,
                } => {
                    if let Err(err) = self.tools.set_tool(&name, mode, options) {
                        log::warn!("deferred tool switch ignored: {err}");
                    }
                }
                Request::PreventDefault => response.prevent_default = true,
            }
        }
    }

    /// End the pointer interaction without firing terminal gestures.
    pub(crate) fn end_interaction(&mut self) {
        self.state.reset_interaction();
        self.interaction_target = None;
        self.mouse_pointers.clear();
    }
}
