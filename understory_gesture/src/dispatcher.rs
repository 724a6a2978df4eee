// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture resolution: tool first, then listeners from target to root.
//!
//! Resolution is split in two. [`build_steps`] turns a target into a step
//! sequence using the host's ancestry lookup and the tool registry, and
//! [`run`] walks any sequence with a handler, honoring [`Outcome::Stop`].
//! [`dispatch`] combines both with the registry and listener table.
//!
//! ## Semantics
//!
//! - The tool step comes first. It exists when the event names an active tool
//!   and some node on the target's ancestry is a substrate of that tool whose
//!   behavior handles the gesture. The behavior runs against the embedding
//!   target of that node if there is one. Returning `true` consumes the
//!   gesture and ends resolution.
//! - One listener step per node, target first. A node's listeners run in
//!   registration order. A listener that consumes the gesture without
//!   [`ListenerOptions::propagate`](crate::listeners::ListenerOptions::propagate)
//!   lets the rest of its node run, then stops. [`Stop::Immediate`] halts right
//!   after the listener; [`Stop::Propagation`] halts after the node.
//!
//! ```
//! use understory_gesture::dispatcher::{Outcome, run};
//!
//! let seq = [1, 2, 3, 4];
//! let mut seen = Vec::new();
//! let stopped = run(&seq, &mut seen, |n, seen| {
//!     seen.push(*n);
//!     if *n == 2 { Outcome::Stop } else { Outcome::Continue }
//! });
//! assert_eq!(stopped, Some(&2));
//! assert_eq!(seen, [1, 2]);
//! ```

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use crate::event::GestureEvent;
use crate::handler::Requests;
use crate::listeners::{ListenerId, ListenerTable, Stop};
use crate::registry::ToolRegistry;
use crate::types::{NodeLookup, path_to_root};

/// Whether resolution continues after a step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Keep going.
    Continue,
    /// Abort resolution; later steps do not run.
    Stop,
}

/// One resolution step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step<K> {
    /// Run the active tool's behavior.
    Tool {
        /// Substrate node found on the ancestry.
        node: K,
        /// Node the behavior acts on: the embedding target, or `node`.
        acting: K,
    },
    /// Run the listeners registered on `node`.
    Listeners {
        /// Node whose listeners run.
        node: K,
    },
}

/// Who consumed a gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Consumer<K> {
    /// The active tool's behavior.
    Tool {
        /// Tool name.
        name: String,
        /// Node the behavior acted on.
        node: K,
    },
    /// A listener.
    Listener {
        /// Node the listener is registered on.
        node: K,
        /// The listener.
        id: ListenerId,
    },
}

/// Summary of one dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchReport<K> {
    /// First handler that returned `true`.
    pub consumed_by: Option<Consumer<K>>,
    /// Handlers invoked.
    pub handlers_run: usize,
}

impl<K> Default for DispatchReport<K> {
    fn default() -> Self {
        Self {
            consumed_by: None,
            handlers_run: 0,
        }
    }
}

impl<K> DispatchReport<K> {
    /// Whether anything consumed the gesture.
    pub fn consumed(&self) -> bool {
        self.consumed_by.is_some()
    }
}

/// Walk `seq` with `handler` until it returns [`Outcome::Stop`].
///
/// Returns the step that stopped resolution, or `None` if every step ran.
pub fn run<'a, S, E>(
    seq: &'a [S],
    ctx: &mut E,
    mut handler: impl FnMut(&S, &mut E) -> Outcome,
) -> Option<&'a S> {
    for step in seq {
        match handler(step, ctx) {
            Outcome::Continue => {}
            Outcome::Stop => return Some(step),
        }
    }
    None
}

/// Resolution steps for `event` against the registry and ancestry.
pub fn build_steps<K: Copy + Eq + Hash + Debug>(
    event: &GestureEvent<K>,
    tools: &ToolRegistry<K>,
    handles: impl Fn(&str) -> bool,
    lookup: &impl NodeLookup<K>,
) -> Vec<Step<K>> {
    let path = path_to_root(event.target, lookup);
    let mut steps = Vec::with_capacity(path.len() + 1);
    if let Some(tool) = event.tool_name.as_deref() {
        if handles(tool) {
            if let Some(node) = tools.bound_node(tool, &path) {
                let acting = tools.embedded_target(node).unwrap_or(node);
                steps.push(Step::Tool { node, acting });
            }
        }
    }
    steps.extend(path.into_iter().map(|node| Step::Listeners { node }));
    steps
}

struct Ctx<'a, K> {
    event: &'a GestureEvent<K>,
    tools: &'a mut ToolRegistry<K>,
    listeners: &'a mut ListenerTable<K>,
    requests: &'a mut Requests<K>,
    report: DispatchReport<K>,
}

/// Resolve `event`: run the tool step, then listeners, honoring stops.
///
/// Callbacks queue their requests into `requests`; nothing is applied here.
pub fn dispatch<K: Copy + Eq + Hash + Debug>(
    event: &GestureEvent<K>,
    tools: &mut ToolRegistry<K>,
    listeners: &mut ListenerTable<K>,
    lookup: &impl NodeLookup<K>,
    requests: &mut Requests<K>,
) -> DispatchReport<K> {
    let steps = {
        let registry = &*tools;
        build_steps(
            event,
            registry,
            |name| {
                registry
                    .behavior(name)
                    .is_some_and(|b| b.handles(event.gesture))
            },
            lookup,
        )
    };
    let mut ctx = Ctx {
        event,
        tools,
        listeners,
        requests,
        report: DispatchReport::default(),
    };
    run(&steps, &mut ctx, |step, ctx| match *step {
        Step::Tool { acting, .. } => run_tool(ctx, acting),
        Step::Listeners { node } => run_listeners(ctx, node),
    });
    ctx.report
}

fn run_tool<K: Copy + Eq + Hash + Debug>(ctx: &mut Ctx<'_, K>, acting: K) -> Outcome {
    let event = ctx.event;
    let Some(name) = event.tool_name.as_deref() else {
        return Outcome::Continue;
    };
    let Some(handler) = ctx
        .tools
        .behavior_mut(name)
        .and_then(|b| b.handler_mut(event.gesture))
    else {
        return Outcome::Continue;
    };
    ctx.report.handlers_run += 1;
    if handler(event, acting, &mut *ctx.requests) {
        log::trace!("{} consumed by tool `{name}` on {acting:?}", event.gesture);
        ctx.report.consumed_by = Some(Consumer::Tool {
            name: name.into(),
            node: acting,
        });
        Outcome::Stop
    } else {
        Outcome::Continue
    }
}

fn run_listeners<K: Copy + Eq + Hash + Debug>(ctx: &mut Ctx<'_, K>, node: K) -> Outcome {
    let event = ctx.event;
    let Some(entries) = ctx.listeners.entries_mut(node) else {
        return Outcome::Continue;
    };
    let gesture = event.gesture;
    let tool = event.tool_name.as_deref();
    let mut halt = false;
    for entry in entries.iter_mut().filter(|e| e.matches(gesture, tool)) {
        ctx.report.handlers_run += 1;
        let consumed = (entry.callback)(event, node, &mut *ctx.requests);
        if consumed {
            if ctx.report.consumed_by.is_none() {
                ctx.report.consumed_by = Some(Consumer::Listener { node, id: entry.id });
            }
            if !entry.options.propagate {
                halt = true;
            }
        }
        match entry.options.stop {
            Some(Stop::Immediate) => return Outcome::Stop,
            Some(Stop::Propagation) => halt = true,
            None => {}
        }
    }
    if halt { Outcome::Stop } else { Outcome::Continue }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::GestureDetail;
    use crate::listeners::ListenerOptions;
    use crate::registry::ToolBehavior;
    use crate::types::GestureType;
    use alloc::collections::BTreeSet;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;
    use hashbrown::HashMap;
    use kurbo::Point;
    use understory_event_state::{ClickMode, InputDevice};

    type Log = Rc<RefCell<Vec<(&'static str, u32)>>>;

    // 3 -> 2 -> 1
    fn parents() -> HashMap<u32, u32> {
        let mut p = HashMap::new();
        p.insert(3, 2);
        p.insert(2, 1);
        p
    }

    fn click_at(target: u32, tool: Option<&str>) -> GestureEvent<u32> {
        GestureEvent {
            gesture: GestureType::Click,
            target,
            position: Point::ZERO,
            scaled_position: Point::ZERO,
            click_mode: ClickMode::Left,
            input_device: InputDevice::Mouse,
            pressed_keys: BTreeSet::new(),
            tool_name: tool.map(Into::into),
            pointer_id: Some(0),
            timestamp: 0,
            detail: GestureDetail::Pointer,
        }
    }

    fn listen(
        table: &mut ListenerTable<u32>,
        log: &Log,
        node: u32,
        label: &'static str,
        consume: bool,
        options: ListenerOptions,
    ) -> ListenerId {
        let log = log.clone();
        table.add(
            node,
            GestureType::Click,
            None,
            options,
            move |_, current, _| {
                log.borrow_mut().push((label, current));
                consume
            },
        )
    }

    #[test]
    fn run_visits_all_without_stop() {
        let seq = [1, 2, 3];
        let mut n = 0;
        assert!(run(&seq, &mut n, |_, n| {
            *n += 1;
            Outcome::Continue
        })
        .is_none());
        assert_eq!(n, 3);
    }

    #[test]
    fn listeners_bubble_target_first() {
        let log = Log::default();
        let mut tools = ToolRegistry::new();
        let mut table = ListenerTable::new();
        listen(&mut table, &log, 1, "root", false, ListenerOptions::default());
        listen(&mut table, &log, 3, "leaf", false, ListenerOptions::default());
        let mut req = Requests::new();
        let report = dispatch(&click_at(3, None), &mut tools, &mut table, &parents(), &mut req);
        assert_eq!(*log.borrow(), vec![("leaf", 3), ("root", 1)]);
        assert!(!report.consumed());
        assert_eq!(report.handlers_run, 2);
    }

    #[test]
    fn consuming_listener_finishes_its_node() {
        let log = Log::default();
        let mut tools = ToolRegistry::new();
        let mut table = ListenerTable::new();
        let first = listen(&mut table, &log, 3, "a", true, ListenerOptions::default());
        listen(&mut table, &log, 3, "b", false, ListenerOptions::default());
        listen(&mut table, &log, 2, "parent", false, ListenerOptions::default());
        let mut req = Requests::new();
        let report = dispatch(&click_at(3, None), &mut tools, &mut table, &parents(), &mut req);
        assert_eq!(*log.borrow(), vec![("a", 3), ("b", 3)]);
        assert_eq!(
            report.consumed_by,
            Some(Consumer::Listener { node: 3, id: first })
        );
    }

    #[test]
    fn propagate_keeps_bubbling_after_consume() {
        let log = Log::default();
        let mut tools = ToolRegistry::new();
        let mut table = ListenerTable::new();
        let propagate = ListenerOptions {
            propagate: true,
            stop: None,
        };
        listen(&mut table, &log, 3, "a", true, propagate);
        listen(&mut table, &log, 1, "root", false, ListenerOptions::default());
        let mut req = Requests::new();
        let report = dispatch(&click_at(3, None), &mut tools, &mut table, &parents(), &mut req);
        assert_eq!(*log.borrow(), vec![("a", 3), ("root", 1)]);
        assert!(report.consumed());
    }

    #[test]
    fn stop_immediate_skips_siblings() {
        let log = Log::default();
        let mut tools = ToolRegistry::new();
        let mut table = ListenerTable::new();
        let immediate = ListenerOptions {
            propagate: false,
            stop: Some(Stop::Immediate),
        };
        listen(&mut table, &log, 3, "a", false, immediate);
        listen(&mut table, &log, 3, "b", false, ListenerOptions::default());
        let mut req = Requests::new();
        dispatch(&click_at(3, None), &mut tools, &mut table, &parents(), &mut req);
        assert_eq!(*log.borrow(), vec![("a", 3)]);
    }

    #[test]
    fn stop_propagation_finishes_node() {
        let log = Log::default();
        let mut tools = ToolRegistry::new();
        let mut table = ListenerTable::new();
        let stop = ListenerOptions {
            propagate: false,
            stop: Some(Stop::Propagation),
        };
        listen(&mut table, &log, 3, "a", false, stop);
        listen(&mut table, &log, 3, "b", false, ListenerOptions::default());
        listen(&mut table, &log, 2, "parent", false, ListenerOptions::default());
        let mut req = Requests::new();
        dispatch(&click_at(3, None), &mut tools, &mut table, &parents(), &mut req);
        assert_eq!(*log.borrow(), vec![("a", 3), ("b", 3)]);
    }

    #[test]
    fn tool_runs_before_listeners_and_can_consume() {
        let log = Log::default();
        let mut tools = ToolRegistry::new();
        tools.add_tool("pen", 2, None);
        let tool_log = log.clone();
        tools.set_tool_behavior(
            "pen",
            ToolBehavior::new().on(GestureType::Click, move |_, current, _| {
                tool_log.borrow_mut().push(("pen", current));
                true
            }),
        );
        let mut table = ListenerTable::new();
        listen(&mut table, &log, 3, "leaf", false, ListenerOptions::default());
        let mut req = Requests::new();
        let report = dispatch(
            &click_at(3, Some("pen")),
            &mut tools,
            &mut table,
            &parents(),
            &mut req,
        );
        assert_eq!(*log.borrow(), vec![("pen", 2)]);
        assert_eq!(
            report.consumed_by,
            Some(Consumer::Tool {
                name: "pen".into(),
                node: 2
            })
        );

        // Without the tool active, listeners handle it.
        log.borrow_mut().clear();
        dispatch(&click_at(3, None), &mut tools, &mut table, &parents(), &mut req);
        assert_eq!(*log.borrow(), vec![("leaf", 3)]);
    }

    #[test]
    fn embedded_tool_acts_on_target() {
        let log = Log::default();
        let mut tools = ToolRegistry::new();
        tools.add_tool("pen", 2, None);
        tools.embed_tool(2, 42);
        let tool_log = log.clone();
        tools.set_tool_behavior(
            "pen",
            ToolBehavior::new().on(GestureType::Click, move |_, current, _| {
                tool_log.borrow_mut().push(("pen", current));
                false
            }),
        );
        let steps = build_steps(
            &click_at(3, Some("pen")),
            &tools,
            |_| true,
            &parents(),
        );
        assert_eq!(steps[0], Step::Tool { node: 2, acting: 42 });
        assert_eq!(steps.len(), 4);

        let mut table = ListenerTable::new();
        let mut req = Requests::new();
        dispatch(
            &click_at(3, Some("pen")),
            &mut tools,
            &mut table,
            &parents(),
            &mut req,
        );
        assert_eq!(*log.borrow(), vec![("pen", 42)]);
    }

    #[test]
    fn tool_filtered_listener() {
        let log = Log::default();
        let mut tools = ToolRegistry::new();
        let mut table = ListenerTable::new();
        let l = log.clone();
        table.add(
            3,
            GestureType::Click,
            Some("pen".into()),
            ListenerOptions::default(),
            move |_, n, _| {
                l.borrow_mut().push(("pen-only", n));
                false
            },
        );
        let mut req = Requests::new();
        dispatch(&click_at(3, None), &mut tools, &mut table, &parents(), &mut req);
        assert!(log.borrow().is_empty());
        dispatch(&click_at(3, Some("pen")), &mut tools, &mut table, &parents(), &mut req);
        assert_eq!(*log.borrow(), vec![("pen-only", 3)]);
    }

    #[test]
    fn callbacks_queue_requests() {
        let mut tools = ToolRegistry::new();
        let mut table = ListenerTable::new();
        table.add(
            3,
            GestureType::Click,
            None,
            ListenerOptions::default(),
            |_, _, req| {
                req.prevent_default();
                false
            },
        );
        let mut req = Requests::new();
        dispatch(&click_at(3, None), &mut tools, &mut table, &parents(), &mut req);
        assert_eq!(req.len(), 1);
    }
}
