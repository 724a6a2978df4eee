// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Feed synthetic input through a gesture engine and log what fires.
//!
//! The scene is a canvas inside a window, with a "hand" tool registered on
//! the window and bound to the `h` key. The script clicks, drags, holds for a
//! long press, scrolls and pinches, then switches to the hand tool and drags
//! again so the tool consumes the drag.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example gesture_trace`

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use kurbo::{Point, Vec2};
use understory_event_state::{ClickMode, Key};
use understory_gesture::{
    GestureConfig, GestureEngine, GestureEvent, GestureType, InputResponse, KeyInput,
    ListenerOptions, PointerInput, SetToolOptions, ToolBehavior, WheelInput,
};

const WINDOW: u32 = 1;
const CANVAS: u32 = 2;

fn describe(ev: &GestureEvent<u32>) -> String {
    let mut line = format!(
        "{:<16} at ({:>5.1}, {:>5.1}) {:?}/{:?}",
        ev.gesture.to_string(),
        ev.position.x,
        ev.position.y,
        ev.input_device,
        ev.click_mode,
    );
    if let Some(delta) = ev.drag_delta() {
        line.push_str(&format!(" delta=({:.1}, {:.1})", delta.x, delta.y));
    }
    if let Some(zoom) = ev.zoom_factor() {
        line.push_str(&format!(" zoom={zoom:.3}"));
    }
    if let Some(tool) = &ev.tool_name {
        line.push_str(&format!(" tool={tool}"));
    }
    line
}

fn report(step: &str, response: &InputResponse) {
    log::info!(
        "{step}: fired {:?}, consumed={}, prevent_default={}",
        response.gestures.as_slice(),
        response.consumed,
        response.prevent_default
    );
}

fn main() {
    env_logger::init();

    let mut parents = HashMap::new();
    parents.insert(CANVAS, WINDOW);
    let mut engine = match GestureEngine::new(GestureConfig::default(), parents) {
        Ok(engine) => engine,
        Err(err) => {
            log::error!("bad configuration: {err}");
            return;
        }
    };

    let trace: Rc<RefCell<Vec<String>>> = Rc::default();
    for gesture in GestureType::builtins() {
        let trace = trace.clone();
        engine
            .add_listener(WINDOW, gesture, ListenerOptions::default(), move |ev, _, _| {
                trace.borrow_mut().push(describe(ev));
                false
            })
            .expect("engine is live");
    }

    engine
        .add_tool("hand", WINDOW, Some(Key::from("h")))
        .expect("engine is live");
    engine
        .set_tool_behavior(
            "hand",
            ToolBehavior::new()
                .on(GestureType::Drag, |ev, node, _| {
                    if let Some(step) = ev.drag_step() {
                        log::info!("hand pans node {node} by ({:.1}, {:.1})", step.x, step.y);
                    }
                    true
                })
                .on_activate(|mode| log::info!("hand active for {mode:?}"))
                .on_deactivate(|mode| log::info!("hand inactive for {mode:?}")),
        )
        .expect("engine is live");

    let p = Point::new;

    // Click.
    report(
        "down",
        &engine.on_pointer_down(PointerInput::mouse(CANVAS, 0, p(10.0, 10.0), 0)),
    );
    report(
        "up",
        &engine.on_pointer_up(PointerInput::mouse(CANVAS, 0, p(10.0, 10.0), 60)),
    );

    // Drag.
    engine.on_pointer_down(PointerInput::mouse(CANVAS, 0, p(10.0, 10.0), 100));
    for (i, x) in [14.0, 25.0, 40.0].into_iter().enumerate() {
        let ts = 110 + 10 * i as u64;
        engine.on_pointer_move(PointerInput::mouse(CANVAS, 0, p(x, 10.0), ts));
    }
    report(
        "drag up",
        &engine.on_pointer_up(PointerInput::mouse(CANVAS, 0, p(40.0, 10.0), 150)),
    );

    // Long press, driven by the host clock.
    engine.on_pointer_down(PointerInput::mouse(CANVAS, 2, p(50.0, 50.0), 200));
    if let Some(deadline) = engine.next_deadline() {
        report("timers", &engine.poll_timers(deadline));
    }
    engine.on_pointer_up(PointerInput::mouse(CANVAS, 2, p(50.0, 50.0), 900));

    // Wheel: a mouse notch, a trackpad scroll and a pinch.
    for (delta, ctrl_key, ts) in [
        (Vec2::new(0.0, 100.0), false, 1_000),
        (Vec2::new(1.5, -3.25), false, 2_000),
        (Vec2::new(0.0, -8.0), true, 2_050),
    ] {
        let response = engine.on_wheel(WheelInput {
            target: CANVAS,
            position: Some(p(60.0, 60.0)),
            delta,
            ctrl_key,
            timestamp: ts,
        });
        report("wheel", &response);
    }
    engine.poll_timers(3_000);

    // The bound key activates the hand for key-driven gestures; pointer
    // drags need it on the left button too.
    engine.on_key_down(KeyInput::new(CANVAS, "h", 3_100));
    engine.on_key_up(KeyInput::new(CANVAS, "h", 3_150));
    engine
        .set_tool("hand", ClickMode::Left, SetToolOptions::default())
        .expect("hand is registered");
    engine.on_pointer_down(PointerInput::mouse(CANVAS, 0, p(0.0, 0.0), 3_200));
    engine.on_pointer_move(PointerInput::mouse(CANVAS, 0, p(30.0, 0.0), 3_210));
    engine.on_pointer_up(PointerInput::mouse(CANVAS, 0, p(30.0, 0.0), 3_220));

    for line in trace.borrow().iter() {
        println!("{line}");
    }

    engine.destroy();
}
