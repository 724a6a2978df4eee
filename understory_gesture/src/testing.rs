// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures: a three-node chain `LEAF -> MID -> ROOT` and an engine
//! whose root records every built-in gesture that reaches it.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use hashbrown::HashMap;

use crate::config::GestureConfig;
use crate::engine::GestureEngine;
use crate::event::GestureEvent;
use crate::listeners::ListenerOptions;
use crate::types::GestureType;

pub(crate) const ROOT: u32 = 1;
pub(crate) const MID: u32 = 2;
pub(crate) const LEAF: u32 = 3;

pub(crate) type Recorded = Rc<RefCell<Vec<GestureEvent<u32>>>>;

pub(crate) fn parents() -> HashMap<u32, u32> {
    let mut parents = HashMap::new();
    parents.insert(LEAF, MID);
    parents.insert(MID, ROOT);
    parents
}

pub(crate) fn engine(config: GestureConfig) -> (GestureEngine<u32, HashMap<u32, u32>>, Recorded) {
    let mut engine = GestureEngine::new(config, parents()).unwrap();
    let recorded: Recorded = Rc::default();
    for gesture in GestureType::builtins() {
        let log = recorded.clone();
        engine
            .add_listener(ROOT, gesture, ListenerOptions::default(), move |ev, _, _| {
                log.borrow_mut().push(ev.clone());
                false
            })
            .unwrap();
    }
    (engine, recorded)
}

pub(crate) fn kinds(recorded: &Recorded) -> Vec<GestureType> {
    recorded.borrow().iter().map(|ev| ev.gesture).collect()
}
