// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-owned list of live engines.
//!
//! Hosts that run one engine per surface keep them here to tear them all down
//! together. Handles are generational: once an engine is destroyed its
//! [`EngineId`] stays stale even if the slot is reused.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use crate::engine::GestureEngine;
use crate::error::GestureError;
use crate::types::NodeLookup;

/// Handle of an engine in an [`EngineRegistry`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EngineId {
    index: u32,
    generation: u32,
}

/// Generational slot map of engines.
#[derive(Debug)]
pub struct EngineRegistry<K, L> {
    slots: Vec<Option<GestureEngine<K, L>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl<K, L> Default for EngineRegistry<K, L> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }
}

impl<K, L> EngineRegistry<K, L>
where
    K: Copy + Eq + Hash + Debug + 'static,
    L: NodeLookup<K>,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `engine`.
    pub fn insert(&mut self, engine: GestureEngine<K, L>) -> EngineId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(engine);
            (idx, generation)
        } else {
            self.slots.push(Some(engine));
            self.generations.push(1);
            (self.slots.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "EngineId uses 32-bit indices by design."
        )]
        let id = EngineId {
            index: idx as u32,
            generation,
        };
        log::debug!("engine {id:?} registered");
        id
    }

    fn slot(&self, id: EngineId) -> Option<usize> {
        let idx = id.index as usize;
        (self.generations.get(idx) == Some(&id.generation)
            && self.slots.get(idx).is_some_and(Option::is_some))
        .then_some(idx)
    }

    /// Whether `id` names a live engine.
    pub fn contains(&self, id: EngineId) -> bool {
        self.slot(id).is_some()
    }

    /// Engine for `id`.
    pub fn get(&self, id: EngineId) -> Result<&GestureEngine<K, L>, GestureError> {
        self.slot(id)
            .and_then(|idx| self.slots[idx].as_ref())
            .ok_or(GestureError::UnknownEngine(id))
    }

    /// Mutable engine for `id`.
    pub fn get_mut(&mut self, id: EngineId) -> Result<&mut GestureEngine<K, L>, GestureError> {
        match self.slot(id) {
            Some(idx) => self.slots[idx]
                .as_mut()
                .ok_or(GestureError::UnknownEngine(id)),
            None => Err(GestureError::UnknownEngine(id)),
        }
    }

    /// Destroy the engine and free its slot.
    pub fn destroy(&mut self, id: EngineId) -> Result<(), GestureError> {
        let idx = self.slot(id).ok_or(GestureError::UnknownEngine(id))?;
        if let Some(mut engine) = self.slots[idx].take() {
            engine.destroy();
        }
        self.free_list.push(idx);
        log::debug!("engine {id:?} destroyed");
        Ok(())
    }

    /// Destroy every engine.
    pub fn destroy_all(&mut self) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if let Some(mut engine) = slot.take() {
                engine.destroy();
                self.free_list.push(idx);
            }
        }
    }

    /// Number of live engines.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether no engine is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live engines with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (EngineId, &GestureEngine<K, L>)> {
        self.slots
            .iter()
            .zip(&self.generations)
            .enumerate()
            .filter_map(|(idx, (slot, generation))| {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "EngineId uses 32-bit indices by design."
                )]
                let index = idx as u32;
                slot.as_ref().map(|engine| {
                    (
                        EngineId {
                            index,
                            generation: *generation,
                        },
                        engine,
                    )
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GestureConfig;
    use crate::types::NoParent;
    use alloc::vec;

    fn engine() -> GestureEngine<u32, NoParent> {
        GestureEngine::new(GestureConfig::default(), NoParent).unwrap()
    }

    #[test]
    fn insert_get_destroy() {
        let mut registry = EngineRegistry::new();
        let a = registry.insert(engine());
        let b = registry.insert(engine());
        assert_eq!(registry.len(), 2);
        assert!(registry.get(a).is_ok());

        registry.destroy(a).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(a));
        assert_eq!(registry.get(a).err(), Some(GestureError::UnknownEngine(a)));
        assert_eq!(registry.destroy(a), Err(GestureError::UnknownEngine(a)));
        assert!(registry.get_mut(b).is_ok());
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut registry = EngineRegistry::new();
        let a = registry.insert(engine());
        registry.destroy(a).unwrap();
        let c = registry.insert(engine());
        assert_ne!(a, c);
        assert!(registry.get_mut(a).is_err());
        assert!(registry.get(c).is_ok());
    }

    #[test]
    fn destroy_all_tears_down_every_engine() {
        let mut registry = EngineRegistry::new();
        let ids = vec![registry.insert(engine()), registry.insert(engine())];
        registry.destroy_all();
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
        for id in ids {
            assert!(!registry.contains(id));
        }
        // Freed slots are reused.
        let d = registry.insert(engine());
        assert_eq!(registry.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec![d]);
    }
}
