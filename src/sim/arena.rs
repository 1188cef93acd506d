//! Registry of live entities
//!
//! Generation-tagged slots with a free list. A destroyed entity's slot is reused
//! with a bumped generation, so stale `EntityId`s resolve to `None` instead of
//! aliasing the new occupant.
//!
//! Serials come from one process-wide counter, and every live serial is listed
//! in a process-wide set, so entities stay distinguishable across scenes.

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use super::entity::{Entity, EntityBuilder, EntityId};
use crate::error::SimError;

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(0);
static LIVE_SERIALS: Mutex<BTreeSet<u64>> = Mutex::new(BTreeSet::new());

fn with_live_serials<R>(f: impl FnOnce(&mut BTreeSet<u64>) -> R) -> R {
    let mut live = LIVE_SERIALS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut live)
}

/// Serials of every live entity in the process, ascending
pub fn live_serials() -> Vec<u64> {
    with_live_serials(|live| live.iter().copied().collect())
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

#[derive(Debug, Default)]
pub struct EntityArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register an entity
    pub fn spawn(&mut self, builder: EntityBuilder) -> Result<EntityId, SimError> {
        let (index, generation) = match self.free.last() {
            Some(&index) => (index, self.slots[index as usize].generation),
            None => (self.slots.len() as u32, 0),
        };
        let id = EntityId { index, generation };
        let serial = NEXT_SERIAL.fetch_add(1, Ordering::Relaxed);

        // Build before touching the slot so a rejected entity leaves no trace
        let entity = builder.build(id, serial)?;
        log::debug!("Spawned '{}' as {} (serial {})", entity.name, id, serial);

        if index as usize == self.slots.len() {
            self.slots.push(Slot {
                generation,
                entity: Some(entity),
            });
        } else {
            self.free.pop();
            self.slots[index as usize].entity = Some(entity);
        }
        with_live_serials(|live| live.insert(serial));
        self.live += 1;
        Ok(id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entity.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entity.as_mut())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Release an entity's resources and free its slot. Returns false for stale ids.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some(slot) = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
        else {
            log::warn!("destroy: stale entity id {}", id);
            return false;
        };
        let Some(mut entity) = slot.entity.take() else {
            log::warn!("destroy: entity {} already destroyed", id);
            return false;
        };
        entity.release();
        with_live_serials(|live| live.remove(&entity.serial()));
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        log::debug!("Destroyed '{}' ({})", entity.name, id);
        true
    }

    /// Destroy every live entity
    pub fn clear(&mut self) {
        for id in self.ids() {
            self.destroy(id);
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Snapshot of live ids in slot order; safe to destroy while walking it
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|e| e.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter_map(|slot| slot.entity.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().filter_map(|slot| slot.entity.as_mut())
    }
}

impl Drop for EntityArena {
    fn drop(&mut self) {
        with_live_serials(|live| {
            for entity in self.slots.iter().filter_map(|slot| slot.entity.as_ref()) {
                live.remove(&entity.serial());
            }
        });
    }
}
