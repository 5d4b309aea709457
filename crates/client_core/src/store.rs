use std::{
    collections::{hash_map::Entry, HashMap},
    fmt::Debug,
    hash::Hash,
};

use shared::{domain::DoctorId, protocol::Doctor};
use tracing::{debug, warn};

/// A server-owned record addressed by its identifier.
pub trait Entity: Clone + Send + Sync {
    type Id: Copy + Eq + Hash + Debug + Send + Sync;

    fn id(&self) -> Self::Id;
}

impl Entity for Doctor {
    type Id = DoctorId;

    fn id(&self) -> DoctorId {
        self.id
    }
}

/// Insertion-ordered collection holding each identifier at most once.
///
/// Only values returned by the backend are written here; the store itself
/// never talks to the network.
#[derive(Debug, Clone)]
pub struct EntityStore<E: Entity> {
    entities: Vec<E>,
}

impl<E: Entity> Default for EntityStore<E> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
        }
    }
}

impl<E: Entity> EntityStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_all(&self) -> &[E] {
        &self.entities
    }

    pub fn get(&self, id: E::Id) -> Option<&E> {
        self.entities.iter().find(|entity| entity.id() == id)
    }

    pub fn contains(&self, id: E::Id) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn position(&self, id: E::Id) -> Option<usize> {
        self.entities.iter().position(|entity| entity.id() == id)
    }

    /// Replaces the whole collection with a freshly listed one. A repeated
    /// identifier keeps its first position and takes the later value.
    pub fn replace_all(&mut self, entities: Vec<E>) {
        self.entities.clear();
        self.entities.reserve(entities.len());
        let mut seen = HashMap::with_capacity(entities.len());
        for entity in entities {
            match seen.entry(entity.id()) {
                Entry::Occupied(slot) => {
                    warn!(id = ?entity.id(), "listing contained a duplicate identifier");
                    self.entities[*slot.get()] = entity;
                }
                Entry::Vacant(slot) => {
                    slot.insert(self.entities.len());
                    self.entities.push(entity);
                }
            }
        }
        debug!(count = self.entities.len(), "entity store reloaded");
    }

    /// Appends a created entity. An identifier already present is replaced
    /// in place instead.
    pub fn apply_create(&mut self, entity: E) {
        match self.position(entity.id()) {
            Some(index) => {
                warn!(id = ?entity.id(), "created entity already present; replacing in place");
                self.entities[index] = entity;
            }
            None => self.entities.push(entity),
        }
    }

    /// Swaps in the server's representation. Returns `false` when no entity
    /// with that identifier is held.
    pub fn apply_update(&mut self, entity: E) -> bool {
        match self.position(entity.id()) {
            Some(index) => {
                self.entities[index] = entity;
                true
            }
            None => {
                debug!(id = ?entity.id(), "update for absent entity ignored");
                false
            }
        }
    }

    pub fn apply_delete(&mut self, id: E::Id) -> Option<E> {
        self.position(id).map(|index| self.entities.remove(index))
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
