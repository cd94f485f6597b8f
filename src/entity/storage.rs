//! # Entity Storage
//!
//! The `load(entity_type, id)` collaborator and an in-memory implementation.

use super::{Entity, EntityId, EntityRef};
use anyhow::Result;
use std::collections::HashMap;

/// Loads entities from the host's storage layer.
///
/// `Ok(None)` means the entity does not exist (or the type is unknown) and is
/// treated as data by callers. `Err` is a storage failure and propagates.
pub trait EntityStorage: Send + Sync {
    fn load(&self, entity_type: &str, id: &EntityId) -> Result<Option<Entity>>;

    /// Load the entity behind a reference.
    fn load_ref(&self, reference: &EntityRef) -> Result<Option<Entity>> {
        self.load(&reference.entity_type, &reference.id)
    }
}

/// Entity storage backed by a `HashMap`, keyed by `(entity_type, id)`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entities: HashMap<EntityRef, Entity>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, replacing any previous entity with the same reference.
    pub fn insert(&mut self, entity: Entity) {
        self.entities.insert(entity.reference(), entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<Entity> for MemoryStorage {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let mut storage = Self::new();
        for entity in iter {
            storage.insert(entity);
        }
        storage
    }
}

impl EntityStorage for MemoryStorage {
    fn load(&self, entity_type: &str, id: &EntityId) -> Result<Option<Entity>> {
        let key = EntityRef::new(entity_type, id.clone());
        Ok(self.entities.get(&key).cloned())
    }
}
