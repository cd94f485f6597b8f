//! # Entity Module
//!
//! The slice of the host's entity system that usage rendering reads.
//!
//! ## Overview
//!
//! Rendering never owns entities. It resolves a target entity to look up its
//! usage, then loads each source entity to project a table row. Both go
//! through the [`EntityStorage`] collaborator, which the embedding
//! application injects.
//!
//! | Type | Role |
//! |------|------|
//! | [`EntityId`] | Identifier within one entity type |
//! | [`EntityRef`] | `(entity_type, id)` pair, not yet loaded |
//! | [`Entity`] | Loaded metadata: label, canonical route, publish state |
//! | [`EntityStorage`] | `load(entity_type, id)` collaborator |

mod storage;

pub use storage::{EntityStorage, MemoryStorage};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifier of an entity within its type.
///
/// Hosts use both serial integers and machine names as ids, so the id is kept
/// as a string. Ids that fit a `u64` sort first, numerically (`2 < 10`);
/// every other id sorts after them, lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "IdRepr", into = "String")]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn as_number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for EntityId {
    fn cmp(&self, other: &Self) -> Ordering {
        let key = |id: &Self| {
            let number = id.as_number();
            (number.is_none(), number)
        };
        key(self)
            .cmp(&key(other))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for EntityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Snapshots write ids either as JSON numbers or strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(u64),
    Text(String),
}

impl From<IdRepr> for EntityId {
    fn from(repr: IdRepr) -> Self {
        match repr {
            IdRepr::Number(n) => Self::from(n),
            IdRepr::Text(s) => Self(s),
        }
    }
}

/// A reference to an entity by type and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity_type: String,
    pub id: EntityId,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, id: impl Into<EntityId>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.id)
    }
}

/// Metadata of a loaded entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity type id, e.g. `node` or `media`.
    pub entity_type: String,
    pub id: EntityId,
    /// Human-readable label.
    pub label: String,
    /// Whether the type exposes a canonical display route for this entity.
    #[serde(default)]
    pub canonical: bool,
    /// Publish state. `None` when the type has no publish semantics
    /// (e.g. paragraphs or taxonomy terms without a status field).
    #[serde(default)]
    pub status: Option<bool>,
}

impl Entity {
    pub fn new(
        entity_type: impl Into<String>,
        id: impl Into<EntityId>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            label: label.into(),
            canonical: false,
            status: None,
        }
    }

    /// Mark the entity as reachable through its canonical route.
    pub fn with_canonical(mut self) -> Self {
        self.canonical = true;
        self
    }

    pub fn with_status(mut self, published: bool) -> Self {
        self.status = Some(published);
        self
    }

    pub fn reference(&self) -> EntityRef {
        EntityRef {
            entity_type: self.entity_type.clone(),
            id: self.id.clone(),
        }
    }
}
