//! # Usage Module
//!
//! Usage records and the lookup of usage for a target entity.
//!
//! ## Overview
//!
//! A *usage* is a reference from a source entity to a target entity, kept by
//! the host's usage index. This module models the snapshot the index hands
//! back and wraps the index behind [`UsageLookup`], the adapter rendering
//! goes through.
//!
//! ## Data Shape
//!
//! ```text
//! UsageMap
//! ├── "media"                    source entity type
//! │   └── "2" => UsageRecord     source entity id
//! └── "node"
//!     ├── "1" => UsageRecord
//!     └── "5" => UsageRecord
//! ```
//!
//! The total usage count is the number of `(source_type, source_id)` pairs,
//! whatever the number of references each record carries.

mod index;
mod lookup;

pub use index::{MemoryUsageIndex, UsageEdge, UsageIndex};
pub use lookup::UsageLookup;

use crate::entity::{EntityId, EntityRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata of one recorded reference. Carried along but not rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageReference {
    /// Tracking method that found the reference, e.g. `entity_reference`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_langcode: Option<String>,
    /// Source revision id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_vid: Option<String>,
    #[serde(default = "default_reference_count")]
    pub count: u32,
}

fn default_reference_count() -> u32 {
    1
}

/// One source entity that references the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub source_type: String,
    pub source_id: EntityId,
    #[serde(default)]
    pub references: Vec<UsageReference>,
}

impl UsageRecord {
    pub fn new(source_type: impl Into<String>, source_id: impl Into<EntityId>) -> Self {
        Self {
            source_type: source_type.into(),
            source_id: source_id.into(),
            references: Vec::new(),
        }
    }

    pub fn with_reference(mut self, reference: UsageReference) -> Self {
        self.references.push(reference);
        self
    }

    pub fn source(&self) -> EntityRef {
        EntityRef::new(self.source_type.clone(), self.source_id.clone())
    }
}

/// Usage of one target entity: `source_type -> source_id -> record`.
///
/// Iteration order is source type, then [`EntityId`] order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageMap {
    by_type: BTreeMap<String, BTreeMap<EntityId, UsageRecord>>,
}

impl UsageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. A record for a source that is already present merges its
    /// references into the existing one, so the source is counted once.
    pub fn insert(&mut self, record: UsageRecord) {
        let sources = self.by_type.entry(record.source_type.clone()).or_default();
        match sources.get_mut(&record.source_id) {
            Some(existing) => existing.references.extend(record.references),
            None => {
                sources.insert(record.source_id.clone(), record);
            }
        }
    }

    /// Total usages across every source type.
    pub fn total(&self) -> usize {
        self.by_type.values().map(BTreeMap::len).sum()
    }

    /// Usages recorded for a single source type.
    pub fn count_for(&self, source_type: &str) -> usize {
        self.by_type.get(source_type).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Source types present, in iteration order.
    pub fn source_types(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }

    /// Every record across all source types.
    pub fn records(&self) -> impl Iterator<Item = &UsageRecord> {
        self.by_type.values().flat_map(BTreeMap::values)
    }
}

impl FromIterator<UsageRecord> for UsageMap {
    fn from_iter<I: IntoIterator<Item = UsageRecord>>(iter: I) -> Self {
        let mut map = Self::new();
        for record in iter {
            map.insert(record);
        }
        map
    }
}
