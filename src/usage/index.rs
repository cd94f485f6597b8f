//! # Usage Index
//!
//! The usage-tracking engine, seen from the consumer side. The engine itself
//! (scanning references on save, cleaning up on delete) lives in the host;
//! this crate only asks it for the usage of one entity.

use super::{UsageMap, UsageRecord, UsageReference};
use crate::entity::{Entity, EntityId, EntityRef};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lists the recorded usage of a target entity.
pub trait UsageIndex: Send + Sync {
    fn list_usage(&self, target: &Entity) -> Result<UsageMap>;
}

/// One persisted usage row: `source` references `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEdge {
    pub target_type: String,
    pub target_id: EntityId,
    pub source_type: String,
    pub source_id: EntityId,
    #[serde(flatten)]
    pub reference: UsageReference,
}

impl UsageEdge {
    pub fn new(target: &EntityRef, source: &EntityRef) -> Self {
        Self {
            target_type: target.entity_type.clone(),
            target_id: target.id.clone(),
            source_type: source.entity_type.clone(),
            source_id: source.id.clone(),
            reference: UsageReference::default(),
        }
    }

    fn target(&self) -> EntityRef {
        EntityRef::new(self.target_type.clone(), self.target_id.clone())
    }
}

/// Usage index built from a flat list of [`UsageEdge`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryUsageIndex {
    by_target: HashMap<EntityRef, UsageMap>,
}

impl MemoryUsageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, edge: UsageEdge) {
        let record = UsageRecord::new(edge.source_type.clone(), edge.source_id.clone())
            .with_reference(edge.reference.clone());
        self.by_target.entry(edge.target()).or_default().insert(record);
    }

    /// Number of targets with at least one usage.
    pub fn target_count(&self) -> usize {
        self.by_target.len()
    }
}

impl FromIterator<UsageEdge> for MemoryUsageIndex {
    fn from_iter<I: IntoIterator<Item = UsageEdge>>(iter: I) -> Self {
        let mut index = Self::new();
        for edge in iter {
            index.record(edge);
        }
        index
    }
}

impl UsageIndex for MemoryUsageIndex {
    fn list_usage(&self, target: &Entity) -> Result<UsageMap> {
        Ok(self
            .by_target
            .get(&target.reference())
            .cloned()
            .unwrap_or_default())
    }
}
