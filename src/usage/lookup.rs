use super::{UsageIndex, UsageMap};
use crate::entity::{Entity, EntityId, EntityStorage};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Adapter between rendering and the host's usage index.
///
/// Absence is data: a target that does not resolve yields an empty map.
/// Failures of the storage or the index propagate to the caller.
#[derive(Clone)]
pub struct UsageLookup {
    storage: Arc<dyn EntityStorage>,
    index: Arc<dyn UsageIndex>,
}

impl UsageLookup {
    pub fn new(storage: Arc<dyn EntityStorage>, index: Arc<dyn UsageIndex>) -> Self {
        Self { storage, index }
    }

    /// Resolve `(entity_type, id)` and list its usage.
    pub fn get_usage(&self, entity_type: &str, id: &EntityId) -> Result<UsageMap> {
        let target = self
            .storage
            .load(entity_type, id)
            .with_context(|| format!("Failed to load usage target {entity_type}:{id}"))?;

        match target {
            Some(entity) => self.list_usage(&entity),
            None => {
                tracing::debug!(entity_type, %id, "usage target not found, no usage");
                Ok(UsageMap::new())
            }
        }
    }

    /// List the usage of an already loaded entity.
    pub fn list_usage(&self, entity: &Entity) -> Result<UsageMap> {
        let usage = self.index.list_usage(entity).with_context(|| {
            format!(
                "Failed to list usage of {}:{}",
                entity.entity_type, entity.id
            )
        })?;
        tracing::debug!(
            entity_type = %entity.entity_type,
            id = %entity.id,
            total = usage.total(),
            "listed usage"
        );
        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityRef, MemoryStorage};
    use crate::usage::{MemoryUsageIndex, UsageEdge};

    struct BrokenIndex;

    impl UsageIndex for BrokenIndex {
        fn list_usage(&self, _target: &Entity) -> Result<UsageMap> {
            anyhow::bail!("usage table is missing")
        }
    }

    fn storage() -> Arc<MemoryStorage> {
        Arc::new(
            vec![
                Entity::new("media", "1", "Logo"),
                Entity::new("node", "3", "Home").with_canonical(),
            ]
            .into_iter()
            .collect(),
        )
    }

    fn index() -> Arc<MemoryUsageIndex> {
        Arc::new(
            vec![UsageEdge::new(
                &EntityRef::new("media", "1"),
                &EntityRef::new("node", "3"),
            )]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn test_get_usage_resolves_target() {
        let lookup = UsageLookup::new(storage(), index());
        let usage = lookup.get_usage("media", &"1".into()).unwrap();
        assert_eq!(usage.total(), 1);
    }

    #[test]
    fn test_get_usage_unresolvable_target_is_empty() {
        let lookup = UsageLookup::new(storage(), index());
        let usage = lookup.get_usage("media", &"404".into()).unwrap();
        assert!(usage.is_empty());
    }

    #[test]
    fn test_list_usage_with_loaded_entity() {
        let lookup = UsageLookup::new(storage(), index());
        let usage = lookup.list_usage(&Entity::new("media", "1", "Logo")).unwrap();
        assert_eq!(usage.count_for("node"), 1);
    }

    #[test]
    fn test_index_failure_propagates() {
        let lookup = UsageLookup::new(storage(), Arc::new(BrokenIndex));
        let err = lookup.get_usage("media", &"1".into()).unwrap_err();
        assert!(format!("{err:#}").contains("usage table is missing"));
    }
}
