//! # Site Snapshot
//!
//! Loads entities and usage rows exported from a site into the in-memory
//! collaborators.
//!
//! ## Format
//!
//! ```json
//! {
//!   "entities": [
//!     { "entity_type": "media", "id": 5, "label": "Logo" },
//!     { "entity_type": "node", "id": 1, "label": "Home", "canonical": true, "status": true }
//!   ],
//!   "usage": [
//!     { "target_type": "media", "target_id": 5, "source_type": "node", "source_id": 1,
//!       "method": "entity_reference", "field_name": "field_media" }
//!   ]
//! }
//! ```

use crate::entity::{Entity, MemoryStorage};
use crate::usage::{MemoryUsageIndex, UsageEdge};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub usage: Vec<UsageEdge>,
}

impl Snapshot {
    /// Load a snapshot from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        let snapshot: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            entities = snapshot.entities.len(),
            usage = snapshot.usage.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Split into entity storage and usage index.
    pub fn into_parts(self) -> (MemoryStorage, MemoryUsageIndex) {
        (
            self.entities.into_iter().collect(),
            self.usage.into_iter().collect(),
        )
    }
}
