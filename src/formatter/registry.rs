use super::{Formatter, FormatterDefinition};
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Builds a formatter instance from a raw settings bag.
pub type FormatterFactory = Box<dyn Fn(&Value) -> Result<Box<dyn Formatter>> + Send + Sync>;

struct Registration {
    definition: FormatterDefinition,
    factory: FormatterFactory,
}

/// Formatters known to the embedding application, keyed by id.
#[derive(Default)]
pub struct FormatterRegistry {
    formatters: BTreeMap<&'static str, Registration>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a formatter. Ids must be unique.
    pub fn register(
        &mut self,
        definition: FormatterDefinition,
        factory: FormatterFactory,
    ) -> Result<()> {
        if self.formatters.contains_key(definition.id) {
            bail!("Formatter '{}' is already registered", definition.id);
        }
        tracing::debug!(id = definition.id, "registered formatter");
        self.formatters
            .insert(definition.id, Registration { definition, factory });
        Ok(())
    }

    /// Build the formatter `id` with the given settings.
    pub fn create(&self, id: &str, settings: &Value) -> Result<Box<dyn Formatter>> {
        let Some(registration) = self.formatters.get(id) else {
            bail!("Unknown formatter '{}'", id);
        };
        (registration.factory)(settings)
            .with_context(|| format!("Failed to create formatter '{id}'"))
    }

    pub fn get(&self, id: &str) -> Option<&FormatterDefinition> {
        self.formatters.get(id).map(|r| &r.definition)
    }

    /// All definitions, ordered by id.
    pub fn definitions(&self) -> impl Iterator<Item = &FormatterDefinition> {
        self.formatters.values().map(|r| &r.definition)
    }

    /// Definitions offered for a field type.
    pub fn for_field_type(&self, field_type: &str) -> Vec<&FormatterDefinition> {
        self.definitions()
            .filter(|d| d.field_types.contains(&field_type))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }
}
