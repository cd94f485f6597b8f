//! # Formatter Module
//!
//! Field formatters and the registry the embedding application owns.
//!
//! ## Overview
//!
//! A formatter turns one field item into markup. The host looks formatters
//! up by id in a [`FormatterRegistry`], builds an instance from the settings
//! it persisted for the field display, and calls
//! [`Formatter::view_value`] once per item.
//!
//! ```text
//! host settings bag ──► FormatterRegistry::create ──► Box<dyn Formatter>
//!                                                        │
//!                          FieldItem ──► view_value ─────┘──► Option<Markup>
//! ```
//!
//! ## Formatters
//!
//! | Id | Field types | Output |
//! |----|-------------|--------|
//! | `entity_usage_addons_formatter` | `integer` | [`EntityUsageFormatter`] |

mod entity_usage;
mod registry;
mod settings;

pub use entity_usage::{EntityUsageFormatter, UsageServices};
pub use registry::{FormatterFactory, FormatterRegistry};
pub use settings::{DisplaySettings, MAX_EXPANDED_OPTIONS};

use crate::entity::{EntityId, EntityRef};
use crate::render::{Markup, RenderedOutput, Theme};
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// Static description of a formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatterDefinition {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    /// Field types the formatter is offered for.
    pub field_types: &'static [&'static str],
}

/// The field a formatter is configured on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: String,
    /// Entity type the field is attached to.
    pub entity_type: String,
}

/// One value of a field, as handed over by the host's rendering pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldItem {
    /// Entity the field belongs to.
    pub host: EntityRef,
    pub value: Option<EntityId>,
}

impl FieldItem {
    pub fn new(host: EntityRef, value: impl Into<EntityId>) -> Self {
        Self {
            host,
            value: Some(value.into()),
        }
    }

    /// An item without a value.
    pub fn empty(host: EntityRef) -> Self {
        Self { host, value: None }
    }
}

/// A settings form element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingDefinition {
    pub key: &'static str,
    pub title: String,
    pub description: String,
    pub widget: Widget,
    pub default: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Widget {
    Select { options: Vec<SettingOption> },
    Checkbox,
    Checkboxes { options: Vec<SettingOption> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingOption {
    pub value: String,
    pub label: String,
}

impl SettingOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A configured field formatter.
pub trait Formatter: Send + Sync {
    fn definition(&self) -> &FormatterDefinition;

    /// Settings a new field display starts with.
    fn default_settings(&self) -> Value;

    /// Form elements for editing the settings.
    fn settings_schema(&self) -> Vec<SettingDefinition>;

    /// Settings this instance was built with, after validation.
    fn settings(&self) -> Value;

    fn is_applicable(&self, field: &FieldDefinition) -> bool {
        self.definition()
            .field_types
            .contains(&field.field_type.as_str())
    }

    fn theme(&self) -> &dyn Theme;

    /// Structured output for one item, `None` when there is nothing to show.
    fn render(&self, item: &FieldItem) -> Result<Option<RenderedOutput>>;

    fn view_value(&self, item: &FieldItem) -> Result<Option<Markup>> {
        Ok(self
            .render(item)?
            .map(|output| self.theme().output(&output)))
    }

    /// Render every item of a field, in order.
    fn view_elements(&self, items: &[FieldItem]) -> Result<Vec<Option<Markup>>> {
        items.iter().map(|item| self.view_value(item)).collect()
    }
}
