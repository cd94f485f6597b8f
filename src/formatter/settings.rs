//! # Display Settings
//!
//! Typed settings of the entity usage formatter, validated once from the
//! untyped settings bag the host persists.
//!
//! ## Accepted Shapes
//!
//! | Key | Default | Accepted values |
//! |-----|---------|-----------------|
//! | `max_expanded` | `3` | non-negative integer, or a numeric string |
//! | `show_fields` | `["entity"]` | column name, list of names, or checkbox map |
//! | `show_header` | `false` | boolean, `0`/`1`, `"0"`/`"1"`, `"true"`/`"false"` |
//!
//! A checkbox map is what a checkboxes widget submits: every option is a key,
//! unchecked options carry `0`, `false` or an empty string.
//!
//! ```json
//! { "show_fields": { "entity": "entity", "status": 0, "type": "type" } }
//! ```
//!
//! Values of the wrong shape fall back to the option's default and are logged
//! at `warn`. Settings never fail a render.

use crate::render::Column;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

/// Choices offered for `max_expanded` in the settings form.
pub const MAX_EXPANDED_OPTIONS: [u32; 8] = [0, 1, 3, 5, 10, 20, 50, 100];

const DEFAULT_MAX_EXPANDED: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplaySettings {
    /// Highest usage total still rendered as a table.
    pub max_expanded: u32,
    /// Table columns.
    pub show_fields: BTreeSet<Column>,
    /// Whether the table carries a header row.
    pub show_header: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            max_expanded: DEFAULT_MAX_EXPANDED,
            show_fields: BTreeSet::from([Column::Entity]),
            show_header: false,
        }
    }
}

impl DisplaySettings {
    /// Validate an untyped settings bag. Missing keys take their default.
    pub fn from_value(raw: &Value) -> Self {
        let defaults = Self::default();
        let bag = match raw {
            Value::Object(bag) => bag,
            Value::Null => return defaults,
            other => {
                tracing::warn!(settings = %other, "settings are not an object, using defaults");
                return defaults;
            }
        };

        for key in bag.keys() {
            if !matches!(key.as_str(), "max_expanded" | "show_fields" | "show_header") {
                tracing::debug!(key = %key, "ignoring unrecognized setting");
            }
        }

        Self {
            max_expanded: setting(bag, "max_expanded", parse_max_expanded)
                .unwrap_or(defaults.max_expanded),
            show_fields: setting(bag, "show_fields", parse_show_fields)
                .unwrap_or(defaults.show_fields),
            show_header: setting(bag, "show_header", parse_flag).unwrap_or(defaults.show_header),
        }
    }

    /// The canonical settings bag.
    pub fn to_value(&self) -> Value {
        let fields: Vec<&str> = self.show_fields.iter().map(|c| c.name()).collect();
        json!({
            "max_expanded": self.max_expanded,
            "show_fields": fields,
            "show_header": self.show_header,
        })
    }

    /// Requested columns in display order.
    pub fn columns(&self) -> Vec<Column> {
        self.show_fields.iter().copied().collect()
    }
}

/// Read one setting. `None` when the key is absent, null, or invalid.
fn setting<T>(bag: &Map<String, Value>, key: &str, parse: fn(&Value) -> Option<T>) -> Option<T> {
    let value = bag.get(key).filter(|v| !v.is_null())?;
    let parsed = parse(value);
    if parsed.is_none() {
        tracing::warn!(key, value = %value, "invalid setting, using default");
    }
    parsed
}

fn parse_max_expanded(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim() {
            "1" | "true" => Some(true),
            "0" | "false" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_show_fields(value: &Value) -> Option<BTreeSet<Column>> {
    let names: Vec<&str> = match value {
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.as_str()),
                other => {
                    tracing::warn!(value = %other, "ignoring non-string show_fields entry");
                    None
                }
            })
            .collect(),
        Value::Object(checkboxes) => checkboxes
            .iter()
            .filter(|(_, checked)| is_checked(checked))
            .map(|(name, _)| name.as_str())
            .collect(),
        _ => return None,
    };

    let columns = names
        .into_iter()
        .filter_map(|name| match name.parse::<Column>() {
            Ok(column) => Some(column),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unknown column in show_fields");
                None
            }
        })
        .collect();
    Some(columns)
}

fn is_checked(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(_) | Value::Object(_) => true,
    }
}
