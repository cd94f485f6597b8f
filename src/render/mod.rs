//! # Render Module
//!
//! Turns the usage of a target entity into either a linked count or a table.
//!
//! ## Decision
//!
//! | Usage total | Output |
//! |-------------|--------|
//! | `0` | nothing |
//! | `1..=max_expanded` | [`TableOutput`], one row per resolvable source |
//! | `> max_expanded` | [`LinkOutput`] to the usage listing page |
//!
//! The total counts every source across all source types before the
//! decision is made.
//!
//! ## Columns
//!
//! Table columns always appear in the order of [`Column`], whatever order
//! they were requested in:
//!
//! | Column | Cell |
//! |--------|------|
//! | `entity` | Link to the source, or its label when it has no canonical page |
//! | `status` | `Published`, `Unpublished`, or empty for types without status |
//! | `type` | Source entity type id |
//!
//! [`Theme`] implementations turn the structured output into markup.

mod renderer;
mod theme;

pub use renderer::UsageRenderer;
pub use theme::{escape_html, HtmlTheme, TextTheme, Theme};

use crate::routing::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A table column. Variant order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Entity,
    Status,
    Type,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Entity, Column::Status, Column::Type];

    /// Machine name used in settings.
    pub fn name(self) -> &'static str {
        match self {
            Column::Entity => "entity",
            Column::Status => "status",
            Column::Type => "type",
        }
    }

    /// Untranslated header label.
    pub fn label(self) -> &'static str {
        match self {
            Column::Entity => "Entity",
            Column::Status => "Status",
            Column::Type => "Type",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|column| column.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown usage column '{}'", s))
    }
}

/// One table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Cell {
    Link { text: String, url: Url },
    Text(String),
    Empty,
}

/// Summary form: the usage count linked to the full listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkOutput {
    pub count: usize,
    pub url: Url,
}

/// Detailed form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableOutput {
    /// Column labels, present only when the header is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RenderedOutput {
    Link(LinkOutput),
    Table(TableOutput),
}

impl RenderedOutput {
    pub fn as_link(&self) -> Option<&LinkOutput> {
        match self {
            RenderedOutput::Link(link) => Some(link),
            RenderedOutput::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableOutput> {
        match self {
            RenderedOutput::Table(table) => Some(table),
            RenderedOutput::Link(_) => None,
        }
    }
}

/// Rendered markup, ready for the host page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
