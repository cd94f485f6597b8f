//! # Translation
//!
//! Interface strings (column labels and publish states) pass through a
//! [`Translator`] before they reach the output.
//!
//! A [`Catalog`] is a flat JSON object mapping source strings to
//! translations:
//!
//! ```json
//! { "Published": "Publié", "Unpublished": "Non publié" }
//! ```

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Translates interface strings.
pub trait Translator: Send + Sync {
    fn translate(&self, source: &str) -> String;
}

/// Returns every string unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Translator for Passthrough {
    fn translate(&self, source: &str) -> String {
        source.to_string()
    }
}

/// Lookup table of translations. Strings without an entry are returned as is.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    strings: HashMap<String, String>,
}

impl Catalog {
    pub fn new(strings: HashMap<String, String>) -> Self {
        Self { strings }
    }

    /// Load a catalog from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read translation file: {}", path.display()))?;
        let strings: HashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse translation file: {}", path.display()))?;
        Ok(Self { strings })
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Translator for Catalog {
    fn translate(&self, source: &str) -> String {
        self.strings
            .get(source)
            .cloned()
            .unwrap_or_else(|| source.to_string())
    }
}
