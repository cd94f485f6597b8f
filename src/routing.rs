//! # Routing
//!
//! URL generation for the two routes usage rendering links to.
//!
//! ## Route Names
//!
//! | Route | Purpose | Default template |
//! |-------|---------|------------------|
//! | `entity.<type>.canonical` | Display page of an entity | `/<type>/{<type>}` |
//! | `entity.<type>.entity_usage` | Full usage listing of an entity | `/<type>/{<type>}/usage` |
//!
//! Route parameters are keyed by the entity type name, so the usage page of
//! `media:5` is built from `entity.media.entity_usage` with `{media: 5}`.

use crate::entity::EntityRef;
use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

/// A generated URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Url(String);

impl Url {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named route parameters.
pub type RouteParams = BTreeMap<String, String>;

/// Builds URLs from route names.
pub trait UrlGenerator: Send + Sync {
    fn build_url(&self, route_name: &str, params: &RouteParams) -> Result<Url>;
}

/// Name of the usage listing route for an entity type.
pub fn usage_route(entity_type: &str) -> String {
    format!("entity.{entity_type}.entity_usage")
}

/// Name of the canonical display route for an entity type.
pub fn canonical_route(entity_type: &str) -> String {
    format!("entity.{entity_type}.canonical")
}

/// Route parameters addressing one entity: `{<entity_type>: <id>}`.
pub fn entity_params(entity: &EntityRef) -> RouteParams {
    let mut params = RouteParams::new();
    params.insert(entity.entity_type.clone(), entity.id.to_string());
    params
}

/// URL of the usage listing page of `entity`.
pub fn usage_url(urls: &dyn UrlGenerator, entity: &EntityRef) -> Result<Url> {
    urls.build_url(&usage_route(&entity.entity_type), &entity_params(entity))
}

/// URL of the canonical display page of `entity`.
pub fn canonical_url(urls: &dyn UrlGenerator, entity: &EntityRef) -> Result<Url> {
    urls.build_url(&canonical_route(&entity.entity_type), &entity_params(entity))
}

/// Template based [`UrlGenerator`].
///
/// Explicitly registered templates take precedence; conventional entity
/// routes resolve without registration.
#[derive(Debug, Clone, Default)]
pub struct PathRouter {
    base_path: String,
    routes: HashMap<String, String>,
}

impl PathRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix every generated path, e.g. `/cms` or `https://example.com`.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into().trim_end_matches('/').to_string();
        self
    }

    /// Register a route template such as `/content/{node}/references`.
    pub fn route(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.routes.insert(name.into(), template.into());
        self
    }

    fn template(&self, route_name: &str) -> Option<String> {
        if let Some(template) = self.routes.get(route_name) {
            return Some(template.clone());
        }

        let rest = route_name.strip_prefix("entity.")?;
        let (entity_type, kind) = rest.split_once('.')?;
        if entity_type.is_empty() {
            return None;
        }
        match kind {
            "canonical" => Some(format!("/{entity_type}/{{{entity_type}}}")),
            "entity_usage" => Some(format!("/{entity_type}/{{{entity_type}}}/usage")),
            _ => None,
        }
    }
}

fn placeholder_re() -> Result<&'static Regex> {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    if let Some(re) = PLACEHOLDER.get() {
        return Ok(re);
    }
    let re = Regex::new(r"\{([A-Za-z0-9_]+)\}").context("Failed to compile placeholder regex")?;
    Ok(PLACEHOLDER.get_or_init(|| re))
}

/// Substitute `{name}` placeholders in `template` with `params`.
fn expand(template: &str, params: &RouteParams) -> Result<String> {
    let re = placeholder_re()?;
    let mut path = String::with_capacity(template.len());
    let mut last = 0;

    for cap in re.captures_iter(template) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let Some(value) = params.get(name.as_str()) else {
            bail!(
                "Missing route parameter '{}' for template '{}'",
                name.as_str(),
                template
            );
        };
        path.push_str(&template[last..whole.start()]);
        path.push_str(&encode_segment(value));
        last = whole.end();
    }
    path.push_str(&template[last..]);

    Ok(path)
}

/// Percent-encode characters that cannot appear in a path segment.
fn encode_segment(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(char::from(byte));
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

impl UrlGenerator for PathRouter {
    fn build_url(&self, route_name: &str, params: &RouteParams) -> Result<Url> {
        let Some(template) = self.template(route_name) else {
            bail!("Route '{}' does not exist", route_name);
        };
        let path = expand(&template, params)
            .with_context(|| format!("Failed to build URL for route '{route_name}'"))?;
        Ok(Url(format!("{}{}", self.base_path, path)))
    }
}
