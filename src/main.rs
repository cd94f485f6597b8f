//! # usage-view
//!
//! Renders the usage of one entity from a site snapshot, the way the entity
//! usage formatter would render it on a page.
//!
//! ## Usage
//!
//! ```bash
//! # Table or linked count for media 5, as HTML
//! usage-view --snapshot site.json --entity-type media --id 5
//!
//! # Terminal table with every column and a header
//! usage-view --snapshot site.json --entity-type media --id 5 \
//!     --show-fields entity,status,type --show-header --format text
//!
//! # Structured output
//! usage-view --snapshot site.json --entity-type node --id 1 --format json
//!
//! # Registered formatters and their settings form
//! usage-view --list-formatters
//! ```
//!
//! Nothing is printed when the entity has no usage. Logging goes to stderr
//! and is controlled with `RUST_LOG` (default `warn`).

use entity_usage::config::Config;
use entity_usage::entity::EntityRef;
use entity_usage::formatter::{
    EntityUsageFormatter, FieldItem, Formatter, FormatterRegistry, UsageServices,
};
use entity_usage::render::{HtmlTheme, Markup, TextTheme, Theme};
use entity_usage::routing::PathRouter;
use entity_usage::snapshot::Snapshot;
use entity_usage::translation::{Catalog, Passthrough, Translator};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Html,
    Text,
    Json,
}

/// Render entity usage as a linked count or a detailed table
#[derive(Parser, Debug)]
#[command(name = "usage-view")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render entity usage as a linked count or a detailed table", long_about = None)]
struct Args {
    /// Site snapshot with entities and usage rows (JSON)
    #[arg(short, long, value_name = "FILE", required_unless_present = "list_formatters")]
    snapshot: Option<PathBuf>,

    /// Entity type of the target entity
    #[arg(short = 't', long, required_unless_present = "list_formatters")]
    entity_type: Option<String>,

    /// Id of the target entity
    #[arg(short, long, required_unless_present = "list_formatters")]
    id: Option<String>,

    /// Highest usage count still rendered as a table
    #[arg(short, long, value_name = "N")]
    max_expanded: Option<u32>,

    /// Table columns, comma separated (entity, status, type)
    #[arg(long, value_name = "FIELDS", value_delimiter = ',')]
    show_fields: Option<Vec<String>>,

    /// Add a header row to the table
    #[arg(long)]
    show_header: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the registered formatters and their settings form, then exit
    #[arg(long)]
    list_formatters: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    let translator: Arc<dyn Translator> = match &config.translations {
        Some(path) => Arc::new(Catalog::load_from(path)?),
        None => Arc::new(Passthrough),
    };
    let theme: Arc<dyn Theme> = match args.format {
        OutputFormat::Text => Arc::new(TextTheme),
        OutputFormat::Html | OutputFormat::Json => Arc::new(HtmlTheme),
    };
    let router = PathRouter::new().with_base_path(config.base_path.clone());

    let snapshot = match &args.snapshot {
        Some(path) => Snapshot::load_from(path)?,
        None => Snapshot::default(),
    };
    let (storage, index) = snapshot.into_parts();

    let services = UsageServices::new(
        Arc::new(storage),
        Arc::new(index),
        Arc::new(router),
        translator,
        theme,
    );
    let mut registry = FormatterRegistry::new();
    EntityUsageFormatter::register(&mut registry, services)?;

    if args.list_formatters {
        return list_formatters(&registry);
    }

    let (Some(entity_type), Some(id)) = (&args.entity_type, &args.id) else {
        anyhow::bail!("--entity-type and --id are required");
    };

    let settings = display_settings(&config.display, args);
    let formatter = registry.create(EntityUsageFormatter::ID, &settings)?;
    let item = FieldItem::new(EntityRef::new(entity_type.as_str(), id.as_str()), id.as_str());

    if let Some(text) = format_item(formatter.as_ref(), &item, args.format)? {
        println!("{text}");
    }

    Ok(())
}

/// Render one item in the requested format. `None` when there is no usage.
fn format_item(
    formatter: &dyn Formatter,
    item: &FieldItem,
    format: OutputFormat,
) -> Result<Option<String>> {
    match format {
        OutputFormat::Json => formatter
            .render(item)?
            .map(|output| {
                serde_json::to_string_pretty(&output).context("Failed to serialize output")
            })
            .transpose(),
        OutputFormat::Html | OutputFormat::Text => {
            Ok(formatter.view_value(item)?.map(Markup::into_string))
        }
    }
}

/// Merge command-line overrides into the configured settings bag.
fn display_settings(configured: &Value, args: &Args) -> Value {
    let mut bag = match configured {
        Value::Object(bag) => bag.clone(),
        _ => Map::new(),
    };

    if let Some(max_expanded) = args.max_expanded {
        bag.insert("max_expanded".to_string(), json!(max_expanded));
    }
    if let Some(fields) = &args.show_fields {
        let fields: Vec<&str> = fields
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect();
        bag.insert("show_fields".to_string(), json!(fields));
    }
    if args.show_header {
        bag.insert("show_header".to_string(), Value::Bool(true));
    }

    Value::Object(bag)
}

fn list_formatters(registry: &FormatterRegistry) -> Result<()> {
    for definition in registry.definitions() {
        let formatter = registry.create(definition.id, &Value::Null)?;
        let listing = json!({
            "definition": definition,
            "default_settings": formatter.default_settings(),
            "settings_schema": formatter.settings_schema(),
        });
        let json =
            serde_json::to_string_pretty(&listing).context("Failed to serialize formatter")?;
        println!("{json}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["usage-view", "-s", "site.json", "-t", "media", "-i", "5"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn formatter(theme: Arc<dyn Theme>) -> Box<dyn Formatter> {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "entities": [
                {"entity_type": "media", "id": 5, "label": "Logo"},
                {"entity_type": "media", "id": 6, "label": "Unused"},
                {"entity_type": "node", "id": 1, "label": "Home"}
            ],
            "usage": [
                {"target_type": "media", "target_id": 5, "source_type": "node", "source_id": 1}
            ]
        }))
        .unwrap();
        let (storage, index) = snapshot.into_parts();
        let services = UsageServices::new(
            Arc::new(storage),
            Arc::new(index),
            Arc::new(PathRouter::new()),
            Arc::new(Passthrough),
            theme,
        );
        let mut registry = FormatterRegistry::new();
        EntityUsageFormatter::register(&mut registry, services).unwrap();
        registry.create(EntityUsageFormatter::ID, &Value::Null).unwrap()
    }

    fn media_item(id: &str) -> FieldItem {
        FieldItem::new(EntityRef::new("media", id), id)
    }

    #[test]
    fn test_no_usage_prints_nothing_in_every_format() {
        for format in [OutputFormat::Json, OutputFormat::Html, OutputFormat::Text] {
            let formatter = formatter(Arc::new(HtmlTheme));
            let text = format_item(formatter.as_ref(), &media_item("6"), format).unwrap();
            assert_eq!(text, None, "{format:?} should print nothing");
        }
    }

    #[test]
    fn test_json_output_for_usage() {
        let formatter = formatter(Arc::new(HtmlTheme));
        let text = format_item(formatter.as_ref(), &media_item("5"), OutputFormat::Json)
            .unwrap()
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["kind"], "table");
        assert_eq!(value["rows"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_cli_overrides_configured_settings() {
        let configured = json!({"max_expanded": 10, "show_fields": ["type"]});
        let args = args(&["--max-expanded", "2", "--show-header"]);

        let bag = display_settings(&configured, &args);
        assert_eq!(
            bag,
            json!({"max_expanded": 2, "show_fields": ["type"], "show_header": true})
        );
    }

    #[test]
    fn test_show_fields_comma_list() {
        let args = args(&["--show-fields", "entity, status,type"]);
        let bag = display_settings(&Value::Null, &args);
        assert_eq!(bag, json!({"show_fields": ["entity", "status", "type"]}));
    }

    #[test]
    fn test_target_required_unless_listing() {
        assert!(Args::try_parse_from(["usage-view"]).is_err());
        assert!(Args::try_parse_from(["usage-view", "--list-formatters"]).is_ok());
    }

    #[test]
    fn test_format_values() {
        let args = args(&["--format", "json"]);
        assert_eq!(args.format, OutputFormat::Json);
    }
}
