use super::{
    DisplaySettings, FieldDefinition, FieldItem, Formatter, FormatterDefinition,
    FormatterRegistry, SettingDefinition, SettingOption, Widget, MAX_EXPANDED_OPTIONS,
};
use crate::entity::{EntityRef, EntityStorage};
use crate::render::{Column, RenderedOutput, Theme, UsageRenderer};
use crate::routing::UrlGenerator;
use crate::translation::Translator;
use crate::usage::{UsageIndex, UsageLookup};
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;

/// Collaborators the entity usage formatter is built with.
#[derive(Clone)]
pub struct UsageServices {
    pub lookup: UsageLookup,
    pub renderer: UsageRenderer,
    pub translator: Arc<dyn Translator>,
    pub theme: Arc<dyn Theme>,
}

impl UsageServices {
    pub fn new(
        storage: Arc<dyn EntityStorage>,
        index: Arc<dyn UsageIndex>,
        urls: Arc<dyn UrlGenerator>,
        translator: Arc<dyn Translator>,
        theme: Arc<dyn Theme>,
    ) -> Self {
        Self {
            lookup: UsageLookup::new(Arc::clone(&storage), index),
            renderer: UsageRenderer::new(storage, urls, Arc::clone(&translator)),
            translator,
            theme,
        }
    }
}

/// Shows which entities reference the entity whose id the field holds.
///
/// Up to `max_expanded` usages are listed in a table; above that, the usage
/// count links to the entity's usage page.
pub struct EntityUsageFormatter {
    services: UsageServices,
    settings: DisplaySettings,
}

impl EntityUsageFormatter {
    pub const ID: &'static str = "entity_usage_addons_formatter";

    pub const DEFINITION: FormatterDefinition = FormatterDefinition {
        id: Self::ID,
        label: "Entity Usage",
        description: "Lists the entities that reference this entity, or links their count.",
        field_types: &["integer"],
    };

    pub fn new(services: UsageServices, settings: DisplaySettings) -> Self {
        Self { services, settings }
    }

    /// Register the formatter; instances share `services`.
    pub fn register(registry: &mut FormatterRegistry, services: UsageServices) -> Result<()> {
        registry.register(
            Self::DEFINITION,
            Box::new(move |raw| {
                let settings = DisplaySettings::from_value(raw);
                Ok(Box::new(Self::new(services.clone(), settings)) as Box<dyn Formatter>)
            }),
        )
    }

    pub fn display_settings(&self) -> &DisplaySettings {
        &self.settings
    }

    fn t(&self, source: &str) -> String {
        self.services.translator.translate(source)
    }
}

impl Formatter for EntityUsageFormatter {
    fn definition(&self) -> &FormatterDefinition {
        &Self::DEFINITION
    }

    fn default_settings(&self) -> Value {
        DisplaySettings::default().to_value()
    }

    fn settings_schema(&self) -> Vec<SettingDefinition> {
        let defaults = DisplaySettings::default().to_value();
        let default_of = |key: &str| defaults.get(key).cloned().unwrap_or(Value::Null);

        vec![
            SettingDefinition {
                key: "max_expanded",
                title: self.t("Max number of references to expand"),
                description: self.t("Max number of references to expand."),
                widget: Widget::Select {
                    options: MAX_EXPANDED_OPTIONS
                        .iter()
                        .map(|n| SettingOption::new(n.to_string(), n.to_string()))
                        .collect(),
                },
                default: default_of("max_expanded"),
            },
            SettingDefinition {
                key: "show_header",
                title: self.t("Show Header"),
                description: self.t("Show a header row above the usage table."),
                widget: Widget::Checkbox,
                default: default_of("show_header"),
            },
            SettingDefinition {
                key: "show_fields",
                title: self.t("Show Fields"),
                description: self.t("Select the fields to display."),
                widget: Widget::Checkboxes {
                    options: Column::ALL
                        .iter()
                        .map(|c| SettingOption::new(c.name(), self.t(c.label())))
                        .collect(),
                },
                default: default_of("show_fields"),
            },
        ]
    }

    fn settings(&self) -> Value {
        self.settings.to_value()
    }

    /// Offered for every field; the field value is read as an entity id.
    fn is_applicable(&self, _field: &FieldDefinition) -> bool {
        true
    }

    fn theme(&self) -> &dyn Theme {
        self.services.theme.as_ref()
    }

    fn render(&self, item: &FieldItem) -> Result<Option<RenderedOutput>> {
        let Some(id) = &item.value else {
            return Ok(None);
        };
        let target = EntityRef::new(item.host.entity_type.clone(), id.clone());

        let usage = self.services.lookup.get_usage(&target.entity_type, &target.id)?;
        self.services
            .renderer
            .render(&target, &usage, &self.settings)
    }
}
