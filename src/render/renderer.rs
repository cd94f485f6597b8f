use super::{Cell, Column, LinkOutput, RenderedOutput, TableOutput};
use crate::entity::{Entity, EntityRef, EntityStorage};
use crate::formatter::DisplaySettings;
use crate::routing::{self, UrlGenerator};
use crate::translation::Translator;
use crate::usage::UsageMap;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Chooses between the linked count and the table, and projects table rows.
#[derive(Clone)]
pub struct UsageRenderer {
    storage: Arc<dyn EntityStorage>,
    urls: Arc<dyn UrlGenerator>,
    translator: Arc<dyn Translator>,
}

impl UsageRenderer {
    pub fn new(
        storage: Arc<dyn EntityStorage>,
        urls: Arc<dyn UrlGenerator>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            storage,
            urls,
            translator,
        }
    }

    /// Render the usage of `target`.
    ///
    /// Returns `Ok(None)` when there is no usage at all.
    pub fn render(
        &self,
        target: &EntityRef,
        usage: &UsageMap,
        settings: &DisplaySettings,
    ) -> Result<Option<RenderedOutput>> {
        if usage.is_empty() {
            return Ok(None);
        }

        let total = usage.total();
        let max_expanded = usize::try_from(settings.max_expanded).unwrap_or(usize::MAX);

        if total > max_expanded {
            tracing::debug!(%target, total, max_expanded, "rendering usage as link");
            let url = routing::usage_url(self.urls.as_ref(), target)
                .with_context(|| format!("Failed to build usage link for {target}"))?;
            return Ok(Some(RenderedOutput::Link(LinkOutput { count: total, url })));
        }

        tracing::debug!(%target, total, max_expanded, "rendering usage as table");
        self.project(usage, settings).map(|table| Some(RenderedOutput::Table(table)))
    }

    /// Project one row per resolvable source entity, across all source types.
    ///
    /// Sources that no longer load are skipped. The header label of a column
    /// is produced the first time a cell of that column is emitted.
    pub fn project(&self, usage: &UsageMap, settings: &DisplaySettings) -> Result<TableOutput> {
        let columns = settings.columns();
        let mut labels: BTreeMap<Column, String> = BTreeMap::new();
        let mut rows = Vec::with_capacity(usage.total());

        for record in usage.records() {
            let source = self
                .storage
                .load(&record.source_type, &record.source_id)
                .with_context(|| {
                    format!(
                        "Failed to load usage source {}:{}",
                        record.source_type, record.source_id
                    )
                })?;
            let Some(source) = source else {
                tracing::debug!(
                    source_type = %record.source_type,
                    source_id = %record.source_id,
                    "usage source not found, skipping row"
                );
                continue;
            };

            let mut row = Vec::with_capacity(columns.len());
            for &column in &columns {
                row.push(self.cell(column, &source)?);
                labels
                    .entry(column)
                    .or_insert_with(|| self.translator.translate(column.label()));
            }
            rows.push(row);
        }

        let header = settings
            .show_header
            .then(|| labels.into_values().collect());

        Ok(TableOutput { header, rows })
    }

    fn cell(&self, column: Column, source: &Entity) -> Result<Cell> {
        let cell = match column {
            Column::Entity if source.canonical => Cell::Link {
                text: source.label.clone(),
                url: routing::canonical_url(self.urls.as_ref(), &source.reference())?,
            },
            Column::Entity => Cell::Text(source.label.clone()),
            Column::Status => match source.status {
                Some(true) => Cell::Text(self.translator.translate("Published")),
                Some(false) => Cell::Text(self.translator.translate("Unpublished")),
                None => Cell::Empty,
            },
            Column::Type => Cell::Text(source.entity_type.clone()),
        };
        Ok(cell)
    }
}
