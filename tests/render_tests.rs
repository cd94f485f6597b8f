//! Display decision and row projection tests
//!
//! Exercises the renderer through the public API with in-memory
//! collaborators and test doubles for failing ones.

use entity_usage::entity::{Entity, EntityId, EntityRef, EntityStorage, MemoryStorage};
use entity_usage::formatter::DisplaySettings;
use entity_usage::render::{Cell, Column, RenderedOutput, UsageRenderer};
use entity_usage::routing::{PathRouter, RouteParams, Url, UrlGenerator};
use entity_usage::translation::{Catalog, Passthrough};
use entity_usage::usage::{UsageMap, UsageRecord};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

/// Storage that fails for one entity type
struct FlakyStorage {
    inner: MemoryStorage,
    broken_type: &'static str,
}

impl EntityStorage for FlakyStorage {
    fn load(&self, entity_type: &str, id: &EntityId) -> anyhow::Result<Option<Entity>> {
        if entity_type == self.broken_type {
            anyhow::bail!("database connection lost");
        }
        self.inner.load(entity_type, id)
    }
}

/// Router that records every route it is asked for
#[derive(Default)]
struct RecordingRouter {
    calls: Mutex<Vec<(String, RouteParams)>>,
}

impl UrlGenerator for RecordingRouter {
    fn build_url(&self, route_name: &str, params: &RouteParams) -> anyhow::Result<Url> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((route_name.to_string(), params.clone()));
        }
        Ok(Url::new(format!("/r/{route_name}")))
    }
}

fn site() -> MemoryStorage {
    vec![
        Entity::new("node", "1", "Home").with_canonical().with_status(true),
        Entity::new("node", "2", "Draft post").with_canonical().with_status(false),
        Entity::new("node", "3", "About").with_canonical().with_status(true),
        Entity::new("node", "4", "Contact").with_canonical().with_status(true),
        Entity::new("node", "5", "Press").with_canonical().with_status(true),
        Entity::new("media", "2", "Gallery").with_status(true),
        Entity::new("media", "3", "Video").with_status(false),
        Entity::new("paragraph", "8", "Hero"),
    ]
    .into_iter()
    .collect()
}

fn renderer() -> UsageRenderer {
    UsageRenderer::new(
        Arc::new(site()),
        Arc::new(PathRouter::new()),
        Arc::new(Passthrough),
    )
}

fn usage(sources: &[(&str, &str)]) -> UsageMap {
    sources
        .iter()
        .map(|(ty, id)| UsageRecord::new(*ty, *id))
        .collect()
}

fn settings(max_expanded: u32) -> DisplaySettings {
    DisplaySettings {
        max_expanded,
        ..Default::default()
    }
}

fn target() -> EntityRef {
    EntityRef::new("media", "5")
}

#[test]
fn test_single_usage_renders_table() {
    let output = renderer()
        .render(&target(), &usage(&[("node", "5")]), &settings(3))
        .unwrap()
        .unwrap();

    let table = output.as_table().unwrap();
    assert_eq!(table.rows.len(), 1);
}

#[test]
fn test_four_usages_over_three_render_link() {
    let usage = usage(&[("node", "1"), ("node", "2"), ("node", "3"), ("node", "4")]);
    let output = renderer()
        .render(&target(), &usage, &settings(3))
        .unwrap()
        .unwrap();

    let link = output.as_link().unwrap();
    assert_eq!(link.count, 4);
    assert_eq!(link.url.as_str(), "/media/5/usage");
}

#[test]
fn test_total_is_aggregated_across_source_types() {
    // 1 node + 2 media: no single type exceeds 2, the total does.
    let usage = usage(&[("node", "1"), ("media", "2"), ("media", "3")]);
    let output = renderer()
        .render(&target(), &usage, &settings(2))
        .unwrap()
        .unwrap();

    assert_eq!(output.as_link().map(|l| l.count), Some(3));
}

#[test]
fn test_table_rows_cover_every_source_type() {
    let usage = usage(&[("node", "1"), ("media", "2"), ("paragraph", "8")]);
    let settings = DisplaySettings {
        max_expanded: 3,
        show_fields: BTreeSet::from([Column::Type]),
        show_header: false,
    };

    let output = renderer()
        .render(&target(), &usage, &settings)
        .unwrap()
        .unwrap();

    let types: Vec<Cell> = output
        .as_table()
        .unwrap()
        .rows
        .iter()
        .flat_map(|row| row.iter().cloned())
        .collect();
    assert_eq!(
        types,
        vec![
            Cell::Text("media".to_string()),
            Cell::Text("node".to_string()),
            Cell::Text("paragraph".to_string()),
        ]
    );
}

#[test]
fn test_zero_threshold_always_links() {
    for sources in [
        vec![("node", "1")],
        vec![("node", "1"), ("media", "2")],
    ] {
        let output = renderer()
            .render(&target(), &usage(&sources), &settings(0))
            .unwrap()
            .unwrap();
        assert!(matches!(output, RenderedOutput::Link(_)));
    }
}

#[test]
fn test_link_iff_total_exceeds_threshold() {
    let all = [("node", "1"), ("node", "2"), ("node", "3"), ("node", "4"), ("node", "5")];
    for count in 1..=all.len() {
        for max_expanded in 0..=6u32 {
            let usage = usage(&all[..count]);
            let output = renderer()
                .render(&target(), &usage, &settings(max_expanded))
                .unwrap()
                .unwrap();

            if count > max_expanded as usize {
                assert_eq!(output.as_link().map(|l| l.count), Some(count));
            } else {
                assert_eq!(output.as_table().map(|t| t.rows.len()), Some(count));
            }
        }
    }
}

#[test]
fn test_empty_usage_renders_nothing() {
    for max_expanded in [0, 3, 100] {
        let output = renderer()
            .render(&target(), &UsageMap::new(), &settings(max_expanded))
            .unwrap();
        assert!(output.is_none());
    }
}

#[test]
fn test_unloadable_source_row_is_omitted() {
    let usage = usage(&[("node", "1"), ("node", "99"), ("media", "2")]);
    let output = renderer()
        .render(&target(), &usage, &settings(3))
        .unwrap()
        .unwrap();

    let table = output.as_table().unwrap();
    assert_eq!(table.rows.len(), 2);
}

#[test]
fn test_all_sources_unloadable_gives_empty_table() {
    let usage = usage(&[("node", "98"), ("node", "99")]);
    let settings = DisplaySettings {
        show_header: true,
        ..Default::default()
    };

    let output = renderer()
        .render(&target(), &usage, &settings)
        .unwrap()
        .unwrap();

    let table = output.as_table().unwrap();
    assert!(table.rows.is_empty());
    assert_eq!(table.header, Some(Vec::new()));
}

#[test]
fn test_header_present_only_when_enabled() {
    let usage = usage(&[("node", "1")]);
    for show_header in [true, false] {
        let settings = DisplaySettings {
            max_expanded: 3,
            show_fields: BTreeSet::from([Column::Status, Column::Entity]),
            show_header,
        };
        let output = renderer()
            .render(&target(), &usage, &settings)
            .unwrap()
            .unwrap();
        let header = output.as_table().unwrap().header.clone();

        if show_header {
            assert_eq!(header, Some(vec!["Entity".to_string(), "Status".to_string()]));
        } else {
            assert_eq!(header, None);
        }
    }
}

#[test]
fn test_status_cell_values() {
    let usage = usage(&[("node", "1"), ("node", "2"), ("paragraph", "8")]);
    let settings = DisplaySettings {
        max_expanded: 3,
        show_fields: BTreeSet::from([Column::Status]),
        show_header: false,
    };
    let output = renderer()
        .render(&target(), &usage, &settings)
        .unwrap()
        .unwrap();

    for row in &output.as_table().unwrap().rows {
        match &row[0] {
            Cell::Text(text) => assert!(text == "Published" || text == "Unpublished"),
            Cell::Empty => {}
            other => panic!("unexpected status cell {other:?}"),
        }
    }
}

#[test]
fn test_translated_labels() {
    let catalog = Catalog::new(HashMap::from([
        ("Entity".to_string(), "Entité".to_string()),
        ("Status".to_string(), "Statut".to_string()),
        ("Published".to_string(), "Publié".to_string()),
    ]));
    let renderer = UsageRenderer::new(
        Arc::new(site()),
        Arc::new(PathRouter::new()),
        Arc::new(catalog),
    );
    let settings = DisplaySettings {
        max_expanded: 3,
        show_fields: BTreeSet::from([Column::Entity, Column::Status]),
        show_header: true,
    };

    let output = renderer
        .render(&target(), &usage(&[("node", "1")]), &settings)
        .unwrap()
        .unwrap();
    let table = output.as_table().unwrap();

    assert_eq!(table.header, Some(vec!["Entité".to_string(), "Statut".to_string()]));
    assert_eq!(table.rows[0][1], Cell::Text("Publié".to_string()));
}

#[test]
fn test_storage_failure_propagates() {
    let storage = FlakyStorage {
        inner: site(),
        broken_type: "media",
    };
    let renderer = UsageRenderer::new(
        Arc::new(storage),
        Arc::new(PathRouter::new()),
        Arc::new(Passthrough),
    );

    let err = renderer
        .render(&target(), &usage(&[("node", "1"), ("media", "2")]), &settings(3))
        .unwrap_err();
    assert!(format!("{err:#}").contains("database connection lost"));
}

#[test]
fn test_link_routes_use_target_entity() {
    let router = Arc::new(RecordingRouter::default());
    let renderer = UsageRenderer::new(Arc::new(site()), router.clone(), Arc::new(Passthrough));

    let output = renderer
        .render(&target(), &usage(&[("node", "1"), ("node", "2")]), &settings(1))
        .unwrap()
        .unwrap();
    assert_eq!(output.as_link().unwrap().url.as_str(), "/r/entity.media.entity_usage");

    let calls = router.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "entity.media.entity_usage");
    assert_eq!(calls[0].1.get("media").map(String::as_str), Some("5"));
}

#[test]
fn test_entity_links_use_canonical_route_of_source() {
    let router = Arc::new(RecordingRouter::default());
    let renderer = UsageRenderer::new(Arc::new(site()), router.clone(), Arc::new(Passthrough));

    renderer
        .render(&target(), &usage(&[("node", "3"), ("paragraph", "8")]), &settings(3))
        .unwrap();

    let calls = router.calls.lock().unwrap();
    let routes: Vec<&str> = calls.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(routes, vec!["entity.node.canonical"]);
}
