//! Registry construction from classified feature collections.
//!
//! `ingest` turns one classified collection into one registry item and its
//! renderable layer handle(s). The grouping logic lives here; the styling
//! and drawing live behind the renderer seam.

use std::collections::{BTreeMap, HashMap};

use crate::classify::Category;
use crate::constraint::parse_constraints;
use crate::geodata::{
    FeatureCollection, Geometry, LonLat, ProcedurePointProperties, SectorProperties,
};
use crate::render::{
    LayerRenderer, MarkerSpec, ProcedureLayerSpec, SectorFeature, SectorLayerSpec,
    VideomapLayerSpec,
};
use crate::style::Color;

use super::model::{Handle, Item, Registry};

/// Ingest one classified collection into the registry.
///
/// Creates the domain/facility/item path on demand. Re-ingesting the same
/// `(domain, facility, category, item_name)` fully replaces the prior item:
/// its old handles are released through the renderer first, never merged.
pub fn ingest(
    registry: &mut Registry,
    renderer: &mut dyn LayerRenderer,
    domain: &str,
    facility: &str,
    category: Category,
    item_name: &str,
    collection: &FeatureCollection,
) {
    let handle = match category {
        Category::Sectors => build_sector_handle(renderer, collection),
        Category::Stars | Category::Sids => build_procedure_handle(renderer, collection),
        Category::Videomap => build_videomap_handle(renderer, collection),
    };

    let items = registry
        .domain_mut(domain)
        .facility_mut(facility)
        .items_mut(category);

    if let Some(previous) = items.remove(item_name) {
        tracing::debug!(domain, facility, %category, item = item_name, "replacing item");
        for id in previous.handle.layer_ids() {
            renderer.release(id);
        }
    }

    items.insert(item_name.to_string(), Item::new(item_name, handle));
}

/// Group sector polygon features by their `Position` property and create one
/// layer per group, styled from the group's fill.
fn build_sector_handle(
    renderer: &mut dyn LayerRenderer,
    collection: &FeatureCollection,
) -> Handle {
    let mut groups: BTreeMap<String, (Color, Vec<SectorFeature>)> = BTreeMap::new();

    for feature in &collection.features {
        let polygons = match &feature.geometry {
            Some(geometry) => geometry.polygons(),
            None => continue,
        };
        if polygons.is_empty() {
            continue;
        }

        let props = SectorProperties::from_feature(feature);
        let fill = props.fill;
        let sector_feature = SectorFeature {
            polygons,
            low: props.low,
            high: props.high,
            notes: props.notes,
        };
        groups
            .entry(props.position)
            .or_insert_with(|| (fill, Vec::new()))
            .1
            .push(sector_feature);
    }

    let mut positions = BTreeMap::new();
    for (position, (fill, features)) in groups {
        let id = renderer.create_sector_layer(SectorLayerSpec {
            position: position.clone(),
            fill,
            features,
        });
        positions.insert(position, id);
    }
    Handle::BySector(positions)
}

/// Distill a STAR/SID collection into markers and lines behind one handle.
///
/// Point features become markers with parsed, capped constraints. Line
/// features contribute their sequences directly; in addition, each point's
/// `from` predecessors yield one connector line per resolvable predecessor.
fn build_procedure_handle(
    renderer: &mut dyn LayerRenderer,
    collection: &FeatureCollection,
) -> Handle {
    let mut markers = Vec::new();
    let mut lines = Vec::new();
    let mut points_by_id: HashMap<String, LonLat> = HashMap::new();
    let mut links: Vec<(LonLat, Vec<String>)> = Vec::new();

    for feature in &collection.features {
        match &feature.geometry {
            Some(Geometry::Point { coordinates }) => {
                let props = ProcedurePointProperties::from_feature(feature);
                if let Some(id) = &props.id {
                    points_by_id.insert(id.clone(), *coordinates);
                }
                if !props.from.is_empty() {
                    links.push((*coordinates, props.from.clone()));
                }
                markers.push(MarkerSpec {
                    at: *coordinates,
                    label: props.id,
                    altitudes: parse_constraints(&props.altitudes),
                    speeds: parse_constraints(&props.speed),
                    color: props.color,
                    icon: props.icon,
                });
            }
            Some(geometry) => {
                lines.extend(geometry.line_sequences());
            }
            None => {}
        }
    }

    // Connector lines from each point's predecessors. Unknown predecessor
    // ids are skipped.
    for (to, from_ids) in links {
        for from_id in from_ids {
            if let Some(from) = points_by_id.get(&from_id) {
                lines.push(vec![*from, to]);
            }
        }
    }

    let id = renderer.create_procedure_layer(ProcedureLayerSpec { markers, lines });
    Handle::Single(id)
}

/// Map a videomap collection onto one handle. Point geometry is suppressed:
/// a videomap never renders markers.
fn build_videomap_handle(
    renderer: &mut dyn LayerRenderer,
    collection: &FeatureCollection,
) -> Handle {
    let mut spec = VideomapLayerSpec::default();
    for feature in &collection.features {
        let geometry = match &feature.geometry {
            Some(geometry) => geometry,
            None => continue,
        };
        if geometry.is_point() {
            continue;
        }
        spec.lines.extend(geometry.line_sequences());
        spec.polygons.extend(geometry.polygons());
    }
    let id = renderer.create_videomap_layer(spec);
    Handle::Single(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{LayerKind, MemoryRenderer};
    use serde_json::json;

    fn collection(value: serde_json::Value) -> FeatureCollection {
        serde_json::from_value(value).unwrap()
    }

    fn sector_collection() -> FeatureCollection {
        collection(json!({
            "name": "JFK_4s",
            "features": [
                {
                    "properties": {"Position": "N", "Fill": "#aa0000", "Low": 0, "High": 4000},
                    "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]]}
                },
                {
                    "properties": {"Position": "S", "Fill": "#00aa00"},
                    "geometry": {"type": "Polygon", "coordinates": [[[2.0, 0.0], [3.0, 0.0], [2.0, 1.0]]]}
                },
                {
                    "properties": {"Position": "N", "Fill": "#ffffff"},
                    "geometry": {"type": "Polygon", "coordinates": [[[4.0, 0.0], [5.0, 0.0], [4.0, 1.0]]]}
                }
            ]
        }))
    }

    #[test]
    fn test_sector_grouping_by_position() {
        let mut registry = Registry::new();
        let mut renderer = MemoryRenderer::new();
        ingest(
            &mut registry,
            &mut renderer,
            "tracon",
            "jfk",
            Category::Sectors,
            "JFK_4s",
            &sector_collection(),
        );

        let item = registry
            .item("tracon", "jfk", Category::Sectors, "JFK_4s")
            .unwrap();
        assert_eq!(item.positions(), vec!["N", "S"]);

        // Two positions, two layers; the N group holds both N features and
        // keeps the first feature's fill.
        assert_eq!(renderer.layer_count(), 2);
        match &item.handle {
            Handle::BySector(positions) => {
                let n_id = positions["N"];
                match renderer.layer(n_id).unwrap() {
                    LayerKind::Sector(spec) => {
                        assert_eq!(spec.features.len(), 2);
                        assert_eq!(spec.fill, Color::new(0xaa, 0, 0));
                    }
                    other => panic!("expected sector layer, got {:?}", other),
                }
            }
            Handle::Single(_) => panic!("sector item must be BySector"),
        }
    }

    #[test]
    fn test_sector_unknown_position_sentinel() {
        let fc = collection(json!({
            "features": [{
                "properties": {},
                "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]}
            }]
        }));
        let mut registry = Registry::new();
        let mut renderer = MemoryRenderer::new();
        ingest(
            &mut registry,
            &mut renderer,
            "tracon",
            "jfk",
            Category::Sectors,
            "anon",
            &fc,
        );
        let item = registry.item("tracon", "jfk", Category::Sectors, "anon").unwrap();
        assert_eq!(item.positions(), vec!["UNKNOWN"]);
    }

    #[test]
    fn test_reingest_replaces_and_releases() {
        let mut registry = Registry::new();
        let mut renderer = MemoryRenderer::new();
        for _ in 0..2 {
            ingest(
                &mut registry,
                &mut renderer,
                "tracon",
                "jfk",
                Category::Sectors,
                "JFK_4s",
                &sector_collection(),
            );
        }
        // Old layers were released: only the second ingest's remain.
        assert_eq!(renderer.layer_count(), 2);
        let item = registry
            .item("tracon", "jfk", Category::Sectors, "JFK_4s")
            .unwrap();
        assert_eq!(item.positions().len(), 2);
    }

    #[test]
    fn test_procedure_markers_and_connectors() {
        let fc = collection(json!({
            "name": "parch",
            "features": [
                {
                    "properties": {"id": "ROBER", "altitudes": ["+080"]},
                    "geometry": {"type": "Point", "coordinates": [-73.0, 40.0]}
                },
                {
                    "properties": {"id": "CCC", "altitudes": ["+080", "-120"], "from": "ROBER"},
                    "geometry": {"type": "Point", "coordinates": [-72.5, 40.2]}
                },
                {
                    "properties": {},
                    "geometry": {"type": "LineString", "coordinates": [[-73.0, 40.0], [-72.0, 40.5]]}
                }
            ]
        }));
        let mut registry = Registry::new();
        let mut renderer = MemoryRenderer::new();
        ingest(
            &mut registry,
            &mut renderer,
            "tracon",
            "jfk",
            Category::Stars,
            "parch",
            &fc,
        );

        let item = registry.item("tracon", "jfk", Category::Stars, "parch").unwrap();
        let id = match item.handle {
            Handle::Single(id) => id,
            Handle::BySector(_) => panic!("procedure item must be Single"),
        };
        match renderer.layer(id).unwrap() {
            LayerKind::Procedure(spec) => {
                assert_eq!(spec.markers.len(), 2);
                // One explicit line plus one ROBER→CCC connector.
                assert_eq!(spec.lines.len(), 2);
                let ccc = spec.markers.iter().find(|m| m.label.as_deref() == Some("CCC")).unwrap();
                // Below-first constraint ordering reaches the marker data.
                assert_eq!(ccc.altitudes[0].value, "120");
            }
            other => panic!("expected procedure layer, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_predecessor_skipped() {
        let fc = collection(json!({
            "features": [{
                "properties": {"id": "CCC", "from": ["MISSING"]},
                "geometry": {"type": "Point", "coordinates": [-72.5, 40.2]}
            }]
        }));
        let mut registry = Registry::new();
        let mut renderer = MemoryRenderer::new();
        ingest(
            &mut registry,
            &mut renderer,
            "tracon",
            "jfk",
            Category::Sids,
            "dep1",
            &fc,
        );
        let item = registry.item("tracon", "jfk", Category::Sids, "dep1").unwrap();
        let id = match item.handle {
            Handle::Single(id) => id,
            Handle::BySector(_) => unreachable!(),
        };
        match renderer.layer(id).unwrap() {
            LayerKind::Procedure(spec) => assert!(spec.lines.is_empty()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_videomap_suppresses_points() {
        let fc = collection(json!({
            "name": "JFK video map",
            "features": [
                {
                    "properties": {},
                    "geometry": {"type": "Point", "coordinates": [-73.0, 40.0]}
                },
                {
                    "properties": {},
                    "geometry": {"type": "LineString", "coordinates": [[-73.0, 40.0], [-72.0, 40.5]]}
                },
                {
                    "properties": {},
                    "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]]}
                }
            ]
        }));
        let mut registry = Registry::new();
        let mut renderer = MemoryRenderer::new();
        ingest(
            &mut registry,
            &mut renderer,
            "tracon",
            "jfk",
            Category::Videomap,
            "JFK",
            &fc,
        );
        let item = registry.item("tracon", "jfk", Category::Videomap, "JFK").unwrap();
        let id = match item.handle {
            Handle::Single(id) => id,
            Handle::BySector(_) => unreachable!(),
        };
        match renderer.layer(id).unwrap() {
            LayerKind::Videomap(spec) => {
                assert_eq!(spec.lines.len(), 1);
                assert_eq!(spec.polygons.len(), 1);
            }
            _ => unreachable!(),
        }
    }
}
