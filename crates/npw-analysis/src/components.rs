//! Connected components of the network subgraph.

use std::collections::VecDeque;

use geo::{BoundingRect, Rect};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

use npw_core::mercator::rect_to_array;
use npw_core::RoadId;
use npw_graph::StudyArea;

use crate::overlay::Overlay;

#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    /// Ascending.
    pub roads: Vec<RoadId>,
    pub length_m: f64,
    /// WGS84 `[min_x, min_y, max_x, max_y]`.
    pub bbox: [f64; 4],
}

/// Components joined through shared intersections, longest first.  Equal
/// lengths keep the order of their lowest road id.
pub fn connected_components(area: &StudyArea, overlay: &Overlay) -> Vec<Component> {
    let graph = &area.graph;
    let mut seen = vec![false; graph.road_count()];
    let mut components = Vec::new();

    for start in overlay.network_roads() {
        if seen[start.index()] {
            continue;
        }
        seen[start.index()] = true;
        let mut roads = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(r) = queue.pop_front() {
            roads.push(r);
            let road = &graph.roads[r.index()];
            for i in [road.src_i, road.dst_i] {
                for next in &graph.intersections[i.index()].roads {
                    if overlay.is_network(*next) && !seen[next.index()] {
                        seen[next.index()] = true;
                        queue.push_back(*next);
                    }
                }
            }
        }
        roads.sort();

        let length_m = roads.iter().map(|r| graph.roads[r.index()].length_m).sum();
        let bbox = roads
            .iter()
            .filter_map(|r| graph.roads[r.index()].linestring.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                    (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
                )
            })
            .map_or([0.0; 4], |rect| rect_to_array(&area.mercator.to_wgs84(&rect)));
        components.push(Component { roads, length_m, bbox });
    }

    components.sort_by(|a, b| b.length_m.total_cmp(&a.length_m));
    log::debug!("Network has {} connected component(s)", components.len());
    components
}

/// One feature per road, tagged with its `component` index; lengths (whole
/// metres) and bboxes per component ride along as foreign members.
pub fn components_to_geojson(area: &StudyArea, components: &[Component]) -> FeatureCollection {
    let mut features = Vec::new();
    for (idx, component) in components.iter().enumerate() {
        for r in &component.roads {
            let road = &area.graph.roads[r.index()];
            let mut f = Feature {
                geometry: Some(Geometry::new(Value::from(&area.mercator.to_wgs84(&road.linestring)))),
                ..Default::default()
            };
            f.set_property("id", r.0);
            f.set_property("component", idx);
            features.push(f);
        }
    }
    let mut members = JsonObject::new();
    members.insert(
        "component_lengths".into(),
        components.iter().map(|c| c.length_m.round() as u64).collect::<Vec<_>>().into(),
    );
    members.insert(
        "component_bboxes".into(),
        components.iter().map(|c| c.bbox.to_vec()).collect::<Vec<_>>().into(),
    );
    FeatureCollection { bbox: None, features, foreign_members: Some(members) }
}

/// Share of network length in the largest component, 0–100.
pub fn largest_component_percent(components: &[Component]) -> f64 {
    let total: f64 = components.iter().map(|c| c.length_m).sum();
    components
        .first()
        .map_or(0.0, |largest| crate::reachability::percent(largest.length_m, total))
}
