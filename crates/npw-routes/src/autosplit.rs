//! Split a drawn path into uniformly classified sections.
//!
//! A new section starts wherever the road's key changes.  The key is the
//! route currently owning the road (other than the one being edited) plus
//! its [`Classification`]: recommended or overridden infra type, street-space
//! fit, LoS and tier band.

use geojson::{Feature, FeatureCollection, Geometry, Value};

use npw_classify::{classify, gradient_group, Classification, LosTable};
use npw_core::{Dir, GradientGroup, InfraType, RoadId, RouteId, Tier};
use npw_graph::{RoadGraph, StudyArea};

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub roads: Vec<(RoadId, Dir)>,
    /// Another route already owns every road in this section.
    pub overlaps: Option<RouteId>,
    pub class: Classification,
    pub length_m: f64,
    pub gradient_group: GradientGroup,
}

/// How a path is being drawn.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplitRequest {
    /// Roads owned by this route don't count as overlaps.
    pub editing: Option<RouteId>,
    pub override_infra: Option<InfraType>,
    pub default_tier: Tier,
}

#[derive(PartialEq)]
struct SplitKey {
    owner: Option<RouteId>,
    class: Classification,
}

/// `owners` is indexed by road.
pub fn autosplit(
    graph: &RoadGraph,
    table: &LosTable,
    owners: &[Option<RouteId>],
    steps: &[(RoadId, Dir)],
    request: &SplitRequest,
) -> Vec<Section> {
    let keyed: Vec<((RoadId, Dir), SplitKey)> = steps
        .iter()
        .map(|&(r, dir)| {
            let road = &graph.roads[r.index()];
            let owner = owners
                .get(r.index())
                .copied()
                .flatten()
                .filter(|owner| Some(*owner) != request.editing);
            let class = classify(&road.attrs, request.override_infra, request.default_tier, table);
            ((r, dir), SplitKey { owner, class })
        })
        .collect();

    let sections: Vec<Section> = keyed
        .chunk_by(|a, b| a.1 == b.1)
        .map(|run| {
            let roads: Vec<(RoadId, Dir)> = run.iter().map(|(step, _)| *step).collect();
            Section {
                length_m: graph.length_of(&roads),
                gradient_group: gradient_group(roads.iter().map(|(r, _)| &graph.roads[r.index()])),
                overlaps: run[0].1.owner,
                class: run[0].1.class,
                roads,
            }
        })
        .collect();
    log::debug!("Split {} roads into {} sections", steps.len(), sections.len());
    sections
}

/// Render sections as a feature collection in WGS84.
pub fn sections_to_geojson(area: &StudyArea, sections: &[Section]) -> FeatureCollection {
    let features = sections
        .iter()
        .map(|s| {
            let mut f = Feature {
                geometry: Some(Geometry::new(Value::from(&area.linestring_wgs84(&s.roads)))),
                ..Default::default()
            };
            f.set_property("kind", if s.overlaps.is_some() { "overlap" } else { "new" });
            if let Some(owner) = s.overlaps {
                f.set_property("overlaps_route", owner.0);
            }
            f.set_property("length", s.length_m);
            f.set_property("infra_type", s.class.infra_type.name());
            f.set_property("fits", s.class.fits);
            f.set_property("gradient_group", s.gradient_group.label());
            f.set_property("los", s.class.los.name());
            f.set_property("tier", s.class.tier.name());
            f
        })
        .collect();
    FeatureCollection { bbox: None, features, foreign_members: None }
}
