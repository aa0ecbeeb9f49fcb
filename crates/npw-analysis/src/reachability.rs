//! Which roads and places the network serves.
//!
//! # Classification
//!
//! Every road is exactly one of:
//!
//! * `Network`: owned by a route.
//! * `Severance`: off the network and not High LoS.  Cyclists are assumed
//!   not to use these to get to the network.
//! * `Reachable`: off the network, not a severance, and connected to the
//!   network through other non-severance roads (within the configured
//!   connecting tolerance, if any).
//! * `Unreachable`: everything else.
//!
//! A place is reachable when any road it attaches to is `Network` or
//! `Reachable`.

use geo::{Geometry, MultiPolygon};
use geojson::{Feature, FeatureCollection, Value};
use serde::Serialize;

use npw_classify::LosTable;
use npw_core::{Dir, InfraType, IntersectionId, LevelOfService, RoadId, Tier};
use npw_graph::router::{costs_from, shortest_path_to_any};
use npw_graph::{Path, PoiKind, Road, StudyArea};
use npw_routes::{autosplit, RouteNode, Section, SetRouteInput, SplitRequest};

use crate::overlay::Overlay;
use crate::{AnalysisError, AnalysisResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reachability {
    Network,
    Severance,
    Reachable,
    Unreachable,
}

impl Reachability {
    pub fn name(self) -> &'static str {
        match self {
            Reachability::Network => "network",
            Reachability::Severance => "severance",
            Reachability::Reachable => "reachable",
            Reachability::Unreachable => "unreachable",
        }
    }

    #[inline]
    pub fn is_reachable(self) -> bool {
        matches!(self, Reachability::Network | Reachability::Reachable)
    }
}

#[inline]
fn is_severance(overlay: &Overlay, road: &Road) -> bool {
    !overlay.is_network(road.id) && overlay.los[road.id.index()] != LevelOfService::High
}

/// Intersections touching at least one network road.
fn network_intersections(area: &StudyArea, overlay: &Overlay) -> Vec<bool> {
    let mut touches = vec![false; area.graph.intersection_count()];
    for r in overlay.network_roads() {
        let road = &area.graph.roads[r.index()];
        touches[road.src_i.index()] = true;
        touches[road.dst_i.index()] = true;
    }
    touches
}

// ── ReachabilityMap ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct ReachabilityMap {
    /// Indexed by `RoadId`.
    pub class: Vec<Reachability>,
}

impl ReachabilityMap {
    /// Flood out from the network over non-severance roads.  With a
    /// tolerance, a road is reachable only if it starts within that many
    /// metres of connecting road.
    pub fn new(area: &StudyArea, overlay: &Overlay, tolerance_m: Option<f64>) -> Self {
        let graph = &area.graph;
        let sources: Vec<IntersectionId> = overlay
            .network_roads()
            .flat_map(|r| {
                let road = &graph.roads[r.index()];
                [road.src_i, road.dst_i]
            })
            .collect();
        let connecting = |road: &Road| -> Option<f64> {
            if overlay.is_network(road.id) {
                Some(0.0)
            } else if is_severance(overlay, road) {
                None
            } else {
                Some(road.length_m)
            }
        };
        let dist = costs_from(graph, sources, &connecting, tolerance_m);

        let class = graph
            .roads
            .iter()
            .map(|road| {
                if overlay.is_network(road.id) {
                    Reachability::Network
                } else if is_severance(overlay, road) {
                    Reachability::Severance
                } else if dist[road.src_i.index()].is_some() || dist[road.dst_i.index()].is_some() {
                    Reachability::Reachable
                } else {
                    Reachability::Unreachable
                }
            })
            .collect();
        ReachabilityMap { class }
    }

    #[inline]
    pub fn get(&self, r: RoadId) -> Reachability {
        self.class[r.index()]
    }

    pub fn place_reachable(&self, area: &StudyArea, kind: PoiKind, idx: usize) -> AnalysisResult<bool> {
        Ok(area.place_roads(kind, idx)?.iter().any(|r| self.get(*r).is_reachable()))
    }

    /// Share of places of `kind` that are reachable, 0–100.  An area with no
    /// such places scores 0.
    pub fn percent_reachable(&self, area: &StudyArea, kind: PoiKind) -> f64 {
        let total = area.place_count(kind);
        let reachable = (0..total)
            .filter(|idx| self.place_reachable(area, kind, *idx).unwrap_or(false))
            .count();
        percent(reachable as f64, total as f64)
    }

    /// Share of population living in a reachable data zone, 0–100; either
    /// over all zones or only the deprived ones.
    pub fn percent_population(&self, area: &StudyArea, deprived_only: bool) -> f64 {
        let (mut reachable, mut total) = (0.0, 0.0);
        for zone in area.data_zones.iter().filter(|z| !deprived_only || z.is_deprived()) {
            total += zone.population as f64;
            if zone.roads.iter().any(|r| self.get(*r).is_reachable()) {
                reachable += zone.population as f64;
            }
        }
        percent(reachable, total)
    }
}

pub(crate) fn percent(part: f64, total: f64) -> f64 {
    if total == 0.0 { 0.0 } else { 100.0 * part / total }
}

// ── Place features ────────────────────────────────────────────────────────────

/// Every place of `kind` in WGS84, with `poi_kind`, `name`, `idx` and
/// `reachable`.  Polygon places also carry their population; data zones
/// their deprivation and density.
pub fn place_features(area: &StudyArea, reach: &ReachabilityMap, kind: PoiKind) -> FeatureCollection {
    let to_feature = |geometry: Geometry, idx: usize| {
        let mut f = Feature {
            geometry: Some(geojson::Geometry::new(Value::from(&area.mercator.to_wgs84(&geometry)))),
            ..Default::default()
        };
        f.set_property("poi_kind", kind.name());
        f.set_property("name", area.place_name(kind, idx).ok().flatten());
        f.set_property("idx", idx);
        f.set_property("reachable", reach.place_reachable(area, kind, idx).unwrap_or(false));
        f
    };
    let polygon = |mp: &MultiPolygon| Geometry::MultiPolygon(mp.clone());

    let features = match kind {
        PoiKind::Schools | PoiKind::GpHospitals => area
            .pois
            .iter()
            .filter(|p| p.kind == kind)
            .enumerate()
            .map(|(idx, p)| to_feature(Geometry::Point(p.point), idx))
            .collect(),
        PoiKind::Greenspaces => area
            .greenspaces
            .iter()
            .enumerate()
            .map(|(idx, g)| to_feature(polygon(&g.polygon), idx))
            .collect(),
        PoiKind::TownCentres | PoiKind::Settlements => {
            let areas = if kind == PoiKind::TownCentres { &area.town_centres } else { &area.settlements };
            areas
                .iter()
                .enumerate()
                .map(|(idx, a)| {
                    let mut f = to_feature(polygon(&a.polygon), idx);
                    f.set_property("population", a.population);
                    f
                })
                .collect()
        }
        PoiKind::DataZones => area
            .data_zones
            .iter()
            .enumerate()
            .map(|(idx, z)| {
                let mut f = to_feature(polygon(&z.polygon), idx);
                f.set_property("population", z.population);
                f.set_property("imd_rank", z.imd_rank);
                f.set_property("imd_percentile", z.imd_percentile);
                f.set_property("area_km2", z.area_km2);
                let density = if z.area_km2 > 0.0 { z.population as f64 / z.area_km2 } else { 0.0 };
                f.set_property("density", density);
                f
            })
            .collect(),
    };
    FeatureCollection { bbox: None, features, foreign_members: None }
}

// ── Diagnostics ───────────────────────────────────────────────────────────────

/// The connecting path that makes a place reachable, ending on the first
/// network intersection.  Empty when the place is on the network.
pub fn debug_reachable_path(
    area: &StudyArea,
    overlay: &Overlay,
    reach: &ReachabilityMap,
    kind: PoiKind,
    idx: usize,
) -> AnalysisResult<Path> {
    let roads = area.place_roads(kind, idx)?;
    if !reach.place_reachable(area, kind, idx)? {
        return Err(AnalysisError::Unreachable { kind, idx });
    }
    let on_network = network_intersections(area, overlay);
    let connecting = |road: &Road| (!is_severance(overlay, road)).then_some(road.length_m);

    let mut best: Option<Path> = None;
    for r in roads.iter().filter(|r| reach.get(**r).is_reachable()) {
        let road = &area.graph.roads[r.index()];
        if overlay.is_network(*r) {
            return Ok(trivial(road.src_i));
        }
        for from in [road.src_i, road.dst_i] {
            let Ok(path) = shortest_path_to_any(&area.graph, from, |i| on_network[i.index()], &connecting) else {
                continue;
            };
            if best.as_ref().is_none_or(|b| path.length_m < b.length_m) {
                best = Some(path);
            }
        }
    }
    best.ok_or(AnalysisError::Unreachable { kind, idx })
}

fn trivial(at: IntersectionId) -> Path {
    Path { start: at, end: at, steps: Vec::new(), cost: 0.0, length_m: 0.0 }
}

/// A proposed route joining an unreachable place to the network.
#[derive(Clone, Debug, PartialEq)]
pub struct FixProposal {
    pub sections: Vec<Section>,
    /// Ready to pass to `RouteStore::set_route`.
    pub input: SetRouteInput,
}

/// Shortest path by length from one of the place's roads to the network,
/// starting with that road so the place itself ends up on the network.
pub fn fix_unreachable_poi(
    area: &StudyArea,
    table: &LosTable,
    overlay: &Overlay,
    reach: &ReachabilityMap,
    kind: PoiKind,
    idx: usize,
) -> AnalysisResult<FixProposal> {
    let roads = area.place_roads(kind, idx)?;
    if reach.place_reachable(area, kind, idx)? {
        return Err(AnalysisError::AlreadyReachable { kind, idx });
    }
    if !overlay.has_network() {
        return Err(AnalysisError::EmptyNetwork);
    }
    let on_network = network_intersections(area, overlay);

    let mut best: Option<(f64, Vec<(RoadId, Dir)>)> = None;
    for r in &roads {
        let road = &area.graph.roads[r.index()];
        let other_roads = |candidate: &Road| (candidate.id != *r).then_some(candidate.length_m);
        for dir in [Dir::Forwards, Dir::Backwards] {
            let (_, to) = road.endpoints(dir);
            let Ok(path) = shortest_path_to_any(&area.graph, to, |i| on_network[i.index()], &other_roads) else {
                continue;
            };
            let length = road.length_m + path.length_m;
            if best.as_ref().is_none_or(|(l, _)| length < *l) {
                let mut steps = vec![(*r, dir)];
                steps.extend(path.steps);
                best = Some((length, steps));
            }
        }
    }
    let (_, steps) = best.ok_or(AnalysisError::Unreachable { kind, idx })?;

    let request = SplitRequest { editing: None, override_infra: None, default_tier: Tier::LocalAccess };
    let sections = autosplit(&area.graph, table, &overlay.owner, &steps, &request);
    let name = area.place_name(kind, idx)?.unwrap_or_else(|| format!("{} #{idx}", kind.name()));
    let input = SetRouteInput {
        name: format!("Connection to {name}"),
        notes: String::new(),
        full_path: area
            .graph
            .path_intersections(&steps)
            .into_iter()
            .map(|snapped| RouteNode { snapped })
            .collect(),
        waypoints: area.waypoints_for(&steps),
        infra_type: sections
            .first()
            .map_or(InfraType::MixedTraffic, |s| s.class.infra_type),
        override_infra_type: false,
        tier: Tier::LocalAccess,
    };
    log::debug!("Proposed {} section(s) to connect {kind:?} #{idx}", sections.len());
    Ok(FixProposal { sections, input })
}
