//! Demand sampling over origin/destination desire lines.
//!
//! Trips are routed with [`QuietCost`], which prefers roads with a good
//! Level of Service on the current network, and each trip's contribution
//! is scaled by the Go Dutch uptake for its length.

use std::collections::BTreeMap;

use geo::{Centroid, Distance, Euclidean};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use itertools::Itertools;
use serde::Serialize;

use npw_core::{EngineConfig, InfraType, LevelOfService, LosPenalties, RoadId, SampleRng, Tier};
use npw_graph::router::shortest_path;
use npw_graph::{EdgeCost, Road, StudyArea};

use crate::overlay::Overlay;
use crate::reachability::percent;

/// Key used for trips on roads no route owns.
pub const NOT_ON_NETWORK: &str = "Not on the network";

// ── Costs & uptake ────────────────────────────────────────────────────────────

/// Length multiplied by the penalty for the road's current LoS.
pub struct QuietCost<'a> {
    overlay: &'a Overlay,
    penalties: &'a LosPenalties,
}

impl<'a> QuietCost<'a> {
    pub fn new(overlay: &'a Overlay, penalties: &'a LosPenalties) -> Self {
        Self { overlay, penalties }
    }
}

impl EdgeCost for QuietCost<'_> {
    #[inline]
    fn cost(&self, road: &Road) -> Option<f64> {
        Some(road.length_m * self.penalties.get(self.overlay.los[road.id.index()]))
    }
}

/// Share of trips of this length that would be cycled under the Go Dutch
/// scenario of the Propensity to Cycle Tool, between 0 and 1.  Gradient is
/// taken as flat.
pub fn pct_godutch_2020(distance_m: f64) -> f64 {
    let alpha = -4.018 + 2.550;
    let d1 = -0.6369 - 0.08036;
    let d2 = 1.988;
    let d3 = 0.008775;
    let h1 = -0.2555;
    let i1 = 0.02006;
    let i2 = -0.1234;
    // Centred gradient for a flat route.
    let gradient = -0.78;

    let km = (distance_m / 1000.0).min(30.0);
    let logit = alpha
        + d1 * km
        + d2 * km.sqrt()
        + d3 * km.powi(2)
        + h1 * gradient
        + i1 * km * gradient
        + i2 * km.sqrt() * gradient;
    1.0 / (1.0 + (-logit).exp())
}

// ── Sampling ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OdCounts {
    /// Rounded uptake-weighted trips per road; roads rounding to zero are
    /// left out.
    pub counts: BTreeMap<RoadId, u64>,
    pub succeeded: usize,
    /// Trips with no sample point, no route, or both ends on the same
    /// intersection.
    pub failed: usize,
}

/// Route every sampled trip.  A fast sample draws one trip per desire line
/// weighted by its count; a full sample draws `count` trips.  Sampling is
/// reseeded from the config on every call.
pub fn od_counts(area: &StudyArea, overlay: &Overlay, config: &EngineConfig, fast_sample: bool) -> OdCounts {
    let graph = &area.graph;
    let cost = QuietCost::new(overlay, &config.los_penalties);
    let mut rng = SampleRng::new(config.od_seed);
    let mut totals: BTreeMap<RoadId, f64> = BTreeMap::new();
    let mut out = OdCounts::default();

    log::info!("Evaluating {} desire lines (fast sample: {fast_sample})", area.desire_lines.len());
    for line in &area.desire_lines {
        let (iterations, weight) = if fast_sample { (1, line.count as f64) } else { (line.count, 1.0) };
        let (Some(from), Some(to)) = (area.od_zones.get(line.from), area.od_zones.get(line.to)) else {
            out.failed += iterations as usize;
            continue;
        };
        for _ in 0..iterations {
            let start = from.random_point(&mut rng).and_then(|pt| graph.nearest_intersection(pt));
            let end = to.random_point(&mut rng).and_then(|pt| graph.nearest_intersection(pt));
            let (Some((start, _)), Some((end, _))) = (start, end) else {
                out.failed += 1;
                continue;
            };
            match shortest_path(graph, start, end, &cost) {
                Ok(path) if !path.is_trivial() => {
                    out.succeeded += 1;
                    let count = pct_godutch_2020(path.length_m) * weight;
                    for (r, _) in &path.steps {
                        *totals.entry(*r).or_default() += count;
                    }
                }
                _ => out.failed += 1,
            }
        }
    }

    out.counts = totals
        .into_iter()
        .map(|(r, v)| (r, v.round() as u64))
        .filter(|(_, v)| *v > 0)
        .collect();
    log::info!("OD sampling: {} succeeded, {} failed", out.succeeded, out.failed);
    out
}

/// Percentages (0–100) of sampled trips by what they ride on.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OdPercents {
    pub od_percents_infra_type: BTreeMap<String, f64>,
    pub od_percents_tier: BTreeMap<String, f64>,
    pub od_percents_los: BTreeMap<String, f64>,
}

impl OdCounts {
    pub fn describe(&self, overlay: &Overlay) -> OdPercents {
        let mut by_infra: BTreeMap<InfraType, u64> = InfraType::ALL.iter().map(|t| (*t, 0)).collect();
        let mut by_tier: BTreeMap<Tier, u64> = Tier::ALL.iter().map(|t| (*t, 0)).collect();
        let mut by_los: BTreeMap<LevelOfService, u64> = LevelOfService::ALL.iter().map(|l| (*l, 0)).collect();
        let (mut off_network, mut total) = (0, 0);

        for (r, count) in &self.counts {
            let idx = r.index();
            total += count;
            match (overlay.infra_type[idx], overlay.tier[idx]) {
                (Some(infra), Some(tier)) => {
                    *by_infra.entry(infra).or_default() += count;
                    *by_tier.entry(tier).or_default() += count;
                }
                _ => off_network += count,
            }
            *by_los.entry(overlay.los[idx]).or_default() += count;
        }

        let pct = |n: u64| percent(n as f64, total as f64);
        let with_off_network = |mut map: BTreeMap<String, f64>| {
            map.insert(NOT_ON_NETWORK.to_string(), pct(off_network));
            map
        };
        OdPercents {
            od_percents_infra_type: with_off_network(
                by_infra.into_iter().map(|(k, n)| (k.name().to_string(), pct(n))).collect(),
            ),
            od_percents_tier: with_off_network(
                by_tier.into_iter().map(|(k, n)| (k.name().to_string(), pct(n))).collect(),
            ),
            od_percents_los: by_los.into_iter().map(|(k, n)| (k.name().to_string(), pct(n))).collect(),
        }
    }

    pub fn max_count(&self) -> u64 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Per-road `count`, `infra_type` and `los`, with the totals and
    /// percentages as foreign members.
    pub fn to_geojson(&self, area: &StudyArea, overlay: &Overlay) -> FeatureCollection {
        let features = self
            .counts
            .iter()
            .map(|(r, count)| {
                let road = &area.graph.roads[r.index()];
                let mut f = Feature {
                    geometry: Some(Geometry::new(Value::from(&area.mercator.to_wgs84(&road.linestring)))),
                    ..Default::default()
                };
                f.set_property("id", r.0);
                f.set_property("count", *count);
                f.set_property("infra_type", overlay.infra_type[r.index()].map(InfraType::name));
                f.set_property("los", overlay.los[r.index()].name());
                f
            })
            .collect();

        let mut members = JsonObject::new();
        members.insert("succeeded".into(), self.succeeded.into());
        members.insert("failed".into(), self.failed.into());
        members.insert("max_count".into(), self.max_count().into());
        if let Ok(serde_json::Value::Object(percents)) = serde_json::to_value(self.describe(overlay)) {
            members.extend(percents);
        }
        FeatureCollection { bbox: None, features, foreign_members: Some(members) }
    }
}

// ── Directness ────────────────────────────────────────────────────────────────

/// Statistics that need many routes and are only recomputed on request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlowStats {
    /// Mean of quiet route length over straight-line distance, across town
    /// centre pairs.  `None` when no pair could be routed.
    pub average_directness: Option<f64>,
    /// WGS84 `[start, end]` of the least direct pairs, worst first.
    pub worst_directness_routes: Vec<[[f64; 2]; 2]>,
}

/// Quiet routes between every pair of town centres whose centroids are
/// within `town_centre_max_distance_m`.
pub fn slow_stats(area: &StudyArea, overlay: &Overlay, config: &EngineConfig) -> SlowStats {
    let graph = &area.graph;
    let cost = QuietCost::new(overlay, &config.los_penalties);
    let centroids: Vec<_> = area.town_centres.iter().filter_map(|tc| tc.polygon.centroid()).collect();

    let mut scored = Vec::new();
    for (p1, p2) in centroids.iter().tuple_combinations() {
        if Euclidean.distance(*p1, *p2) > config.town_centre_max_distance_m {
            continue;
        }
        let (Some((a, _)), Some((b, _))) = (graph.nearest_intersection(p1.0), graph.nearest_intersection(p2.0))
        else {
            continue;
        };
        let Ok(path) = shortest_path(graph, a, b, &cost) else {
            continue;
        };
        let straight = Euclidean.distance(graph.intersections[a.index()].point, graph.intersections[b.index()].point);
        if straight == 0.0 {
            continue;
        }
        scored.push((path.length_m / straight, *p1, *p2));
    }
    log::debug!("Routed {} town centre pair(s)", scored.len());

    let average_directness =
        (!scored.is_empty()).then(|| scored.iter().map(|(d, _, _)| d).sum::<f64>() / scored.len() as f64);
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(config.worst_directness_routes);

    let wgs84 = |p: geo::Point| {
        let c = area.mercator.pt_to_wgs84(p.0);
        [c.x, c.y]
    };
    SlowStats {
        average_directness,
        worst_directness_routes: scored.into_iter().map(|(_, a, b)| [wgs84(a), wgs84(b)]).collect(),
    }
}
