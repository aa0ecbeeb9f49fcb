//! Response shapes that aren't already defined by the lower crates.

use geojson::{Feature, Geometry, Value};
use serde::Serialize;

use npw_analysis::{Metric, OdPercents, Scorecard, SlowStats, Stats};
use npw_core::{RoadId, RouteId};
use npw_graph::quintiles::Quintiles;
use npw_graph::{Road, RoadAttrs};
use npw_routes::SetRouteOutcome;

/// A road's static attributes, flattened into GeoJSON properties.
#[derive(Serialize)]
pub struct StaticRoad<'a> {
    pub id: RoadId,
    pub name: Option<&'a str>,
    pub length: f64,
    #[serde(flatten)]
    pub attrs: &'a RoadAttrs,
    /// 1 is the busiest fifth; `None` for roads without demand.
    pub precalculated_demand_quintile: Option<usize>,
}

impl<'a> StaticRoad<'a> {
    pub fn new(road: &'a Road, quintiles: &Quintiles) -> Self {
        let demand = road.attrs.precalculated_demand;
        StaticRoad {
            id: road.id,
            name: road.name.as_deref(),
            length: road.length_m,
            attrs: &road.attrs,
            precalculated_demand_quintile: (demand > 0).then(|| quintiles.quintile(demand)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatsResponse {
    pub stats: Stats,
    /// Directness is only filled in by the slow stats.
    pub scorecard: Scorecard,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlowStatsResponse {
    #[serde(flatten)]
    pub slow: SlowStats,
    pub directness: Option<Metric>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OdStatsResponse {
    pub succeeded: usize,
    pub failed: usize,
    #[serde(flatten)]
    pub percents: OdPercents,
    #[serde(flatten)]
    pub slow: SlowStats,
}

/// The routes created by a `set_route` call, and the prior routes it
/// truncated or removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SetRouteResponse {
    pub ids: Vec<RouteId>,
    pub affected: Vec<RouteId>,
}

impl From<SetRouteOutcome> for SetRouteResponse {
    fn from(outcome: SetRouteOutcome) -> Self {
        SetRouteResponse { ids: outcome.ids, affected: outcome.affected }
    }
}

/// A feature whose properties are `properties` serialized as an object.
pub(crate) fn feature(value: Value, properties: &impl Serialize) -> Feature {
    let properties = match serde_json::to_value(properties) {
        Ok(serde_json::Value::Object(map)) => Some(map),
        _ => None,
    };
    Feature { geometry: Some(Geometry::new(value)), properties, ..Default::default() }
}
