//! Route a single journey and describe it.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use npw_core::{Dir, EngineConfig, GradientGroup, RoadId};
use npw_graph::router::shortest_path;
use npw_graph::{ByLength, StudyArea};

use crate::od::{QuietCost, NOT_ON_NETWORK};
use crate::overlay::Overlay;
use crate::AnalysisResult;

/// How to colour an evaluated route.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Breakdown {
    /// One feature for the whole route.
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "los")]
    Los,
    #[serde(rename = "infra_type")]
    InfraType,
    #[serde(rename = "gradient")]
    Gradient,
}

/// A run of consecutive roads with the same name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Direction {
    pub name: Option<String>,
    pub length: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteEvaluation {
    pub steps: Vec<(RoadId, Dir)>,
    pub quiet_bike_length: f64,
    /// Shortest path by length, ignoring LoS.
    pub direct_bike_length: f64,
    pub directions: Vec<Direction>,
}

/// `start` and `end` are WGS84 `[lon, lat]`, snapped to the nearest
/// intersection.
pub fn evaluate_route(
    area: &StudyArea,
    overlay: &Overlay,
    config: &EngineConfig,
    start: [f64; 2],
    end: [f64; 2],
) -> AnalysisResult<RouteEvaluation> {
    let graph = &area.graph;
    let from = area.snap_wgs84(start, None)?;
    let to = area.snap_wgs84(end, None)?;
    let quiet = shortest_path(graph, from, to, &QuietCost::new(overlay, &config.los_penalties))?;
    let direct = shortest_path(graph, from, to, &ByLength)?;

    let directions = quiet
        .steps
        .iter()
        .chunk_by(|(r, _)| graph.roads[r.index()].name.clone())
        .into_iter()
        .map(|(name, run)| Direction {
            name,
            length: run.map(|(r, _)| graph.roads[r.index()].length_m).sum(),
        })
        .collect();

    Ok(RouteEvaluation {
        quiet_bike_length: quiet.length_m,
        direct_bike_length: direct.length_m,
        steps: quiet.steps,
        directions,
    })
}

impl RouteEvaluation {
    /// The quiet route split wherever the breakdown value changes.  Each
    /// feature has `kind` (the breakdown value) and `length`.
    pub fn to_geojson(&self, area: &StudyArea, overlay: &Overlay, breakdown: Breakdown) -> FeatureCollection {
        let graph = &area.graph;
        let kind = |r: RoadId| -> String {
            let idx = r.index();
            match breakdown {
                Breakdown::None => String::new(),
                Breakdown::Los => overlay.los[idx].name().to_string(),
                Breakdown::InfraType => overlay.infra_type[idx]
                    .map_or(NOT_ON_NETWORK, |t| t.name())
                    .to_string(),
                Breakdown::Gradient => {
                    GradientGroup::from_gradient(graph.roads[idx].attrs.gradient).label().to_string()
                }
            }
        };

        let keyed: Vec<((RoadId, Dir), String)> = self.steps.iter().map(|step| (*step, kind(step.0))).collect();
        let features = keyed
            .chunk_by(|a, b| a.1 == b.1)
            .map(|run| {
                let steps: Vec<(RoadId, Dir)> = run.iter().map(|(step, _)| *step).collect();
                let mut f = Feature {
                    geometry: Some(Geometry::new(Value::from(&area.linestring_wgs84(&steps)))),
                    ..Default::default()
                };
                f.set_property("kind", run[0].1.clone());
                f.set_property("length", graph.length_of(&steps));
                f
            })
            .collect();

        let mut members = JsonObject::new();
        members.insert("quiet_bike_length".into(), self.quiet_bike_length.into());
        members.insert("direct_bike_length".into(), self.direct_bike_length.into());
        members.insert(
            "directions".into(),
            serde_json::to_value(&self.directions).unwrap_or(serde_json::Value::Null),
        );
        FeatureCollection { bbox: None, features, foreign_members: Some(members) }
    }
}
