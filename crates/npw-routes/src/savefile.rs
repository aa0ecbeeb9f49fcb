//! The save format: every route as a GeoJSON feature, plus the id counter.
//!
//! ```text
//! { "type": "FeatureCollection",
//!   "version": 2, "id_counter": 7, "study_area_name": "…",
//!   "features": [ { "id": 3, "geometry": …, "properties": {
//!       "name", "notes", "infra_type", "override_infra_type", "tier",
//!       "roads": [[12, "Forwards"], …], "full_path": [{ "snapped": 40 }, …],
//!       "waypoints": [{ "point": [lon, lat], "snapped": true }, …] } } ] }
//! ```
//!
//! Version 1 files have no `roads` and no `study_area_name`, and may omit
//! `override_infra_type`.  They are upgraded on load by re-resolving
//! `full_path` against the graph.

use std::collections::{BTreeMap, HashMap};

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};

use npw_core::{Dir, InfraType, RoadId, RouteId, Tier};
use npw_graph::{StudyArea, Waypoint};

use crate::route::{resolve_full_path, Route, RouteNode};
use crate::{RouteError, RouteResult, RouteStore};

pub const SAVEFILE_VERSION: u64 = 2;

#[derive(Serialize, Deserialize)]
struct SavedRoute {
    name: String,
    notes: String,
    infra_type: InfraType,
    override_infra_type: bool,
    tier: Tier,
    roads: Vec<(RoadId, Dir)>,
    full_path: Vec<RouteNode>,
    waypoints: Vec<Waypoint>,
}

#[derive(Deserialize)]
struct LegacyRoute {
    name: String,
    #[serde(default)]
    notes: String,
    infra_type: InfraType,
    #[serde(default)]
    override_infra_type: bool,
    tier: Tier,
    full_path: Vec<RouteNode>,
    #[serde(default)]
    waypoints: Vec<Waypoint>,
}

/// A decoded savefile, before validation against the graph.
enum Savefile {
    V1 {
        routes: Vec<(RouteId, LegacyRoute)>,
        id_counter: Option<u32>,
    },
    V2 {
        routes: Vec<(RouteId, SavedRoute)>,
        id_counter: u32,
        study_area_name: String,
    },
}

/// One route as a WGS84 feature carrying every persisted field.
pub fn route_feature(area: &StudyArea, id: RouteId, route: &Route) -> Feature {
    let saved = SavedRoute {
        name: route.name.clone(),
        notes: route.notes.clone(),
        infra_type: route.infra_type,
        override_infra_type: route.override_infra_type,
        tier: route.tier,
        roads: route.roads.clone(),
        full_path: route.full_path(&area.graph),
        waypoints: route.waypoints.clone(),
    };
    let properties = match serde_json::to_value(saved) {
        Ok(serde_json::Value::Object(map)) => Some(map),
        _ => None,
    };
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&area.linestring_wgs84(&route.roads)))),
        id: Some(Id::Number(id.0.into())),
        properties,
        foreign_members: None,
    }
}

impl RouteStore {
    pub fn to_savefile(&self, area: &StudyArea) -> FeatureCollection {
        let features = self
            .routes()
            .iter()
            .map(|(id, route)| route_feature(area, *id, route))
            .collect();
        let mut members = JsonObject::new();
        members.insert("version".into(), SAVEFILE_VERSION.into());
        members.insert("id_counter".into(), self.id_counter().into());
        members.insert("study_area_name".into(), area.name.clone().into());
        FeatureCollection { bbox: None, features, foreign_members: Some(members) }
    }

    /// Parse, upgrade and validate a savefile.  Nothing is loaded unless the
    /// whole file is valid.
    pub fn from_savefile(area: &StudyArea, text: &str) -> RouteResult<RouteStore> {
        let store = match parse(text)? {
            Savefile::V1 { routes, id_counter } => {
                log::info!("Upgrading version 1 savefile with {} route(s)", routes.len());
                let routes = routes
                    .into_iter()
                    .map(|(id, legacy)| Ok((id, upgrade_v1(area, legacy)?)))
                    .collect::<RouteResult<Vec<_>>>()?;
                let id_counter = match id_counter {
                    Some(counter) => counter,
                    None => next_free_id(&routes)?,
                };
                build(area, routes, id_counter)?
            }
            Savefile::V2 { routes, id_counter, study_area_name } => {
                if study_area_name != area.name {
                    return Err(RouteError::Savefile(format!(
                        "savefile is for {study_area_name:?}, not {:?}",
                        area.name
                    )));
                }
                let routes = routes
                    .into_iter()
                    .map(|(id, saved)| {
                        let route = Route {
                            name: saved.name,
                            notes: saved.notes,
                            roads: saved.roads,
                            waypoints: saved.waypoints,
                            infra_type: saved.infra_type,
                            override_infra_type: saved.override_infra_type,
                            tier: saved.tier,
                        };
                        (id, route)
                    })
                    .collect();
                build(area, routes, id_counter)?
            }
        };
        log::info!("Loaded savefile with {} route(s)", store.len());
        Ok(store)
    }
}

fn parse(text: &str) -> RouteResult<Savefile> {
    let GeoJson::FeatureCollection(fc) = text.parse::<GeoJson>()? else {
        return Err(RouteError::Savefile("expected a FeatureCollection".into()));
    };
    let members = fc.foreign_members.unwrap_or_default();
    let version = match members.get("version") {
        None => 1,
        Some(v) => v
            .as_u64()
            .ok_or_else(|| RouteError::Savefile(format!("bad version {v}")))?,
    };
    let id_counter = match members.get("id_counter") {
        None => None,
        Some(v) => Some(
            v.as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| RouteError::Savefile(format!("bad id_counter {v}")))?,
        ),
    };

    match version {
        1 => Ok(Savefile::V1 { routes: properties_of(fc.features)?, id_counter }),
        2 => Ok(Savefile::V2 {
            routes: properties_of(fc.features)?,
            id_counter: id_counter.ok_or_else(|| RouteError::Savefile("missing id_counter".into()))?,
            study_area_name: members
                .get("study_area_name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| RouteError::Savefile("missing study_area_name".into()))?
                .to_string(),
        }),
        v => Err(RouteError::Savefile(format!("unsupported savefile version {v}"))),
    }
}

fn properties_of<T: serde::de::DeserializeOwned>(features: Vec<Feature>) -> RouteResult<Vec<(RouteId, T)>> {
    features
        .into_iter()
        .map(|f| {
            let id = match &f.id {
                Some(Id::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
                Some(Id::String(s)) => s.parse().ok(),
                None => None,
            }
            .map(RouteId)
            .ok_or_else(|| RouteError::Savefile("route feature without a valid id".into()))?;
            let props = serde_json::Value::Object(f.properties.unwrap_or_default());
            Ok((id, serde_json::from_value(props)?))
        })
        .collect()
}

fn upgrade_v1(area: &StudyArea, legacy: LegacyRoute) -> RouteResult<Route> {
    let roads = resolve_full_path(&area.graph, &legacy.full_path)?;
    Ok(Route {
        name: legacy.name,
        notes: legacy.notes,
        waypoints: if legacy.waypoints.is_empty() {
            area.waypoints_for(&roads)
        } else {
            legacy.waypoints
        },
        roads,
        infra_type: legacy.infra_type,
        override_infra_type: legacy.override_infra_type,
        tier: legacy.tier,
    })
}

/// One past the highest id, for version 1 files without a counter.
fn next_free_id(routes: &[(RouteId, Route)]) -> RouteResult<u32> {
    routes.iter().try_fold(0, |next, (id, _)| -> RouteResult<u32> {
        let after = id.0.checked_add(1).ok_or_else(|| RouteError::Savefile(format!("{id} leaves no free id")))?;
        Ok(next.max(after))
    })
}

/// Check ids, roads, contiguity and single ownership.
fn build(area: &StudyArea, routes: Vec<(RouteId, Route)>, id_counter: u32) -> RouteResult<RouteStore> {
    let mut map = BTreeMap::new();
    let mut owner_of: HashMap<RoadId, RouteId> = HashMap::new();
    for (id, route) in routes {
        if map.contains_key(&id) {
            return Err(RouteError::Savefile(format!("{id} appears twice")));
        }
        if id.0 >= id_counter {
            return Err(RouteError::Savefile(format!("{id} is not below id_counter {id_counter}")));
        }
        if route.roads.is_empty() {
            return Err(RouteError::Savefile(format!("{id} has no roads")));
        }
        for (r, _) in &route.roads {
            area.graph.road(*r)?;
            match owner_of.insert(*r, id) {
                Some(other) if other == id => {
                    return Err(RouteError::Savefile(format!("{id} uses {r} more than once")));
                }
                Some(other) => {
                    return Err(RouteError::Savefile(format!("{r} is claimed by both {other} and {id}")));
                }
                None => {}
            }
        }
        if !area.graph.is_contiguous(&route.roads) {
            return Err(RouteError::Savefile(format!("{id} is not a contiguous path")));
        }
        map.insert(id, route);
    }
    Ok(RouteStore::from_parts(map, id_counter))
}
