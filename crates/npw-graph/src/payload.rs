//! Compact binary payload produced by data preparation.
//!
//! The payload is a `bincode` encoding of [`GraphPayload`].  All coordinates
//! are WGS84 `(lon, lat)`; projection to local metres happens at load.

use geo::{Coord, CoordsIter, LineString, MultiPolygon};
use serde::{Deserialize, Serialize};

use crate::places::PoiKind;
use crate::road::RoadAttrs;
use crate::{GraphError, GraphResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphPayload {
    pub study_area_name: String,
    pub boundary: MultiPolygon,
    pub intersections: Vec<Coord>,
    pub roads: Vec<RoadRecord>,
    pub pois: Vec<PoiRecord>,
    pub greenspaces: Vec<GreenspaceRecord>,
    pub town_centres: Vec<AreaRecord>,
    pub settlements: Vec<AreaRecord>,
    pub data_zones: Vec<DataZoneRecord>,
    /// Origin/destination zones referenced by `desire_lines`.
    pub od_zones: Vec<AreaRecord>,
    pub desire_lines: Vec<DesireLineRecord>,
}

impl Default for GraphPayload {
    fn default() -> Self {
        GraphPayload {
            study_area_name: String::new(),
            boundary: MultiPolygon::new(Vec::new()),
            intersections: Vec::new(),
            roads: Vec::new(),
            pois: Vec::new(),
            greenspaces: Vec::new(),
            town_centres: Vec::new(),
            settlements: Vec::new(),
            data_zones: Vec::new(),
            od_zones: Vec::new(),
            desire_lines: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoadRecord {
    pub src: u32,
    pub dst: u32,
    pub geometry: LineString,
    pub name: Option<String>,
    pub attrs: RoadAttrs,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoiRecord {
    pub kind: PoiKind,
    pub name: Option<String>,
    pub point: Coord,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GreenspaceRecord {
    pub name: Option<String>,
    pub polygon: MultiPolygon,
    pub access_points: Vec<Coord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AreaRecord {
    pub name: Option<String>,
    pub polygon: MultiPolygon,
    pub population: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataZoneRecord {
    pub id: String,
    pub polygon: MultiPolygon,
    pub population: u32,
    pub imd_rank: u32,
    /// 1–100; lower is more deprived.
    pub imd_percentile: u8,
    pub area_km2: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DesireLineRecord {
    pub from_zone: String,
    pub to_zone: String,
    pub count: u32,
}

impl GraphPayload {
    pub fn encode(&self) -> GraphResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> GraphResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Checks that don't need the built graph.  Road topology is validated
    /// by [`RoadGraphBuilder::build`](crate::RoadGraphBuilder::build).
    pub fn validate(&self) -> GraphResult<()> {
        if self.boundary.0.is_empty() {
            return Err(GraphError::Malformed("study area boundary is empty".into()));
        }
        if self.intersections.is_empty() || self.roads.is_empty() {
            return Err(GraphError::Malformed("graph has no roads".into()));
        }
        if let Some(idx) = self
            .intersections
            .iter()
            .position(|c| !finite(c))
        {
            return Err(GraphError::Malformed(format!(
                "intersection {idx} has a non-finite coordinate"
            )));
        }

        check_polygon("boundary", &self.boundary)?;
        for (idx, p) in self.pois.iter().enumerate() {
            if !finite(&p.point) {
                return Err(GraphError::Malformed(format!("POI {idx} has a non-finite coordinate")));
            }
        }
        for g in &self.greenspaces {
            check_polygon("greenspace", &g.polygon)?;
            if g.access_points.iter().any(|c| !finite(c)) {
                return Err(GraphError::Malformed("greenspace access point is non-finite".into()));
            }
        }
        for (what, areas) in [
            ("town centre", &self.town_centres),
            ("settlement", &self.settlements),
            ("OD zone", &self.od_zones),
        ] {
            for a in areas {
                check_polygon(what, &a.polygon)?;
            }
        }
        for z in &self.data_zones {
            check_polygon("data zone", &z.polygon)?;
        }

        for line in &self.desire_lines {
            for zone in [&line.from_zone, &line.to_zone] {
                if !self.od_zones.iter().any(|z| z.name.as_deref() == Some(zone.as_str())) {
                    return Err(GraphError::Malformed(format!(
                        "desire line references unknown zone {zone}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[inline]
fn finite(c: &Coord) -> bool {
    c.x.is_finite() && c.y.is_finite()
}

fn check_polygon(what: &str, mp: &MultiPolygon) -> GraphResult<()> {
    if mp.coords_iter().any(|c| !finite(&c)) {
        return Err(GraphError::Malformed(format!("{what} polygon has a non-finite coordinate")));
    }
    Ok(())
}
