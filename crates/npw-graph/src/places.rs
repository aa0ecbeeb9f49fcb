//! Static places attached to the road graph: points of interest, polygons
//! of interest, and the zones used for demand sampling.
//!
//! Geometry is in local metres.  Each place records the roads it attaches
//! to, so reachability only ever has to look at roads.

use geo::{BoundingRect, Contains, Coord, MultiPolygon, Point};
use serde::{Deserialize, Serialize};

use npw_core::{RoadId, SampleRng};

/// Reachability category.  Point POIs in the payload are only ever
/// `Schools` or `GpHospitals`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiKind {
    Schools,
    GpHospitals,
    Greenspaces,
    TownCentres,
    Settlements,
    DataZones,
}

impl PoiKind {
    pub const ALL: [PoiKind; 6] = [
        PoiKind::Schools,
        PoiKind::GpHospitals,
        PoiKind::Greenspaces,
        PoiKind::TownCentres,
        PoiKind::Settlements,
        PoiKind::DataZones,
    ];

    /// Same spelling as the serde representation.
    pub fn name(self) -> &'static str {
        match self {
            PoiKind::Schools => "schools",
            PoiKind::GpHospitals => "gp_hospitals",
            PoiKind::Greenspaces => "greenspaces",
            PoiKind::TownCentres => "town_centres",
            PoiKind::Settlements => "settlements",
            PoiKind::DataZones => "data_zones",
        }
    }

    pub fn is_point(self) -> bool {
        matches!(self, PoiKind::Schools | PoiKind::GpHospitals)
    }
}

#[derive(Clone, Debug)]
pub struct Poi {
    pub kind: PoiKind,
    pub name: Option<String>,
    pub point: Point,
    /// Nearest road to `point`.
    pub road: RoadId,
}

#[derive(Clone, Debug)]
pub struct Greenspace {
    pub name: Option<String>,
    pub polygon: MultiPolygon,
    pub access_points: Vec<Point>,
    /// Roads nearest each access point, or every road touching the polygon
    /// when there are no access points.
    pub roads: Vec<RoadId>,
}

/// A named polygon: town centre or settlement.
#[derive(Clone, Debug)]
pub struct Area {
    pub name: Option<String>,
    pub polygon: MultiPolygon,
    pub population: u32,
    /// Roads intersecting the polygon.
    pub roads: Vec<RoadId>,
}

/// Census data zone with population and deprivation.
#[derive(Clone, Debug)]
pub struct DataZone {
    pub id: String,
    pub polygon: MultiPolygon,
    pub population: u32,
    pub imd_rank: u32,
    pub imd_percentile: u8,
    pub area_km2: f64,
    pub roads: Vec<RoadId>,
}

impl DataZone {
    /// Among the 20 % most deprived zones nationally.
    pub fn is_deprived(&self) -> bool {
        self.imd_percentile <= 20
    }
}

/// Origin/destination zone.  The bbox is kept in whole centimetres so
/// sampling can draw integers.
#[derive(Clone, Debug)]
pub struct OdZone {
    pub name: String,
    pub polygon: MultiPolygon,
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
}

/// Rejection sampling gives up after this many misses (degenerate polygons).
const MAX_SAMPLE_ATTEMPTS: usize = 1_000;

impl OdZone {
    pub fn new(name: String, polygon: MultiPolygon) -> Option<Self> {
        let bbox = polygon.bounding_rect()?;
        Some(Self {
            name,
            x1: (bbox.min().x * 100.0) as i64,
            y1: (bbox.min().y * 100.0) as i64,
            x2: (bbox.max().x * 100.0) as i64,
            y2: (bbox.max().y * 100.0) as i64,
            polygon,
        })
    }

    /// Uniform random point inside the zone.
    pub fn random_point(&self, rng: &mut SampleRng) -> Option<Coord> {
        for _ in 0..MAX_SAMPLE_ATTEMPTS {
            let x = rng.gen_range(self.x1..=self.x2) as f64 / 100.0;
            let y = rng.gen_range(self.y1..=self.y2) as f64 / 100.0;
            let pt = Coord { x, y };
            if self.polygon.contains(&pt) {
                return Some(pt);
            }
        }
        None
    }
}

/// `count` trips between two OD zones (indices into the study area's zones).
#[derive(Clone, Debug)]
pub struct DesireLine {
    pub from: usize,
    pub to: usize,
    pub count: u32,
}
