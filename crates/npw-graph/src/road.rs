//! Road and intersection records.

use geo::{Coord, LineString, Point};
use serde::{Deserialize, Serialize};

use npw_core::{
    Dir, InfraType, IntersectionId, RoadId, StreetSpace, Tier, TrafficVolume,
};

/// Static attributes of one road, as delivered by data preparation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadAttrs {
    /// Main road; the denominator of the arterial safety metric.
    pub is_arterial: bool,
    pub within_settlement: bool,
    pub traffic: TrafficVolume,
    /// Speed limit in mph.
    pub speed_mph: u16,
    /// Gradient in percent; positive is uphill in the `src → dst` direction.
    pub gradient: f64,
    /// Cycle infrastructure that already exists on this road.
    pub existing_infra: Option<InfraType>,
    /// Tier of this road in the precalculated core network, if any.
    pub core_network: Option<Tier>,
    /// Modelled cycling demand before any intervention.
    pub precalculated_demand: u32,
    pub street_space: Option<StreetSpace>,
    /// Runs through or alongside greenspace or otherwise pleasant surroundings.
    pub is_attractive: bool,
}

impl Default for RoadAttrs {
    fn default() -> Self {
        Self {
            is_arterial: false,
            within_settlement: true,
            traffic: TrafficVolume::UpTo1000,
            speed_mph: 20,
            gradient: 0.0,
            existing_infra: None,
            core_network: None,
            precalculated_demand: 0,
            street_space: None,
            is_attractive: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Road {
    pub id: RoadId,
    pub src_i: IntersectionId,
    pub dst_i: IntersectionId,
    /// Geometry in local metres, oriented `src → dst`.
    pub linestring: LineString,
    pub length_m: f64,
    pub name: Option<String>,
    pub attrs: RoadAttrs,
}

impl Road {
    /// `(from, to)` intersections when traversed in `dir`.
    #[inline]
    pub fn endpoints(&self, dir: Dir) -> (IntersectionId, IntersectionId) {
        match dir {
            Dir::Forwards => (self.src_i, self.dst_i),
            Dir::Backwards => (self.dst_i, self.src_i),
        }
    }

    /// The intersection at the other end from `i`.
    #[inline]
    pub fn other_end(&self, i: IntersectionId) -> IntersectionId {
        if self.src_i == i { self.dst_i } else { self.src_i }
    }

    /// Coordinates in traversal order.
    pub fn coords(&self, dir: Dir) -> Vec<Coord> {
        let mut pts = self.linestring.0.clone();
        if dir == Dir::Backwards {
            pts.reverse();
        }
        pts
    }
}

#[derive(Clone, Debug)]
pub struct Intersection {
    pub id: IntersectionId,
    pub point: Point,
    /// Incident roads, ascending by id.
    pub roads: Vec<RoadId>,
}
