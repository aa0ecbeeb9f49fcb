//! Programmatic construction of small payloads.
//!
//! Used by the test suites of every downstream crate and by `npw synth`
//! to produce a demonstration study area without real map data.
//! Coordinates are WGS84 degrees; rectangles are `[min_lon, min_lat, max_lon, max_lat]`.

use geo::{Coord, LineString, MultiPolygon, Rect};

use crate::payload::{
    AreaRecord, DataZoneRecord, DesireLineRecord, GraphPayload, GreenspaceRecord, PoiRecord,
    RoadRecord,
};
use crate::places::PoiKind;
use crate::road::RoadAttrs;

/// Margin added around the intersections when no boundary is given, degrees.
const BOUNDARY_PAD_DEG: f64 = 0.01;

pub struct PayloadBuilder {
    payload: GraphPayload,
    boundary: Option<MultiPolygon>,
}

fn rect_polygon([x1, y1, x2, y2]: [f64; 4]) -> MultiPolygon {
    MultiPolygon::new(vec![Rect::new(Coord { x: x1, y: y1 }, Coord { x: x2, y: y2 }).to_polygon()])
}

impl PayloadBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            payload: GraphPayload { study_area_name: name.to_string(), ..Default::default() },
            boundary: None,
        }
    }

    pub fn boundary(&mut self, rect: [f64; 4]) -> &mut Self {
        self.boundary = Some(rect_polygon(rect));
        self
    }

    pub fn intersection(&mut self, lon: f64, lat: f64) -> u32 {
        self.payload.intersections.push(Coord { x: lon, y: lat });
        (self.payload.intersections.len() - 1) as u32
    }

    /// Straight road between two intersections.
    pub fn road(&mut self, src: u32, dst: u32, attrs: RoadAttrs) -> u32 {
        self.named_road(src, dst, None, attrs)
    }

    pub fn named_road(&mut self, src: u32, dst: u32, name: Option<&str>, attrs: RoadAttrs) -> u32 {
        let pt = |i: u32| {
            self.payload
                .intersections
                .get(i as usize)
                .copied()
                .unwrap_or(Coord { x: f64::NAN, y: f64::NAN })
        };
        let geometry = LineString::new(vec![pt(src), pt(dst)]);
        self.payload.roads.push(RoadRecord {
            src,
            dst,
            geometry,
            name: name.map(str::to_string),
            attrs,
        });
        (self.payload.roads.len() - 1) as u32
    }

    pub fn poi(&mut self, kind: PoiKind, name: &str, lon: f64, lat: f64) -> &mut Self {
        self.payload.pois.push(PoiRecord {
            kind,
            name: Some(name.to_string()),
            point: Coord { x: lon, y: lat },
        });
        self
    }

    pub fn greenspace(&mut self, name: &str, rect: [f64; 4], access_points: &[[f64; 2]]) -> &mut Self {
        self.payload.greenspaces.push(GreenspaceRecord {
            name: Some(name.to_string()),
            polygon: rect_polygon(rect),
            access_points: access_points.iter().map(|[x, y]| Coord { x: *x, y: *y }).collect(),
        });
        self
    }

    pub fn town_centre(&mut self, name: &str, rect: [f64; 4]) -> &mut Self {
        self.payload.town_centres.push(AreaRecord {
            name: Some(name.to_string()),
            polygon: rect_polygon(rect),
            population: 0,
        });
        self
    }

    pub fn settlement(&mut self, name: &str, rect: [f64; 4], population: u32) -> &mut Self {
        self.payload.settlements.push(AreaRecord {
            name: Some(name.to_string()),
            polygon: rect_polygon(rect),
            population,
        });
        self
    }

    pub fn data_zone(&mut self, id: &str, rect: [f64; 4], population: u32, imd_percentile: u8) -> &mut Self {
        self.payload.data_zones.push(DataZoneRecord {
            id: id.to_string(),
            polygon: rect_polygon(rect),
            population,
            imd_rank: imd_percentile as u32 * 70,
            imd_percentile,
            area_km2: 1.0,
        });
        self
    }

    pub fn od_zone(&mut self, name: &str, rect: [f64; 4]) -> &mut Self {
        self.payload.od_zones.push(AreaRecord {
            name: Some(name.to_string()),
            polygon: rect_polygon(rect),
            population: 0,
        });
        self
    }

    pub fn desire_line(&mut self, from: &str, to: &str, count: u32) -> &mut Self {
        self.payload.desire_lines.push(DesireLineRecord {
            from_zone: from.to_string(),
            to_zone: to.to_string(),
            count,
        });
        self
    }

    /// Mutable access for tests that need to break invariants on purpose.
    pub fn payload_mut(&mut self) -> &mut GraphPayload {
        &mut self.payload
    }

    pub fn build(mut self) -> GraphPayload {
        self.payload.boundary = match self.boundary.take() {
            Some(b) => b,
            None => {
                let xs = self.payload.intersections.iter().map(|c| c.x);
                let ys = self.payload.intersections.iter().map(|c| c.y);
                let (x1, x2) = xs.fold((f64::MAX, f64::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
                let (y1, y2) = ys.fold((f64::MAX, f64::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
                if x1 > x2 {
                    MultiPolygon::new(Vec::new())
                } else {
                    rect_polygon([
                        x1 - BOUNDARY_PAD_DEG,
                        y1 - BOUNDARY_PAD_DEG,
                        x2 + BOUNDARY_PAD_DEG,
                        y2 + BOUNDARY_PAD_DEG,
                    ])
                }
            }
        };
        self.payload
    }
}

/// A `cols × rows` lattice of intersections `spacing_deg` apart, with a road
/// along every edge.  `attrs(road_number)` styles each road.
///
/// Intersection `r * cols + c` sits at `(c * spacing, r * spacing)`.  Roads
/// are numbered horizontals first (row by row), then verticals.
pub fn grid(
    name: &str,
    cols: u32,
    rows: u32,
    spacing_deg: f64,
    attrs: impl Fn(u32) -> RoadAttrs,
) -> PayloadBuilder {
    let mut b = PayloadBuilder::new(name);
    for r in 0..rows {
        for c in 0..cols {
            b.intersection(c as f64 * spacing_deg, r as f64 * spacing_deg);
        }
    }
    let mut n = 0;
    for r in 0..rows {
        for c in 0..cols.saturating_sub(1) {
            b.road(r * cols + c, r * cols + c + 1, attrs(n));
            n += 1;
        }
    }
    for r in 0..rows.saturating_sub(1) {
        for c in 0..cols {
            b.road(r * cols + c, (r + 1) * cols + c, attrs(n));
            n += 1;
        }
    }
    b
}
