//! A loaded study area: the road graph plus every static place layer.

use std::collections::HashMap;

use geo::{BoundingRect, Coord, LineString, MultiPolygon, Point, Polygon};

use npw_core::mercator::trim_lon_lat;
use npw_core::{Dir, EngineConfig, IntersectionId, Mercator, RoadId};

use crate::network::{RoadGraph, RoadGraphBuilder};
use crate::payload::{AreaRecord, GraphPayload};
use crate::places::{Area, DataZone, DesireLine, Greenspace, OdZone, Poi, PoiKind};
use crate::quintiles::Quintiles;
use crate::snap::Waypoint;
use crate::{GraphError, GraphResult};

pub struct StudyArea {
    pub name: String,
    pub mercator: Mercator,
    pub boundary_wgs84: MultiPolygon,
    pub graph: RoadGraph,

    pub pois: Vec<Poi>,
    pub greenspaces: Vec<Greenspace>,
    pub town_centres: Vec<Area>,
    pub settlements: Vec<Area>,
    pub data_zones: Vec<DataZone>,

    pub od_zones: Vec<OdZone>,
    pub desire_lines: Vec<DesireLine>,

    pub demand_quintiles: Quintiles,
}

impl StudyArea {
    /// Decode and validate a binary payload.
    pub fn load(bytes: &[u8], config: &EngineConfig) -> GraphResult<Self> {
        Self::from_payload(GraphPayload::decode(bytes)?, config)
    }

    pub fn from_payload(payload: GraphPayload, config: &EngineConfig) -> GraphResult<Self> {
        payload.validate()?;
        let bounds = payload
            .boundary
            .bounding_rect()
            .ok_or_else(|| GraphError::Malformed("study area boundary is empty".into()))?;
        let mercator = Mercator::from_bounds(bounds);

        let mut b = RoadGraphBuilder::with_capacity(payload.intersections.len(), payload.roads.len());
        for pt in &payload.intersections {
            b.add_intersection(mercator.pt_to_mercator(*pt));
        }
        for road in payload.roads {
            b.add_road(
                IntersectionId(road.src),
                IntersectionId(road.dst),
                mercator.to_mercator(&road.geometry),
                road.name,
                road.attrs,
            );
        }
        let graph = b.build(config.major_junction_min_degree)?;

        let nearest_road = |pt: Coord| {
            graph
                .nearest_road(pt)
                .ok_or_else(|| GraphError::Malformed("graph has no roads".into()))
        };

        let mut pois = Vec::with_capacity(payload.pois.len());
        for (idx, record) in payload.pois.into_iter().enumerate() {
            if !record.kind.is_point() {
                return Err(GraphError::Malformed(format!(
                    "POI {idx} has non-point kind {:?}",
                    record.kind
                )));
            }
            let pt = mercator.pt_to_mercator(record.point);
            pois.push(Poi {
                kind: record.kind,
                name: record.name,
                point: Point::from(pt),
                road: nearest_road(pt)?,
            });
        }

        let mut greenspaces = Vec::with_capacity(payload.greenspaces.len());
        for record in payload.greenspaces {
            let polygon = mercator.to_mercator(&record.polygon);
            let access_points: Vec<Point> = record
                .access_points
                .iter()
                .map(|c| Point::from(mercator.pt_to_mercator(*c)))
                .collect();
            let mut roads = if access_points.is_empty() {
                graph.roads_intersecting(&polygon)
            } else {
                access_points
                    .iter()
                    .map(|p| nearest_road(p.0))
                    .collect::<GraphResult<Vec<_>>>()?
            };
            roads.sort_unstable();
            roads.dedup();
            greenspaces.push(Greenspace { name: record.name, polygon, access_points, roads });
        }

        let to_areas = |records: Vec<AreaRecord>| -> Vec<Area> {
            records
                .into_iter()
                .map(|r| {
                    let polygon = mercator.to_mercator(&r.polygon);
                    Area {
                        roads: graph.roads_intersecting(&polygon),
                        name: r.name,
                        polygon,
                        population: r.population,
                    }
                })
                .collect()
        };
        let town_centres = to_areas(payload.town_centres);
        let settlements = to_areas(payload.settlements);

        let data_zones = payload
            .data_zones
            .into_iter()
            .map(|z| {
                let polygon = mercator.to_mercator(&z.polygon);
                DataZone {
                    roads: graph.roads_intersecting(&polygon),
                    id: z.id,
                    polygon,
                    population: z.population,
                    imd_rank: z.imd_rank,
                    imd_percentile: z.imd_percentile,
                    area_km2: z.area_km2,
                }
            })
            .collect::<Vec<_>>();

        let mut od_zones = Vec::with_capacity(payload.od_zones.len());
        let mut zone_idx: HashMap<String, usize> = HashMap::new();
        for record in payload.od_zones {
            let name = record.name.unwrap_or_default();
            let polygon = mercator.to_mercator(&record.polygon);
            let zone = OdZone::new(name.clone(), polygon)
                .ok_or_else(|| GraphError::Malformed(format!("OD zone {name} has no area")))?;
            zone_idx.insert(name, od_zones.len());
            od_zones.push(zone);
        }
        let desire_lines = payload
            .desire_lines
            .into_iter()
            .map(|line| {
                let from = zone_idx.get(&line.from_zone).copied();
                let to = zone_idx.get(&line.to_zone).copied();
                match (from, to) {
                    (Some(from), Some(to)) => Ok(DesireLine { from, to, count: line.count }),
                    _ => Err(GraphError::Malformed(format!(
                        "desire line {} -> {} references an unknown zone",
                        line.from_zone, line.to_zone
                    ))),
                }
            })
            .collect::<GraphResult<Vec<_>>>()?;

        let demands: Vec<u32> = graph.roads.iter().map(|r| r.attrs.precalculated_demand).collect();
        let demand_quintiles = Quintiles::new(&demands);

        log::info!(
            "Loaded study area {:?}: {} roads, {} intersections ({} major), {} POIs, {} desire lines",
            payload.study_area_name,
            graph.road_count(),
            graph.intersection_count(),
            graph.major_junctions().count(),
            pois.len(),
            desire_lines.len(),
        );

        Ok(Self {
            name: payload.study_area_name,
            mercator,
            boundary_wgs84: payload.boundary,
            graph,
            pois,
            greenspaces,
            town_centres,
            settlements,
            data_zones,
            od_zones,
            desire_lines,
            demand_quintiles,
        })
    }

    // ── Boundaries ────────────────────────────────────────────────────────

    /// `[min_x, min_y, max_x, max_y]` in WGS84.
    pub fn bounds(&self) -> [f64; 4] {
        self.mercator.bounds_array()
    }

    /// The whole world with the study area cut out, for fading the map
    /// outside it.
    pub fn inverted_boundary(&self) -> Polygon {
        invert(self.boundary_wgs84.0.iter().map(|p| p.exterior().clone()))
    }

    /// The whole world with every settlement cut out.
    pub fn inverted_boundary_inside_settlements(&self) -> Polygon {
        invert(self.settlements_wgs84().flat_map(|mp| mp.0).map(|p| p.exterior().clone()))
    }

    /// The settlements themselves, to fade everything inside them.
    pub fn inverted_boundary_outside_settlements(&self) -> MultiPolygon {
        MultiPolygon::new(self.settlements_wgs84().flat_map(|mp| mp.0).collect())
    }

    fn settlements_wgs84(&self) -> impl Iterator<Item = MultiPolygon> + '_ {
        self.settlements.iter().map(|s| self.mercator.to_wgs84(&s.polygon))
    }

    // ── Snapping in WGS84 ─────────────────────────────────────────────────

    pub fn snap_wgs84(&self, pt: [f64; 2], major_threshold: Option<f64>) -> GraphResult<IntersectionId> {
        self.graph
            .snap(self.mercator.pt_to_mercator(Coord { x: pt[0], y: pt[1] }), major_threshold)
    }

    pub fn waypoints_to_path(
        &self,
        waypoints: &[Waypoint],
        major_threshold: Option<f64>,
    ) -> GraphResult<Vec<(RoadId, Dir)>> {
        let pts: Vec<Coord> = waypoints
            .iter()
            .map(|w| self.mercator.pt_to_mercator(Coord { x: w.point[0], y: w.point[1] }))
            .collect();
        self.graph.points_to_path(&pts, major_threshold)
    }

    /// Intermediate snap candidates between two waypoints, as
    /// `(lon, lat, snapped)`.
    pub fn extra_nodes(
        &self,
        a: &Waypoint,
        b: &Waypoint,
        major_threshold: Option<f64>,
    ) -> GraphResult<Vec<(f64, f64, bool)>> {
        let to_merc = |w: &Waypoint| self.mercator.pt_to_mercator(Coord { x: w.point[0], y: w.point[1] });
        Ok(self
            .graph
            .extra_nodes(to_merc(a), to_merc(b), major_threshold)?
            .into_iter()
            .map(|i| {
                let [x, y] = self.intersection_wgs84(i);
                (x, y, true)
            })
            .collect())
    }

    /// Intersection position as trimmed `[lon, lat]`.
    pub fn intersection_wgs84(&self, i: IntersectionId) -> [f64; 2] {
        let pt = self.mercator.pt_to_wgs84(self.graph.intersections[i.index()].point.0);
        [trim_lon_lat(pt.x), trim_lon_lat(pt.y)]
    }

    /// The fewest snapped waypoints that redraw `steps` exactly.
    pub fn waypoints_for(&self, steps: &[(RoadId, Dir)]) -> Vec<Waypoint> {
        self.graph
            .minimal_waypoints(steps)
            .into_iter()
            .map(|i| Waypoint { point: self.intersection_wgs84(i), snapped: true })
            .collect()
    }

    /// Geometry of a step sequence in WGS84.
    pub fn linestring_wgs84(&self, steps: &[(RoadId, Dir)]) -> LineString {
        self.mercator.to_wgs84(&self.graph.glue(steps))
    }

    // ── Places ────────────────────────────────────────────────────────────

    pub fn place_count(&self, kind: PoiKind) -> usize {
        match kind {
            PoiKind::Schools | PoiKind::GpHospitals => {
                self.pois.iter().filter(|p| p.kind == kind).count()
            }
            PoiKind::Greenspaces => self.greenspaces.len(),
            PoiKind::TownCentres => self.town_centres.len(),
            PoiKind::Settlements => self.settlements.len(),
            PoiKind::DataZones => self.data_zones.len(),
        }
    }

    /// Roads a place attaches to.  Point POIs are indexed within their own
    /// kind, in payload order.
    pub fn place_roads(&self, kind: PoiKind, idx: usize) -> GraphResult<Vec<RoadId>> {
        let missing = || GraphError::PlaceNotFound { kind, idx };
        Ok(match kind {
            PoiKind::Schools | PoiKind::GpHospitals => {
                vec![self.pois.iter().filter(|p| p.kind == kind).nth(idx).ok_or_else(missing)?.road]
            }
            PoiKind::Greenspaces => self.greenspaces.get(idx).ok_or_else(missing)?.roads.clone(),
            PoiKind::TownCentres => self.town_centres.get(idx).ok_or_else(missing)?.roads.clone(),
            PoiKind::Settlements => self.settlements.get(idx).ok_or_else(missing)?.roads.clone(),
            PoiKind::DataZones => self.data_zones.get(idx).ok_or_else(missing)?.roads.clone(),
        })
    }

    /// Display name of a place; data zones are named by their id.
    pub fn place_name(&self, kind: PoiKind, idx: usize) -> GraphResult<Option<String>> {
        let missing = || GraphError::PlaceNotFound { kind, idx };
        Ok(match kind {
            PoiKind::Schools | PoiKind::GpHospitals => {
                self.pois.iter().filter(|p| p.kind == kind).nth(idx).ok_or_else(missing)?.name.clone()
            }
            PoiKind::Greenspaces => self.greenspaces.get(idx).ok_or_else(missing)?.name.clone(),
            PoiKind::TownCentres => self.town_centres.get(idx).ok_or_else(missing)?.name.clone(),
            PoiKind::Settlements => self.settlements.get(idx).ok_or_else(missing)?.name.clone(),
            PoiKind::DataZones => Some(self.data_zones.get(idx).ok_or_else(missing)?.id.clone()),
        })
    }
}

/// World polygon with the given rings as holes.
fn invert(holes: impl Iterator<Item = LineString>) -> Polygon {
    let world = LineString::from(vec![
        (-180.0, -90.0),
        (180.0, -90.0),
        (180.0, 90.0),
        (-180.0, 90.0),
        (-180.0, -90.0),
    ]);
    Polygon::new(world, holes.collect())
}
