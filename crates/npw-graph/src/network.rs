//! Road graph representation and builder.
//!
//! # Data layout
//!
//! Roads are undirected, so each one contributes two **half-edges**, one per
//! traversal direction.  Half-edges are stored in CSR form: the half-edges
//! leaving intersection `i` occupy
//!
//! ```text
//! half_road[ node_out_start[i] .. node_out_start[i+1] ]
//! ```
//!
//! sorted by road id within each row, so every traversal visits candidate
//! roads lowest-id first.
//!
//! # Spatial indices
//!
//! Three R-trees (via `rstar`) over local-metre coordinates:
//! every intersection, major junctions only, and every straight segment of
//! every road's geometry.

use geo::{BoundingRect, Coord, Intersects, LineString, MultiPolygon, Point};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use npw_core::{Dir, IntersectionId, RoadId};

use crate::road::{Intersection, Road, RoadAttrs};
use crate::{GraphError, GraphResult};

// ── R-tree entries ────────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id: IntersectionId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// One straight piece of a road's polyline.
#[derive(Clone)]
struct SegmentEntry {
    a: [f64; 2],
    b: [f64; 2],
    road: RoadId,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.a, self.b)
    }
}

impl PointDistance for SegmentEntry {
    /// Squared distance from `point` to the closest point on the segment.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let (dx, dy) = (self.b[0] - self.a[0], self.b[1] - self.a[1]);
        let len_2 = dx * dx + dy * dy;
        let t = if len_2 == 0.0 {
            0.0
        } else {
            (((point[0] - self.a[0]) * dx + (point[1] - self.a[1]) * dy) / len_2).clamp(0.0, 1.0)
        };
        let px = self.a[0] + t * dx - point[0];
        let py = self.a[1] + t * dy - point[1];
        px * px + py * py
    }
}

/// Among all entries at exactly the minimum distance, return the lowest id.
fn nearest_lowest_id<T, K>(tree: &RTree<T>, pt: [f64; 2], key: impl Fn(&T) -> K) -> Option<(K, f64)>
where
    T: PointDistance + RTreeObject<Envelope = AABB<[f64; 2]>>,
    K: Ord + Copy,
{
    let mut iter = tree.nearest_neighbor_iter(&pt);
    let first = iter.next()?;
    let best_d2 = first.distance_2(&pt);
    let mut best = key(first);
    for entry in iter {
        if entry.distance_2(&pt) > best_d2 {
            break;
        }
        best = best.min(key(entry));
    }
    Some((best, best_d2.sqrt()))
}

#[inline]
fn coord_array(c: Coord) -> [f64; 2] {
    [c.x, c.y]
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Immutable undirected road graph.  Construct with [`RoadGraphBuilder`].
pub struct RoadGraph {
    pub roads: Vec<Road>,
    pub intersections: Vec<Intersection>,

    node_out_start: Vec<u32>,
    half_road: Vec<RoadId>,
    half_dir: Vec<Dir>,
    half_to: Vec<IntersectionId>,

    major: Vec<bool>,

    node_idx: RTree<NodeEntry>,
    major_idx: RTree<NodeEntry>,
    segment_idx: RTree<SegmentEntry>,
}

impl RoadGraph {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn road(&self, id: RoadId) -> GraphResult<&Road> {
        self.roads.get(id.index()).ok_or(GraphError::RoadNotFound(id))
    }

    pub fn intersection(&self, id: IntersectionId) -> GraphResult<&Intersection> {
        self.intersections
            .get(id.index())
            .ok_or(GraphError::IntersectionNotFound(id))
    }

    /// Roads incident to `i`, ascending by id.
    pub fn roads_of(&self, i: IntersectionId) -> GraphResult<&[RoadId]> {
        Ok(&self.intersection(i)?.roads)
    }

    #[inline]
    pub fn degree(&self, i: IntersectionId) -> usize {
        self.intersections[i.index()].roads.len()
    }

    #[inline]
    pub fn is_major(&self, i: IntersectionId) -> bool {
        self.major[i.index()]
    }

    pub fn major_junctions(&self) -> impl Iterator<Item = IntersectionId> + '_ {
        self.major
            .iter()
            .enumerate()
            .filter(|(_, m)| **m)
            .map(|(idx, _)| IntersectionId(idx as u32))
    }

    /// Half-edges leaving `i` as `(road, direction, far end)`, lowest road first.
    #[inline]
    pub fn half_edges(
        &self,
        i: IntersectionId,
    ) -> impl Iterator<Item = (RoadId, Dir, IntersectionId)> + '_ {
        let start = self.node_out_start[i.index()] as usize;
        let end = self.node_out_start[i.index() + 1] as usize;
        (start..end).map(move |h| (self.half_road[h], self.half_dir[h], self.half_to[h]))
    }

    /// The lowest-id road joining `a` and `b`, with the direction that goes
    /// from `a` to `b`.
    pub fn find_road(&self, a: IntersectionId, b: IntersectionId) -> Option<(RoadId, Dir)> {
        if a.index() >= self.intersections.len() {
            return None;
        }
        self.half_edges(a)
            .find(|(_, _, to)| *to == b)
            .map(|(r, dir, _)| (r, dir))
    }

    /// Intersections visited by a contiguous sequence of steps, in order.
    pub fn path_intersections(&self, steps: &[(RoadId, Dir)]) -> Vec<IntersectionId> {
        let mut out = Vec::with_capacity(steps.len() + 1);
        for (r, dir) in steps {
            let (from, to) = self.roads[r.index()].endpoints(*dir);
            if out.last() != Some(&from) {
                out.push(from);
            }
            out.push(to);
        }
        out
    }

    /// `true` when each step starts where the previous one ended.
    pub fn is_contiguous(&self, steps: &[(RoadId, Dir)]) -> bool {
        steps.windows(2).all(|pair| {
            let (_, end) = self.roads[pair[0].0.index()].endpoints(pair[0].1);
            let (start, _) = self.roads[pair[1].0.index()].endpoints(pair[1].1);
            end == start
        })
    }

    /// Concatenate the geometry of a sequence of steps.
    pub fn glue(&self, steps: &[(RoadId, Dir)]) -> LineString {
        let mut pts: Vec<Coord> = Vec::new();
        for (r, dir) in steps {
            for pt in self.roads[r.index()].coords(*dir) {
                if pts.last() != Some(&pt) {
                    pts.push(pt);
                }
            }
        }
        LineString::new(pts)
    }

    pub fn length_of(&self, steps: &[(RoadId, Dir)]) -> f64 {
        steps.iter().map(|(r, _)| self.roads[r.index()].length_m).sum()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest intersection of any class and its distance in metres.
    pub fn nearest_intersection(&self, pt: Coord) -> Option<(IntersectionId, f64)> {
        nearest_lowest_id(&self.node_idx, coord_array(pt), |e| e.id)
    }

    /// Nearest major junction and its distance in metres.
    pub fn nearest_major(&self, pt: Coord) -> Option<(IntersectionId, f64)> {
        nearest_lowest_id(&self.major_idx, coord_array(pt), |e| e.id)
    }

    /// Road whose geometry passes closest to `pt`.
    pub fn nearest_road(&self, pt: Coord) -> Option<RoadId> {
        nearest_lowest_id(&self.segment_idx, coord_array(pt), |e| e.road).map(|(r, _)| r)
    }

    /// Roads whose geometry intersects `polygon`, ascending by id.
    pub fn roads_intersecting(&self, polygon: &MultiPolygon) -> Vec<RoadId> {
        let Some(bbox) = polygon.bounding_rect() else {
            return Vec::new();
        };
        let envelope = AABB::from_corners(coord_array(bbox.min()), coord_array(bbox.max()));
        let mut roads: Vec<RoadId> = self
            .segment_idx
            .locate_in_envelope_intersecting(&envelope)
            .map(|seg| seg.road)
            .collect();
        roads.sort_unstable();
        roads.dedup();
        roads.retain(|r| polygon.intersects(&self.roads[r.index()].linestring));
        roads
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// Intersections are numbered in insertion order from 0, roads likewise.
/// All structural validation happens in `build`.
///
/// # Example
///
/// ```
/// use geo::{Coord, LineString};
/// use npw_graph::{RoadAttrs, RoadGraphBuilder};
///
/// let mut b = RoadGraphBuilder::new();
/// let a = b.add_intersection(Coord { x: 0.0, y: 0.0 });
/// let c = b.add_intersection(Coord { x: 100.0, y: 0.0 });
/// b.add_straight_road(a, c, RoadAttrs::default());
/// let graph = b.build(3).unwrap();
/// assert_eq!(graph.road_count(), 1);
/// assert_eq!(graph.degree(a), 1);
/// ```
pub struct RoadGraphBuilder {
    points: Vec<Coord>,
    raw_roads: Vec<RawRoad>,
}

struct RawRoad {
    src: IntersectionId,
    dst: IntersectionId,
    linestring: LineString,
    name: Option<String>,
    attrs: RoadAttrs,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self { points: Vec::new(), raw_roads: Vec::new() }
    }

    pub fn with_capacity(intersections: usize, roads: usize) -> Self {
        Self {
            points: Vec::with_capacity(intersections),
            raw_roads: Vec::with_capacity(roads),
        }
    }

    pub fn add_intersection(&mut self, pt: Coord) -> IntersectionId {
        let id = IntersectionId(self.points.len() as u32);
        self.points.push(pt);
        id
    }

    pub fn add_road(
        &mut self,
        src: IntersectionId,
        dst: IntersectionId,
        linestring: LineString,
        name: Option<String>,
        attrs: RoadAttrs,
    ) -> RoadId {
        let id = RoadId(self.raw_roads.len() as u32);
        self.raw_roads.push(RawRoad { src, dst, linestring, name, attrs });
        id
    }

    /// Convenience for tests and synthetic graphs: a straight road between
    /// two previously added intersections.
    pub fn add_straight_road(
        &mut self,
        src: IntersectionId,
        dst: IntersectionId,
        attrs: RoadAttrs,
    ) -> RoadId {
        let pt = |i: IntersectionId| self.points.get(i.index()).copied().unwrap_or(Coord { x: f64::NAN, y: f64::NAN });
        let linestring = LineString::new(vec![pt(src), pt(dst)]);
        self.add_road(src, dst, linestring, None, attrs)
    }

    pub fn intersection_count(&self) -> usize {
        self.points.len()
    }

    pub fn road_count(&self) -> usize {
        self.raw_roads.len()
    }

    /// Validate and freeze the graph.
    ///
    /// Fails on a dangling endpoint, a road whose endpoints coincide, a
    /// geometry with fewer than two points, or any non-finite coordinate.
    pub fn build(self, major_min_degree: usize) -> GraphResult<RoadGraph> {
        let n = self.points.len();

        for (idx, pt) in self.points.iter().enumerate() {
            if !pt.x.is_finite() || !pt.y.is_finite() {
                return Err(GraphError::Malformed(format!(
                    "intersection {idx} has a non-finite coordinate"
                )));
            }
        }

        let mut roads = Vec::with_capacity(self.raw_roads.len());
        let mut incident: Vec<Vec<RoadId>> = vec![Vec::new(); n];
        for (idx, raw) in self.raw_roads.into_iter().enumerate() {
            let id = RoadId(idx as u32);
            if raw.src.index() >= n || raw.dst.index() >= n {
                return Err(GraphError::Malformed(format!(
                    "road {idx} references a missing intersection ({} -> {})",
                    raw.src.0, raw.dst.0
                )));
            }
            if raw.src == raw.dst {
                return Err(GraphError::Malformed(format!(
                    "road {idx} starts and ends at the same intersection"
                )));
            }
            if raw.linestring.0.len() < 2 {
                return Err(GraphError::Malformed(format!("road {idx} has fewer than 2 points")));
            }
            if raw.linestring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
                return Err(GraphError::Malformed(format!(
                    "road {idx} has a non-finite coordinate"
                )));
            }
            if !raw.attrs.gradient.is_finite() {
                return Err(GraphError::Malformed(format!("road {idx} has a non-finite gradient")));
            }

            let length_m = raw
                .linestring
                .lines()
                .map(|l| l.dx().hypot(l.dy()))
                .sum();
            incident[raw.src.index()].push(id);
            incident[raw.dst.index()].push(id);
            roads.push(Road {
                id,
                src_i: raw.src,
                dst_i: raw.dst,
                linestring: raw.linestring,
                length_m,
                name: raw.name,
                attrs: raw.attrs,
            });
        }

        // Roads were pushed in ascending id order, so each row is already sorted.
        let mut node_out_start = Vec::with_capacity(n + 1);
        let mut half_road = Vec::with_capacity(roads.len() * 2);
        let mut half_dir = Vec::with_capacity(roads.len() * 2);
        let mut half_to = Vec::with_capacity(roads.len() * 2);
        node_out_start.push(0u32);
        for (idx, row) in incident.iter().enumerate() {
            let i = IntersectionId(idx as u32);
            for r in row {
                let road = &roads[r.index()];
                half_road.push(*r);
                if road.src_i == i {
                    half_dir.push(Dir::Forwards);
                    half_to.push(road.dst_i);
                } else {
                    half_dir.push(Dir::Backwards);
                    half_to.push(road.src_i);
                }
            }
            node_out_start.push(half_road.len() as u32);
        }
        debug_assert_eq!(half_road.len(), roads.len() * 2);

        let major: Vec<bool> = incident
            .iter()
            .map(|row| {
                row.len() >= major_min_degree && row.iter().any(|r| roads[r.index()].attrs.is_arterial)
            })
            .collect();

        let node_entries: Vec<NodeEntry> = self
            .points
            .iter()
            .enumerate()
            .map(|(idx, pt)| NodeEntry { point: coord_array(*pt), id: IntersectionId(idx as u32) })
            .collect();
        let major_entries: Vec<NodeEntry> = node_entries
            .iter()
            .filter(|e| major[e.id.index()])
            .cloned()
            .collect();
        let segment_entries: Vec<SegmentEntry> = roads
            .iter()
            .flat_map(|road| {
                road.linestring.lines().map(move |l| SegmentEntry {
                    a: coord_array(l.start),
                    b: coord_array(l.end),
                    road: road.id,
                })
            })
            .collect();

        let intersections = self
            .points
            .into_iter()
            .zip(incident)
            .enumerate()
            .map(|(idx, (pt, roads))| Intersection {
                id: IntersectionId(idx as u32),
                point: Point::from(pt),
                roads,
            })
            .collect();

        Ok(RoadGraph {
            roads,
            intersections,
            node_out_start,
            half_road,
            half_dir,
            half_to,
            major,
            node_idx: RTree::bulk_load(node_entries),
            major_idx: RTree::bulk_load(major_entries),
            segment_idx: RTree::bulk_load(segment_entries),
        })
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
