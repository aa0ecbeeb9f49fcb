//! Snapping user points onto the graph.
//!
//! All inputs here are already projected to local metres; the
//! [`StudyArea`](crate::StudyArea) wrappers accept WGS84.

use geo::Coord;
use serde::{Deserialize, Serialize};

use npw_core::{Dir, IntersectionId, RoadId};

use crate::network::RoadGraph;
use crate::router::{shortest_path, ByLength};
use crate::{GraphError, GraphResult};

/// A user-drawn control point, kept on routes for re-editing.
///
/// `point` is `[lon, lat]`.  Every persisted waypoint is snapped to an
/// intersection; freehand points would require edges the graph doesn't have.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub point: [f64; 2],
    pub snapped: bool,
}

impl RoadGraph {
    /// Snap `pt` to an intersection.
    ///
    /// With `major_threshold`, a major junction within that many metres wins;
    /// otherwise (or when there is none that close) the nearest intersection of
    /// any class is used.  Equidistant candidates resolve to the lowest id.
    pub fn snap(&self, pt: Coord, major_threshold: Option<f64>) -> GraphResult<IntersectionId> {
        if let Some(threshold) = major_threshold {
            if let Some((i, dist)) = self.nearest_major(pt) {
                if dist <= threshold {
                    return Ok(i);
                }
            }
        }
        self.nearest_intersection(pt)
            .map(|(i, _)| i)
            .ok_or_else(|| GraphError::Malformed("graph has no intersections".into()))
    }

    /// Resolve a sequence of points into a contiguous road path by snapping
    /// each and joining consecutive ones with the shortest path by length.
    pub fn points_to_path(
        &self,
        pts: &[Coord],
        major_threshold: Option<f64>,
    ) -> GraphResult<Vec<(RoadId, Dir)>> {
        if pts.len() < 2 {
            return Err(GraphError::TooFewWaypoints);
        }
        let snapped = pts
            .iter()
            .map(|pt| self.snap(*pt, major_threshold))
            .collect::<GraphResult<Vec<_>>>()?;

        let mut steps = Vec::new();
        for pair in snapped.windows(2) {
            steps.extend(shortest_path(self, pair[0], pair[1], &ByLength)?.steps);
        }
        Ok(steps)
    }

    /// Intermediate intersections on the shortest path between two snapped
    /// points, excluding both ends.
    pub fn extra_nodes(
        &self,
        a: Coord,
        b: Coord,
        major_threshold: Option<f64>,
    ) -> GraphResult<Vec<IntersectionId>> {
        let steps = self.points_to_path(&[a, b], major_threshold)?;
        let mut nodes = self.path_intersections(&steps);
        if nodes.len() <= 2 {
            return Ok(Vec::new());
        }
        nodes.pop();
        nodes.remove(0);
        Ok(nodes)
    }

    /// The fewest intersections (always including both ends) whose
    /// shortest-by-length connection reproduces `steps` exactly.
    ///
    /// Tries the two ends alone first, then greedily drops any middle
    /// intersection whose removal leaves the path unchanged.
    pub fn minimal_waypoints(&self, steps: &[(RoadId, Dir)]) -> Vec<IntersectionId> {
        let nodes = self.path_intersections(steps);
        let (Some(first), Some(last)) = (nodes.first().copied(), nodes.last().copied()) else {
            return Vec::new();
        };
        let reproduces = |stops: &[IntersectionId]| {
            crate::router::shortest_path_via(self, stops, &ByLength)
                .map(|p| p.steps == steps)
                .unwrap_or(false)
        };

        let simple = vec![first, last];
        if reproduces(&simple) {
            return simple;
        }

        let mut current = nodes;
        let mut idx = 1;
        while idx + 1 < current.len() {
            let removed = current.remove(idx);
            if reproduces(&current) {
                continue;
            }
            current.insert(idx, removed);
            idx += 1;
        }
        current
    }
}
