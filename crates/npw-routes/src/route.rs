//! Route records and the input shape used to create or replace them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use npw_core::{Dir, InfraType, IntersectionId, RoadId, Tier};
use npw_graph::{RoadGraph, Waypoint};

use crate::{RouteError, RouteResult};

/// One user-authored route.  Its roads always form a contiguous path.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub name: String,
    pub notes: String,
    pub roads: Vec<(RoadId, Dir)>,
    /// Snapped control points kept for re-editing.
    pub waypoints: Vec<Waypoint>,
    pub infra_type: InfraType,
    /// `infra_type` was chosen by the user rather than recommended.
    pub override_infra_type: bool,
    pub tier: Tier,
}

impl Route {
    /// Every intersection the route passes, in order.
    pub fn full_path(&self, graph: &RoadGraph) -> Vec<RouteNode> {
        graph
            .path_intersections(&self.roads)
            .into_iter()
            .map(|snapped| RouteNode { snapped })
            .collect()
    }

    pub fn length_m(&self, graph: &RoadGraph) -> f64 {
        graph.length_of(&self.roads)
    }
}

/// A node of a drawn path.  Only snapped nodes exist.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNode {
    pub snapped: IntersectionId,
}

/// Everything needed to create a route, or replace one being edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetRouteInput {
    pub name: String,
    #[serde(default)]
    pub notes: String,
    pub full_path: Vec<RouteNode>,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
    pub infra_type: InfraType,
    /// When false, `infra_type` is ignored and each section gets the
    /// recommended type.
    pub override_infra_type: bool,
    pub tier: Tier,
}

impl SetRouteInput {
    pub fn override_infra(&self) -> Option<InfraType> {
        self.override_infra_type.then_some(self.infra_type)
    }
}

/// Join consecutive nodes by the lowest-id road between them.
pub fn resolve_full_path(graph: &RoadGraph, full_path: &[RouteNode]) -> RouteResult<Vec<(RoadId, Dir)>> {
    if full_path.len() < 2 {
        return Err(RouteError::EmptyPath);
    }
    for node in full_path {
        graph.intersection(node.snapped)?;
    }
    let mut steps = Vec::with_capacity(full_path.len() - 1);
    for pair in full_path.windows(2) {
        let (from, to) = (pair[0].snapped, pair[1].snapped);
        if from == to {
            continue;
        }
        steps.push(graph.find_road(from, to).ok_or(RouteError::NotAdjacent { from, to })?);
    }
    if steps.is_empty() {
        return Err(RouteError::EmptyPath);
    }
    ensure_simple(&steps)?;
    Ok(steps)
}

/// Fail if any road appears twice, in either direction.
pub fn ensure_simple(steps: &[(RoadId, Dir)]) -> RouteResult<()> {
    let mut seen = HashSet::with_capacity(steps.len());
    match steps.iter().find(|(r, _)| !seen.insert(*r)) {
        Some((r, _)) => Err(RouteError::RepeatedRoad(*r)),
        None => Ok(()),
    }
}
