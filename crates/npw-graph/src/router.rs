//! Shortest paths over the road graph.
//!
//! # Pluggable costs
//!
//! Every search takes an [`EdgeCost`].  [`ByLength`] gives plain distance;
//! the analysis layer supplies LoS-weighted "quiet" costs and
//! severance-avoiding costs.  Returning `None` from `cost` makes a road
//! impassable for that search.
//!
//! # Determinism
//!
//! Costs are accumulated as integer millimetre-equivalents so that equal
//! paths compare equal exactly.  When two paths reach a node at the same
//! cost, the one arriving over the lower road id wins; heap ties pop the
//! lower intersection id first.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use npw_core::{Dir, IntersectionId, RoadId};

use crate::network::RoadGraph;
use crate::road::Road;
use crate::{GraphError, GraphResult};

/// Fixed-point scale applied to `f64` costs.
const COST_SCALE: f64 = 1000.0;

// ── EdgeCost ──────────────────────────────────────────────────────────────────

pub trait EdgeCost {
    /// Cost of traversing `road` in either direction, `None` if impassable.
    fn cost(&self, road: &Road) -> Option<f64>;
}

impl<F> EdgeCost for F
where
    F: Fn(&Road) -> Option<f64>,
{
    #[inline]
    fn cost(&self, road: &Road) -> Option<f64> {
        self(road)
    }
}

/// Cost = length in metres.
pub struct ByLength;

impl EdgeCost for ByLength {
    #[inline]
    fn cost(&self, road: &Road) -> Option<f64> {
        Some(road.length_m)
    }
}

#[inline]
fn scaled(cost: f64) -> u64 {
    (cost.max(0.0) * COST_SCALE).round() as u64
}

// ── Path ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub start: IntersectionId,
    pub end: IntersectionId,
    pub steps: Vec<(RoadId, Dir)>,
    /// Total cost under the cost model used for the search.
    pub cost: f64,
    pub length_m: f64,
}

impl Path {
    pub fn is_trivial(&self) -> bool {
        self.steps.is_empty()
    }
}

// ── Searches ──────────────────────────────────────────────────────────────────

/// Shortest path from `from` to `to`.
///
/// `from == to` yields an empty path rather than an error.
pub fn shortest_path(
    graph: &RoadGraph,
    from: IntersectionId,
    to: IntersectionId,
    cost: &impl EdgeCost,
) -> GraphResult<Path> {
    graph.intersection(from)?;
    graph.intersection(to)?;
    shortest_path_to_any(graph, from, |i| i == to, cost).map_err(|err| match err {
        GraphError::NoPath { from, .. } => GraphError::NoPath { from, to },
        other => other,
    })
}

/// Shortest path from `from` to the nearest intersection satisfying `is_target`.
pub fn shortest_path_to_any(
    graph: &RoadGraph,
    from: IntersectionId,
    is_target: impl Fn(IntersectionId) -> bool,
    cost: &impl EdgeCost,
) -> GraphResult<Path> {
    graph.intersection(from)?;
    let n = graph.intersection_count();
    let mut dist = vec![u64::MAX; n];
    let mut prev: Vec<Option<(RoadId, Dir)>> = vec![None; n];

    dist[from.index()] = 0;
    let mut heap: BinaryHeap<Reverse<(u64, IntersectionId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((d, node))) = heap.pop() {
        if d > dist[node.index()] {
            continue;
        }
        if is_target(node) {
            return Ok(reconstruct(graph, &prev, from, node, d));
        }
        relax(graph, node, d, &mut dist, &mut prev, &mut heap, cost, None);
    }

    Err(GraphError::NoPath { from, to: IntersectionId::INVALID })
}

/// Multi-source Dijkstra.  Returns per-intersection cost from the nearest
/// source, `None` where unreachable or beyond `max_cost`.
pub fn costs_from(
    graph: &RoadGraph,
    sources: impl IntoIterator<Item = IntersectionId>,
    cost: &impl EdgeCost,
    max_cost: Option<f64>,
) -> Vec<Option<f64>> {
    let n = graph.intersection_count();
    let mut dist = vec![u64::MAX; n];
    let mut prev: Vec<Option<(RoadId, Dir)>> = vec![None; n];
    let limit = max_cost.map(scaled);

    let mut heap: BinaryHeap<Reverse<(u64, IntersectionId)>> = BinaryHeap::new();
    for s in sources {
        if s.index() < n && dist[s.index()] != 0 {
            dist[s.index()] = 0;
            heap.push(Reverse((0, s)));
        }
    }

    while let Some(Reverse((d, node))) = heap.pop() {
        if d > dist[node.index()] {
            continue;
        }
        relax(graph, node, d, &mut dist, &mut prev, &mut heap, cost, limit);
    }

    dist.into_iter()
        .map(|d| (d != u64::MAX).then(|| d as f64 / COST_SCALE))
        .collect()
}

#[allow(clippy::too_many_arguments)]
#[inline]
fn relax(
    graph: &RoadGraph,
    node: IntersectionId,
    d: u64,
    dist: &mut [u64],
    prev: &mut [Option<(RoadId, Dir)>],
    heap: &mut BinaryHeap<Reverse<(u64, IntersectionId)>>,
    cost: &impl EdgeCost,
    limit: Option<u64>,
) {
    for (road, dir, next) in graph.half_edges(node) {
        let Some(c) = cost.cost(&graph.roads[road.index()]) else {
            continue;
        };
        let step = scaled(c);
        let nd = d.saturating_add(step);
        if limit.is_some_and(|l| nd > l) {
            continue;
        }
        let slot = next.index();
        let better = nd < dist[slot]
            || (step > 0 && nd == dist[slot] && prev[slot].is_some_and(|(r, _)| road < r));
        if better {
            let improved = nd < dist[slot];
            dist[slot] = nd;
            prev[slot] = Some((road, dir));
            if improved {
                heap.push(Reverse((nd, next)));
            }
        }
    }
}

fn reconstruct(
    graph: &RoadGraph,
    prev: &[Option<(RoadId, Dir)>],
    from: IntersectionId,
    to: IntersectionId,
    total: u64,
) -> Path {
    let mut steps = Vec::new();
    let mut cur = to;
    while cur != from {
        let Some((road, dir)) = prev[cur.index()] else {
            break;
        };
        steps.push((road, dir));
        cur = graph.roads[road.index()].endpoints(dir).0;
    }
    steps.reverse();
    Path {
        start: from,
        end: to,
        length_m: graph.length_of(&steps),
        steps,
        cost: total as f64 / COST_SCALE,
    }
}

/// Shortest path visiting `stops` in order, concatenated.
pub fn shortest_path_via(
    graph: &RoadGraph,
    stops: &[IntersectionId],
    cost: &impl EdgeCost,
) -> GraphResult<Path> {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Err(GraphError::TooFewWaypoints);
    };
    let mut out = Path { start: *first, end: *last, steps: Vec::new(), cost: 0.0, length_m: 0.0 };
    for pair in stops.windows(2) {
        let leg = shortest_path(graph, pair[0], pair[1], cost)?;
        out.steps.extend(leg.steps);
        out.cost += leg.cost;
        out.length_m += leg.length_m;
    }
    Ok(out)
}
