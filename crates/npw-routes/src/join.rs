//! Join individually selected roads into longer chains.
//!
//! Two roads are joined across an intersection when they share a key and no
//! other selected road with that key meets there.  Roads with different keys
//! never join.

use std::collections::{HashMap, HashSet};

use npw_core::{Dir, IntersectionId, RoadId};
use npw_graph::RoadGraph;

/// A contiguous run of roads sharing one key.
#[derive(Clone, Debug, PartialEq)]
pub struct Chain<K> {
    pub steps: Vec<(RoadId, Dir)>,
    pub key: K,
}

/// Chains come out ordered by their lowest road id, which is always
/// traversed forwards.
pub fn collapse_degree_2<K: Copy + Eq + std::hash::Hash>(
    graph: &RoadGraph,
    mut roads: Vec<(RoadId, K)>,
) -> Vec<Chain<K>> {
    roads.sort_by_key(|(r, _)| *r);
    roads.dedup_by_key(|(r, _)| *r);

    // Selected roads touching each intersection, per key.
    let mut incident: HashMap<(IntersectionId, K), Vec<RoadId>> = HashMap::new();
    for (r, key) in &roads {
        let road = &graph.roads[r.index()];
        for i in [road.src_i, road.dst_i] {
            incident.entry((i, *key)).or_default().push(*r);
        }
    }
    // Only a pass-through intersection continues a chain.
    let continue_from = |i: IntersectionId, key: K, from: RoadId| -> Option<RoadId> {
        match incident.get(&(i, key)).map(Vec::as_slice) {
            Some([a, b]) => Some(if *a == from { *b } else { *a }),
            _ => None,
        }
    };

    let mut visited: HashSet<RoadId> = HashSet::new();
    let mut chains = Vec::new();
    for (start, key) in &roads {
        if !visited.insert(*start) {
            continue;
        }
        let first = &graph.roads[start.index()];

        // Walk backwards from src, then forwards from dst.
        let mut back = Vec::new();
        let (mut at, mut via) = (first.src_i, *start);
        while let Some(next) = continue_from(at, *key, via) {
            if !visited.insert(next) {
                break;
            }
            let road = &graph.roads[next.index()];
            // Arriving at `at` along `next`.
            let dir = if road.dst_i == at { Dir::Forwards } else { Dir::Backwards };
            back.push((next, dir));
            at = road.other_end(at);
            via = next;
        }
        back.reverse();

        let mut steps = back;
        steps.push((*start, Dir::Forwards));
        let (mut at, mut via) = (first.dst_i, *start);
        while let Some(next) = continue_from(at, *key, via) {
            if !visited.insert(next) {
                break;
            }
            let road = &graph.roads[next.index()];
            let dir = if road.src_i == at { Dir::Forwards } else { Dir::Backwards };
            steps.push((next, dir));
            at = road.other_end(at);
            via = next;
        }

        chains.push(Chain { steps, key: *key });
    }
    log::debug!("Joined {} roads into {} chains", roads.len(), chains.len());
    chains
}
