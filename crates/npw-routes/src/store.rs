//! The mutable collection of routes.
//!
//! # Atomicity
//!
//! Every mutation validates its input first.  `set_route` additionally
//! works on a clone and swaps it in only once every step has succeeded, so a
//! failed call leaves the store exactly as it was.
//!
//! # Ownership
//!
//! At most one route owns any road.  The route being set always wins: prior
//! owners lose the overlapping roads, keep their first remaining contiguous
//! run under their own id, and any further runs become new routes.  Routes
//! left with no roads are deleted.

use std::collections::{BTreeMap, HashSet};

use npw_classify::LosTable;
use npw_core::{Dir, InfraType, RoadId, RouteId, Tier};
use npw_graph::StudyArea;

use crate::autosplit::{autosplit, Section, SplitRequest};
use crate::route::{resolve_full_path, Route, SetRouteInput};
use crate::{RouteError, RouteResult};

/// Result of a successful [`RouteStore::set_route`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetRouteOutcome {
    /// Ids of the routes created from the input, in path order.
    pub ids: Vec<RouteId>,
    /// Prior routes that were truncated, split or removed, ascending.
    pub affected: Vec<RouteId>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteStore {
    routes: BTreeMap<RouteId, Route>,
    /// Next id to hand out.  Never decreases.
    id_counter: u32,
}

impl RouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a store from already validated parts.
    pub(crate) fn from_parts(routes: BTreeMap<RouteId, Route>, id_counter: u32) -> Self {
        Self { routes, id_counter }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn routes(&self) -> &BTreeMap<RouteId, Route> {
        &self.routes
    }

    pub fn get(&self, id: RouteId) -> RouteResult<&Route> {
        self.routes.get(&id).ok_or(RouteError::UnknownRoute(id))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn id_counter(&self) -> u32 {
        self.id_counter
    }

    /// Owning route of every road, indexed by road.
    pub fn owners(&self, road_count: usize) -> Vec<Option<RouteId>> {
        let mut owners = vec![None; road_count];
        for (id, route) in &self.routes {
            for (r, _) in &route.roads {
                if let Some(slot) = owners.get_mut(r.index()) {
                    *slot = Some(*id);
                }
            }
        }
        owners
    }

    pub fn used_roads(&self) -> HashSet<RoadId> {
        self.routes
            .values()
            .flat_map(|route| route.roads.iter().map(|(r, _)| *r))
            .collect()
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    fn next_id(&mut self) -> RouteId {
        let id = RouteId(self.id_counter);
        self.id_counter += 1;
        id
    }

    /// Insert a route under a fresh id.  The caller guarantees its roads are
    /// unowned.
    pub(crate) fn insert_new(&mut self, route: Route) -> RouteId {
        let id = self.next_id();
        self.routes.insert(id, route);
        id
    }

    /// Create a route (`edit_id = None`) or replace one, splitting the path
    /// into one route per section.
    ///
    /// Section ids: a section with exactly the same roads as an existing
    /// route reuses that route's id; otherwise, when editing, the first
    /// section still without an id inherits `edit_id`; every other section
    /// gets a fresh id.
    pub fn set_route(
        &mut self,
        area: &StudyArea,
        table: &LosTable,
        edit_id: Option<RouteId>,
        input: SetRouteInput,
    ) -> RouteResult<SetRouteOutcome> {
        if let Some(id) = edit_id {
            self.get(id)?;
        }
        let steps = resolve_full_path(&area.graph, &input.full_path)?;

        let mut next = self.clone();
        let edited = edit_id.and_then(|id| next.routes.remove(&id).map(|route| (id, route)));

        let owners = next.owners(area.graph.road_count());
        let request = SplitRequest {
            editing: None,
            override_infra: input.override_infra(),
            default_tier: input.tier,
        };
        let sections = autosplit(&area.graph, table, &owners, &steps, &request);
        if sections.is_empty() {
            return Err(RouteError::EmptyPath);
        }

        // ── Identity ──────────────────────────────────────────────────────
        let mut ids: Vec<Option<RouteId>> = sections
            .iter()
            .map(|s| {
                edited
                    .iter()
                    .map(|(id, route)| (id, route))
                    .chain(&next.routes)
                    .find(|(_, route)| route.roads == s.roads)
                    .map(|(id, _)| *id)
            })
            .collect();
        if let Some(id) = edit_id {
            if !ids.contains(&Some(id)) {
                if let Some(slot) = ids.iter_mut().find(|slot| slot.is_none()) {
                    *slot = Some(id);
                }
            }
        }
        let ids: Vec<RouteId> = ids
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| next.next_id()))
            .collect();

        let new_routes: Vec<Route> = sections
            .iter()
            .map(|s| section_route(area, &input, s, sections.len() == 1))
            .collect();

        // ── Overlap resolution ────────────────────────────────────────────
        let claimed: HashSet<RoadId> = steps.iter().map(|(r, _)| *r).collect();
        let mut affected = Vec::new();
        let prior_ids: Vec<RouteId> = next.routes.keys().copied().collect();
        for id in prior_ids {
            let Some(route) = next.routes.get(&id) else {
                continue;
            };
            if !route.roads.iter().any(|(r, _)| claimed.contains(r)) {
                continue;
            }
            if let Some(idx) = ids.iter().position(|new_id| *new_id == id) {
                if route != &new_routes[idx] {
                    affected.push(id);
                }
                continue;
            }
            affected.push(id);
            let Some(route) = next.routes.remove(&id) else {
                continue;
            };
            let mut runs = remaining_runs(&route.roads, &claimed).into_iter();
            if let Some(first) = runs.next() {
                next.routes.insert(id, truncated(area, &route, first));
            }
            for run in runs {
                let piece = truncated(area, &route, run);
                next.insert_new(piece);
            }
        }

        for (id, route) in ids.iter().zip(new_routes) {
            next.routes.insert(*id, route);
        }

        log::info!(
            "Set route {:?}: {} section(s) {:?}, {} prior route(s) affected",
            edit_id,
            ids.len(),
            ids,
            affected.len()
        );
        *self = next;
        Ok(SetRouteOutcome { ids, affected })
    }

    pub fn delete_routes(&mut self, ids: &[RouteId]) -> RouteResult<()> {
        self.check_all(ids)?;
        for id in ids {
            self.routes.remove(id);
        }
        Ok(())
    }

    /// Remove every route.  Ids handed out so far stay retired.
    pub fn clear_all_routes(&mut self) {
        self.routes.clear();
    }

    pub fn change_tier(&mut self, ids: &[RouteId], tier: Tier) -> RouteResult<()> {
        self.check_all(ids)?;
        for route in self.routes_mut(ids) {
            route.tier = tier;
        }
        Ok(())
    }

    /// Apply `infra_type` as a user override.
    pub fn change_infra_type(&mut self, ids: &[RouteId], infra_type: InfraType) -> RouteResult<()> {
        self.check_all(ids)?;
        for route in self.routes_mut(ids) {
            route.infra_type = infra_type;
            route.override_infra_type = true;
        }
        Ok(())
    }

    fn check_all(&self, ids: &[RouteId]) -> RouteResult<()> {
        match ids.iter().find(|id| !self.routes.contains_key(*id)) {
            Some(id) => Err(RouteError::UnknownRoute(*id)),
            None => Ok(()),
        }
    }

    fn routes_mut<'a>(&'a mut self, ids: &'a [RouteId]) -> impl Iterator<Item = &'a mut Route> + 'a {
        self.routes
            .iter_mut()
            .filter(move |(id, _)| ids.contains(id))
            .map(|(_, route)| route)
    }
}

fn section_route(area: &StudyArea, input: &SetRouteInput, section: &Section, only_section: bool) -> Route {
    Route {
        name: input.name.clone(),
        notes: input.notes.clone(),
        roads: section.roads.clone(),
        waypoints: if only_section && !input.waypoints.is_empty() {
            input.waypoints.clone()
        } else {
            area.waypoints_for(&section.roads)
        },
        infra_type: section.class.infra_type,
        override_infra_type: input.override_infra_type,
        tier: section.class.tier,
    }
}

fn truncated(area: &StudyArea, route: &Route, roads: Vec<(RoadId, Dir)>) -> Route {
    Route {
        waypoints: area.waypoints_for(&roads),
        roads,
        ..route.clone()
    }
}

/// Maximal runs of consecutive steps whose road isn't `claimed`.
pub(crate) fn remaining_runs(steps: &[(RoadId, Dir)], claimed: &HashSet<RoadId>) -> Vec<Vec<(RoadId, Dir)>> {
    steps
        .split(|(r, _)| claimed.contains(r))
        .filter(|run| !run.is_empty())
        .map(<[_]>::to_vec)
        .collect()
}
