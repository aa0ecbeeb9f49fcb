//! Route store queries and mutations.

use geojson::{Feature, FeatureCollection, JsonObject};

use npw_core::{InfraType, PlanError, PlanResult, RouteId, Tier};
use npw_graph::Waypoint;
use npw_routes::{
    autosplit, ensure_simple, route_feature, sections_to_geojson, ImportKind, RouteNode, RouteStore, SetRouteInput,
    SplitRequest,
};

use crate::response::SetRouteResponse;
use crate::Engine;

impl Engine {
    // ── Queries ───────────────────────────────────────────────────────────

    /// Every route as a savefile: a feature collection with `version`,
    /// `id_counter` and `study_area_name`.
    pub fn get_all_routes(&self) -> PlanResult<FeatureCollection> {
        let session = self.session()?;
        Ok(session.store.to_savefile(&session.area))
    }

    pub fn get_route(&self, id: RouteId) -> PlanResult<Feature> {
        let session = self.session()?;
        Ok(route_feature(&session.area, id, session.store.get(id)?))
    }

    /// Each route re-split with its own tier and override, tagged with
    /// `route_id`.
    pub fn get_route_sections(&self, ids: &[RouteId]) -> PlanResult<FeatureCollection> {
        let session = self.session()?;
        let (area, store) = (&session.area, &session.store);
        let routes = ids.iter().map(|id| Ok((*id, store.get(*id)?))).collect::<PlanResult<Vec<_>>>()?;
        let owners = store.owners(area.graph.road_count());

        let mut features = Vec::new();
        for (id, route) in routes {
            let request = SplitRequest {
                editing: Some(id),
                override_infra: route.override_infra_type.then_some(route.infra_type),
                default_tier: route.tier,
            };
            let sections = autosplit(&area.graph, &self.table, &owners, &route.roads, &request);
            for mut f in sections_to_geojson(area, &sections).features {
                f.set_property("route_id", id.0);
                features.push(f);
            }
        }
        Ok(FeatureCollection { bbox: None, features, foreign_members: None })
    }

    /// Split a drawn path without storing anything.  The response carries
    /// the snapped `full_path` so it can be passed straight to
    /// [`set_route`][Self::set_route].
    pub fn autosplit_route(
        &self,
        editing: Option<RouteId>,
        waypoints: &[Waypoint],
        override_infra: Option<InfraType>,
        default_tier: Tier,
        major_threshold: Option<f64>,
    ) -> PlanResult<FeatureCollection> {
        let session = self.session()?;
        let (area, store) = (&session.area, &session.store);
        if let Some(id) = editing {
            store.get(id)?;
        }
        let steps = area.waypoints_to_path(waypoints, major_threshold)?;
        ensure_simple(&steps)?;
        let request = SplitRequest { editing, override_infra, default_tier };
        let sections = autosplit(
            &area.graph,
            &self.table,
            &store.owners(area.graph.road_count()),
            &steps,
            &request,
        );

        let full_path: Vec<RouteNode> = area
            .graph
            .path_intersections(&steps)
            .into_iter()
            .map(|snapped| RouteNode { snapped })
            .collect();
        let mut fc = sections_to_geojson(area, &sections);
        let mut members = JsonObject::new();
        if let Ok(value) = serde_json::to_value(&full_path) {
            members.insert("full_path".into(), value);
        }
        fc.foreign_members = Some(members);
        Ok(fc)
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Create (`edit_id = None`) or replace a route.  The path is split into
    /// one route per section.  All or nothing.
    pub fn set_route(&mut self, edit_id: Option<RouteId>, input: SetRouteInput) -> PlanResult<SetRouteResponse> {
        let table = &self.table;
        let session = self.session.as_mut().ok_or(PlanError::NotReady)?;
        Ok(session.store.set_route(&session.area, table, edit_id, input)?.into())
    }

    pub fn delete_routes(&mut self, ids: &[RouteId]) -> PlanResult<()> {
        Ok(self.session_mut()?.store.delete_routes(ids)?)
    }

    pub fn clear_all_routes(&mut self) -> PlanResult<()> {
        self.session_mut()?.store.clear_all_routes();
        Ok(())
    }

    pub fn change_tier(&mut self, ids: &[RouteId], tier: Tier) -> PlanResult<()> {
        Ok(self.session_mut()?.store.change_tier(ids, tier)?)
    }

    pub fn change_infra_type(&mut self, ids: &[RouteId], infra_type: InfraType) -> PlanResult<()> {
        Ok(self.session_mut()?.store.change_infra_type(ids, infra_type)?)
    }

    /// Returns the number of routes created.
    pub fn import_existing_routes(&mut self, kind: ImportKind) -> PlanResult<usize> {
        let table = &self.table;
        let session = self.session.as_mut().ok_or(PlanError::NotReady)?;
        Ok(session.store.import_existing_routes(&session.area, table, kind))
    }

    /// Returns the number of routes created.
    pub fn import_arterial_roads(&mut self) -> PlanResult<usize> {
        let table = &self.table;
        let session = self.session.as_mut().ok_or(PlanError::NotReady)?;
        Ok(session.store.import_arterial_roads(&session.area, table))
    }

    // ── Savefiles ─────────────────────────────────────────────────────────

    /// Replace the route store with the savefile's routes.  Older savefile
    /// versions are upgraded first; an invalid file changes nothing.
    pub fn load_savefile(&mut self, text: &str) -> PlanResult<()> {
        let session = self.session_mut()?;
        session.store = RouteStore::from_savefile(&session.area, text)?;
        Ok(())
    }
}
