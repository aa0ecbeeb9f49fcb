//! Derived views: overlay, reachability diagnostics, stats and demand.

use geojson::{Feature, FeatureCollection, JsonObject, Value};

use npw_analysis::{
    compute_stats, components_to_geojson, connected_components, debug_reachable_path, dynamic_roads,
    evaluate_route, fix_unreachable_poi, grid_mesh_density, network_lengths, od_counts, slow_stats,
    Breakdown, DynamicRoad, NetworkLengths, NetworkView, Scorecard, SlowStats,
};
use npw_core::PlanResult;
use npw_graph::{PoiKind, StudyArea};
use npw_routes::{sections_to_geojson, RouteStore};

use crate::engine::{geometry_feature, Session};
use crate::response::{OdStatsResponse, SlowStatsResponse, StatsResponse};
use crate::Engine;

impl Engine {
    fn current(&self) -> PlanResult<(&Session, NetworkView)> {
        let session = self.session()?;
        Ok((session, session.view(&self.table, &self.config)))
    }

    /// Per-road owner, LoS, fit and reachability.
    pub fn render_dynamic_roads(&self) -> PlanResult<Vec<DynamicRoad>> {
        let (session, view) = self.current()?;
        Ok(dynamic_roads(&session.store, &view.overlay, &view.reach))
    }

    // ── Stats ─────────────────────────────────────────────────────────────

    pub fn recalculate_stats(&self) -> PlanResult<StatsResponse> {
        let session = self.session()?;
        Ok(self.stats_for(&session.area, &session.store))
    }

    /// The same metrics with no routes at all.
    pub fn get_baseline_stats(&self) -> PlanResult<StatsResponse> {
        Ok(self.stats_for(self.area()?, &RouteStore::new()))
    }

    fn stats_for(&self, area: &StudyArea, store: &RouteStore) -> StatsResponse {
        let view = NetworkView::new(area, store, &self.table, &self.config);
        let components = connected_components(area, &view.overlay);
        let stats = compute_stats(area, &view.overlay, &view.reach, &components);
        let scorecard = Scorecard::new(&stats, None);
        StatsResponse { stats, scorecard }
    }

    /// Directness over town-centre pairs.  Routes every pair, so slower
    /// than [`recalculate_stats`][Self::recalculate_stats].
    pub fn recalculate_slow_stats(&self) -> PlanResult<SlowStatsResponse> {
        let slow = self.slow()?;
        let directness = self.scorecard_with(&slow)?.directness;
        Ok(SlowStatsResponse { slow, directness })
    }

    /// Fast-sample OD percentages together with the slow stats.
    pub fn recalculate_od_stats(&self) -> PlanResult<OdStatsResponse> {
        let (session, view) = self.current()?;
        let od = od_counts(&session.area, &view.overlay, &self.config, true);
        Ok(OdStatsResponse {
            succeeded: od.succeeded,
            failed: od.failed,
            percents: od.describe(&view.overlay),
            slow: slow_stats(&session.area, &view.overlay, &self.config),
        })
    }

    fn slow(&self) -> PlanResult<SlowStats> {
        let (session, view) = self.current()?;
        Ok(slow_stats(&session.area, &view.overlay, &self.config))
    }

    fn scorecard_with(&self, slow: &SlowStats) -> PlanResult<Scorecard> {
        let session = self.session()?;
        let stats = self.stats_for(&session.area, &session.store).stats;
        Ok(Scorecard::new(&stats, Some(slow)))
    }

    /// Length of the network per tier and infra type.
    pub fn get_network_lengths(&self) -> PlanResult<NetworkLengths> {
        let session = self.session()?;
        Ok(network_lengths(&session.area, &session.store))
    }

    pub fn get_grid_mesh_density(&self, resolution: f64, x_offset: f64, y_offset: f64) -> PlanResult<FeatureCollection> {
        let (session, view) = self.current()?;
        Ok(grid_mesh_density(&session.area, &view.overlay, resolution, x_offset, y_offset)?)
    }

    pub fn get_connected_components(&self) -> PlanResult<FeatureCollection> {
        let (session, view) = self.current()?;
        Ok(components_to_geojson(&session.area, &connected_components(&session.area, &view.overlay)))
    }

    // ── Reachability diagnostics ──────────────────────────────────────────

    /// The path from a reachable place to the network, with `length_meters`.
    pub fn debug_reachable_path(&self, kind: PoiKind, idx: usize) -> PlanResult<Feature> {
        let (session, view) = self.current()?;
        let area = &session.area;
        let path = debug_reachable_path(area, &view.overlay, &view.reach, kind, idx)?;
        let mut f = geometry_feature(Value::from(&area.linestring_wgs84(&path.steps)));
        f.set_property("length_meters", path.length_m);
        Ok(f)
    }

    /// Proposed sections connecting an unreachable place to the network.
    /// The `SetRouteInput` to create them rides along as `input`.
    pub fn fix_unreachable_poi(&self, kind: PoiKind, idx: usize) -> PlanResult<FeatureCollection> {
        let (session, view) = self.current()?;
        let area = &session.area;
        let fix = fix_unreachable_poi(area, &self.table, &view.overlay, &view.reach, kind, idx)?;
        let mut fc = sections_to_geojson(area, &fix.sections);
        let mut members = JsonObject::new();
        if let Ok(input) = serde_json::to_value(&fix.input) {
            members.insert("input".into(), input);
        }
        fc.foreign_members = Some(members);
        Ok(fc)
    }

    // ── Demand ────────────────────────────────────────────────────────────

    /// Quiet route between two WGS84 points, split by `breakdown`.
    pub fn evaluate_route(&self, start: [f64; 2], end: [f64; 2], breakdown: Breakdown) -> PlanResult<FeatureCollection> {
        let (session, view) = self.current()?;
        let eval = evaluate_route(&session.area, &view.overlay, &self.config, start, end)?;
        Ok(eval.to_geojson(&session.area, &view.overlay, breakdown))
    }

    /// Per-road counts from sampling every desire line.  Trips that can't
    /// be routed are counted as `failed`.
    pub fn evaluate_od(&self, fast_sample: bool) -> PlanResult<FeatureCollection> {
        let (session, view) = self.current()?;
        let od = od_counts(&session.area, &view.overlay, &self.config, fast_sample);
        Ok(od.to_geojson(&session.area, &view.overlay))
    }
}
