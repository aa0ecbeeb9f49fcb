//! The `Engine` struct: one loaded study area plus its route store.

use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, Value};

use npw_analysis::{place_features, NetworkView};
use npw_classify::LosTable;
use npw_core::{EngineConfig, PlanError, PlanResult};
use npw_graph::{GraphPayload, PoiKind, StudyArea, Waypoint};
use npw_routes::RouteStore;

use crate::response::{feature, StaticRoad};

// ── Session ───────────────────────────────────────────────────────────────────

/// Everything tied to one loaded graph.  Replaced wholesale on load.
pub(crate) struct Session {
    pub area: StudyArea,
    pub store: RouteStore,
}

impl Session {
    pub fn view(&self, table: &LosTable, config: &EngineConfig) -> NetworkView {
        NetworkView::new(&self.area, &self.store, table, config)
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// The request boundary.
///
/// Every operation except loading fails with [`PlanError::NotReady`] until
/// a graph has been loaded.  Derived views (overlay, reachability, stats)
/// are recomputed from the study area and route store on every request;
/// nothing else is cached.
///
/// `Engine` is single-threaded and holds no locks.  Callers wanting to keep
/// an interactive thread free should own it on a worker thread.
pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) table: LosTable,
    pub(crate) session: Option<Session>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine { config: EngineConfig::default(), table: LosTable::default(), session: None }
    }
}

impl Engine {
    /// An engine with no study area loaded yet.
    pub fn new(config: EngineConfig, table: LosTable) -> PlanResult<Self> {
        config.validate()?;
        Ok(Engine { config, table, session: None })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn los_table(&self) -> &LosTable {
        &self.table
    }

    pub fn is_ready(&self) -> bool {
        self.session.is_some()
    }

    pub(crate) fn session(&self) -> PlanResult<&Session> {
        self.session.as_ref().ok_or(PlanError::NotReady)
    }

    pub(crate) fn session_mut(&mut self) -> PlanResult<&mut Session> {
        self.session.as_mut().ok_or(PlanError::NotReady)
    }

    pub(crate) fn area(&self) -> PlanResult<&StudyArea> {
        Ok(&self.session()?.area)
    }

    // ── Loading ───────────────────────────────────────────────────────────

    /// Decode a binary graph payload and start a fresh, empty route store.
    /// On failure the previously loaded study area (if any) stays in place.
    pub fn load_graph(&mut self, bytes: &[u8]) -> PlanResult<()> {
        let area = StudyArea::load(bytes, &self.config).inspect_err(|err| self.warn_kept(err))?;
        self.install(area);
        Ok(())
    }

    /// Like [`load_graph`][Self::load_graph] for an already decoded payload.
    pub fn load_payload(&mut self, payload: GraphPayload) -> PlanResult<()> {
        let area = StudyArea::from_payload(payload, &self.config).inspect_err(|err| self.warn_kept(err))?;
        self.install(area);
        Ok(())
    }

    fn warn_kept(&self, err: &impl std::fmt::Display) {
        match &self.session {
            Some(session) => log::warn!("Graph load failed, keeping {:?}: {err}", session.area.name),
            None => log::warn!("Graph load failed: {err}"),
        }
    }

    fn install(&mut self, area: StudyArea) {
        self.session = Some(Session { area, store: RouteStore::new() });
    }

    // ── Study area ────────────────────────────────────────────────────────

    pub fn study_area_name(&self) -> PlanResult<&str> {
        Ok(&self.area()?.name)
    }

    /// `[min_x, min_y, max_x, max_y]` in WGS84.
    pub fn get_bounds(&self) -> PlanResult<[f64; 4]> {
        Ok(self.area()?.bounds())
    }

    pub fn get_study_area_boundary(&self) -> PlanResult<Feature> {
        Ok(geometry_feature(Value::from(&self.area()?.boundary_wgs84)))
    }

    pub fn get_inverted_boundary(&self) -> PlanResult<Feature> {
        Ok(geometry_feature(Value::from(&self.area()?.inverted_boundary())))
    }

    pub fn get_inverted_boundary_inside_settlements(&self) -> PlanResult<Feature> {
        Ok(geometry_feature(Value::from(&self.area()?.inverted_boundary_inside_settlements())))
    }

    pub fn get_inverted_boundary_outside_settlements(&self) -> PlanResult<Feature> {
        Ok(geometry_feature(Value::from(&self.area()?.inverted_boundary_outside_settlements())))
    }

    /// Every road with its static attributes.
    pub fn render_static_roads(&self) -> PlanResult<FeatureCollection> {
        let area = self.area()?;
        let features = area
            .graph
            .roads
            .iter()
            .map(|road| {
                feature(
                    Value::from(&area.mercator.to_wgs84(&road.linestring)),
                    &StaticRoad::new(road, &area.demand_quintiles),
                )
            })
            .collect();
        Ok(FeatureCollection { bbox: None, features, foreign_members: None })
    }

    /// Major junctions as WGS84 points.
    pub fn get_major_junctions(&self) -> PlanResult<FeatureCollection> {
        let area = self.area()?;
        let features = area
            .graph
            .major_junctions()
            .map(|i| {
                let [x, y] = area.intersection_wgs84(i);
                let mut f = geometry_feature(Value::from(&Point::new(x, y)));
                f.set_property("id", i.0);
                f
            })
            .collect();
        Ok(FeatureCollection { bbox: None, features, foreign_members: None })
    }

    // ── Snapping ──────────────────────────────────────────────────────────

    /// WGS84 position of the intersection `pt` snaps to.
    pub fn snap_point(&self, pt: [f64; 2], major_threshold: Option<f64>) -> PlanResult<[f64; 2]> {
        let area = self.area()?;
        Ok(area.intersection_wgs84(area.snap_wgs84(pt, major_threshold)?))
    }

    pub fn get_extra_nodes(
        &self,
        a: &Waypoint,
        b: &Waypoint,
        major_threshold: Option<f64>,
    ) -> PlanResult<Vec<(f64, f64, bool)>> {
        Ok(self.area()?.extra_nodes(a, b, major_threshold)?)
    }

    /// The snapped path through `waypoints`, with its `length`.  Nothing
    /// is classified or stored.
    pub fn preview_route(&self, waypoints: &[Waypoint], major_threshold: Option<f64>) -> PlanResult<Feature> {
        let area = self.area()?;
        let steps = area.waypoints_to_path(waypoints, major_threshold)?;
        let mut f = geometry_feature(Value::from(&area.linestring_wgs84(&steps)));
        f.set_property("length", area.graph.length_of(&steps));
        Ok(f)
    }

    // ── Places ────────────────────────────────────────────────────────────

    /// Schools and GP surgeries / hospitals.
    pub fn get_pois(&self) -> PlanResult<FeatureCollection> {
        let mut schools = self.places(PoiKind::Schools)?;
        schools.features.extend(self.places(PoiKind::GpHospitals)?.features);
        Ok(schools)
    }

    pub fn get_town_centres(&self) -> PlanResult<FeatureCollection> {
        self.places(PoiKind::TownCentres)
    }

    pub fn get_settlements(&self) -> PlanResult<FeatureCollection> {
        self.places(PoiKind::Settlements)
    }

    pub fn get_greenspaces(&self) -> PlanResult<FeatureCollection> {
        self.places(PoiKind::Greenspaces)
    }

    pub fn get_data_zones(&self) -> PlanResult<FeatureCollection> {
        self.places(PoiKind::DataZones)
    }

    fn places(&self, kind: PoiKind) -> PlanResult<FeatureCollection> {
        let session = self.session()?;
        let view = session.view(&self.table, &self.config);
        Ok(place_features(&session.area, &view.reach, kind))
    }
}

pub(crate) fn geometry_feature(value: Value) -> Feature {
    Feature { geometry: Some(Geometry::new(value)), ..Default::default() }
}
