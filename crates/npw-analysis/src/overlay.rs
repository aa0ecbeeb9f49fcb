//! The per-road view of the current network.
//!
//! [`Overlay`] is rebuilt from `(StudyArea, RouteStore)` for every request
//! that needs it; nothing here is cached between mutations.

use serde::Serialize;

use npw_classify::{fits, LosTable};
use npw_core::{EngineConfig, InfraType, LevelOfService, RoadId, RouteId, Tier};
use npw_graph::StudyArea;
use npw_routes::RouteStore;

use crate::reachability::{Reachability, ReachabilityMap};

/// Column-oriented per-road state, indexed by `RoadId`.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub owner: Vec<Option<RouteId>>,
    pub infra_type: Vec<Option<InfraType>>,
    pub tier: Vec<Option<Tier>>,
    /// With the route's infra type where owned, the existing infrastructure
    /// (or mixed traffic) otherwise.
    pub los: Vec<LevelOfService>,
    pub fits: Vec<bool>,
}

impl Overlay {
    pub fn new(area: &StudyArea, store: &RouteStore, table: &LosTable) -> Self {
        let n = area.graph.road_count();
        let owner = store.owners(n);
        let mut overlay = Overlay {
            infra_type: vec![None; n],
            tier: vec![None; n],
            los: Vec::with_capacity(n),
            fits: vec![true; n],
            owner,
        };
        for road in &area.graph.roads {
            let idx = road.id.index();
            let route = overlay.owner[idx].and_then(|id| store.get(id).ok());
            let infra = match route {
                Some(route) => {
                    overlay.infra_type[idx] = Some(route.infra_type);
                    overlay.tier[idx] = Some(route.tier);
                    overlay.fits[idx] = fits(route.infra_type, road.attrs.street_space);
                    route.infra_type
                }
                None => road.attrs.existing_infra.unwrap_or(InfraType::MixedTraffic),
            };
            overlay.los.push(table.los_for(infra, &road.attrs));
        }
        overlay
    }

    #[inline]
    pub fn is_network(&self, r: RoadId) -> bool {
        self.owner[r.index()].is_some()
    }

    pub fn network_roads(&self) -> impl Iterator<Item = RoadId> + '_ {
        self.owner
            .iter()
            .enumerate()
            .filter(|(_, owner)| owner.is_some())
            .map(|(idx, _)| RoadId(idx as u32))
    }

    pub fn has_network(&self) -> bool {
        self.owner.iter().any(Option::is_some)
    }
}

/// One road of the overlay as the map layer consumes it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DynamicRoad {
    pub id: RoadId,
    pub current_route_id: Option<RouteId>,
    pub current_route_name: Option<String>,
    pub current_infra_type: Option<InfraType>,
    pub current_tier: Option<Tier>,
    pub current_infra_fits: bool,
    pub los: LevelOfService,
    pub reachability: Reachability,
}

pub fn dynamic_roads(store: &RouteStore, overlay: &Overlay, reach: &ReachabilityMap) -> Vec<DynamicRoad> {
    (0..overlay.owner.len())
        .map(|idx| {
            let route_id = overlay.owner[idx];
            DynamicRoad {
                id: RoadId(idx as u32),
                current_route_id: route_id,
                current_route_name: route_id
                    .and_then(|id| store.get(id).ok())
                    .map(|route| route.name.clone()),
                current_infra_type: overlay.infra_type[idx],
                current_tier: overlay.tier[idx],
                current_infra_fits: overlay.fits[idx],
                los: overlay.los[idx],
                reachability: reach.class[idx],
            }
        })
        .collect()
}

/// Overlay plus reachability, the two views most requests start from.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkView {
    pub overlay: Overlay,
    pub reach: ReachabilityMap,
}

impl NetworkView {
    pub fn new(area: &StudyArea, store: &RouteStore, table: &LosTable, config: &EngineConfig) -> Self {
        let overlay = Overlay::new(area, store, table);
        let reach = ReachabilityMap::new(area, &overlay, config.reachable_tolerance_m);
        NetworkView { overlay, reach }
    }
}
