//! Seed the route store from data already in the graph.

use serde::{Deserialize, Serialize};

use npw_classify::{recommend, tier_band, LosTable};
use npw_core::{InfraType, LevelOfService, RoadId, Tier};
use npw_graph::StudyArea;

use crate::join::collapse_degree_2;
use crate::route::Route;
use crate::RouteStore;

const IMPORT_NOTES: &str = "imported from existing network";

/// Which existing infrastructure to import.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    /// Segregated tracks and off-road paths, regardless of LoS.
    InfraType,
    /// Any existing infrastructure that already gives High LoS.
    Los,
}

impl RouteStore {
    /// Import unowned roads with existing infrastructure as LocalAccess
    /// routes.  Returns the number of routes created.
    pub fn import_existing_routes(&mut self, area: &StudyArea, table: &LosTable, kind: ImportKind) -> usize {
        let used = self.used_roads();
        let imports: Vec<(RoadId, (InfraType, Tier))> = area
            .graph
            .roads
            .iter()
            .filter(|road| !used.contains(&road.id))
            .filter_map(|road| {
                let infra = road.attrs.existing_infra?;
                let keep = match kind {
                    ImportKind::InfraType => matches!(
                        infra,
                        InfraType::Segregated | InfraType::SegregatedWithSpeedVolume | InfraType::OffRoad
                    ),
                    ImportKind::Los => table.los_for(infra, &road.attrs) == LevelOfService::High,
                };
                keep.then_some((road.id, (infra, Tier::LocalAccess)))
            })
            .collect();
        let created = self.import_roads(area, imports);
        log::info!("Imported {created} existing route(s) ({kind:?})");
        created
    }

    /// Import unowned arterial roads with their recommended infrastructure.
    /// The tier comes from the core network where a road is part of it, and
    /// is Primary otherwise.
    pub fn import_arterial_roads(&mut self, area: &StudyArea, table: &LosTable) -> usize {
        let used = self.used_roads();
        let imports: Vec<(RoadId, (InfraType, Tier))> = area
            .graph
            .roads
            .iter()
            .filter(|road| road.attrs.is_arterial && !used.contains(&road.id))
            .map(|road| {
                let tier = tier_band(road.attrs.core_network.unwrap_or(Tier::Primary), road.attrs.within_settlement);
                (road.id, (recommend(&road.attrs, table), tier))
            })
            .collect();
        let created = self.import_roads(area, imports);
        log::info!("Imported {created} arterial route(s)");
        created
    }

    fn import_roads(&mut self, area: &StudyArea, imports: Vec<(RoadId, (InfraType, Tier))>) -> usize {
        let chains = collapse_degree_2(&area.graph, imports);
        let created = chains.len();
        for chain in chains {
            let (infra_type, tier) = chain.key;
            let name = chain
                .steps
                .iter()
                .find_map(|(r, _)| area.graph.roads[r.index()].name.clone())
                .unwrap_or_default();
            self.insert_new(Route {
                name,
                notes: IMPORT_NOTES.to_string(),
                waypoints: area.waypoints_for(&chain.steps),
                roads: chain.steps,
                infra_type,
                override_infra_type: true,
                tier,
            });
        }
        created
    }
}
