//! Network length broken down by tier and infrastructure type.

use std::collections::BTreeMap;

use serde::Serialize;

use npw_core::{InfraType, Tier};
use npw_graph::StudyArea;
use npw_routes::RouteStore;

/// Metres.  Every tier and infra type is present, zero if unused.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NetworkLengths {
    pub total: f64,
    pub by_tier: BTreeMap<Tier, f64>,
    pub by_infra_type: BTreeMap<InfraType, f64>,
}

pub fn network_lengths(area: &StudyArea, store: &RouteStore) -> NetworkLengths {
    let mut out = NetworkLengths {
        total: 0.0,
        by_tier: Tier::ALL.iter().map(|t| (*t, 0.0)).collect(),
        by_infra_type: InfraType::ALL.iter().map(|t| (*t, 0.0)).collect(),
    };
    for route in store.routes().values() {
        let length = route.length_m(&area.graph);
        out.total += length;
        *out.by_tier.entry(route.tier).or_default() += length;
        *out.by_infra_type.entry(route.infra_type).or_default() += length;
    }
    out
}
