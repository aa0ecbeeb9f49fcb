//! Per-road infrastructure recommendation.

use npw_core::{GradientGroup, InfraType, LevelOfService, StreetSpace, Tier};
use npw_graph::{Road, RoadAttrs};

use crate::LosTable;

/// Everything the autosplitter keys a road on, apart from ownership.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Classification {
    pub infra_type: InfraType,
    pub fits: bool,
    pub los: LevelOfService,
    pub tier: Tier,
}

/// Recommended infra type for a road, in strict priority order:
///
/// 1. existing off-road infrastructure stays off-road;
/// 2. mixed traffic, when speed and traffic already give High LoS;
/// 3. shared footway outside settlements;
/// 4. a segregated track.
pub fn recommend(attrs: &RoadAttrs, table: &LosTable) -> InfraType {
    if attrs.existing_infra == Some(InfraType::OffRoad) {
        InfraType::OffRoad
    } else if table.los_for(InfraType::MixedTraffic, attrs) == LevelOfService::High {
        InfraType::MixedTraffic
    } else if !attrs.within_settlement {
        InfraType::SharedFootway
    } else {
        InfraType::Segregated
    }
}

/// Whether `infra` fits the available street width.  Roads with no width
/// data are assumed to fit.
pub fn fits(infra: InfraType, street_space: Option<StreetSpace>) -> bool {
    let Some(space) = street_space else {
        return true;
    };
    match infra {
        InfraType::Segregated | InfraType::SegregatedWithSpeedVolume => space == StreetSpace::Segregated,
        InfraType::CycleLane | InfraType::CycleLaneWithSpeedVolume => {
            matches!(space, StreetSpace::Segregated | StreetSpace::CycleLane)
        }
        _ => true,
    }
}

/// Primary and Secondary routes outside settlements are long-distance.
pub fn tier_band(default_tier: Tier, within_settlement: bool) -> Tier {
    match default_tier {
        Tier::Primary | Tier::Secondary if !within_settlement => Tier::LongDistance,
        tier => tier,
    }
}

/// Classify one road for a route drawn with `default_tier`.  An
/// `override_infra` replaces the recommendation; its fit is still checked.
pub fn classify(
    attrs: &RoadAttrs,
    override_infra: Option<InfraType>,
    default_tier: Tier,
    table: &LosTable,
) -> Classification {
    let infra_type = override_infra.unwrap_or_else(|| recommend(attrs, table));
    Classification {
        infra_type,
        fits: fits(infra_type, attrs.street_space),
        los: table.los_for(infra_type, attrs),
        tier: tier_band(default_tier, attrs.within_settlement),
    }
}

/// Length-weighted mean absolute gradient of some roads, bucketed.
pub fn gradient_group<'a>(roads: impl IntoIterator<Item = &'a Road>) -> GradientGroup {
    let (weighted, total) = roads.into_iter().fold((0.0, 0.0), |(w, t), road| {
        (w + road.attrs.gradient.abs() * road.length_m, t + road.length_m)
    });
    GradientGroup::from_gradient(if total > 0.0 { weighted / total } else { 0.0 })
}
