//! Network-wide metrics and their qualitative ratings.
//!
//! [`Stats`] holds raw lengths and percentages.  [`Scorecard`] bands the
//! headline metrics into a [`Rating`] with the fixed thresholds below and
//! combines sub-scores with fixed linear weights.
//!
//! | Metric                    | Banding | Thresholds (t0..t3)       |
//! |---------------------------|---------|---------------------------|
//! | safety (all three)        | HB      | 20, 40, 60, 80 %          |
//! | density                   | LB      | 1000, 500, 400, 250 m     |
//! | coherence (combined)      | HB      | 20, 40, 60, 80            |
//! | comfort                   | HB      | 10, 20, 40, 60 %          |
//! | attractiveness            | HB      | 0, 25, 50, 75 %           |
//! | directness                | LB      | 1.5, 1.4, 1.3, 1.2        |
//! | reachability              | HB      | 20, 40, 60, 80 %          |

use serde::Serialize;

use npw_core::{GradientGroup, LevelOfService, Rating, Tier};
use npw_graph::{PoiKind, StudyArea};

use crate::components::{largest_component_percent, Component};
use crate::mesh::mesh_density;
use crate::od::SlowStats;
use crate::overlay::Overlay;
use crate::reachability::{percent, ReachabilityMap};

// ── Banding ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Banding {
    /// `value <= t[0]` is very poor, `value <= t[1]` poor, … above `t[3]`
    /// very good.
    HigherIsBetter([f64; 4]),
    /// `value > t[0]` is very poor, `value > t[1]` poor, … at or under
    /// `t[3]` very good.
    LowerIsBetter([f64; 4]),
}

impl Banding {
    pub fn rate(&self, value: f64) -> Rating {
        let band = match self {
            Banding::HigherIsBetter(t) => t.iter().position(|t| value <= *t),
            Banding::LowerIsBetter(t) => t.iter().position(|t| value > *t),
        };
        band.map_or(Rating::VeryGood, |b| Rating::ASCENDING[b])
    }
}

pub const SAFETY: Banding = Banding::HigherIsBetter([20.0, 40.0, 60.0, 80.0]);
pub const DENSITY: Banding = Banding::LowerIsBetter([1000.0, 500.0, 400.0, 250.0]);
pub const COHERENCE: Banding = Banding::HigherIsBetter([20.0, 40.0, 60.0, 80.0]);
pub const COMFORT: Banding = Banding::HigherIsBetter([10.0, 20.0, 40.0, 60.0]);
pub const ATTRACTIVENESS: Banding = Banding::HigherIsBetter([0.0, 25.0, 50.0, 75.0]);
pub const DIRECTNESS: Banding = Banding::LowerIsBetter([1.5, 1.4, 1.3, 1.2]);
pub const REACHABILITY: Banding = Banding::HigherIsBetter([20.0, 40.0, 60.0, 80.0]);

const SAFETY_ARTERIAL_WEIGHT: f64 = 0.9;
const SAFETY_PRIMARY_SECONDARY_WEIGHT: f64 = 0.1;
const COHERENCE_DENSITY_WEIGHT: f64 = 0.5;
const COHERENCE_COMPONENT_WEIGHT: f64 = 0.5;

// ── Stats ─────────────────────────────────────────────────────────────────────

/// Lengths are metres, percentages 0–100.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stats {
    pub percent_reachable_schools: f64,
    pub percent_reachable_gp_hospitals: f64,
    pub percent_reachable_greenspaces: f64,
    pub percent_reachable_town_centres: f64,
    pub percent_reachable_settlements: f64,
    pub percent_reachable_population: f64,
    pub percent_reachable_imd_population: f64,

    /// Precalculated demand per quintile, busiest first.
    pub total_quintile_sums: [u64; 5],
    /// The part of `total_quintile_sums` on network roads.
    pub covered_quintile_sums: [u64; 5],

    pub total_network_length: f64,
    pub total_high_los_length: f64,
    pub total_low_gradient_length: f64,
    /// Network roads whose infra type doesn't fit the street.
    pub total_undeliverable_length: f64,
    pub total_attractive_length: f64,

    pub total_arterial_road_length: f64,
    /// Arterial roads at High LoS, on or off the network.
    pub high_los_arterial_road_length: f64,
    pub total_primary_secondary_length: f64,
    pub high_los_primary_secondary_length: f64,

    pub mesh_density_m: Option<f64>,
    pub num_components: usize,
    pub largest_component_percent: f64,
}

pub fn compute_stats(
    area: &StudyArea,
    overlay: &Overlay,
    reach: &ReachabilityMap,
    components: &[Component],
) -> Stats {
    let mut stats = Stats {
        percent_reachable_schools: reach.percent_reachable(area, PoiKind::Schools),
        percent_reachable_gp_hospitals: reach.percent_reachable(area, PoiKind::GpHospitals),
        percent_reachable_greenspaces: reach.percent_reachable(area, PoiKind::Greenspaces),
        percent_reachable_town_centres: reach.percent_reachable(area, PoiKind::TownCentres),
        percent_reachable_settlements: reach.percent_reachable(area, PoiKind::Settlements),
        percent_reachable_population: reach.percent_population(area, false),
        percent_reachable_imd_population: reach.percent_population(area, true),
        total_quintile_sums: area.demand_quintiles.total_sums,
        covered_quintile_sums: [0; 5],
        total_network_length: 0.0,
        total_high_los_length: 0.0,
        total_low_gradient_length: 0.0,
        total_undeliverable_length: 0.0,
        total_attractive_length: 0.0,
        total_arterial_road_length: 0.0,
        high_los_arterial_road_length: 0.0,
        total_primary_secondary_length: 0.0,
        high_los_primary_secondary_length: 0.0,
        mesh_density_m: mesh_density(area, overlay),
        num_components: components.len(),
        largest_component_percent: largest_component_percent(components),
    };

    for road in &area.graph.roads {
        let idx = road.id.index();
        let high = overlay.los[idx] == LevelOfService::High;
        if road.attrs.is_arterial {
            stats.total_arterial_road_length += road.length_m;
            if high {
                stats.high_los_arterial_road_length += road.length_m;
            }
        }
        if !overlay.is_network(road.id) {
            continue;
        }

        stats.total_network_length += road.length_m;
        if high {
            stats.total_high_los_length += road.length_m;
        }
        if GradientGroup::from_gradient(road.attrs.gradient) == GradientGroup::UpTo3 {
            stats.total_low_gradient_length += road.length_m;
        }
        if !overlay.fits[idx] {
            stats.total_undeliverable_length += road.length_m;
        }
        if road.attrs.is_attractive {
            stats.total_attractive_length += road.length_m;
        }
        if matches!(overlay.tier[idx], Some(Tier::Primary | Tier::Secondary)) {
            stats.total_primary_secondary_length += road.length_m;
            if high {
                stats.high_los_primary_secondary_length += road.length_m;
            }
        }
        let demand = road.attrs.precalculated_demand;
        if demand > 0 {
            stats.covered_quintile_sums[area.demand_quintiles.quintile(demand) - 1] += demand as u64;
        }
    }
    stats
}

// ── Scorecard ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Metric {
    pub value: f64,
    pub rating: Rating,
}

impl Metric {
    fn banded(value: f64, banding: Banding) -> Self {
        Metric { value, rating: banding.rate(value) }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scorecard {
    pub safety_arterial: Metric,
    pub safety_primary_secondary: Metric,
    pub safety_combined: Metric,
    /// `None` without network inside settlements.
    pub density: Option<Metric>,
    pub coherence_combined: Metric,
    /// Share of the network at or under 3 % gradient.
    pub comfort: Metric,
    pub attractiveness: Metric,
    /// Only known once slow stats have been computed.
    pub directness: Option<Metric>,
    /// Mean share of reachable places and population.
    pub reachability: Metric,
}

impl Scorecard {
    pub fn new(stats: &Stats, slow: Option<&SlowStats>) -> Self {
        let arterial = percent(stats.high_los_arterial_road_length, stats.total_arterial_road_length);
        let primary_secondary =
            percent(stats.high_los_primary_secondary_length, stats.total_primary_secondary_length);
        let safety_combined =
            SAFETY_ARTERIAL_WEIGHT * arterial + SAFETY_PRIMARY_SECONDARY_WEIGHT * primary_secondary;

        let density = stats.mesh_density_m.map(|d| Metric::banded(d, DENSITY));
        let density_score = density.map_or(0.0, |d| d.rating.score());
        let coherence = COHERENCE_DENSITY_WEIGHT * density_score
            + COHERENCE_COMPONENT_WEIGHT * stats.largest_component_percent;

        let reachability = [
            stats.percent_reachable_schools,
            stats.percent_reachable_gp_hospitals,
            stats.percent_reachable_greenspaces,
            stats.percent_reachable_town_centres,
            stats.percent_reachable_settlements,
            stats.percent_reachable_population,
        ];

        Scorecard {
            safety_arterial: Metric::banded(arterial, SAFETY),
            safety_primary_secondary: Metric::banded(primary_secondary, SAFETY),
            safety_combined: Metric::banded(safety_combined, SAFETY),
            density,
            coherence_combined: Metric::banded(coherence, COHERENCE),
            comfort: Metric::banded(
                percent(stats.total_low_gradient_length, stats.total_network_length),
                COMFORT,
            ),
            attractiveness: Metric::banded(
                percent(stats.total_attractive_length, stats.total_network_length),
                ATTRACTIVENESS,
            ),
            directness: slow
                .and_then(|s| s.average_directness)
                .map(|d| Metric::banded(d, DIRECTNESS)),
            reachability: Metric::banded(
                reachability.iter().sum::<f64>() / reachability.len() as f64,
                REACHABILITY,
            ),
        }
    }
}
