//! Unit tests for npw-analysis.

#[cfg(test)]
mod helpers {
    use npw_classify::LosTable;
    use npw_core::{EngineConfig, InfraType, IntersectionId, Tier, TrafficVolume};
    use npw_graph::synthetic::{grid, PayloadBuilder};
    use npw_graph::{RoadAttrs, StudyArea, Waypoint};
    use npw_routes::{RouteNode, RouteStore, SetRouteInput};

    use crate::NetworkView;

    /// Four roads west→east, 0.001° apart; road `i` joins intersections `i`
    /// and `i + 1`.
    pub fn line_area(attrs: impl Fn(u32) -> RoadAttrs, extra: impl FnOnce(&mut PayloadBuilder)) -> StudyArea {
        let mut b = grid("Line", 5, 1, 0.001, attrs);
        extra(&mut b);
        StudyArea::from_payload(b.build(), &EngineConfig::default()).unwrap()
    }

    pub fn quiet(_: u32) -> RoadAttrs {
        RoadAttrs::default()
    }

    /// Unowned, this is ShouldNotBeUsed and therefore a severance.
    pub fn busy() -> RoadAttrs {
        RoadAttrs { speed_mph: 40, traffic: TrafficVolume::UpTo4000, ..RoadAttrs::default() }
    }

    pub fn busy_middle(r: u32) -> RoadAttrs {
        if r == 2 { busy() } else { quiet(r) }
    }

    /// A school on road 0 and a surgery on road 3.
    pub fn with_pois(b: &mut PayloadBuilder) {
        b.poi(npw_graph::PoiKind::Schools, "School", 0.0005, 0.0001)
            .poi(npw_graph::PoiKind::GpHospitals, "Surgery", 0.0035, 0.0001);
    }

    pub fn input(area: &StudyArea, nodes: &[u32], tier: Tier) -> SetRouteInput {
        let waypoint = |n: u32| Waypoint { point: area.intersection_wgs84(IntersectionId(n)), snapped: true };
        SetRouteInput {
            name: "Route".into(),
            notes: String::new(),
            full_path: nodes.iter().map(|n| RouteNode { snapped: IntersectionId(*n) }).collect(),
            waypoints: vec![waypoint(nodes[0]), waypoint(nodes[nodes.len() - 1])],
            infra_type: InfraType::MixedTraffic,
            override_infra_type: false,
            tier,
        }
    }

    pub fn store_with(area: &StudyArea, paths: &[&[u32]]) -> RouteStore {
        let mut store = RouteStore::new();
        for nodes in paths {
            store
                .set_route(area, &LosTable::default(), None, input(area, nodes, Tier::LocalAccess))
                .unwrap();
        }
        store
    }

    pub fn view(area: &StudyArea, store: &RouteStore) -> NetworkView {
        NetworkView::new(area, store, &LosTable::default(), &EngineConfig::default())
    }

    /// Metres per 0.001° near the equator.
    pub const STEP_M: f64 = 111.3;

    pub fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }
}

// ── Overlay ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod overlay {
    use npw_classify::LosTable;
    use npw_core::{InfraType, LevelOfService, RouteId, StreetSpace, Tier};
    use npw_graph::RoadAttrs;

    use super::helpers::{busy, input, line_area, quiet, store_with, view};
    use crate::{dynamic_roads, Overlay, Reachability};

    #[test]
    fn owned_roads_take_route_attributes() {
        let area = line_area(
            |r| if r == 1 { RoadAttrs { street_space: Some(StreetSpace::Nothing), ..busy() } } else { quiet(r) },
            |_| {},
        );
        let table = LosTable::default();
        let mut store = store_with(&area, &[]);
        store.set_route(&area, &table, None, input(&area, &[0, 1, 2], Tier::Secondary)).unwrap();
        let overlay = Overlay::new(&area, &store, &table);

        assert_eq!(overlay.owner[0], Some(RouteId(0)));
        assert_eq!(overlay.infra_type[1], Some(InfraType::Segregated));
        assert_eq!(overlay.tier[1], Some(Tier::Secondary));
        assert_eq!(overlay.los[1], LevelOfService::High);
        assert!(!overlay.fits[1]);
        // Unowned roads fall back to mixed traffic.
        assert_eq!(overlay.owner[3], None);
        assert_eq!(overlay.los[3], LevelOfService::High);
        assert!(overlay.fits[3]);
    }

    #[test]
    fn deleting_clears_dynamic_roads() {
        let area = line_area(quiet, |_| {});
        let mut store = store_with(&area, &[&[0, 1, 2, 3, 4]]);
        let v = view(&area, &store);
        assert!(dynamic_roads(&store, &v.overlay, &v.reach).iter().all(|d| d.current_route_id.is_some()));

        store.delete_routes(&[RouteId(0)]).unwrap();
        let v = view(&area, &store);
        let roads = dynamic_roads(&store, &v.overlay, &v.reach);
        assert_eq!(roads.len(), 4);
        for road in roads {
            assert_eq!(road.current_route_id, None);
            assert_eq!(road.current_route_name, None);
            assert_eq!(road.reachability, Reachability::Unreachable);
        }
    }

    #[test]
    fn same_input_twice_gives_same_overlay() {
        let area = line_area(super::helpers::busy_middle, |_| {});
        let table = LosTable::default();
        let mut store = store_with(&area, &[]);
        store.set_route(&area, &table, None, input(&area, &[0, 1, 2, 3], Tier::Primary)).unwrap();
        let once = view(&area, &store);
        store.set_route(&area, &table, None, input(&area, &[0, 1, 2, 3], Tier::Primary)).unwrap();
        assert_eq!(view(&area, &store), once);
    }
}

// ── Reachability ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod reachability {
    use npw_classify::LosTable;
    use npw_core::{Dir, RoadId};
    use npw_graph::PoiKind;

    use super::helpers::{approx, busy_middle, line_area, quiet, store_with, view, with_pois, STEP_M};
    use crate::{
        debug_reachable_path, fix_unreachable_poi, place_features, AnalysisError, Overlay, Reachability,
        ReachabilityMap,
    };
    use Reachability::*;

    #[test]
    fn nothing_is_reachable_without_a_network() {
        let area = line_area(busy_middle, with_pois);
        let v = view(&area, &store_with(&area, &[]));
        assert_eq!(v.reach.class, vec![Unreachable, Unreachable, Severance, Unreachable]);
        assert_eq!(v.reach.percent_reachable(&area, PoiKind::Schools), 0.0);
    }

    #[test]
    fn severances_stop_the_flood() {
        let area = line_area(busy_middle, with_pois);
        let v = view(&area, &store_with(&area, &[&[0, 1]]));
        assert_eq!(v.reach.class, vec![Network, Reachable, Severance, Unreachable]);
        assert!(v.reach.place_reachable(&area, PoiKind::Schools, 0).unwrap());
        assert!(!v.reach.place_reachable(&area, PoiKind::GpHospitals, 0).unwrap());
        assert_eq!(v.reach.percent_reachable(&area, PoiKind::GpHospitals), 0.0);
        // No greenspaces at all.
        assert_eq!(v.reach.percent_reachable(&area, PoiKind::Greenspaces), 0.0);
    }

    #[test]
    fn tolerance_limits_connecting_length() {
        let area = line_area(quiet, |_| {});
        let store = store_with(&area, &[&[0, 1]]);
        let overlay = Overlay::new(&area, &store, &LosTable::default());

        let unbounded = ReachabilityMap::new(&area, &overlay, None);
        assert_eq!(unbounded.class, vec![Network, Reachable, Reachable, Reachable]);
        let bounded = ReachabilityMap::new(&area, &overlay, Some(50.0));
        assert_eq!(bounded.class, vec![Network, Reachable, Unreachable, Unreachable]);
    }

    #[test]
    fn population_reachability() {
        let area = line_area(busy_middle, |b| {
            b.data_zone("West", [-0.0002, -0.0002, 0.0012, 0.0002], 300, 10)
                .data_zone("East", [0.0031, -0.0002, 0.0042, 0.0002], 100, 90);
        });
        let v = view(&area, &store_with(&area, &[&[0, 1]]));
        assert!(approx(v.reach.percent_population(&area, false), 75.0, 1e-9));
        assert!(approx(v.reach.percent_population(&area, true), 100.0, 1e-9));
    }

    #[test]
    fn place_features_carry_reachability() {
        let area = line_area(busy_middle, with_pois);
        let v = view(&area, &store_with(&area, &[&[0, 1]]));
        let schools = place_features(&area, &v.reach, PoiKind::Schools);
        assert_eq!(schools.features.len(), 1);
        let props = schools.features[0].properties.as_ref().unwrap();
        assert_eq!(props["poi_kind"], "schools");
        assert_eq!(props["name"], "School");
        assert_eq!(props["idx"], 0);
        assert_eq!(props["reachable"], true);

        let gps = place_features(&area, &v.reach, PoiKind::GpHospitals);
        assert_eq!(gps.features[0].properties.as_ref().unwrap()["reachable"], false);
    }

    #[test]
    fn debug_path_ends_on_the_network() {
        let area = line_area(quiet, with_pois);
        let v = view(&area, &store_with(&area, &[&[0, 1]]));
        let path = debug_reachable_path(&area, &v.overlay, &v.reach, PoiKind::GpHospitals, 0).unwrap();
        assert_eq!(path.steps, vec![(RoadId(2), Dir::Backwards), (RoadId(1), Dir::Backwards)]);
        assert!(approx(path.length_m, 2.0 * STEP_M, 1.0), "got {}", path.length_m);

        let on_network = debug_reachable_path(&area, &v.overlay, &v.reach, PoiKind::Schools, 0).unwrap();
        assert!(on_network.is_trivial());
    }

    #[test]
    fn debug_path_of_unreachable_place_fails() {
        let area = line_area(busy_middle, with_pois);
        let v = view(&area, &store_with(&area, &[&[0, 1]]));
        assert!(matches!(
            debug_reachable_path(&area, &v.overlay, &v.reach, PoiKind::GpHospitals, 0),
            Err(AnalysisError::Unreachable { .. })
        ));
        assert!(debug_reachable_path(&area, &v.overlay, &v.reach, PoiKind::GpHospitals, 5).is_err());
    }

    #[test]
    fn fix_connects_through_the_severance() {
        let area = line_area(busy_middle, with_pois);
        let table = LosTable::default();
        let mut store = store_with(&area, &[&[0, 1]]);
        let v = view(&area, &store);

        let fix = fix_unreachable_poi(&area, &table, &v.overlay, &v.reach, PoiKind::GpHospitals, 0).unwrap();
        let nodes: Vec<u32> = fix.input.full_path.iter().map(|n| n.snapped.0).collect();
        assert_eq!(nodes, vec![4, 3, 2, 1]);
        assert_eq!(fix.sections.len(), 3);
        assert_eq!(fix.input.name, "Connection to Surgery");

        store.set_route(&area, &table, None, fix.input).unwrap();
        let v = view(&area, &store);
        assert!(v.reach.place_reachable(&area, PoiKind::GpHospitals, 0).unwrap());
    }

    #[test]
    fn fix_rejects_reachable_places_and_empty_networks() {
        let area = line_area(busy_middle, with_pois);
        let table = LosTable::default();
        let v = view(&area, &store_with(&area, &[&[0, 1]]));
        assert!(matches!(
            fix_unreachable_poi(&area, &table, &v.overlay, &v.reach, PoiKind::Schools, 0),
            Err(AnalysisError::AlreadyReachable { .. })
        ));

        let empty = view(&area, &store_with(&area, &[]));
        assert!(matches!(
            fix_unreachable_poi(&area, &table, &empty.overlay, &empty.reach, PoiKind::Schools, 0),
            Err(AnalysisError::EmptyNetwork)
        ));
    }
}

// ── Components & mesh ─────────────────────────────────────────────────────────

#[cfg(test)]
mod components {
    use npw_core::RoadId;

    use super::helpers::{approx, line_area, quiet, store_with, view, STEP_M};
    use crate::components::largest_component_percent;
    use crate::{components_to_geojson, connected_components, grid_mesh_density, mesh_density, AnalysisError};

    #[test]
    fn longest_component_first() {
        let area = line_area(quiet, |_| {});
        let store = store_with(&area, &[&[0, 1], &[2, 3, 4]]);
        let v = view(&area, &store);
        let components = connected_components(&area, &v.overlay);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].roads, vec![RoadId(2), RoadId(3)]);
        assert_eq!(components[1].roads, vec![RoadId(0)]);
        assert!(approx(largest_component_percent(&components), 200.0 / 3.0, 0.1));

        let [x1, y1, x2, y2] = components[1].bbox;
        assert!(approx(x1, 0.0, 1e-9) && approx(x2, 0.001, 1e-9));
        assert!(approx(y1, 0.0, 1e-9) && approx(y2, 0.0, 1e-9));

        let fc = components_to_geojson(&area, &components);
        assert_eq!(fc.features.len(), 3);
        let lengths = &fc.foreign_members.as_ref().unwrap()["component_lengths"];
        assert_eq!(lengths.as_array().unwrap().len(), 2);
    }

    #[test]
    fn joining_merges_components() {
        let area = line_area(quiet, |_| {});
        let store = store_with(&area, &[&[0, 1], &[2, 3, 4], &[1, 2]]);
        let components = connected_components(&area, &view(&area, &store).overlay);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].roads.len(), 4);
        assert!(approx(components[0].length_m, 4.0 * STEP_M, 2.0));
        assert_eq!(largest_component_percent(&components), 100.0);
    }

    #[test]
    fn mesh_density_in_settlements() {
        let area = line_area(quiet, |b| {
            b.settlement("Town", [-0.001, -0.001, 0.005, 0.001], 1000);
        });
        assert_eq!(mesh_density(&area, &view(&area, &store_with(&area, &[])).overlay), None);

        let v = view(&area, &store_with(&area, &[&[0, 1, 2]]));
        let settlement_area = geo::Area::unsigned_area(&area.settlements[0].polygon);
        let network = area.graph.roads[0].length_m + area.graph.roads[1].length_m;
        let density = mesh_density(&area, &v.overlay).unwrap();
        assert!(approx(density, 2.0 * settlement_area / network, 1e-6));
    }

    #[test]
    fn grid_cells_partition_road_length() {
        let area = line_area(quiet, |_| {});
        let v = view(&area, &store_with(&area, &[&[0, 1]]));
        assert!(matches!(
            grid_mesh_density(&area, &v.overlay, 0.0, 0.0, 0.0),
            Err(AnalysisError::BadResolution(_))
        ));

        let fc = grid_mesh_density(&area, &v.overlay, 250.0, 30.0, 0.0).unwrap();
        let sum = |key: &str| -> f64 {
            fc.features
                .iter()
                .map(|f| f.properties.as_ref().unwrap()[key].as_f64().unwrap())
                .sum()
        };
        let total: f64 = area.graph.roads.iter().map(|r| r.length_m).sum();
        assert!(approx(sum("total"), total, 1e-6));
        assert!(approx(sum("routes"), area.graph.roads[0].length_m, 1e-6));
        assert!(fc.features.len() >= 2);
    }
}

// ── Stats ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod stats {
    use npw_classify::LosTable;
    use npw_core::{Rating, StreetSpace, Tier};
    use npw_graph::RoadAttrs;

    use super::helpers::{approx, busy, input, line_area, quiet, store_with, view};
    use crate::stats::{ATTRACTIVENESS, DENSITY, DIRECTNESS, SAFETY};
    use crate::{compute_stats, connected_components, network_lengths, Banding, Scorecard, SlowStats};

    fn arterial_line() -> npw_graph::StudyArea {
        line_area(
            |r| match r {
                0 => RoadAttrs { precalculated_demand: 10, is_attractive: true, ..quiet(r) },
                2 => RoadAttrs { is_arterial: true, street_space: Some(StreetSpace::Nothing), ..busy() },
                3 => RoadAttrs { gradient: 6.0, ..quiet(r) },
                _ => quiet(r),
            },
            |b| {
                b.settlement("Town", [-0.001, -0.001, 0.005, 0.001], 1000);
            },
        )
    }

    #[test]
    fn banding_edges() {
        let hb = Banding::HigherIsBetter([20.0, 40.0, 60.0, 80.0]);
        assert_eq!(hb.rate(20.0), Rating::VeryPoor);
        assert_eq!(hb.rate(20.1), Rating::Poor);
        assert_eq!(hb.rate(60.0), Rating::Medium);
        assert_eq!(hb.rate(80.0), Rating::Good);
        assert_eq!(hb.rate(80.1), Rating::VeryGood);

        assert_eq!(DENSITY.rate(1200.0), Rating::VeryPoor);
        assert_eq!(DENSITY.rate(1000.0), Rating::Poor);
        assert_eq!(DENSITY.rate(400.0), Rating::Good);
        assert_eq!(DENSITY.rate(250.0), Rating::VeryGood);
        assert_eq!(DIRECTNESS.rate(1.45), Rating::Poor);
        assert_eq!(ATTRACTIVENESS.rate(0.0), Rating::VeryPoor);
        assert_eq!(SAFETY.rate(100.0), Rating::VeryGood);
    }

    #[test]
    fn baseline_has_no_network() {
        let area = arterial_line();
        let store = store_with(&area, &[]);
        let v = view(&area, &store);
        let stats = compute_stats(&area, &v.overlay, &v.reach, &connected_components(&area, &v.overlay));
        assert_eq!(stats.total_network_length, 0.0);
        assert_eq!(stats.mesh_density_m, None);
        assert_eq!(stats.num_components, 0);
        assert_eq!(stats.total_quintile_sums, [10, 0, 0, 0, 0]);
        assert_eq!(stats.covered_quintile_sums, [0; 5]);
        assert!(stats.total_arterial_road_length > 100.0);
        assert_eq!(stats.high_los_arterial_road_length, 0.0);

        let card = Scorecard::new(&stats, None);
        assert_eq!(card.safety_arterial.rating, Rating::VeryPoor);
        assert_eq!(card.density, None);
        assert_eq!(card.directness, None);
        assert_eq!(card.coherence_combined.value, 0.0);
    }

    #[test]
    fn full_network_stats() {
        let area = arterial_line();
        let table = LosTable::default();
        let mut store = store_with(&area, &[]);
        store.set_route(&area, &table, None, input(&area, &[0, 1, 2, 3, 4], Tier::Primary)).unwrap();
        let v = view(&area, &store);
        let components = connected_components(&area, &v.overlay);
        let stats = compute_stats(&area, &v.overlay, &v.reach, &components);

        let len = |r: usize| area.graph.roads[r].length_m;
        let total = (0..4).map(len).sum::<f64>();
        assert!(approx(stats.total_network_length, total, 1e-9));
        assert!(approx(stats.total_high_los_length, total, 1e-9));
        assert!(approx(stats.total_low_gradient_length, total - len(3), 1e-9));
        assert!(approx(stats.total_undeliverable_length, len(2), 1e-9));
        assert!(approx(stats.total_attractive_length, len(0), 1e-9));
        assert!(approx(stats.high_los_arterial_road_length, len(2), 1e-9));
        assert!(approx(stats.total_primary_secondary_length, total, 1e-9));
        assert_eq!(stats.covered_quintile_sums, [10, 0, 0, 0, 0]);
        assert_eq!(stats.num_components, 1);
        assert_eq!(stats.largest_component_percent, 100.0);
        assert!(stats.mesh_density_m.is_some());

        let slow = SlowStats { average_directness: Some(1.25), worst_directness_routes: Vec::new() };
        let card = Scorecard::new(&stats, Some(&slow));
        assert_eq!(card.safety_arterial.value, 100.0);
        assert_eq!(card.safety_combined.value, 100.0);
        assert_eq!(card.safety_combined.rating, Rating::VeryGood);
        assert_eq!(card.directness.unwrap().rating, Rating::Good);
        let density_score = card.density.unwrap().rating.score();
        assert!(approx(card.coherence_combined.value, 0.5 * density_score + 50.0, 1e-9));
        assert!(approx(card.comfort.value, 100.0 * (total - len(3)) / total, 1e-9));
    }

    #[test]
    fn safety_weights() {
        let area = arterial_line();
        let table = LosTable::default();
        let mut store = store_with(&area, &[]);
        // Primary on quiet roads only: arterial coverage stays at zero.
        store.set_route(&area, &table, None, input(&area, &[0, 1], Tier::Primary)).unwrap();
        let v = view(&area, &store);
        let stats = compute_stats(&area, &v.overlay, &v.reach, &connected_components(&area, &v.overlay));
        let card = Scorecard::new(&stats, None);
        assert_eq!(card.safety_arterial.value, 0.0);
        assert_eq!(card.safety_primary_secondary.value, 100.0);
        assert!(approx(card.safety_combined.value, 10.0, 1e-9));
        assert_eq!(card.safety_combined.rating, Rating::VeryPoor);
    }

    #[test]
    fn lengths_by_tier_and_type() {
        let area = line_area(|r| if r == 2 { busy() } else { quiet(r) }, |_| {});
        let table = LosTable::default();
        let mut store = store_with(&area, &[]);
        store.set_route(&area, &table, None, input(&area, &[0, 1, 2, 3], Tier::Secondary)).unwrap();
        let lengths = network_lengths(&area, &store);
        let len = |r: usize| area.graph.roads[r].length_m;
        assert!(approx(lengths.total, len(0) + len(1) + len(2), 1e-9));
        assert!(approx(lengths.by_tier[&Tier::Secondary], lengths.total, 1e-9));
        assert_eq!(lengths.by_tier[&Tier::Primary], 0.0);
        assert!(approx(lengths.by_infra_type[&npw_core::InfraType::Segregated], len(2), 1e-9));
        assert_eq!(lengths.by_infra_type.len(), 8);
    }
}

// ── Demand & evaluation ───────────────────────────────────────────────────────

#[cfg(test)]
mod demand {
    use npw_core::EngineConfig;
    use npw_graph::synthetic::PayloadBuilder;
    use npw_graph::{RoadAttrs, StudyArea};

    use super::helpers::{approx, busy, line_area, quiet, store_with, view, STEP_M};
    use crate::od::NOT_ON_NETWORK;
    use crate::{evaluate_route, od_counts, pct_godutch_2020, slow_stats, Breakdown};

    fn commuter_line() -> StudyArea {
        line_area(quiet, |b| {
            b.od_zone("A", [-0.0002, -0.0002, 0.0002, 0.0002])
                .od_zone("B", [0.0038, -0.0002, 0.0042, 0.0002])
                .desire_line("A", "B", 3);
        })
    }

    #[test]
    fn uptake_curve() {
        let short = pct_godutch_2020(500.0);
        let medium = pct_godutch_2020(5_000.0);
        let long = pct_godutch_2020(20_000.0);
        for p in [short, medium, long] {
            assert!(p > 0.0 && p < 1.0);
        }
        assert!(medium > short && medium > long);
        assert!(approx(medium, 0.4867, 1e-3), "got {medium}");
        assert_eq!(pct_godutch_2020(30_000.0), pct_godutch_2020(45_000.0));
    }

    #[test]
    fn zero_routes_counts_everything_off_network() {
        let area = commuter_line();
        let v = view(&area, &store_with(&area, &[]));
        let od = od_counts(&area, &v.overlay, &EngineConfig::default(), true);
        assert_eq!(od.succeeded, 1);
        assert_eq!(od.failed, 0);
        let percents = od.describe(&v.overlay);
        assert_eq!(percents.od_percents_infra_type[NOT_ON_NETWORK], 100.0);
        assert_eq!(percents.od_percents_tier["Primary"], 0.0);
        assert_eq!(percents.od_percents_los["High"], 100.0);
    }

    #[test]
    fn full_sample_is_deterministic() {
        let area = commuter_line();
        let store = store_with(&area, &[&[0, 1, 2, 3, 4]]);
        let v = view(&area, &store);
        let config = EngineConfig::default();
        let full = od_counts(&area, &v.overlay, &config, false);
        assert_eq!(full.succeeded, 3);
        assert_eq!(full, od_counts(&area, &v.overlay, &config, false));

        let percents = full.describe(&v.overlay);
        assert_eq!(percents.od_percents_infra_type["MixedTraffic"], 100.0);
        assert_eq!(percents.od_percents_tier["LocalAccess"], 100.0);
        assert_eq!(percents.od_percents_tier[NOT_ON_NETWORK], 0.0);

        let fc = full.to_geojson(&area, &v.overlay);
        let members = fc.foreign_members.as_ref().unwrap();
        assert_eq!(members["succeeded"], 3);
        assert_eq!(members["max_count"], full.max_count());
        assert!(members.contains_key("od_percents_los"));
    }

    #[test]
    fn disconnected_trips_are_counted_as_failed() {
        let area = line_area(quiet, |b| {
            let a = b.intersection(0.006, 0.0);
            let c = b.intersection(0.007, 0.0);
            b.road(a, c, RoadAttrs::default());
            b.od_zone("A", [-0.0002, -0.0002, 0.0002, 0.0002])
                .od_zone("C", [0.0068, -0.0002, 0.0072, 0.0002])
                .desire_line("A", "C", 2);
        });
        let v = view(&area, &store_with(&area, &[]));
        let full = od_counts(&area, &v.overlay, &EngineConfig::default(), false);
        assert_eq!((full.succeeded, full.failed), (0, 2));
        assert!(full.counts.is_empty());
        assert_eq!(full.describe(&v.overlay).od_percents_infra_type[NOT_ON_NETWORK], 0.0);
    }

    #[test]
    fn town_centre_directness() {
        let area = line_area(quiet, |b| {
            b.boundary([-0.01, -0.01, 0.07, 0.01])
                .town_centre("West", [-0.0001, -0.0001, 0.0001, 0.0001])
                .town_centre("East", [0.0039, -0.0001, 0.0041, 0.0001])
                .town_centre("Far", [0.0599, -0.0001, 0.0601, 0.0001]);
        });
        let v = view(&area, &store_with(&area, &[]));
        let slow = slow_stats(&area, &v.overlay, &EngineConfig::default());
        assert!(approx(slow.average_directness.unwrap(), 1.0, 1e-9));
        assert_eq!(slow.worst_directness_routes.len(), 1);
        assert!(approx(slow.worst_directness_routes[0][1][0], 0.004, 1e-9));

        let none = line_area(quiet, |_| {});
        let slow = slow_stats(&none, &view(&none, &store_with(&none, &[])).overlay, &EngineConfig::default());
        assert_eq!(slow.average_directness, None);
    }

    /// A direct busy road from A to B and a quiet named detour through C.
    fn detour() -> StudyArea {
        let mut b = PayloadBuilder::new("Detour");
        let a = b.intersection(0.0, 0.0);
        let bb = b.intersection(0.002, 0.0);
        let c = b.intersection(0.001, 0.001);
        b.named_road(a, bb, Some("Main Road"), busy());
        b.named_road(a, c, Some("Mill Lane"), quiet(1));
        b.named_road(c, bb, Some("Mill Lane"), RoadAttrs { gradient: 4.0, ..quiet(2) });
        StudyArea::from_payload(b.build(), &EngineConfig::default()).unwrap()
    }

    #[test]
    fn quiet_route_avoids_busy_road() {
        let area = detour();
        let v = view(&area, &store_with(&area, &[]));
        let eval = evaluate_route(&area, &v.overlay, &EngineConfig::default(), [0.0, 0.0], [0.002, 0.0]).unwrap();
        assert!(approx(eval.direct_bike_length, 2.0 * STEP_M, 1.0));
        assert!(approx(eval.quiet_bike_length, 2.0 * 157.4, 1.5), "got {}", eval.quiet_bike_length);
        assert_eq!(eval.directions.len(), 1);
        assert_eq!(eval.directions[0].name.as_deref(), Some("Mill Lane"));

        let whole = eval.to_geojson(&area, &v.overlay, Breakdown::None);
        assert_eq!(whole.features.len(), 1);
        let members = whole.foreign_members.as_ref().unwrap();
        assert!(members.contains_key("direct_bike_length"));
        assert!(!members.contains_key("car_length"));

        let by_gradient = eval.to_geojson(&area, &v.overlay, Breakdown::Gradient);
        let kinds: Vec<_> = by_gradient
            .features
            .iter()
            .map(|f| f.properties.as_ref().unwrap()["kind"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(kinds, vec!["<= 3%", "3 - 5%"]);

        let by_infra = eval.to_geojson(&area, &v.overlay, Breakdown::InfraType);
        assert_eq!(by_infra.features[0].properties.as_ref().unwrap()["kind"], NOT_ON_NETWORK);
    }

    #[test]
    fn breakdown_names() {
        assert_eq!(serde_json::from_str::<Breakdown>("\"\"").unwrap(), Breakdown::None);
        assert_eq!(serde_json::from_str::<Breakdown>("\"infra_type\"").unwrap(), Breakdown::InfraType);
        assert!(serde_json::from_str::<Breakdown>("\"car\"").is_err());
    }
}
