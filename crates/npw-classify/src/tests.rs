//! Unit tests for npw-classify.

#[cfg(test)]
mod helpers {
    use npw_core::TrafficVolume;
    use npw_graph::RoadAttrs;

    pub fn attrs(speed_mph: u16, traffic: TrafficVolume, within_settlement: bool) -> RoadAttrs {
        RoadAttrs { speed_mph, traffic, within_settlement, ..RoadAttrs::default() }
    }
}

// ── LoS table ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod los_table {
    use npw_core::{InfraType, LevelOfService::*, TrafficVolume::*};

    use crate::{ClassifyError, LosTable, DEFAULT_LOS_TABLE_TOML};

    #[test]
    fn shipped_toml_matches_default() {
        assert_eq!(LosTable::from_toml_str(DEFAULT_LOS_TABLE_TOML).unwrap(), LosTable::default());
    }

    #[test]
    fn mixed_traffic_rows() {
        let t = LosTable::default();
        let m = InfraType::MixedTraffic;
        assert_eq!(t.los(m, 20, UpTo1000, true), High);
        assert_eq!(t.los(m, 20, UpTo2000, true), High);
        assert_eq!(t.los(m, 20, UpTo4000, true), Medium);
        assert_eq!(t.los(m, 20, Over4000, true), Low);
        assert_eq!(t.los(m, 30, UpTo2000, true), Medium);
        assert_eq!(t.los(m, 40, UpTo1000, true), Medium);
        assert_eq!(t.los(m, 40, UpTo4000, true), ShouldNotBeUsed);
        assert_eq!(t.los(m, 60, UpTo1000, false), Low);
        assert_eq!(t.los(m, 70, UpTo1000, false), ShouldNotBeUsed);
    }

    #[test]
    fn speed_bands_are_inclusive() {
        let t = LosTable::default();
        assert_eq!(t.los(InfraType::CycleLane, 30, UpTo1000, true), High);
        assert_eq!(t.los(InfraType::CycleLane, 31, UpTo1000, true), Medium);
        assert_eq!(t.los(InfraType::CycleLane, 10, Over4000, true), Medium);
        assert_eq!(t.los(InfraType::CycleLane, 50, Over4000, true), Low);
        assert_eq!(t.los(InfraType::CycleLane, 60, UpTo2000, true), ShouldNotBeUsed);
    }

    #[test]
    fn fixed_and_settlement_rules() {
        let t = LosTable::default();
        for speed in [10, 30, 70] {
            for traffic in [UpTo1000, Over4000] {
                for inside in [true, false] {
                    assert_eq!(t.los(InfraType::OffRoad, speed, traffic, inside), High);
                    assert_eq!(t.los(InfraType::Segregated, speed, traffic, inside), High);
                    assert_eq!(t.los(InfraType::MixedTrafficWithSpeedVolume, speed, traffic, inside), High);
                    assert_eq!(t.los(InfraType::CycleLaneWithSpeedVolume, speed, traffic, inside), High);
                }
                assert_eq!(t.los(InfraType::SharedFootway, speed, traffic, true), Low);
                assert_eq!(t.los(InfraType::SharedFootway, speed, traffic, false), High);
            }
        }
    }

    fn replace_rule(from: &str, to: &str) -> String {
        assert!(DEFAULT_LOS_TABLE_TOML.contains(from));
        DEFAULT_LOS_TABLE_TOML.replacen(from, to, 1)
    }

    #[test]
    fn override_changes_lookup() {
        let custom = replace_rule(
            "infra_type = \"SharedFootway\"\ninside     = \"Low\"",
            "infra_type = \"SharedFootway\"\ninside     = \"Medium\"",
        );
        let t = LosTable::from_toml_str(&custom).unwrap();
        assert_eq!(t.los(InfraType::SharedFootway, 20, UpTo1000, true), Medium);
    }

    #[test]
    fn missing_rule_rejected() {
        let custom = replace_rule("infra_type = \"OffRoad\"", "infra_type = \"Segregated\"");
        assert!(matches!(
            LosTable::from_toml_str(&custom),
            Err(ClassifyError::DuplicateRule(InfraType::Segregated))
        ));

        let only_one = "[[rule]]\nkind = \"fixed\"\ninfra_type = \"OffRoad\"\nlevel = \"High\"\n";
        assert!(matches!(LosTable::from_toml_str(only_one), Err(ClassifyError::MissingRule(_))));
    }

    #[test]
    fn unordered_bands_rejected() {
        let custom = replace_rule("max_speed_mph = 30", "max_speed_mph = 15");
        assert!(matches!(
            LosTable::from_toml_str(&custom),
            Err(ClassifyError::UnorderedBands(InfraType::MixedTraffic))
        ));
    }

    #[test]
    fn unknown_level_is_a_parse_error() {
        let custom = replace_rule("level      = \"High\"", "level      = \"Splendid\"");
        assert!(matches!(LosTable::from_toml_str(&custom), Err(ClassifyError::Parse(_))));
    }
}

// ── Recommendation ────────────────────────────────────────────────────────────

#[cfg(test)]
mod recommendation {
    use npw_core::{InfraType, LevelOfService, StreetSpace, Tier, TrafficVolume::*};
    use npw_graph::RoadAttrs;

    use super::helpers::attrs;
    use crate::{classify, fits, recommend, tier_band, LosTable};

    #[test]
    fn priority_order() {
        let t = LosTable::default();

        let off_road = RoadAttrs { existing_infra: Some(InfraType::OffRoad), ..attrs(60, Over4000, true) };
        assert_eq!(recommend(&off_road, &t), InfraType::OffRoad);

        assert_eq!(recommend(&attrs(20, UpTo1000, true), &t), InfraType::MixedTraffic);
        assert_eq!(recommend(&attrs(20, UpTo1000, false), &t), InfraType::MixedTraffic);
        assert_eq!(recommend(&attrs(40, UpTo4000, false), &t), InfraType::SharedFootway);
        assert_eq!(recommend(&attrs(40, UpTo4000, true), &t), InfraType::Segregated);

        // Other existing infra doesn't short-cut the recommendation.
        let lane = RoadAttrs { existing_infra: Some(InfraType::CycleLane), ..attrs(40, UpTo4000, true) };
        assert_eq!(recommend(&lane, &t), InfraType::Segregated);
    }

    #[test]
    fn street_space_fit() {
        use InfraType::*;
        assert!(fits(Segregated, None));
        assert!(fits(Segregated, Some(StreetSpace::Segregated)));
        assert!(!fits(Segregated, Some(StreetSpace::CycleLane)));
        assert!(!fits(SegregatedWithSpeedVolume, Some(StreetSpace::Nothing)));
        assert!(fits(CycleLane, Some(StreetSpace::Segregated)));
        assert!(fits(CycleLaneWithSpeedVolume, Some(StreetSpace::CycleLane)));
        assert!(!fits(CycleLane, Some(StreetSpace::Nothing)));
        assert!(fits(MixedTraffic, Some(StreetSpace::Nothing)));
        assert!(fits(SharedFootway, Some(StreetSpace::Nothing)));
        assert!(fits(OffRoad, Some(StreetSpace::Nothing)));
    }

    #[test]
    fn tier_bands() {
        assert_eq!(tier_band(Tier::Primary, true), Tier::Primary);
        assert_eq!(tier_band(Tier::Primary, false), Tier::LongDistance);
        assert_eq!(tier_band(Tier::Secondary, false), Tier::LongDistance);
        assert_eq!(tier_band(Tier::LocalAccess, false), Tier::LocalAccess);
        assert_eq!(tier_band(Tier::LongDistance, true), Tier::LongDistance);
    }

    #[test]
    fn override_keeps_fit_check() {
        let t = LosTable::default();
        let narrow = RoadAttrs { street_space: Some(StreetSpace::CycleLane), ..attrs(40, UpTo4000, true) };
        let c = classify(&narrow, Some(InfraType::Segregated), Tier::Primary, &t);
        assert_eq!(c.infra_type, InfraType::Segregated);
        assert!(!c.fits);
        assert_eq!(c.los, LevelOfService::High);

        let c = classify(&narrow, Some(InfraType::CycleLane), Tier::Primary, &t);
        assert!(c.fits);
        assert_eq!(c.los, LevelOfService::Low);

        let c = classify(&narrow, None, Tier::Secondary, &t);
        assert_eq!(c.infra_type, InfraType::Segregated);
        assert_eq!(c.tier, Tier::Secondary);
    }
}

#[cfg(test)]
mod gradient {
    use geo::Coord;
    use npw_core::GradientGroup;
    use npw_graph::{RoadAttrs, RoadGraphBuilder};

    use crate::gradient_group;

    #[test]
    fn length_weighted_absolute_mean() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_intersection(Coord { x: 0.0, y: 0.0 });
        let c = b.add_intersection(Coord { x: 300.0, y: 0.0 });
        let d = b.add_intersection(Coord { x: 400.0, y: 0.0 });
        b.add_straight_road(a, c, RoadAttrs { gradient: -2.0, ..RoadAttrs::default() });
        b.add_straight_road(c, d, RoadAttrs { gradient: 12.0, ..RoadAttrs::default() });
        let g = b.build(3).unwrap();

        // (2 * 300 + 12 * 100) / 400 = 4.5
        assert_eq!(gradient_group(&g.roads), GradientGroup::UpTo5);
        assert_eq!(gradient_group(&g.roads[..1]), GradientGroup::UpTo3);
        assert_eq!(gradient_group(&g.roads[1..]), GradientGroup::Over10);
        assert_eq!(gradient_group(std::iter::empty()), GradientGroup::UpTo3);
    }
}
