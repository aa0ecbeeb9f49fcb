//! Unit tests for npw-core primitives.

#[cfg(test)]
mod ids {
    use crate::{IntersectionId, RoadId, RouteId};

    #[test]
    fn index_roundtrip() {
        let id = RoadId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(RoadId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(RoadId::INVALID.0, u32::MAX);
        assert_eq!(IntersectionId::default(), IntersectionId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(RouteId(7).to_string(), "RouteId(7)");
    }

    #[test]
    fn serializes_as_bare_number() {
        assert_eq!(serde_json::to_string(&RouteId(3)).unwrap(), "3");
        let back: RoadId = serde_json::from_str("11").unwrap();
        assert_eq!(back, RoadId(11));
    }
}

#[cfg(test)]
mod mercator {
    use geo::{Coord, Rect};

    use crate::Mercator;

    fn edinburgh() -> Mercator {
        Mercator::from_bounds(Rect::new(
            Coord { x: -3.3, y: 55.9 },
            Coord { x: -3.1, y: 56.0 },
        ))
    }

    #[test]
    fn origin_is_south_west_corner() {
        let m = edinburgh();
        let p = m.pt_to_mercator(Coord { x: -3.3, y: 55.9 });
        assert!(p.x.abs() < 1e-9 && p.y.abs() < 1e-9);
    }

    #[test]
    fn roundtrip_point() {
        let m = edinburgh();
        let pt = Coord { x: -3.2, y: 55.95 };
        let back = m.pt_to_wgs84(m.pt_to_mercator(pt));
        assert!((back.x - pt.x).abs() < 1e-12);
        assert!((back.y - pt.y).abs() < 1e-12);
    }

    #[test]
    fn a_tenth_of_a_degree_of_latitude_is_about_11km() {
        let m = edinburgh();
        let p = m.pt_to_mercator(Coord { x: -3.3, y: 56.0 });
        assert!((p.y - 11_132.0).abs() < 20.0, "got {}", p.y);
    }
}

#[cfg(test)]
mod types {
    use crate::{GradientGroup, InfraType, Rating, StreetSpace, TrafficVolume};

    #[test]
    fn traffic_bands() {
        assert_eq!(TrafficVolume::from_count(0), TrafficVolume::UpTo1000);
        assert_eq!(TrafficVolume::from_count(999), TrafficVolume::UpTo1000);
        assert_eq!(TrafficVolume::from_count(1000), TrafficVolume::UpTo2000);
        assert_eq!(TrafficVolume::from_count(3999), TrafficVolume::UpTo4000);
        assert_eq!(TrafficVolume::from_count(20_000), TrafficVolume::Over4000);
    }

    #[test]
    fn gradient_groups_ignore_sign() {
        assert_eq!(GradientGroup::from_gradient(-2.0), GradientGroup::UpTo3);
        assert_eq!(GradientGroup::from_gradient(3.0), GradientGroup::UpTo3);
        assert_eq!(GradientGroup::from_gradient(4.5), GradientGroup::UpTo5);
        assert_eq!(GradientGroup::from_gradient(-8.0), GradientGroup::UpTo10);
        assert_eq!(GradientGroup::from_gradient(12.0), GradientGroup::Over10);
        assert_eq!(GradientGroup::from_gradient(6.0).label(), "5 - 7%");
    }

    #[test]
    fn infra_type_names_roundtrip() {
        for t in InfraType::ALL {
            assert_eq!(InfraType::from_name(t.name()), Some(t));
        }
        assert_eq!(InfraType::from_name("Tram"), None);
    }

    #[test]
    fn serde_labels() {
        assert_eq!(serde_json::to_string(&Rating::VeryPoor).unwrap(), "\"very poor\"");
        assert_eq!(serde_json::to_string(&StreetSpace::Nothing).unwrap(), "\"nothing\"");
        assert_eq!(serde_json::to_string(&GradientGroup::Over10).unwrap(), "\"> 10%\"");
    }
}

#[cfg(test)]
mod config {
    use crate::{EngineConfig, LevelOfService, PlanError};

    #[test]
    fn defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.major_junction_min_degree, 3);
        assert_eq!(c.od_seed, 42);
        assert_eq!(c.los_penalties.get(LevelOfService::Medium), 1.5);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_override() {
        let c = EngineConfig::from_toml_str("od_seed = 7\n[los_penalties]\nlow = 4.0\n").unwrap();
        assert_eq!(c.od_seed, 7);
        assert_eq!(c.los_penalties.low, 4.0);
        assert_eq!(c.los_penalties.high, 1.0);
        assert_eq!(c.worst_directness_routes, 10);
    }

    #[test]
    fn rejects_non_positive_penalty() {
        let err = EngineConfig::from_toml_str("[los_penalties]\nhigh = 0.0\n").unwrap_err();
        assert!(matches!(err, PlanError::Config(_)));
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            EngineConfig::from_toml_str("od_seed = \"nope\""),
            Err(PlanError::Config(_))
        ));
    }
}

#[cfg(test)]
mod rng {
    use crate::SampleRng;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SampleRng::new(42);
        let mut b = SampleRng::new(42);
        for _ in 0..10 {
            assert_eq!(a.gen_range(0..1_000_000i64), b.gen_range(0..1_000_000i64));
        }
    }
}
