//! Unit tests for sr-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::from_index(42), Some(id));
        assert_eq!(NodeId::from_index(u32::MAX as usize), None);
        assert_eq!(NodeId::from_index(usize::MAX), None);
    }

    #[test]
    fn ordering() {
        assert!(NodeId(0) < NodeId(1));
        assert!(EdgeId(100) > EdgeId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
        assert_eq!(NodeId::default(), NodeId::INVALID);
        assert!(!EdgeId::default().is_valid());
        assert!(EdgeId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "n7");
        assert_eq!(EdgeId(12).to_string(), "e12");
    }
}

#[cfg(test)]
mod geo {
    use crate::{CoreError, GeoPoint};

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(40.7128, -74.0060);
        assert!(p.distance_m(p) < 0.01);
    }

    #[test]
    fn one_degree_latitude() {
        // ~1 degree of latitude ≈ 111 km
        let a = GeoPoint::new(30.0, -88.0);
        let b = GeoPoint::new(31.0, -88.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 500.0, "got {d}");
    }

    #[test]
    fn midpoint_is_mean() {
        let m = GeoPoint::new(0.0, 0.0).midpoint(GeoPoint::new(2.0, -4.0));
        assert_eq!(m, GeoPoint::new(1.0, -2.0));
    }

    #[test]
    fn planar_distance() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(3.0, 4.0);
        assert_eq!(a.planar_distance2_deg(b), 25.0);
        assert_eq!(a.planar_distance_deg(b), 5.0);
    }

    #[test]
    fn lon_lat_order() {
        let p = GeoPoint::new(12.5, -3.25);
        assert_eq!(p.to_lon_lat(), [-3.25, 12.5]);
        assert_eq!(GeoPoint::from_lon_lat([-3.25, 12.5]), p);
    }

    #[test]
    fn checked_rejects_bad_input() {
        assert!(GeoPoint::checked(45.0, 90.0).is_ok());
        assert!(matches!(
            GeoPoint::checked(f64::NAN, 0.0),
            Err(CoreError::InvalidCoordinate { .. })
        ));
        assert!(GeoPoint::checked(91.0, 0.0).is_err());
        assert!(GeoPoint::checked(0.0, -180.5).is_err());
    }
}

#[cfg(test)]
mod mode {
    use crate::{CoreError, RoutingMode};

    #[test]
    fn parse() {
        assert_eq!("fast".parse::<RoutingMode>().unwrap(), RoutingMode::Fast);
        assert_eq!(" SAFE ".parse::<RoutingMode>().unwrap(), RoutingMode::Safe);
        assert_eq!(
            "scenic".parse::<RoutingMode>(),
            Err(CoreError::UnknownMode("scenic".into()))
        );
    }

    #[test]
    fn display_roundtrip() {
        for mode in RoutingMode::ALL {
            assert_eq!(mode.to_string().parse::<RoutingMode>().unwrap(), mode);
        }
    }

    #[test]
    fn only_safe_uses_zones() {
        assert!(!RoutingMode::Fast.uses_zones());
        assert!(RoutingMode::Safe.uses_zones());
    }
}
