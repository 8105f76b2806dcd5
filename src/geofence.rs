use std::fmt;

use geo::{point, GeodesicDistance, Point};
use serde::{Deserialize, Serialize};

use crate::error::{HafError, Result};
use crate::track::{valid_coordinate, TrackPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Start,
    Turnpoint,
}

impl Role {
    /// Document name of the fence in the course store.
    pub fn cylinder_name(&self) -> &'static str {
        match self {
            Role::Start => "startcylinder",
            Role::Turnpoint => "turnpoint",
        }
    }

    pub fn from_cylinder_name(name: &str) -> Option<Role> {
        match name {
            "startcylinder" => Some(Role::Start),
            "turnpoint" => Some(Role::Turnpoint),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Start => write!(f, "Start / Finish Cylinder"),
            Role::Turnpoint => write!(f, "Turnpoint"),
        }
    }
}

/// A circular zone on the ground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoFence {
    pub lat: f64,
    pub lon: f64,
    /// Meters.
    pub radius: f64,
    pub role: Role,
}

impl GeoFence {
    pub fn new(role: Role, lat: f64, lon: f64, radius: f64) -> Result<GeoFence> {
        if !valid_coordinate(lat, lon) {
            return Err(HafError::InvalidCoordinate {
                latitude: lat,
                longitude: lon,
            });
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(HafError::InvalidFence(format!(
                "{} radius must be positive, got {}",
                role.cylinder_name(),
                radius
            )));
        }
        Ok(GeoFence {
            lat,
            lon,
            radius,
            role,
        })
    }

    pub fn center(&self) -> Point<f64> {
        point!(x: self.lon, y: self.lat)
    }

    /// Ellipsoidal (WGS84) surface distance in meters from the center.
    pub fn distance_to(&self, lat: f64, lon: f64) -> f64 {
        self.center().geodesic_distance(&point!(x: lon, y: lat))
    }

    /// A point on the boundary itself is outside.
    pub fn contains(&self, p: &TrackPoint) -> bool {
        self.distance_to(p.lat, p.lon) < self.radius
    }

    /// One flag per track point, in track order.
    pub fn containment(&self, points: &[TrackPoint]) -> Vec<bool> {
        points.iter().map(|p| self.contains(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use geo::GeodesicDestination;

    fn at(lat: f64, lon: f64) -> TrackPoint {
        TrackPoint {
            index: 0,
            time: DateTime::parse_from_rfc3339("2023-05-01T10:00:00Z").unwrap(),
            lat,
            lon,
            ele: None,
        }
    }

    #[test]
    fn center_is_inside() {
        let fence = GeoFence::new(Role::Start, 47.9, 20.4, 50.0).unwrap();
        assert!(fence.contains(&at(47.9, 20.4)));
    }

    #[test]
    fn far_points_are_outside() {
        let fence = GeoFence::new(Role::Turnpoint, 47.9, 20.4, 400.0).unwrap();
        for bearing in [0.0, 45.0, 90.0, 180.0, 270.0] {
            let p = fence.center().geodesic_destination(bearing, 401.0);
            assert!(!fence.contains(&at(p.y(), p.x())), "bearing {}", bearing);
            let p = fence.center().geodesic_destination(bearing, 399.0);
            assert!(fence.contains(&at(p.y(), p.x())), "bearing {}", bearing);
        }
    }

    #[test]
    fn boundary_point_is_outside() {
        let probe = point!(x: 20.4, y: 47.9).geodesic_destination(33.0, 250.0);
        let exact = GeoFence::new(Role::Start, 47.9, 20.4, 1.0)
            .unwrap()
            .distance_to(probe.y(), probe.x());
        let fence = GeoFence::new(Role::Start, 47.9, 20.4, exact).unwrap();
        assert!(!fence.contains(&at(probe.y(), probe.x())));
    }

    #[test]
    fn uses_ellipsoidal_distance() {
        // one degree of latitude at the equator is ~110.57 km on WGS84
        // versus ~111.19 km on a sphere
        let fence = GeoFence::new(Role::Start, 0.0, 0.0, 1.0).unwrap();
        let d = fence.distance_to(1.0, 0.0);
        assert!((d - 110_574.0).abs() < 5.0, "{}", d);
    }

    #[test]
    fn rejects_bad_fences() {
        assert!(matches!(
            GeoFence::new(Role::Start, 47.0, 19.0, 0.0),
            Err(HafError::InvalidFence(_))
        ));
        assert!(matches!(
            GeoFence::new(Role::Turnpoint, 47.0, 19.0, -3.0),
            Err(HafError::InvalidFence(_))
        ));
        assert!(matches!(
            GeoFence::new(Role::Start, 47.0, 181.0, 10.0),
            Err(HafError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn cylinder_names_round_trip() {
        assert_eq!(Role::from_cylinder_name("startcylinder"), Some(Role::Start));
        assert_eq!(
            Role::from_cylinder_name(Role::Turnpoint.cylinder_name()),
            Some(Role::Turnpoint)
        );
        assert_eq!(Role::from_cylinder_name("finish"), None);
        assert_eq!(Role::Turnpoint.to_string(), "Turnpoint");
    }
}
