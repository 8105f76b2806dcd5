use serde::Serialize;

use crate::error::{HafError, Result};
use crate::geofence::{GeoFence, Role};

/// The task of one race: a start/finish cylinder and a single turnpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    pub race: String,
    pub startcylinder: GeoFence,
    pub turnpoint: GeoFence,
}

impl Course {
    pub fn new(race: &str, startcylinder: GeoFence, turnpoint: GeoFence) -> Result<Course> {
        if startcylinder.role != Role::Start || turnpoint.role != Role::Turnpoint {
            return Err(HafError::InvalidFence(format!(
                "course {} needs a start cylinder and a turnpoint",
                race
            )));
        }
        Ok(Course {
            race: race.to_string(),
            startcylinder,
            turnpoint,
        })
    }

    /// Bounding box of the two cylinder centers as `[[south, west], [north, east]]`.
    pub fn bounds(&self) -> [[f64; 2]; 2] {
        let (a, b) = (&self.startcylinder, &self.turnpoint);
        [
            [a.lat.min(b.lat), a.lon.min(b.lon)],
            [a.lat.max(b.lat), a.lon.max(b.lon)],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_must_match() {
        let start = GeoFence::new(Role::Start, 47.90, 20.38, 150.0).unwrap();
        let tp = GeoFence::new(Role::Turnpoint, 47.92, 20.41, 100.0).unwrap();
        assert!(Course::new("eged", tp, start).is_err());

        let course = Course::new("eged", start, tp).unwrap();
        assert_eq!(course.bounds(), [[47.90, 20.38], [47.92, 20.41]]);
    }
}
