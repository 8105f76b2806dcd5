use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::error::{HafError, Result};

/// One recorded position. `index` is the position in the original file
/// and is the only ordering the analysis relies on; timestamps may repeat
/// or run backwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub index: usize,
    pub time: DateTime<FixedOffset>,
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
}

pub fn valid_coordinate(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}

/// A single attempt's tracklog, in file order. Never empty and every
/// coordinate is in range.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    points: Vec<TrackPoint>,
}

impl Track {
    /// Builds a track from `(time, lat, lon, ele)` records. Indices are
    /// assigned from the record order.
    pub fn from_records<I>(records: I) -> Result<Track>
    where
        I: IntoIterator<Item = (DateTime<FixedOffset>, f64, f64, Option<f64>)>,
    {
        let mut points = Vec::new();
        for (index, (time, lat, lon, ele)) in records.into_iter().enumerate() {
            if !valid_coordinate(lat, lon) {
                return Err(HafError::InvalidCoordinate {
                    latitude: lat,
                    longitude: lon,
                });
            }
            points.push(TrackPoint {
                index,
                time,
                lat,
                lon,
                ele,
            });
        }

        if points.is_empty() {
            return Err(HafError::InvalidInput("track has no points".to_string()));
        }

        Ok(Track { points })
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrackPoint> {
        self.points.get(index)
    }

    pub fn first(&self) -> &TrackPoint {
        &self.points[0]
    }

    /// Calendar day of the first recorded point, in the logger's own offset.
    pub fn date(&self) -> NaiveDate {
        self.first().time.date_naive()
    }

    /// Bounding box as `[[south, west], [north, east]]`.
    pub fn bounds(&self) -> [[f64; 2]; 2] {
        let first = self.first();
        let mut bbox = [[first.lat, first.lon], [first.lat, first.lon]];
        for p in &self.points[1..] {
            bbox[0][0] = bbox[0][0].min(p.lat);
            bbox[0][1] = bbox[0][1].min(p.lon);
            bbox[1][0] = bbox[1][0].max(p.lat);
            bbox[1][1] = bbox[1][1].max(p.lon);
        }
        bbox
    }
}
