use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::error::{HafError, Result};
use crate::track::Track;

pub fn read_whole_file<P: AsRef<Path>>(filename: P) -> Result<String> {
    let mut file = File::open(filename)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

fn point_time(time: &::gpx::Time) -> Result<DateTime<FixedOffset>> {
    let iso = time.format().map_err(|e| HafError::GpxParse(e.to_string()))?;
    DateTime::parse_from_rfc3339(&iso).map_err(|e| HafError::GpxParse(e.to_string()))
}

/// Reads the first track of a GPX document. Its segments are joined in
/// file order; any further tracks are ignored.
pub fn parse_gpx(gpx_data: &str) -> Result<Track> {
    let gpx = ::gpx::read(io::Cursor::new(gpx_data.as_bytes()))
        .map_err(|e| HafError::GpxParse(e.to_string()))?;

    if gpx.tracks.len() > 1 {
        warn!(tracks = gpx.tracks.len(), "only the first track is evaluated");
    }
    let trk = gpx
        .tracks
        .first()
        .ok_or_else(|| HafError::InvalidInput("GPX file has no track".to_string()))?;

    let mut records = Vec::new();
    for trkseg in &trk.segments {
        for trkpt in &trkseg.points {
            let time = match &trkpt.time {
                Some(time) => point_time(time)?,
                None => {
                    return Err(HafError::InvalidInput(format!(
                        "track point {} has no timestamp",
                        records.len()
                    )))
                }
            };
            let p = trkpt.point();
            records.push((time, p.y(), p.x(), trkpt.elevation));
        }
    }
    debug!(points = records.len(), segments = trk.segments.len(), "parsed GPX track");

    Track::from_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SEGMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>eged</name>
    <trkseg>
      <trkpt lat="47.9000" lon="20.4000"><ele>180.0</ele><time>2023-05-01T10:00:00Z</time></trkpt>
      <trkpt lat="47.9010" lon="20.4010"><ele>190.5</ele><time>2023-05-01T10:00:10Z</time></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="47.9020" lon="20.4020"><time>2023-05-01T10:00:20Z</time></trkpt>
    </trkseg>
  </trk>
  <trk>
    <trkseg>
      <trkpt lat="10.0" lon="10.0"><time>2023-05-01T11:00:00Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn joins_segments_of_first_track() {
        let track = parse_gpx(TWO_SEGMENTS).unwrap();
        assert_eq!(track.len(), 3);
        let last = track.get(2).unwrap();
        assert_eq!(last.index, 2);
        assert_eq!(last.lat, 47.902);
        assert_eq!(last.lon, 20.402);
        assert_eq!(last.ele, None);
        assert_eq!(track.first().ele, Some(180.0));
        assert_eq!(
            track.first().time,
            DateTime::parse_from_rfc3339("2023-05-01T10:00:00Z").unwrap()
        );
    }

    #[test]
    fn missing_time_is_invalid_input() {
        let data = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="47.9" lon="20.4"><time>2023-05-01T10:00:00Z</time></trkpt>
    <trkpt lat="47.9" lon="20.4"></trkpt>
  </trkseg></trk>
</gpx>"#;
        let err = parse_gpx(data).unwrap_err();
        assert!(matches!(err, HafError::InvalidInput(msg) if msg.contains("point 1")));
    }

    #[test]
    fn no_track_is_invalid_input() {
        let data = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1"></gpx>"#;
        assert!(matches!(parse_gpx(data), Err(HafError::InvalidInput(_))));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(parse_gpx("not xml at all"), Err(HafError::GpxParse(_))));
    }
}
