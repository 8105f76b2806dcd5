//! Hike-and-fly site records.
//!
//! An athlete walks from the start cylinder up to the turnpoint and flies
//! back down. From the uploaded tracklog this crate finds the climb and the
//! descent, checks the cylinders were tagged in the right order and builds
//! the result that goes onto the race leaderboard.

pub mod config;
pub mod db;
pub mod error;
pub mod geofence;
pub mod gpx;
pub mod logging;
pub mod models;
pub mod results;
pub mod segments;
pub mod track;
pub mod validate;

use chrono::{DateTime, Utc};

pub use config::Config;
pub use db::{create_db_pool, establish_connection};
pub use error::{HafError, Rejection, Result};
pub use geofence::{GeoFence, Role};
pub use models::Course;
pub use results::{
    build_result, check_duplicates, format_duration, same_attempt, same_tracklog, LeaderboardEntry,
    ResultRecord,
};
pub use segments::{classify, Classification, Segment};
pub use track::{Track, TrackPoint};
pub use validate::{classify_and_validate, validate_submission, Attempt, Verdict};

/// Runs a tracklog through the whole evaluation: name check, course
/// validation and result building. Rejections come back as
/// [`HafError::Rejected`].
pub fn evaluate(
    track: &Track,
    course: &Course,
    athlete: &str,
    submitted_at: DateTime<Utc>,
) -> Result<ResultRecord> {
    let attempt = validate_submission(athlete, track, &course.startcylinder, &course.turnpoint)?;
    build_result(track, &attempt, athlete, submitted_at)
}
