use serde::Serialize;
use tracing::info;

use crate::error::Rejection;
use crate::geofence::GeoFence;
use crate::segments::{classify, Classification, Segment};
use crate::track::Track;

/// A track that completed the course: both legs resolved and in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub segment_up: Segment,
    pub segment_down: Segment,
    pub start_contacts: usize,
    pub turnpoint_contacts: usize,
}

pub type Verdict = Result<Attempt, Rejection>;

/// Trims the name and refuses a blank one.
pub fn check_athlete_name(name: &str) -> Result<&str, Rejection> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Rejection::MissingAthleteName);
    }
    Ok(name)
}

/// Applies the course rules to a classified track. The first failing rule
/// decides the verdict.
pub fn validate(c: &Classification) -> Verdict {
    let start_contacts = c.start_contacts();
    if start_contacts < 1 {
        return Err(Rejection::StartNotCrossed);
    }
    let turnpoint_contacts = c.turnpoint_contacts();
    if turnpoint_contacts < 1 {
        return Err(Rejection::TurnpointNotCrossed);
    }

    let segment_down = c
        .segment_down()
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or(Rejection::NoDescent)?;
    let segment_up = c
        .segment_up()
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or(Rejection::NoClimb)?;

    match (segment_up.last(), segment_down.first()) {
        (Some(up_last), Some(down_first)) if up_last <= down_first => (),
        _ => return Err(Rejection::OrderingViolation),
    }

    Ok(Attempt {
        segment_up,
        segment_down,
        start_contacts,
        turnpoint_contacts,
    })
}

pub fn classify_and_validate(track: &Track, start: &GeoFence, turnpoint: &GeoFence) -> Verdict {
    let verdict = validate(&classify(track, start, turnpoint));
    if let Err(kind) = &verdict {
        info!(kind = kind.code(), points = track.len(), "track rejected");
    }
    verdict
}

/// Same as [`classify_and_validate`], but refuses a blank athlete name
/// before looking at the track.
pub fn validate_submission(
    athlete: &str,
    track: &Track,
    start: &GeoFence,
    turnpoint: &GeoFence,
) -> Verdict {
    check_athlete_name(athlete)?;
    classify_and_validate(track, start, turnpoint)
}
