use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{HafError, Rejection, Result};
use crate::segments::Segment;
use crate::track::{Track, TrackPoint};
use crate::validate::Attempt;

/// Outcome of one accepted attempt, as stored in the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub athlete: String,
    pub date: NaiveDate,
    pub time_up: String,
    pub time_down: String,
    pub start_time: DateTime<FixedOffset>,
    pub finish_time: DateTime<FixedOffset>,
    /// `"<lon>,<lat>"` of the last descent fix.
    pub finish_coords: String,
    /// Submission time, also names the stored GPX file.
    pub timestamp: DateTime<Utc>,
}

impl ResultRecord {
    pub fn time_up_duration(&self) -> Option<Duration> {
        parse_duration(&self.time_up)
    }
}

/// `HH:MM:SS`. Hours are not wrapped into days; past 99 the field simply
/// grows. Negative durations render as zero.
pub fn format_duration(d: Duration) -> String {
    let total = d.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

pub fn parse_duration(s: &str) -> Option<Duration> {
    let mut parts = s.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = parts.next()?.parse().ok()?;
    if parts.next().is_some()
        || hours < 0
        || !(0..60).contains(&minutes)
        || !(0..60).contains(&seconds)
    {
        return None;
    }
    Some(Duration::seconds(hours * 3600 + minutes * 60 + seconds))
}

fn segment_points<'a>(track: &'a Track, segment: &Segment) -> Result<&'a [TrackPoint]> {
    let range = segment.indices();
    if range.is_empty() || range.end > track.len() {
        return Err(HafError::InvalidInput(format!(
            "segment ({}, {}) does not fit a track of {} points",
            segment.lower,
            segment.upper,
            track.len()
        )));
    }
    Ok(&track.points()[range])
}

fn time_span(points: &[TrackPoint]) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
    let mut min = points[0].time;
    let mut max = points[0].time;
    for p in &points[1..] {
        if p.time < min {
            min = p.time;
        }
        if p.time > max {
            max = p.time;
        }
    }
    (min, max)
}

/// Elapsed times use the earliest and latest timestamps inside each leg,
/// not the first and last fix, so out of order timestamps cannot produce a
/// negative time.
pub fn build_result(
    track: &Track,
    attempt: &Attempt,
    athlete: &str,
    submitted_at: DateTime<Utc>,
) -> Result<ResultRecord> {
    let up = segment_points(track, &attempt.segment_up)?;
    let down = segment_points(track, &attempt.segment_down)?;

    let (up_min, up_max) = time_span(up);
    let (down_min, down_max) = time_span(down);

    let finish = &down[down.len() - 1];

    let record = ResultRecord {
        athlete: athlete.trim().to_string(),
        date: track.date(),
        time_up: format_duration(up_max.signed_duration_since(up_min)),
        time_down: format_duration(down_max.signed_duration_since(down_min)),
        start_time: up_min,
        finish_time: down_max,
        finish_coords: format!("{},{}", finish.lon, finish.lat),
        timestamp: submitted_at,
    };
    info!(
        athlete = %record.athlete,
        time_up = %record.time_up,
        time_down = %record.time_down,
        "built result"
    );
    Ok(record)
}

/// Same athlete starting at the same moment.
pub fn same_attempt(a: &ResultRecord, b: &ResultRecord) -> bool {
    a.athlete == b.athlete && a.start_time == b.start_time
}

/// Same climb time finishing at the same spot, whatever the name.
pub fn same_tracklog(a: &ResultRecord, b: &ResultRecord) -> bool {
    a.time_up == b.time_up && a.finish_coords == b.finish_coords
}

/// Checks a new record against everything stored so far. A repeated attempt
/// is reported before a repeated tracklog.
pub fn check_duplicates<'a, I>(
    new: &ResultRecord,
    existing: I,
) -> std::result::Result<(), Rejection>
where
    I: IntoIterator<Item = &'a ResultRecord>,
    I::IntoIter: Clone,
{
    let mut existing = existing.into_iter();
    if existing.clone().any(|r| same_attempt(r, new)) {
        return Err(Rejection::DuplicateAttempt);
    }
    if existing.any(|r| same_tracklog(r, new)) {
        return Err(Rejection::DuplicateTracklog);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub record: ResultRecord,
}

/// Orders by climb time, fastest first. Equal times keep their input order.
/// Records whose time cannot be read go last.
pub fn rank(mut records: Vec<ResultRecord>) -> Vec<LeaderboardEntry> {
    records.sort_by_key(|r| match r.time_up_duration() {
        Some(d) => (0, d),
        None => (1, Duration::zero()),
    });
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| LeaderboardEntry { rank: i + 1, record })
        .collect()
}
