//! Postgres-backed course, result and source stores.

use chrono::{DateTime, Utc};
use postgis::ewkb;
use postgres::{Client, GenericClient, NoTls, Row};
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{HafError, Result};
use crate::geofence::{GeoFence, Role};
use crate::models::Course;
use crate::results::{check_duplicates, rank, LeaderboardEntry, ResultRecord};

pub type DbPool = Pool<PostgresConnectionManager<NoTls>>;

pub fn establish_connection(config: &Config) -> Result<Client> {
    Ok(Client::connect(&config.database_url, NoTls)?)
}

pub fn create_db_pool(config: &Config) -> Result<DbPool> {
    let manager = PostgresConnectionManager::new(config.database_url.parse()?, NoTls);
    Ok(Pool::new(manager)?)
}

pub fn create_db(db: &mut Client) -> Result<()> {
    db.batch_execute(
        "CREATE EXTENSION IF NOT EXISTS postgis;

         CREATE TABLE IF NOT EXISTS courses (
            race TEXT NOT NULL,
            name TEXT NOT NULL,
            lat DOUBLE PRECISION NOT NULL,
            lon DOUBLE PRECISION NOT NULL,
            radius DOUBLE PRECISION NOT NULL CHECK (radius > 0),
            PRIMARY KEY (race, name)
         );

         CREATE TABLE IF NOT EXISTS source_routes (
            id SERIAL PRIMARY KEY,
            race TEXT NOT NULL,
            submitted_at TIMESTAMPTZ NOT NULL,
            gpx XML NOT NULL
         );

         CREATE TABLE IF NOT EXISTS results (
            id SERIAL PRIMARY KEY,
            race TEXT NOT NULL,
            athlete TEXT NOT NULL,
            date DATE NOT NULL,
            time_up TEXT NOT NULL,
            time_up_seconds BIGINT,
            time_down TEXT NOT NULL,
            start_time TIMESTAMPTZ NOT NULL,
            finish_time TIMESTAMPTZ NOT NULL,
            finish_coords TEXT NOT NULL,
            finish_geom GEOGRAPHY(POINT, 4326),
            submitted_at TIMESTAMPTZ NOT NULL,
            source_id INTEGER REFERENCES source_routes (id),
            UNIQUE (race, athlete, start_time),
            UNIQUE (race, time_up, finish_coords)
         );",
    )?;
    info!("database schema created");
    Ok(())
}

pub fn empty_db(db: &mut Client) -> Result<()> {
    db.batch_execute(
        "DROP TABLE IF EXISTS results;
         DROP TABLE IF EXISTS source_routes;
         DROP TABLE IF EXISTS courses;",
    )?;
    info!("database emptied");
    Ok(())
}

pub fn store_course(db: &mut Client, course: &Course) -> Result<()> {
    let mut tx = db.transaction()?;
    for fence in [&course.startcylinder, &course.turnpoint] {
        tx.execute(
            "INSERT INTO courses (race, name, lat, lon, radius) VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (race, name) DO UPDATE
             SET lat = EXCLUDED.lat, lon = EXCLUDED.lon, radius = EXCLUDED.radius",
            &[
                &course.race,
                &fence.role.cylinder_name(),
                &fence.lat,
                &fence.lon,
                &fence.radius,
            ],
        )?;
    }
    tx.commit()?;
    info!(race = %course.race, "stored course");
    Ok(())
}

pub fn load_course(db: &mut Client, race: &str) -> Result<Course> {
    let rows = db.query(
        "SELECT name, lat, lon, radius FROM courses WHERE race = $1",
        &[&race],
    )?;

    let mut startcylinder = None;
    let mut turnpoint = None;
    for row in &rows {
        let name: String = row.get("name");
        let role = match Role::from_cylinder_name(&name) {
            Some(role) => role,
            None => {
                warn!(race, name = %name, "ignoring unknown cylinder");
                continue;
            }
        };
        let fence = GeoFence::new(role, row.get("lat"), row.get("lon"), row.get("radius"))?;
        match role {
            Role::Start => startcylinder = Some(fence),
            Role::Turnpoint => turnpoint = Some(fence),
        }
    }

    match (startcylinder, turnpoint) {
        (Some(s), Some(t)) => Course::new(race, s, t),
        _ => Err(HafError::UnknownCourse(race.to_string())),
    }
}

/// Keeps the uploaded file, keyed by its submission time.
pub fn store_source<C: GenericClient>(
    db: &mut C,
    race: &str,
    submitted_at: DateTime<Utc>,
    gpx: &str,
) -> Result<i32> {
    let rows = db.query(
        "INSERT INTO source_routes (race, submitted_at, gpx)
         VALUES ($1, $2, XMLPARSE (DOCUMENT $3::text)) RETURNING id",
        &[&race, &submitted_at, &gpx],
    )?;
    let id: i32 = rows[0].get(0);
    debug!(id, race, "stored source route");
    Ok(id)
}

fn record_from_row(row: &Row) -> ResultRecord {
    ResultRecord {
        athlete: row.get("athlete"),
        date: row.get("date"),
        time_up: row.get("time_up"),
        time_down: row.get("time_down"),
        start_time: row.get("start_time"),
        finish_time: row.get("finish_time"),
        finish_coords: row.get("finish_coords"),
        timestamp: row.get("submitted_at"),
    }
}

fn finish_point(record: &ResultRecord) -> Option<ewkb::Point> {
    let (lon, lat) = record.finish_coords.split_once(',')?;
    Some(ewkb::Point {
        x: lon.parse().ok()?,
        y: lat.parse().ok()?,
        srid: Some(4326),
    })
}

const SELECT_RESULTS: &str = "SELECT athlete, date, time_up, time_down, start_time,
            finish_time, finish_coords, submitted_at
     FROM results WHERE race = $1 ORDER BY id ASC";

/// All results of a race in submission order.
pub fn load_results(db: &mut Client, race: &str) -> Result<Vec<ResultRecord>> {
    let rows = db.query(SELECT_RESULTS, &[&race])?;
    Ok(rows.iter().map(record_from_row).collect())
}

/// Inserts a result, and its GPX file when given, unless it repeats a stored
/// attempt or tracklog. The check and the inserts run in one transaction
/// holding a lock that excludes concurrent inserts, so two identical
/// uploads cannot both land.
pub fn insert_result(
    db: &mut Client,
    race: &str,
    record: &ResultRecord,
    gpx: Option<&str>,
) -> Result<i32> {
    let mut tx = db.transaction()?;
    tx.batch_execute("LOCK TABLE results IN SHARE ROW EXCLUSIVE MODE")?;

    let existing: Vec<ResultRecord> = tx
        .query(SELECT_RESULTS, &[&race])?
        .iter()
        .map(record_from_row)
        .collect();
    if let Err(kind) = check_duplicates(record, &existing) {
        warn!(race, athlete = %record.athlete, kind = kind.code(), "duplicate submission");
        return Err(kind.into());
    }

    let source_id = match gpx {
        Some(gpx) => Some(store_source(&mut tx, race, record.timestamp, gpx)?),
        None => None,
    };

    let time_up_seconds = record.time_up_duration().map(|d| d.num_seconds());
    let rows = tx.query(
        "INSERT INTO results (race, athlete, date, time_up, time_up_seconds, time_down,
                              start_time, finish_time, finish_coords, finish_geom,
                              submitted_at, source_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING id",
        &[
            &race,
            &record.athlete,
            &record.date,
            &record.time_up,
            &time_up_seconds,
            &record.time_down,
            &record.start_time,
            &record.finish_time,
            &record.finish_coords,
            &finish_point(record),
            &record.timestamp,
            &source_id,
        ],
    )?;
    let id: i32 = rows[0].get(0);
    tx.commit()?;

    info!(id, race, athlete = %record.athlete, time_up = %record.time_up, "stored result");
    Ok(id)
}

/// Every result of the race ranked by climb time.
pub fn leaderboard(db: &mut Client, race: &str) -> Result<Vec<LeaderboardEntry>> {
    Ok(rank(load_results(db, race)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate};

    #[test]
    fn finish_point_is_lon_lat() {
        let record = ResultRecord {
            athlete: "Earl".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            time_up: "00:40:00".to_string(),
            time_down: "00:05:00".to_string(),
            start_time: DateTime::parse_from_rfc3339("2023-05-01T10:00:00Z").unwrap(),
            finish_time: DateTime::parse_from_rfc3339("2023-05-01T11:00:00Z").unwrap(),
            finish_coords: "20.4012,47.9001".to_string(),
            timestamp: Utc::now(),
        };
        let p = finish_point(&record).unwrap();
        assert_eq!(p.x, 20.4012);
        assert_eq!(p.y, 47.9001);
        assert_eq!(p.srid, Some(4326));

        let broken = ResultRecord {
            finish_coords: "nowhere".to_string(),
            ..record
        };
        assert!(finish_point(&broken).is_none());
    }
}
