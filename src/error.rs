use serde::Serialize;
use thiserror::Error;

/// Reasons an attempt is turned down. These are ordinary outcomes of a
/// submission, not failures of the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    #[error("the athlete's name cannot be left blank")]
    MissingAthleteName,
    #[error("tracklog does not cross the start cylinder")]
    StartNotCrossed,
    #[error("tracklog does not cross the turnpoint")]
    TurnpointNotCrossed,
    #[error("running up does not start within the start cylinder")]
    NoClimb,
    #[error("tracklog does not go back to the start cylinder")]
    NoDescent,
    #[error("order of tagging the cylinders is incorrect")]
    OrderingViolation,
    #[error("result already submitted for the same athlete and start time")]
    DuplicateAttempt,
    #[error("this tracklog has already been uploaded")]
    DuplicateTracklog,
}

impl Rejection {
    /// Stable machine readable code, the same string serde produces.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::MissingAthleteName => "missing_athlete_name",
            Rejection::StartNotCrossed => "start_not_crossed",
            Rejection::TurnpointNotCrossed => "turnpoint_not_crossed",
            Rejection::NoClimb => "no_climb",
            Rejection::NoDescent => "no_descent",
            Rejection::OrderingViolation => "ordering_violation",
            Rejection::DuplicateAttempt => "duplicate_attempt",
            Rejection::DuplicateTracklog => "duplicate_tracklog",
        }
    }
}

#[derive(Debug, Error)]
pub enum HafError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid coordinate: lat {latitude}, lon {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("invalid geofence: {0}")]
    InvalidFence(String),
    #[error("failed to parse GPX file: {0}")]
    GpxParse(String),
    #[error("unknown course: {0}")]
    UnknownCourse(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Database(#[from] postgres::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

impl HafError {
    /// The rejection carried by this error, if the attempt was turned down
    /// rather than the input being unusable.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            HafError::Rejected(kind) => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HafError>;
