extern crate actix_web;
extern crate hafrecords;

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{error::BlockingError, web, App, HttpResponse, HttpServer, ResponseError};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use hafrecords::db::{insert_result, leaderboard, load_course, DbPool};
use hafrecords::gpx::parse_gpx;
use hafrecords::{create_db_pool, evaluate, logging, Config, HafError};

const MAX_GPX_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug)]
enum ApiError {
    Haf(HafError),
    Blocking,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::Haf(err) => write!(f, "{}", err),
            ApiError::Blocking => write!(f, "worker thread failed"),
        }
    }
}

impl From<HafError> for ApiError {
    fn from(err: HafError) -> ApiError {
        ApiError::Haf(err)
    }
}

impl From<BlockingError> for ApiError {
    fn from(_: BlockingError) -> ApiError {
        ApiError::Blocking
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Haf(HafError::Rejected(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Haf(HafError::InvalidInput(_))
            | ApiError::Haf(HafError::InvalidCoordinate { .. })
            | ApiError::Haf(HafError::GpxParse(_)) => StatusCode::BAD_REQUEST,
            ApiError::Haf(HafError::UnknownCourse(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Haf(HafError::Rejected(kind)) => json!({
                "kind": kind.code(),
                "message": kind.to_string(),
            }),
            ApiError::Haf(err) if self.status_code().is_client_error() => json!({
                "kind": "invalid_input",
                "message": err.to_string(),
            }),
            other => {
                error!(error = %other, "request failed");
                json!({ "kind": "internal", "message": "internal server error" })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

async fn get_race(
    pool: web::Data<DbPool>,
    race: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let race = race.into_inner();
    let entries = web::block(move || {
        let mut db = pool.get()?;
        leaderboard(&mut db, &race)
    })
    .await??;
    Ok(HttpResponse::Ok().json(entries))
}

async fn get_course(
    pool: web::Data<DbPool>,
    race: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let race = race.into_inner();
    let course = web::block(move || {
        let mut db = pool.get()?;
        load_course(&mut db, &race)
    })
    .await??;
    Ok(HttpResponse::Ok().json(course))
}

#[derive(Deserialize)]
struct SubmitQuery {
    athlete: Option<String>,
}

async fn post_attempt(
    pool: web::Data<DbPool>,
    race: web::Path<String>,
    query: web::Query<SubmitQuery>,
    body: String,
) -> Result<HttpResponse, ApiError> {
    let race = race.into_inner();
    let athlete = query.into_inner().athlete.unwrap_or_default();
    let result = web::block(move || {
        let mut db = pool.get()?;
        let course = load_course(&mut db, &race)?;
        let track = parse_gpx(&body)?;
        let result = evaluate(&track, &course, &athlete, Utc::now())?;
        insert_result(&mut db, &race, &result, Some(&body))?;
        Ok::<_, HafError>(result)
    })
    .await??;
    Ok(HttpResponse::Created().json(result))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    logging::init(false);
    let config = Config::from_env()?;
    let pool = create_db_pool(&config)?;

    info!(bind = %config.bind_address, "starting hafrd");
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::PayloadConfig::new(MAX_GPX_BYTES))
            .route("/race/{race}", web::get().to(get_race))
            .route("/race/{race}/course", web::get().to(get_course))
            .route("/race/{race}/attempts", web::post().to(post_attempt))
    })
    .bind(&config.bind_address)?
    .run()
    .await?;
    Ok(())
}
