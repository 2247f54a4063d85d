use crate::models::{Batch, JobId, ModelError};
use crate::workflows::{JobError, JobRequest};
use rocket::{
    http::Status as HttpStatus,
    response::status::Custom,
    serde::json::{json, Error as JsonError, Json, Value as JsonValue},
    State,
};
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool};
use std::fmt::Display;
use tracing::{error, info, warn};

fn error_response(status: HttpStatus, message: impl Display) -> Custom<JsonValue> {
    Custom(status, json!({ "error": message.to_string() }))
}

/// Log a failed job operation, at a level matching its cause.
fn log_job_error(error: &JobError) {
    match error {
        JobError::Graph(_) if !error.is_validation_error() => {
            error!(%error, "graph invariant broken")
        }
        JobError::Persistence(_) => warn!(%error, "failed to store job"),
        _ => info!(%error, "job rejected"),
    }
}

/// Validate a job submission, then store it along with its tasks.
///
/// Answers `{"msg": "ok"}`, or `{"error": "..."}` on failure.
#[post("/jobs", data = "<request>")]
pub async fn submit_job(
    pool: &State<SqlitePool>,
    request: Result<Json<JobRequest>, JsonError<'_>>,
) -> Result<JsonValue, Custom<JsonValue>> {
    let request = request.map_err(|e| {
        let message = match e {
            JsonError::Io(e) => e.to_string(),
            JsonError::Parse(_, e) => e.to_string(),
        };
        info!(%message, "malformed job request");
        error_response(HttpStatus::BadRequest, message)
    })?;

    let mut conn = acquire(pool).await?;
    request.submit(&mut conn).await.map_err(|e| {
        log_job_error(&e);
        error_response(e.http_status(), &e)
    })?;
    Ok(json!({ "msg": "ok" }))
}

async fn acquire(pool: &SqlitePool) -> Result<PoolConnection<Sqlite>, Custom<JsonValue>> {
    pool.acquire().await.map_err(|e| {
        error!(error = %e, "failed to acquire db connection");
        error_response(HttpStatus::InternalServerError, "failed to acquire db handle")
    })
}

fn batch_response(batch: Result<Batch, ModelError>) -> Result<JsonValue, Custom<JsonValue>> {
    let Batch { job, tasks } = batch.map_err(|e| {
        let e = JobError::from(e);
        if !matches!(e, JobError::Persistence(ModelError::ModelNotFound)) {
            warn!(error = %e, "failed to load job");
        }
        error_response(e.http_status(), &e)
    })?;
    Ok(json!({
        "job": job,
        "tasks": tasks,
    }))
}

/// return a stored job and its tasks.
#[get("/jobs/<job_id>")]
pub async fn get_job(
    pool: &State<SqlitePool>,
    job_id: JobId,
) -> Result<JsonValue, Custom<JsonValue>> {
    let mut conn = acquire(pool).await?;
    batch_response(Batch::from_job(job_id, &mut conn).await)
}

/// same as `get_job`, with the job looked up by its slug.
#[get("/jobs/slug/<slug>")]
pub async fn get_job_by_slug(
    pool: &State<SqlitePool>,
    slug: &str,
) -> Result<JsonValue, Custom<JsonValue>> {
    let mut conn = acquire(pool).await?;
    batch_response(Batch::from_slug(slug, &mut conn).await)
}
