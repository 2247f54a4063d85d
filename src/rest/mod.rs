mod jobs;

pub use crate::rest::jobs::{get_job, get_job_by_slug, submit_job};

use rocket::{Build, Rocket};
use sqlx::SqlitePool;

/// Attach the database pool and the job routes to `rocket`.
pub fn mount(rocket: Rocket<Build>, pool: SqlitePool) -> Rocket<Build> {
    rocket
        .manage(pool)
        .mount("/api", routes![submit_job, get_job, get_job_by_slug])
}
