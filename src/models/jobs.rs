use crate::models::{ModelError, NodeId};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

/// newly created job, not existing in db yet
#[derive(Debug, Clone, Copy)]
pub struct NewJob;
/// id (primary key) of a job
pub type JobId = i64;

/// How a job gets triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// triggered by its cron-style `schedule`
    Scheduled,
    /// triggered from the outside, through its `route_path`
    Manual,
}

impl JobKind {
    pub fn from_u8(value: u8) -> Result<Self, String> {
        match value {
            0 => Ok(Self::Scheduled),
            1 => Ok(Self::Manual),
            v => Err(format!("'{:}' cannot be converted to a JobKind", v)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match *self {
            Self::Scheduled => 0,
            Self::Manual => 1,
        }
    }
}

/// The `Job` struct implements abstraction over the `jobs` SQL table,
/// defined as such:
///
/// ```sql
/// CREATE TABLE IF NOT EXISTS jobs (
///       id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
///       name VARCHAR(256) NOT NULL,
///       kind TINYINT NOT NULL DEFAULT 0 CHECK (kind in (0, 1)),
///       schedule VARCHAR(256) DEFAULT NULL,
///       route_path VARCHAR(512) DEFAULT NULL,
///       slug VARCHAR(256) DEFAULT NULL UNIQUE,
///       is_online BOOLEAN NOT NULL DEFAULT 0,
///       node_id INTEGER DEFAULT NULL,
///       created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
///       FOREIGN KEY(node_id) REFERENCES nodes(id)
/// );
/// ```
///
/// The `job.id` primary key groups the rows of the `tasks` table
/// (see `crate::models::Task`), a job and its tasks are always written together,
/// see `crate::models::Batch`.
#[derive(Debug, Clone, Serialize)]
pub struct Job<Id> {
    pub id: Id,
    /// human readable name, not unique
    pub name: String,
    pub kind: JobKind,
    /// cron-style expression
    pub schedule: Option<String>,
    /// path used to trigger the job from the outside
    pub route_path: Option<String>,
    /// globally unique short identifier
    pub slug: Option<String>,
    pub is_online: bool,
    /// node this job runs on
    pub node_id: Option<NodeId>,
    pub created_at: NaiveDateTime,
}

impl Job<NewJob> {
    /// Build a Job, using the current time as `created_at`.
    /// The returned instance is not saved in the database.
    pub fn new(name: &str, kind: JobKind) -> Self {
        Job {
            id: NewJob,
            name: name.to_string(),
            kind,
            schedule: None,
            route_path: None,
            slug: None,
            is_online: false,
            node_id: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub async fn save(self, conn: &mut SqliteConnection) -> Result<Job<JobId>, ModelError> {
        let query_result = sqlx::query(
            "INSERT INTO jobs \
            (name, kind, schedule, route_path, slug, is_online, node_id, created_at) \
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&self.name)
        .bind(self.kind.as_u8())
        .bind(&self.schedule)
        .bind(&self.route_path)
        .bind(&self.slug)
        .bind(self.is_online)
        .bind(self.node_id)
        .bind(self.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(Job {
            id: query_result.last_insert_rowid(),
            name: self.name,
            kind: self.kind,
            schedule: self.schedule,
            route_path: self.route_path,
            slug: self.slug,
            is_online: self.is_online,
            node_id: self.node_id,
            created_at: self.created_at,
        })
    }
}

impl Job<JobId> {
    /// Select a Job by its id
    pub async fn get_by_id(id: JobId, conn: &mut SqliteConnection) -> Result<Self, ModelError> {
        let row = sqlx::query(
            "SELECT id, name, kind, schedule, route_path, slug, is_online, node_id, created_at \
            FROM jobs WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
        Self::from_row(&row)
    }

    /// Select a Job by its slug
    pub async fn get_by_slug(slug: &str, conn: &mut SqliteConnection) -> Result<Self, ModelError> {
        let row = sqlx::query(
            "SELECT id, name, kind, schedule, route_path, slug, is_online, node_id, created_at \
            FROM jobs WHERE slug = ?",
        )
        .bind(slug)
        .fetch_one(&mut *conn)
        .await?;
        Self::from_row(&row)
    }

    fn from_row(row: &SqliteRow) -> Result<Self, ModelError> {
        let kind_code: u8 = row
            .try_get("kind")
            .map_err(|_| ModelError::ColumnError("kind".to_string()))?;
        let kind =
            JobKind::from_u8(kind_code).map_err(|_| ModelError::ColumnError("kind".to_string()))?;
        Ok(Self {
            id: row
                .try_get("id")
                .map_err(|_| ModelError::ColumnError("id".to_string()))?,
            name: row
                .try_get("name")
                .map_err(|_| ModelError::ColumnError("name".to_string()))?,
            kind,
            schedule: row
                .try_get("schedule")
                .map_err(|_| ModelError::ColumnError("schedule".to_string()))?,
            route_path: row
                .try_get("route_path")
                .map_err(|_| ModelError::ColumnError("route_path".to_string()))?,
            slug: row
                .try_get("slug")
                .map_err(|_| ModelError::ColumnError("slug".to_string()))?,
            is_online: row
                .try_get("is_online")
                .map_err(|_| ModelError::ColumnError("is_online".to_string()))?,
            node_id: row
                .try_get("node_id")
                .map_err(|_| ModelError::ColumnError("node_id".to_string()))?,
            created_at: row
                .try_get("created_at")
                .map_err(|_| ModelError::ColumnError("created_at".to_string()))?,
        })
    }

    /// Number of jobs stored, used to check that failed writes left nothing behind.
    pub async fn count(conn: &mut SqliteConnection) -> Result<i64, ModelError> {
        let (count,): (i64,) = sqlx::query_as("SELECT count(id) FROM jobs")
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }
}
