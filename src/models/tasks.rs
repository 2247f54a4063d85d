use crate::models::{JobId, ModelError};
use rocket::futures::TryStreamExt;
use serde::Serialize;
use sqlx::sqlite::SqliteConnection;
use sqlx::Row;

/// newly created task, not existing in db yet
#[derive(Debug, Clone, Copy)]
pub struct NewTask;
/// id (primary key) of a task
pub type TaskId = i64;

/// This `Task` struct implements abstraction over the `tasks` SQL table,
/// defined as such:
/// ```sql
/// CREATE TABLE IF NOT EXISTS tasks (
///       id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
///       job_id INTEGER NOT NULL,
///       name VARCHAR(256) NOT NULL,
///       command TEXT NOT NULL,
///       next_tasks TEXT NOT NULL DEFAULT "",
///       FOREIGN KEY(job_id) REFERENCES jobs(id),
///       UNIQUE(job_id, name)
/// );
/// ```
/// Each record is one command to execute.
///
/// Each `Task` is linked to one `crate::models::Job` (many to one relationship) through its `job_id` attribute.
///
/// The dependency edges are stored on the parent side: `next_tasks` holds the names
/// of the tasks (of the same job) that can start once this one is done,
/// as a comma separated list.
#[derive(Debug, Clone, Serialize)]
pub struct Task<Id> {
    pub id: Id,
    /// id of the related `Job` model
    pub job_id: JobId,
    /// unique within a job
    pub name: String,
    pub command: String,
    /// names of the successor tasks
    pub next_tasks: Vec<String>,
}

impl Task<NewTask> {
    pub async fn save(self, conn: &mut SqliteConnection) -> Result<Task<TaskId>, ModelError> {
        let query_result = sqlx::query(
            "INSERT INTO tasks (job_id, name, command, next_tasks) \
            VALUES (?, ?, ?, ?)",
        )
        .bind(self.job_id)
        .bind(&self.name)
        .bind(&self.command)
        .bind(self.next_tasks.join(","))
        .execute(&mut *conn)
        .await?;

        let id: TaskId = query_result.last_insert_rowid();

        Ok(Task {
            id,
            job_id: self.job_id,
            name: self.name,
            command: self.command,
            next_tasks: self.next_tasks,
        })
    }
}

impl Task<TaskId> {
    /// Select all tasks of a job, in insertion order.
    pub async fn select_by_job(
        job_id: JobId,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<Self>, ModelError> {
        let mut tasks: Vec<Self> = Vec::new();
        let mut rows = sqlx::query(
            "SELECT id, name, command, next_tasks FROM tasks WHERE job_id = ? ORDER BY id",
        )
        .bind(job_id)
        .fetch(&mut *conn);

        while let Some(row) = rows.try_next().await? {
            let next_tasks: String = row
                .try_get("next_tasks")
                .map_err(|_| ModelError::ColumnError("next_tasks".to_string()))?;
            tasks.push(Self {
                id: row
                    .try_get("id")
                    .map_err(|_| ModelError::ColumnError("id".to_string()))?,
                job_id,
                name: row
                    .try_get("name")
                    .map_err(|_| ModelError::ColumnError("name".to_string()))?,
                command: row
                    .try_get("command")
                    .map_err(|_| ModelError::ColumnError("command".to_string()))?,
                next_tasks: next_tasks
                    .split(',')
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect(),
            });
        }
        Ok(tasks)
    }

    /// Number of tasks stored, across all jobs.
    pub async fn count(conn: &mut SqliteConnection) -> Result<i64, ModelError> {
        let (count,): (i64,) = sqlx::query_as("SELECT count(id) FROM tasks")
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test::setup_in_memory_database;
    use crate::models::{Job, JobKind};
    use rocket::tokio;

    fn new_task(job_id: JobId, name: &str, next_tasks: &[&str]) -> Task<NewTask> {
        Task {
            id: NewTask,
            job_id,
            name: name.to_string(),
            command: format!("echo {}", name),
            next_tasks: next_tasks.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_next_tasks_survive_storage() {
        let mut conn = setup_in_memory_database().await.unwrap();
        let job = Job::new("job", JobKind::Manual).save(&mut conn).await.unwrap();

        new_task(job.id, "A", &["B", "C"]).save(&mut conn).await.unwrap();
        new_task(job.id, "B", &[]).save(&mut conn).await.unwrap();

        let tasks = Task::select_by_job(job.id, &mut conn).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].name, "A");
        assert_eq!(tasks[0].next_tasks, vec!["B", "C"]);
        assert_eq!(tasks[0].command, "echo A");
        assert!(tasks[1].next_tasks.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_task_names_are_unique_per_job() {
        let mut conn = setup_in_memory_database().await.unwrap();
        let job_a = Job::new("a", JobKind::Manual).save(&mut conn).await.unwrap();
        let job_b = Job::new("b", JobKind::Manual).save(&mut conn).await.unwrap();

        new_task(job_a.id, "build", &[]).save(&mut conn).await.unwrap();
        // same name, other job: fine
        new_task(job_b.id, "build", &[]).save(&mut conn).await.unwrap();

        let err = new_task(job_a.id, "build", &[])
            .save(&mut conn)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Conflict(_)));
        assert_eq!(Task::count(&mut conn).await.unwrap(), 2);
    }
}
