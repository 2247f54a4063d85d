use crate::models::{Job, JobId, ModelError, NewJob, NewTask, Task, TaskId};
use crate::workflows::JobRequest;
use sqlx::sqlite::SqliteConnection;
use sqlx::Connection;
use tracing::{debug, info, warn};

/// A `Batch` is a job together with its task graph.
/// It is a composition of 2 kinds of models:
/// * one `crate::models::Job`: metadata about the whole Batch
/// * a collections of `crate::models::Task`s, (commands to be executed),
///   each of them holding its outgoing edges.
#[derive(Debug)]
pub struct Batch {
    pub job: Job<JobId>,
    /// One task == one command to execute == one vertex in the execution graph
    pub tasks: Vec<Task<TaskId>>,
}

impl Batch {
    /// Store a job and all its tasks in one DB transaction.
    ///
    /// `request` is expected to be validated (see `JobRequest::validate`),
    /// this only enforces what the database enforces.
    /// If any insert fails, the transaction is rolled back
    /// and none of the rows are kept.
    pub async fn create(
        request: &JobRequest,
        conn: &mut SqliteConnection,
    ) -> Result<Self, ModelError> {
        let mut transaction = conn.begin().await?;
        debug!(job = %request.name, tasks = request.tasks.len(), "inserting job");

        match Self::insert(request, &mut transaction).await {
            Ok(batch) => {
                transaction.commit().await?;
                info!(
                    job_id = batch.job.id,
                    job = %batch.job.name,
                    tasks = batch.tasks.len(),
                    "job created"
                );
                Ok(batch)
            }
            Err(error) => {
                warn!(job = %request.name, %error, "job insertion failed, rolling back");
                if let Err(rollback_error) = transaction.rollback().await {
                    // the transaction is rolled back anyway when dropped
                    warn!(%rollback_error, "explicit rollback failed");
                }
                Err(error)
            }
        }
    }

    /// Insert the job row, then its task rows, on `conn`.
    /// Commit/rollback is left to the caller.
    pub(crate) async fn insert(
        request: &JobRequest,
        conn: &mut SqliteConnection,
    ) -> Result<Self, ModelError> {
        let mut job = Job::<NewJob>::new(&request.name, request.kind());
        job.schedule = request.schedule().map(String::from);
        job.route_path = request.route_path().map(String::from);
        job.slug = request.slug().map(String::from);
        job.is_online = request.is_online;
        job.node_id = request.node_id;
        let job = job.save(&mut *conn).await?;

        let mut tasks: Vec<Task<TaskId>> = Vec::with_capacity(request.tasks.len());
        for task_request in &request.tasks {
            let task = Task {
                id: NewTask,
                job_id: job.id,
                name: task_request.name.clone(),
                command: task_request.command.clone(),
                next_tasks: task_request.next_task_names(),
            }
            .save(&mut *conn)
            .await?;
            tasks.push(task);
        }
        Ok(Self { job, tasks })
    }

    /// Load a stored job and its tasks.
    pub async fn from_job(job_id: JobId, conn: &mut SqliteConnection) -> Result<Self, ModelError> {
        let job = Job::get_by_id(job_id, &mut *conn).await?;
        let tasks = Task::select_by_job(job_id, &mut *conn).await?;
        Ok(Self { job, tasks })
    }

    /// Load a stored job, looked up by its slug, and its tasks.
    pub async fn from_slug(slug: &str, conn: &mut SqliteConnection) -> Result<Self, ModelError> {
        let job = Job::get_by_slug(slug, &mut *conn).await?;
        let tasks = Task::select_by_job(job.id, &mut *conn).await?;
        Ok(Self { job, tasks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test::setup_in_memory_database;
    use crate::models::{JobKind, NewNode, Node};
    use crate::workflows::TaskRequest;
    use rocket::tokio;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::Executor;
    use std::str::FromStr;

    fn task(name: &str, next_tasks: &str) -> TaskRequest {
        TaskRequest {
            name: name.to_string(),
            command: format!("run {}", name),
            next_tasks: Some(next_tasks.to_string()),
        }
    }

    fn request(tasks: Vec<TaskRequest>) -> JobRequest {
        JobRequest {
            name: "test-job".to_string(),
            schedule: Some("* * * * *".to_string()),
            route_path: None,
            slug: None,
            node_id: None,
            is_online: true,
            tasks,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_batch_persistence() {
        let mut conn = setup_in_memory_database().await.unwrap();
        let node = Node::<NewNode>::new("worker").create(&mut conn).await.unwrap();

        let mut request = request(vec![task("A", "B, C"), task("B", ""), task("C", "")]);
        request.slug = Some("nightly".to_string());
        request.node_id = Some(node.id);
        let batch = Batch::create(&request, &mut conn).await.unwrap();

        let stored = Batch::from_job(batch.job.id, &mut conn).await.unwrap();
        assert_eq!(stored.job.name, "test-job");
        assert_eq!(stored.job.kind, JobKind::Scheduled);
        assert_eq!(stored.job.slug.as_deref(), Some("nightly"));
        assert_eq!(stored.job.node_id, Some(node.id));
        assert!(stored.job.is_online);
        let names: Vec<&str> = stored.tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(stored.tasks[0].next_tasks, vec!["B", "C"]);
        assert!(stored.tasks.iter().all(|t| t.job_id == batch.job.id));

        let by_slug = Batch::from_slug("nightly", &mut conn).await.unwrap();
        assert_eq!(by_slug.job.id, batch.job.id);
        assert_eq!(by_slug.tasks.len(), 3);
        assert!(matches!(
            Batch::from_slug("weekly", &mut conn).await,
            Err(ModelError::ModelNotFound)
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_task_insert_rolls_back_everything() {
        let mut conn = setup_in_memory_database().await.unwrap();
        // the third insert breaks UNIQUE(job_id, name)
        let request = request(vec![task("A", ""), task("B", ""), task("A", "")]);

        let err = Batch::create(&request, &mut conn).await.unwrap_err();
        assert!(matches!(err, ModelError::Conflict(_)));
        assert_eq!(Job::count(&mut conn).await.unwrap(), 0);
        assert_eq!(Task::count(&mut conn).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_job_insert_writes_nothing() {
        let mut conn = setup_in_memory_database().await.unwrap();
        let mut request = request(vec![task("A", "")]);
        request.node_id = Some(1234);

        let err = Batch::create(&request, &mut conn).await.unwrap_err();
        assert!(matches!(err, ModelError::InvalidReference(_)));
        assert_eq!(Job::count(&mut conn).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_dropped_transaction_leaves_no_rows() {
        let mut conn = setup_in_memory_database().await.unwrap();
        {
            let mut transaction = conn.begin().await.unwrap();
            Batch::insert(&request(vec![task("A", "")]), &mut transaction)
                .await
                .unwrap();
            // dropped without commit, eg: the request was cancelled
        }
        assert_eq!(Job::count(&mut conn).await.unwrap(), 0);
        assert_eq!(Task::count(&mut conn).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_slug_submissions() {
        let dir = tempfile::tempdir().unwrap();
        let options = SqliteConnectOptions::from_str(&format!(
            "sqlite://{}",
            dir.path().join("jobs.db").display()
        ))
        .unwrap()
        .create_if_missing(true)
        .busy_timeout(std::time::Duration::from_secs(10));
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .unwrap();
        pool.execute(include_str!("../../migrations/20240101000000_creation.sql"))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..2 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                let mut request = request(vec![task("A", "B"), task("B", "")]);
                request.name = format!("job-{}", i);
                request.slug = Some("shared-slug".to_string());
                let mut conn = pool.acquire().await.unwrap();
                Batch::create(&request, &mut conn).await
            }));
        }
        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(ModelError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error {:?}", other),
            }
        }
        assert_eq!((successes, conflicts), (1, 1));

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(Job::count(&mut conn).await.unwrap(), 1);
        assert_eq!(Task::count(&mut conn).await.unwrap(), 2);
    }
}
