use crate::models::{Batch, JobKind, NodeId};
use crate::workflows::error::JobError;
use crate::workflows::graph::{render_path, DependencyGraph};
use serde::Deserialize;
use sqlx::SqliteConnection;
use std::collections::HashSet;

/// A job submission, as sent by clients:
/// ```json
/// {
///   "name": "deploy",
///   "schedule": "0 * * * *",
///   "tasks": [
///     { "name": "build", "command": "make", "next_tasks": "test,lint" },
///     { "name": "test", "command": "make test" },
///     { "name": "lint", "command": "make lint" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct JobRequest {
    pub name: String,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub route_path: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub node_id: Option<NodeId>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub tasks: Vec<TaskRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskRequest {
    pub name: String,
    pub command: String,
    /// comma separated task names, eg: "task1,task2"
    #[serde(default)]
    pub next_tasks: Option<String>,
}

impl TaskRequest {
    /// Split `next_tasks` into trimmed names, blank entries are dropped.
    pub fn next_task_names(&self) -> Vec<String> {
        self.next_tasks
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl JobRequest {
    pub fn schedule(&self) -> Option<&str> {
        non_empty(&self.schedule)
    }

    pub fn route_path(&self) -> Option<&str> {
        non_empty(&self.route_path)
    }

    pub fn slug(&self) -> Option<&str> {
        non_empty(&self.slug)
    }

    /// Jobs with a schedule are cron triggered, the others are triggered through their route.
    pub fn kind(&self) -> JobKind {
        match self.schedule() {
            Some(_) => JobKind::Scheduled,
            None => JobKind::Manual,
        }
    }

    /// Check the submission, stops at the first problem found.
    ///
    /// Checks run in this order:
    /// 1. a trigger (schedule or route_path) is set,
    /// 2. there is at least one task,
    /// 3. every name in `next_tasks` is a task of this job,
    /// 4. task names are unique (reported by the graph),
    /// 5. the task graph has no cycle.
    ///
    /// Both triggers may be set at once.
    pub fn validate(&self) -> Result<(), JobError> {
        if self.schedule().is_none() && self.route_path().is_none() {
            return Err(JobError::MissingTrigger);
        }
        if self.tasks.is_empty() {
            return Err(JobError::EmptyTaskSet);
        }
        self.check_task_dependencies()
    }

    fn check_task_dependencies(&self) -> Result<(), JobError> {
        let task_vertices: Vec<(&str, Vec<String>)> = self
            .tasks
            .iter()
            .map(|task| (task.name.as_str(), task.next_task_names()))
            .collect();
        let task_names: HashSet<&str> = self.tasks.iter().map(|task| task.name.as_str()).collect();

        for (task, next_tasks) in &task_vertices {
            if let Some(name) = next_tasks
                .iter()
                .find(|name| !task_names.contains(name.as_str()))
            {
                return Err(JobError::UnknownTaskReference {
                    name: name.clone(),
                    task: task.to_string(),
                });
            }
        }

        let mut graph = DependencyGraph::with_capacity(self.tasks.len())?;
        for (task, next_tasks) in task_vertices {
            graph.add_vertex(task.to_string(), next_tasks)?;
        }
        if graph.has_cycle() {
            return Err(JobError::CyclicDependency {
                path: render_path(&graph.cycle_path()),
            });
        }
        Ok(())
    }

    /// Validate the request, then store the job and its tasks in one transaction.
    pub async fn submit(&self, conn: &mut SqliteConnection) -> Result<Batch, JobError> {
        self.validate()?;
        let batch = Batch::create(self, conn).await?;
        Ok(batch)
    }
}
