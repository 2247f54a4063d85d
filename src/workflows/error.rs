use crate::models::ModelError;
use crate::workflows::graph::GraphError;
use rocket::http::Status as HttpStatus;
use thiserror::Error;

/// Everything that can go wrong between receiving a job submission
/// and acknowledging it.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("schedule or route_path must be set")]
    MissingTrigger,
    #[error("job must have at least one task")]
    EmptyTaskSet,
    /// `name` is referenced by the `next_tasks` of `task` but no task has that name.
    #[error("failed to find {name} in {task}")]
    UnknownTaskReference { name: String, task: String },
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("found cycle in this job, cycle path: {path}")]
    CyclicDependency { path: String },
    #[error(transparent)]
    Persistence(#[from] ModelError),
}

impl JobError {
    /// True for errors caused by the submission itself,
    /// the client may fix its request and retry.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Self::MissingTrigger
            | Self::EmptyTaskSet
            | Self::UnknownTaskReference { .. }
            | Self::CyclicDependency { .. } => true,
            Self::Graph(GraphError::DuplicateVertex(_)) => true,
            Self::Graph(_) => false,
            Self::Persistence(_) => false,
        }
    }

    /// HTTP status to answer with.
    pub fn http_status(&self) -> HttpStatus {
        match self {
            _ if self.is_validation_error() => HttpStatus::BadRequest,
            Self::Persistence(ModelError::Conflict(_)) => HttpStatus::Conflict,
            Self::Persistence(ModelError::InvalidReference(_)) => HttpStatus::BadRequest,
            Self::Persistence(ModelError::ModelNotFound) => HttpStatus::NotFound,
            _ => HttpStatus::InternalServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            JobError::MissingTrigger.to_string(),
            "schedule or route_path must be set"
        );
        let err = JobError::UnknownTaskReference {
            name: "Z".to_string(),
            task: "A".to_string(),
        };
        assert_eq!(err.to_string(), "failed to find Z in A");
        let err = JobError::CyclicDependency {
            path: "A -> B -> A".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "found cycle in this job, cycle path: A -> B -> A"
        );
        // graph errors are displayed as-is
        let err = JobError::from(GraphError::DuplicateVertex("A".to_string()));
        assert_eq!(err.to_string(), "vertex A is already in the graph");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(JobError::EmptyTaskSet.http_status(), HttpStatus::BadRequest);
        assert_eq!(
            JobError::from(GraphError::DuplicateVertex("A".to_string())).http_status(),
            HttpStatus::BadRequest
        );
        assert_eq!(
            JobError::from(GraphError::CapacityExceeded(1)).http_status(),
            HttpStatus::InternalServerError
        );
        assert_eq!(
            JobError::from(ModelError::Conflict("slug".to_string())).http_status(),
            HttpStatus::Conflict
        );
        assert_eq!(
            JobError::from(ModelError::DbError("disk full".to_string())).http_status(),
            HttpStatus::InternalServerError
        );
    }
}
